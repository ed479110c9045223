//! Headless stagehand runner: preview playback, position queries and
//! merged keyframe export from the command line.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use anyhow::Context as _;
    use clap::{Parser, Subcommand};
    use stagehand::config::AppConfig;
    use stagehand::format::{MergedExport, read_script};
    use stagehand::interpolate::Interpolator;
    use stagehand::model::ActorId;
    use stagehand::playback::Playback;
    use stagehand::preview::{PreviewScript, PreviewSession};
    use stagehand::sample::sample_script;
    use stagehand::timeline::format_time_display;
    use stagehand_time::{Clock, ManualClock, SharedClock, SystemClock, unix_millis};

    #[derive(Parser, Debug)]
    #[command(name = "stagehand", version, about = "Stage rehearsal preview tools")]
    struct Cli {
        /// Configuration file (defaults to the user config directory)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        cmd: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Play a preview script and print actor positions as it runs.
        Play(PlayArgs),
        /// Print the interpolated position of one actor.
        Position(PositionArgs),
        /// Write a script's keyframes as a merged export file.
        Export(ExportArgs),
        /// Print the built-in sample script as JSON.
        Sample,
    }

    #[derive(Parser, Debug)]
    struct PlayArgs {
        /// Preview script JSON (defaults to the sample show)
        #[arg(long)]
        script: Option<PathBuf>,

        /// Playback speed multiplier, 0.25 to 2
        #[arg(long)]
        speed: Option<f64>,

        /// Follow the wall clock instead of running as fast as possible
        #[arg(long, default_value_t = false)]
        realtime: bool,

        /// Print every Nth tick
        #[arg(long, default_value_t = 10)]
        every: u32,
    }

    #[derive(Parser, Debug)]
    struct PositionArgs {
        /// Actor id
        #[arg(long)]
        actor: u64,

        /// Time in seconds
        #[arg(long)]
        time: f64,

        /// Preview script JSON (defaults to the sample show)
        #[arg(long)]
        script: Option<PathBuf>,
    }

    #[derive(Parser, Debug)]
    struct ExportArgs {
        /// Output file; relative paths land in the configured export folder
        #[arg(long)]
        out: Option<PathBuf>,

        /// Preview script JSON (defaults to the sample show)
        #[arg(long)]
        script: Option<PathBuf>,
    }

    pub fn run() -> anyhow::Result<()> {
        let cli = Cli::parse();
        let config = match &cli.config {
            Some(path) => AppConfig::load_from(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AppConfig::load_from_default_path().unwrap_or_default(),
        };
        stagehand::native::init_logging(config.preferences.log_level.to_level_filter());

        match cli.cmd {
            Command::Play(args) => cmd_play(&config, args),
            Command::Position(args) => cmd_position(args),
            Command::Export(args) => cmd_export(&config, args),
            Command::Sample => cmd_sample(),
        }
    }

    fn load_script(path: Option<&Path>) -> anyhow::Result<PreviewScript> {
        match path {
            Some(path) => {
                read_script(path).with_context(|| format!("reading script {}", path.display()))
            }
            None => Ok(sample_script()),
        }
    }

    fn cmd_play(config: &AppConfig, args: PlayArgs) -> anyhow::Result<()> {
        let script = load_script(args.script.as_deref())?;
        let interval = config.tick_interval();
        let playback = Playback::default()
            .with_tick_interval(interval)
            .with_speed(args.speed.unwrap_or(config.playback.default_speed));
        let mut session = PreviewSession::with_playback(script, playback);

        let manual = Arc::new(ManualClock::new());
        let clock: SharedClock = if args.realtime {
            SystemClock::shared()
        } else {
            manual.clone()
        };

        println!(
            "Playing {:.1}s at {}x",
            session.playback().duration(),
            session.playback().speed()
        );
        session.start(clock.now());
        print_frame(&session);

        let every = args.every.max(1);
        let mut ticks: u32 = 0;
        loop {
            if args.realtime {
                std::thread::sleep(interval);
            } else {
                manual.advance(interval);
            }
            let outcome = session.pump(clock.now());
            if !outcome.advanced() {
                continue;
            }
            let before = ticks / every;
            ticks += outcome.ticks;
            if outcome.finished || ticks / every != before {
                print_frame(&session);
            }
            if outcome.finished {
                break;
            }
        }
        println!("Done after {ticks} ticks");
        Ok(())
    }

    fn print_frame(session: &PreviewSession) {
        let positions = session
            .positions()
            .iter()
            .map(|(id, p)| format!("{id}:({:.0},{:.0})", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        let speaking = session
            .active_dialogues()
            .map(|d| format!("[{}] {}", d.actor_id, d.content))
            .collect::<Vec<_>>()
            .join(" / ");
        if speaking.is_empty() {
            println!("{}  {}", format_time_display(session.current_time()), positions);
        } else {
            println!(
                "{}  {}  {}",
                format_time_display(session.current_time()),
                positions,
                speaking
            );
        }
    }

    fn cmd_position(args: PositionArgs) -> anyhow::Result<()> {
        let script = load_script(args.script.as_deref())?;
        let p = Interpolator::new(&script.keyframes, &[])
            .position_at(ActorId(args.actor), args.time);
        println!("{} {}", p.x, p.y);
        Ok(())
    }

    fn cmd_export(config: &AppConfig, args: ExportArgs) -> anyhow::Result<()> {
        let script = load_script(args.script.as_deref())?;
        let session = PreviewSession::new(script);
        let export = MergedExport::from_session(&session);

        let out = args.out.unwrap_or_else(|| {
            PathBuf::from(MergedExport::default_filename(unix_millis() / 1000))
        });
        let folder = &config.preferences.export_folder;
        let out = if out.is_relative() && !folder.is_empty() {
            Path::new(folder).join(out)
        } else {
            out
        };

        export
            .write_to(&out)
            .with_context(|| format!("writing {}", out.display()))?;
        println!("Wrote {} positions to {}", export.position_count(), out.display());
        Ok(())
    }

    fn cmd_sample() -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(&sample_script())?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}

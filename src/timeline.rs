//! Timeline tracks and time formatting.
//!
//! Cues are laid out at a fixed scale of [`TIMELINE_PX_PER_SECOND`]: one
//! track per actor holding its dialogue and movement segments, followed by a
//! music track and a lighting track when those have any cues.

use crate::constants::TIMELINE_PX_PER_SECOND;
use crate::model::{ActorId, Dialogue, StageDocument, TimedCue};

const MUSIC_TRACK_COLOR: &str = "#81a1c1";
const LIGHT_TRACK_COLOR: &str = "#e6b17a";
/// Alpha suffix that renders movement segments translucent
const MOVEMENT_ALPHA: &str = "88";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Dialogue,
    Movement,
    Music,
    Light,
}

impl SegmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            SegmentKind::Dialogue => "Dialogue",
            SegmentKind::Movement => "Movement",
            SegmentKind::Music => "Music",
            SegmentKind::Light => "Light",
        }
    }
}

/// One cue drawn on a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSegment {
    /// Id of the cue this segment shows
    pub id: String,
    pub kind: SegmentKind,
    /// Left edge in pixels
    pub start_px: f64,
    pub width_px: f64,
    pub color: String,
}

/// Which rows a track belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKey {
    Actor(ActorId),
    Music,
    Lighting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineTrack {
    pub key: TrackKey,
    pub name: String,
    pub segments: Vec<TimelineSegment>,
}

pub fn time_to_px(seconds: f64) -> f64 {
    seconds * TIMELINE_PX_PER_SECOND
}

pub fn px_to_time(px: f64) -> f64 {
    px / TIMELINE_PX_PER_SECOND
}

fn segment(cue: &impl TimedCue, id: &str, kind: SegmentKind, color: String) -> TimelineSegment {
    TimelineSegment {
        id: id.to_string(),
        kind,
        start_px: time_to_px(cue.start_time()),
        width_px: time_to_px(cue.duration()),
        color,
    }
}

/// Lay out every cue of the document.
pub fn build_tracks(doc: &StageDocument) -> Vec<TimelineTrack> {
    let mut tracks = Vec::with_capacity(doc.actors().len() + 2);

    for actor in doc.actors() {
        let dialogues = doc
            .dialogues_for(actor.id)
            .map(|d| segment(d, &d.id, SegmentKind::Dialogue, actor.color.clone()));
        let movements = doc.movements_for(actor.id).map(|m| {
            segment(m, &m.id, SegmentKind::Movement, format!("{}{MOVEMENT_ALPHA}", actor.color))
        });
        tracks.push(TimelineTrack {
            key: TrackKey::Actor(actor.id),
            name: actor.name.clone(),
            segments: dialogues.chain(movements).collect(),
        });
    }

    if !doc.music_tracks().is_empty() {
        tracks.push(TimelineTrack {
            key: TrackKey::Music,
            name: "Music".to_string(),
            segments: doc
                .music_tracks()
                .iter()
                .map(|m| segment(m, &m.id, SegmentKind::Music, MUSIC_TRACK_COLOR.to_string()))
                .collect(),
        });
    }

    if !doc.lights().is_empty() {
        tracks.push(TimelineTrack {
            key: TrackKey::Lighting,
            name: "Lighting".to_string(),
            segments: doc
                .lights()
                .iter()
                .map(|l| segment(l, &l.id, SegmentKind::Light, LIGHT_TRACK_COLOR.to_string()))
                .collect(),
        });
    }

    tracks
}

/// Dialogues whose `[start, start + duration]` contains `time`.
pub fn dialogues_at(dialogues: &[Dialogue], time: f64) -> Vec<&Dialogue> {
    dialogues.iter().filter(|d| d.contains(time)).collect()
}

/// `MM:SS.cc`. Negative or non-finite input shows as zero.
pub fn format_time_display(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let centis = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{minutes:02}:{secs:02}.{centis:02}")
}

fn format_minutes_seconds(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes:02}:{secs:02}")
}

/// Turn `"start-end"` in seconds into `"MM:SS-MM:SS"`.
/// Anything else is returned unchanged.
pub fn format_time_range(range: &str) -> String {
    let Some((start, end)) = range.split_once('-') else {
        return range.to_string();
    };
    match (start.trim().parse::<f64>(), end.trim().parse::<f64>()) {
        (Ok(start), Ok(end)) if start.is_finite() && end.is_finite() => {
            format!("{}-{}", format_minutes_seconds(start), format_minutes_seconds(end))
        }
        _ => range.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Actor, Light, LightKind, Point};

    fn line(id: &str, actor: u64, start: f64, duration: f64) -> Dialogue {
        Dialogue {
            id: id.to_string(),
            actor_id: ActorId(actor),
            content: String::new(),
            start_time: start,
            duration,
            emotion: None,
            volume: None,
        }
    }

    #[test]
    fn test_format_time_display() {
        assert_eq!(format_time_display(0.0), "00:00.00");
        assert_eq!(format_time_display(84.5), "01:24.50");
        assert_eq!(format_time_display(45.0), "00:45.00");
        assert_eq!(format_time_display(-3.0), "00:00.00");
    }

    #[test]
    fn test_format_time_range() {
        assert_eq!(format_time_range("15-19"), "00:15-00:19");
        assert_eq!(format_time_range("75.5-130"), "01:15-02:10");
        assert_eq!(format_time_range("soon"), "soon");
        assert_eq!(format_time_range(""), "");
    }

    #[test]
    fn test_dialogues_at_is_inclusive() {
        let lines = vec![line("a", 1, 2.0, 4.0), line("b", 2, 6.0, 1.0)];
        let ids = |t| dialogues_at(&lines, t).iter().map(|d| d.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(1.0), Vec::<String>::new());
        assert_eq!(ids(2.0), vec!["a"]);
        assert_eq!(ids(6.0), vec!["a", "b"]);
        assert_eq!(ids(7.5), Vec::<String>::new());
    }

    #[test]
    fn test_build_tracks() {
        let mut doc = StageDocument::new();
        doc.actors_mut().push(Actor::new(ActorId(1), "Lead", Point::default(), "#a8c090"));
        doc.dialogues_mut().push(line("d1", 1, 2.0, 4.0));
        doc.lights_mut().push(Light {
            id: "l1".to_string(),
            name: "Key".to_string(),
            position: Point::default(),
            direction: 0.0,
            kind: LightKind::Flood,
            color: "#FFFFFF".to_string(),
            intensity: 50.0,
            beam_angle: 30.0,
            start_time: 1.0,
            duration: 3.0,
        });

        let tracks = build_tracks(&doc);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].key, TrackKey::Actor(ActorId(1)));
        assert_eq!(tracks[0].segments[0].start_px, 20.0);
        assert_eq!(tracks[0].segments[0].width_px, 40.0);
        assert_eq!(tracks[1].key, TrackKey::Lighting);
        assert_eq!(tracks[1].segments[0].color, LIGHT_TRACK_COLOR);
    }

    #[test]
    fn test_px_conversion() {
        assert_eq!(time_to_px(4.5), 45.0);
        assert_eq!(px_to_time(45.0), 4.5);
    }
}

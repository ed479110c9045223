//! Browser entry points.
//!
//! The web front end drives the editor itself; these bindings expose the
//! pieces it needs without a round trip through the backend.

use wasm_bindgen::prelude::*;

use crate::interpolate::Interpolator;
use crate::model::ActorId;
use crate::preview::PreviewScript;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"stagehand core loaded".into());
}

/// Sample preview script as JSON.
#[wasm_bindgen(js_name = sampleScript)]
pub fn sample_script() -> Result<String, JsError> {
    Ok(serde_json::to_string(&crate::sample::sample_script())?)
}

/// Interpolated `[x, y]` of `actor` at `time` in a preview script given as JSON.
#[wasm_bindgen(js_name = positionAt)]
pub fn position_at(script_json: &str, actor: u32, time: f64) -> Result<Vec<f64>, JsError> {
    let script: PreviewScript = serde_json::from_str(script_json)?;
    let p = Interpolator::new(&script.keyframes, &[]).position_at(ActorId(u64::from(actor)), time);
    Ok(vec![p.x, p.y])
}

//! Framework-neutral WASM <-> JavaScript bridge for triage scoring.
//!
//! Input is one case object or an array of them:
//!
//! ```json
//! { "vitals": { "hr": 120, "rr": 24, "sbp": 90, "spo2": 92 }, "resource_count": 3 }
//! ```
//!
//! The optional config is a partial parameter set (see [`ParamsOverride`]),
//! e.g. `{ "preset": "strict", "max_resources": 8 }`.

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use triage_core::validate::{clamp_resource_count, sanitize_vitals};
use triage_core::{Engine, Params, ParamsOverride, ReferenceRanges, ScoreBreakdown, TriageError, Vitals};
use triage_export::TriageRecord;
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub resource_count: i32,
    #[serde(default)]
    pub id: Option<String>,
    /// Score against pediatric reference ranges.
    #[serde(default)]
    pub pediatric: bool,
    /// Clamp out-of-bounds vitals and the resource count before scoring.
    #[serde(default)]
    pub clamp: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestInput {
    // Tried first: a struct also deserializes from a sequence.
    Many(Vec<ScoreRequest>),
    One(ScoreRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub record: TriageRecord,
    pub breakdown: ScoreBreakdown,
    pub wait_time_minutes: u32,
    pub recommended_actions: &'static [&'static str],
}

/// Score each request with `params`. Output order matches input order.
pub fn score_requests(requests: &[ScoreRequest], params: Params) -> Vec<ScoreResponse> {
    let adult = Engine::new(params);
    let pediatric = Engine::with_ranges(params, ReferenceRanges::pediatric());
    requests
        .iter()
        .map(|request| {
            let engine = if request.pediatric { &pediatric } else { &adult };
            let (vitals, resource_count) = if request.clamp {
                let (clean, _) = sanitize_vitals(&request.vitals);
                (clean, clamp_resource_count(request.resource_count, params.max_resources))
            } else {
                (request.vitals, request.resource_count)
            };
            let breakdown = engine.breakdown(&vitals, resource_count);
            let level = params.level_for(breakdown.score);
            let mut record = TriageRecord::new(&vitals, resource_count, breakdown.score, level);
            record.id = request.id.clone();
            ScoreResponse {
                record,
                breakdown,
                wait_time_minutes: level.wait_time_minutes(),
                recommended_actions: level.recommended_actions(),
            }
        })
        .collect()
}

/// Resolve an optional partial config onto the default set and validate it.
pub fn resolve_params(config: Option<ParamsOverride>) -> Result<Params, TriageError> {
    config.unwrap_or_default().into_params().validated()
}

/// JSON-string entry point behind [`score_vitals`], usable without a JS host.
///
/// A single case in gives a single result object out; an array gives an array.
pub fn score_json(input: &str, config: Option<&str>) -> Result<String, String> {
    let input: RequestInput =
        serde_json::from_str(input).map_err(|err| format!("Cannot read case JSON: {err}"))?;
    let config = config
        .map(serde_json::from_str::<ParamsOverride>)
        .transpose()
        .map_err(|err| format!("Cannot read config: {err}"))?;
    let params = resolve_params(config).map_err(format_triage_error)?;
    let output = match input {
        RequestInput::One(request) => serde_json::to_string(&score_requests(&[request], params)[0]),
        RequestInput::Many(requests) => serde_json::to_string(&score_requests(&requests, params)),
    };
    output.map_err(|err| format!("Cannot serialize result: {err}"))
}

#[wasm_bindgen]
pub fn score_vitals(input: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let input: RequestInput = from_value(input)
        .map_err(|err| JsValue::from_str(&format!("Cannot read case JSON: {err}")))?;

    let params = resolve_js_config(config)?;

    let serialized = match input {
        RequestInput::One(request) => to_value(&score_requests(&[request], params)[0]),
        RequestInput::Many(requests) => to_value(&score_requests(&requests, params)),
    };
    serialized.map_err(|err| JsValue::from_str(&format!("Cannot serialize result: {err}")))
}

/// The parameter set a config resolves to, for display in settings panels.
#[wasm_bindgen]
pub fn resolved_params(config: Option<JsValue>) -> Result<JsValue, JsValue> {
    let params = resolve_js_config(config)?;
    to_value(&params).map_err(|err| JsValue::from_str(&format!("Cannot serialize params: {err}")))
}

fn resolve_js_config(config: Option<JsValue>) -> Result<Params, JsValue> {
    let overrides = match config {
        Some(js_cfg) => Some(
            from_value::<ParamsOverride>(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Cannot read config: {err}")))?,
        ),
        None => None,
    };
    resolve_params(overrides).map_err(|err| JsValue::from_str(&format_triage_error(err)))
}

fn format_triage_error(err: TriageError) -> String {
    format!("Triage error: {err}")
}

//! Pulls the plan object out of free-form generator text.
//!
//! The generator is told to answer with bare JSON but often wraps it in a
//! ```` ```json ```` fence or a sentence of prose. Extraction is deliberately a
//! slice from the first `{` to the last `}`; it does not balance braces, so
//! stray braces in prose can produce a bad slice. The JSON parse that follows
//! is what actually decides whether the text was usable.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::errors::PlannerError;

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"(?is)```json(.*?)```").unwrap();
}

/// Returns the best-guess JSON object substring of `text`.
pub fn extract_json(text: &str) -> Result<&str, PlannerError> {
    if text.trim().is_empty() {
        return Err(PlannerError::MalformedResponse("DeepSeek 回傳為空字串。".to_string()));
    }
    let candidate = JSON_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);

    match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&candidate[start..=end]),
        _ => Err(PlannerError::MalformedResponse(
            "DeepSeek 回傳內容找不到 JSON 結構。".to_string(),
        )),
    }
}

/// Extracts and parses the plan. The result is any JSON value; checking that
/// it is an object is left to the canonicalizer.
pub fn parse_plan(raw_text: &str) -> Result<Value, PlannerError> {
    let json_text = extract_json(raw_text)?;
    debug!("Extracted plan JSON ({} bytes)", json_text.len());
    serde_json::from_str(json_text).map_err(|e| {
        PlannerError::MalformedResponse(format!("DeepSeek 回傳內容無法解析為 JSON：{}", e))
    })
}

//! Pipeline entry points: raw request in, canonical plan out.

use log::info;
use serde_json::Value;

use crate::api_connection::PlanGenerator;
use crate::config::PlannerConfig;
use crate::errors::PlannerError;
use crate::json_extractor::parse_plan;
use crate::plan::{canonicalize_plan, Plan, Timeframe};
use crate::prompt::build_prompt;
use crate::request::{ensure_goal, normalize_request};

pub async fn generate_plan<G>(
    raw_request: &Value,
    timeframe: Timeframe,
    config: &PlannerConfig,
    generator: &G,
) -> Result<Plan, PlannerError>
where
    G: PlanGenerator + ?Sized,
{
    let request = normalize_request(raw_request, config.history_limit);
    ensure_goal(&request, timeframe)?;

    let prompt = build_prompt(&request, timeframe)
        .map_err(|e| PlannerError::Configuration(format!("無法建立提示內容：{}", e)))?;
    info!(
        "Requesting {} plan for goal {:?} with {} history turns",
        timeframe,
        request.goal,
        request.history.len()
    );

    let raw_text = generator.generate(&prompt, &request.history).await?;
    let parsed = parse_plan(&raw_text)?;
    canonicalize_plan(&parsed, timeframe, &request)
}

pub async fn generate_day_plan<G>(
    raw_request: &Value,
    config: &PlannerConfig,
    generator: &G,
) -> Result<Plan, PlannerError>
where
    G: PlanGenerator + ?Sized,
{
    generate_plan(raw_request, Timeframe::Day, config, generator).await
}

pub async fn generate_week_plan<G>(
    raw_request: &Value,
    config: &PlannerConfig,
    generator: &G,
) -> Result<Plan, PlannerError>
where
    G: PlanGenerator + ?Sized,
{
    generate_plan(raw_request, Timeframe::Week, config, generator).await
}

use anyhow::{Context, Result};
use log::{error, info};
use meal_planner::api_connection::Provider;
use meal_planner::cli::{load_json, parse_args, Command};
use meal_planner::config::PlannerConfig;
use meal_planner::planner::generate_plan;
use meal_planner::shopping_list::build_shopping_list;
use meal_planner::{PlannerError, Timeframe};
use serde_json::json;

fn report(err: PlannerError) -> anyhow::Error {
    if err.is_client_fault() {
        info!("Request rejected ({}): {}", err.status_code(), err.message());
    } else {
        error!("Planning failed ({}): {}", err.status_code(), err);
    }
    anyhow::anyhow!("{}", err.message())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let config = PlannerConfig::from_env();
    let cli_args = parse_args();

    let output = match cli_args.command {
        Command::Day { request } => run_plan(&request, Timeframe::Day, &config).await?,
        Command::Week { request } => run_plan(&request, Timeframe::Week, &config).await?,
        Command::ShoppingList { plan } => {
            let plan = load_json(&plan).await?;
            // Accept either a bare plan or the `{"plan": ...}` envelope.
            let plan = plan.get("plan").cloned().unwrap_or(plan);
            let list = build_shopping_list(&plan).map_err(report)?;
            json!({ "list": list })
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render output")?
    );
    Ok(())
}

async fn run_plan(
    request_path: &std::path::Path,
    timeframe: Timeframe,
    config: &PlannerConfig,
) -> Result<serde_json::Value> {
    let raw_request = load_json(request_path).await?;
    let provider = Provider::deepseek(config);
    info!("Generating {} plan with model {}", timeframe, provider.model());
    let plan = generate_plan(&raw_request, timeframe, config, &provider)
        .await
        .map_err(report)?;
    serde_json::to_value(&plan).context("Failed to serialize plan")
}

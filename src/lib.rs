pub mod api_connection;
pub mod cli;
pub mod config;
pub mod errors;
pub mod json_extractor;
pub mod normalize;
pub mod plan;
pub mod planner;
pub mod prompt;
pub mod request;
pub mod shopping_list;

pub use errors::PlannerError;
pub use plan::{Plan, Timeframe};

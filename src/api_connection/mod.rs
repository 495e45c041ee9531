pub mod connection;
pub mod endpoints;

pub use connection::{ApiConnectionError, PlanGenerator};
pub use endpoints::Provider;

pub mod health;
pub mod stats;

pub use health::{AppStartTime, HealthService, health_routes};
pub use stats::{actions_routes, data_routes, query_config, views_routes};

//! API endpoint modules.

pub mod design_rules;
pub mod health;
pub mod openapi;
pub mod scenarios;
pub mod server_runs;
pub mod sessions;

pub use design_rules::configure_routes as configure_design_rule_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use scenarios::configure_routes as configure_scenario_routes;
pub use server_runs::configure_routes as configure_run_routes;
pub use sessions::configure_routes as configure_session_routes;
pub use sessions::configure_runtime_routes;

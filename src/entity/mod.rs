//! SeaORM entity definitions for PostgreSQL database.

pub mod endpoint;
pub mod endpoint_config;
pub mod environment;
pub mod exposed_url;
pub mod postman_test;
pub mod postman_test_result;
pub mod report;
pub mod rule_result;
pub mod rule_session;
pub mod scenario_case;
pub mod scenario_variable;
pub mod scheduled_scenario;
pub mod server_run;
pub mod session;
pub mod session_log;
pub mod session_type;
pub mod test_option;
pub mod test_scenario;
pub mod test_suite;
pub mod test_version;

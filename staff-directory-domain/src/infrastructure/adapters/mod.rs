pub mod cognito_gateway;
pub mod env_config;
pub mod in_memory_gateway;
pub mod telemetry;

pub use cognito_gateway::*;
pub use env_config::*;
pub use in_memory_gateway::*;
pub use telemetry::{default_directive, init_tracing};

pub mod agent_config;
pub mod transition;

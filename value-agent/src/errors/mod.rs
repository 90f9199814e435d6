pub mod agent_error;

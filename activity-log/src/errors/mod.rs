pub mod activity_log_error;

pub mod activity_event;
pub mod activity_type;
pub mod user_state;

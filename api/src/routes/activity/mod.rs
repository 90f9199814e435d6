pub mod record_activity_request;
pub mod record_activity_route;

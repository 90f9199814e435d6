pub mod home_feed_route;
pub mod recommendations_query;
pub mod recommendations_response;
pub mod recommendations_route;

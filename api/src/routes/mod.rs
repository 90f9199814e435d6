pub mod activity;
pub mod health_route;
pub mod recommendations;
pub mod similar_products;

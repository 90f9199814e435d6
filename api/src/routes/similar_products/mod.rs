pub mod similar_products_query;
pub mod similar_products_route;

pub mod product_tracking;
pub mod rec_config;
pub mod recommended_product;
pub mod training_report;

pub mod category;
pub mod vector_columns;
pub mod neighbor;

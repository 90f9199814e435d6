pub mod content_filter_error;

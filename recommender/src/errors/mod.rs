pub mod recommender_error;

pub mod backend;
pub mod json_store;
pub mod schema;
pub mod score_store;

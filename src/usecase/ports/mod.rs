pub mod catalog_api;
pub mod session_store;

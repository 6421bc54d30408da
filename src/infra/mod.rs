pub mod export;
pub mod http;
pub mod image;
pub mod sqlite;

pub mod entities;
pub mod table_engine;

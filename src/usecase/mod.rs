pub mod cache;
pub mod ports;
pub mod services;
pub mod workflow;

pub mod address;
pub mod config;
pub mod error;
pub mod integrity;
pub mod mapping;
pub mod resolver;
pub mod table;
pub mod types;

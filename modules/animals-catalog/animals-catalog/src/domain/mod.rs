pub mod cache;
pub mod list;
pub mod service;

pub mod cache;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod packages;
pub mod registry;
pub mod scheduler;
pub mod util;
pub mod version;

pub mod config;
pub mod error;
pub mod formula;
pub mod generator;
pub mod maze;
pub mod pipeline;
pub mod render;

pub mod input_user;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod directory;
pub mod load_config;
pub mod notion;

pub use cli::{run, Cli, Commands};

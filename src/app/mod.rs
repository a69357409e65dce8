pub mod cli;
pub mod config;
pub mod error;

pub use cli::CliApp;
pub use config::{Args, SimulationConfig};
pub use error::AppError;

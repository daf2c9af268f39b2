pub mod collaborators;
pub mod complex_path;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod router;
pub mod simple_path;
pub mod types;

pub use crate::config::Config;
pub use crate::error::SessionError;
pub use crate::orchestrator::{Collaborators, Orchestrator};

pub mod action;
pub mod catalog;
pub mod config;
pub mod error;
pub mod io;
pub mod orchestrator;
pub mod paths;
pub mod stage;
pub mod tooling;

pub use error::{PipelineError, Result};

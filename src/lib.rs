pub mod config;
pub mod error;
pub mod replicate;
pub mod server;
pub mod tryon;

pub use error::{Error, Result};

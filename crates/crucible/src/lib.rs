pub mod build;
pub mod config;
pub mod error;
pub mod parse;
pub mod session;

pub use error::{Error, Result};

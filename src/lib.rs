#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

pub mod config;
pub mod error;
pub mod sql;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};

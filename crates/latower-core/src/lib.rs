//! # LATower Core
//!
//! Core types shared by every crate of the linear advance tower generator:
//! the unified error taxonomy and the fixed chunk pipeline.

pub mod chunk;
pub mod error;

pub use chunk::Chunk;
pub use error::{ConfigError, Error, GcodeError, ProfileError, Result};

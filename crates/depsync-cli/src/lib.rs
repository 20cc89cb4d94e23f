//! depsync library - expose modules for testing
//!
//! This library exposes the command handlers and their shared settings so
//! they can be exercised without going through the binary.

pub mod commands;
pub mod common;
pub mod errors;
pub mod installer;
pub mod settings;

//! Command-line and HTTP surfaces for the formscope engine.

pub mod commands;
pub mod options;
pub mod server;

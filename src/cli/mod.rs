//! Command line interface

pub mod commands;
pub mod expose;

pub use self::commands::{CliArgs, Commands};
pub use self::expose::ExposeCommand;

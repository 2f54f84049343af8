//! # nails-console
//!
//! Console application and scaffolding toolkit for Nails applications: command
//! discovery, an explicit command registry, template-driven code generation and
//! the `services.php` registry rewriter.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod state;

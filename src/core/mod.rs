// src/core/mod.rs

pub mod command_locator;
pub mod config_loader;
pub mod errors;
pub mod maker;
pub mod paths;
pub mod service_document;
pub mod service_registry;
pub mod template;

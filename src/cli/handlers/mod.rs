// src/cli/handlers/mod.rs

// One module per console command.

pub mod commons;
pub mod list;
pub mod make_console;
pub mod make_service;
pub mod services_sort;

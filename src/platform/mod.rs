// LogWarden - platform/mod.rs
//
// Platform layer: config directory and config.toml, file content reading.
// Dependencies: standard library, directories, toml, memmap2.
// Must NOT depend on: core, app.

pub mod config;
pub mod fs;

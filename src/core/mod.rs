// LogWarden - core/mod.rs
//
// Core business logic layer: detection, parsing, threat analysis and the
// pure helpers built on them.
// Must NOT depend on: platform, app, or the binary.

pub mod analysis;
pub mod brute_force;
pub mod detect;
pub mod discovery;
pub mod export;
pub mod filter;
pub mod grammar;
pub mod level;
pub mod model;
pub mod parser;
pub mod summary;
pub mod threat;

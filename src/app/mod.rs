// LogWarden - app/mod.rs
//
// Application layer: per-file orchestration and report rendering.
// Dependencies: core and platform layers.

pub mod analyze;
pub mod report;

pub mod config;
pub mod eval;
pub mod sample;

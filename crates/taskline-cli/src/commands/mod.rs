pub mod common;
pub mod config;
pub mod generate;
pub mod schedule;
pub mod timer;

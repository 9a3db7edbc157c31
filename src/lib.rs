// ABOUTME: Library root for parley — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod app;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod render;
pub mod session;

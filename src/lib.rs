// Library target exists solely for integration tests.
// The binary entry point is main.rs; this file re-declares the module tree so
// tests can import types via `wordpace::engine::*` / `wordpace::session::*`.
// Most code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

// Public: used directly by integration tests
pub mod config;
pub mod engine;
pub mod generator;
pub mod session;
pub mod store;

// Private: required transitively (won't compile without them)
mod app;
mod event;
mod ui;

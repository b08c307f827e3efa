// Library surface for the drill app, benches, and integration tests.
// The maintenance binary in main.rs consumes the same modules.
pub mod config;
pub mod engine;
pub mod prompt;
pub mod session;
pub mod store;

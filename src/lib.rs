// Library root: the binary in src/main.rs and the integration tests under
// tests/ both build on these modules.

pub mod bootstrap;
pub mod config;
pub mod corpus;
pub mod error;
pub mod exit;
pub mod llm;
pub mod session;

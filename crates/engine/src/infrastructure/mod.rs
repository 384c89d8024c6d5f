//! Infrastructure - External dependency implementations.

pub mod clock;
pub mod openrouter;
pub mod ports;
pub mod resilient_llm;
pub mod sqlite;

#[cfg(test)]
mod sqlite_integration_tests;

//! pgerr agent: library crate for the error-log agent binary.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `pgerr-e2e-tests`) can reach `AgentConfig`, the feeder and
//! `build_router`.

pub mod config;
pub mod error;
pub mod feeder;
pub mod routes;
pub mod shutdown;

// src/lib.rs — Library root for toxamp

pub mod cli;
pub mod core;
pub mod infra;
pub mod provider;
pub mod scorer;

// src/core/mod.rs — Amplification engine: search, budget and batch control

pub mod amplifier;
pub mod budget;
pub mod experiment;
pub mod orchestrator;
pub mod prompt;
pub mod splitter;
pub mod types;

//! BDD step definitions for hackathon-sync

pub mod draft_steps;
pub mod filter_steps;
pub mod gate_steps;

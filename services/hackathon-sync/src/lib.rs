//! Hackathon Sync - client-side data synchronization for the hackathon dashboard
//!
//! Polls and aggregates the hackathon API into per-view state, guards
//! user-triggered actions against duplicate runs, and merges newly created
//! hackathons into the lists a view shows.

pub mod actions;
pub mod aggregator;
pub mod api;
pub mod commands;
pub mod config;
pub mod draft;
pub mod error;
pub mod filter;
pub mod gate;
pub mod io;
pub mod liveness;
pub mod model;
pub mod poller;
pub mod state;
pub mod surface;
pub mod view;

#[cfg(test)]
mod test_support;

pub use config::{load_config, Config};
pub use error::{Result, SyncError};

//! Shared ambient utilities for the ticketing workspace.

pub mod utils;

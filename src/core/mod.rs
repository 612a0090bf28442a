// Author: Dustin Pilgrim
// License: MIT

pub mod action;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod info;
pub mod metrics;
pub mod mode;
pub mod session;
pub mod snapshot;
pub mod tracker;
pub mod utils;
pub mod workbench;

#[cfg(test)]
mod tracker_tests;

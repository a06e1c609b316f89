//! Punch hours and time-bank engine.
//!
//! This crate derives, for each recorded check-in/check-out punch, the
//! hours worked, overtime split into day, night and holiday buckets, the
//! time-bank movement and lateness. Department overtime caps are enforced
//! on the way, and punch edits go through an append-only correction ledger
//! that triggers recomputation.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

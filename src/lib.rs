//! Client-side adapter for the care-facility allocation optimizer.
//!
//! Builds the request from a geocoded patient and candidate facilities, calls
//! the optimizer once under a deadline and turns its reply into the result
//! shape the results view renders.

pub mod adapter;
pub mod config;
pub mod estimates;
pub mod output;
pub mod server;
pub mod types;

//! Core library for the `apiwatch` CLI.
//!
//! Captured request/response exchanges flow through a bounded, batched
//! ingest pipeline into a store; listing, lookup and analytics read them
//! back. The [`monitor::Monitor`] facade wires these pieces together for
//! embedding in a host service, and the `apiwatch` binary drives the same
//! API from the command line.
pub mod analytics;
pub mod args;
pub mod capture;
pub mod config;
pub mod entry;
pub mod error;
pub mod filter;
pub mod logger;
pub mod model;
pub mod monitor;
pub mod pipeline;
pub mod store;

#[cfg(test)]
mod test_support;

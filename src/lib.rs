//! Signal fusion and trade-planning engine.
//!
//! Raw candles flow through the indicator engine and structure detector, into
//! the feature assembler, then in parallel through the sequence model and the
//! advisory adapter. The fusion policy reconciles both opinions and the trade
//! planner turns the final signal into concrete levels.

pub mod advisory;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod indicators;
pub mod inference;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

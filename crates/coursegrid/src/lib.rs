//! Core library for the coursegrid schedule-building API.
//!
//! The pipeline: the catalog loader normalizes raw course records once at
//! startup, the filter engine drives browsing over them, the selection store
//! tracks the chosen sections per term (persisted as a TTL-checked snapshot),
//! and the layout engine turns the visible selection into weekly-grid
//! coordinates for an external renderer.

pub mod catalog;
pub mod config;
pub mod filter;
pub mod ics;
pub mod layout;
pub mod overlap;
pub mod selection;
pub mod server;
pub mod types;

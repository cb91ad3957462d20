//! Survey prediction server
//!
//! Serves the survey classifier over HTTP alongside health, readiness and
//! Prometheus endpoints.

pub mod api;
pub mod config;
pub mod startup;

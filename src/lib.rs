//! Deviation Dashboard - Planned vs. actual production and quality analysis
//!
//! Loads a tabular dataset, derives per-record deviations, filters by an
//! inclusive date range, summarizes the result and presents it either in a
//! desktop window or as a standalone HTML report.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod report;
pub mod service;
pub mod stats;

pub use config::{DashboardConfig, Theme};
pub use service::{DashboardService, DashboardView, RangeRequest};

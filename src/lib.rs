//! Interactive explorer for US bikeshare trip exports.
//!
//! A session collects a city/month/day selection, loads and filters that
//! city's trips, prints four groups of statistics and optionally pages
//! through the raw rows.

pub mod app;
pub mod config;
pub mod console;
pub mod data;
pub mod error;
pub mod pager;
pub mod report;
pub mod stats;

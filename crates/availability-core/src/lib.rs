//! Domain model and shared helpers for the site availability report.
//!
//! Holds the typed record and field selectors, the error taxonomy, the fixed
//! regional baselines, rounding/formatting rules, date parsing and the CLI
//! settings.

pub mod baselines;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

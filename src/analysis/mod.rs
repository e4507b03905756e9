//! Metrics computation over normalized stoppage records.
//!
//! This module turns a filtered record set into a [`types::MetricsSnapshot`],
//! compares two snapshots across periods, and derives rule-based
//! recommendations from the results.

pub mod cache;
pub mod compare;
pub mod metrics;
pub mod recommend;
pub mod schedule;
pub mod types;
pub mod utility;

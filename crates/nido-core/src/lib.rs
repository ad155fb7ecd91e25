//! Core domain logic for nido.
//!
//! This crate contains the fundamental types and logic for:
//! - Record loading: typed records from tracking-app CSV exports
//! - Daily aggregation: feeding, sleep, and diaper summaries per calendar day
//! - Monthly resampling and derived series (growth rates, event gaps)
//! - Growth-standard reference tables for chart overlays

pub mod calendar;
pub mod diaper;
pub mod feeding;
pub mod growth;
pub mod medical;
pub mod monthly;
pub mod record;
pub mod reference;
pub mod sleep;

pub use calendar::{DateSpan, DayWindow};
pub use diaper::DiaperDay;
pub use feeding::FeedingDay;
pub use record::{
    DiaperContents, DiaperRecord, FeedingRecord, GrowthRecord, LoadError, MiscRecord, SleepRecord,
    WeightRecord,
};
pub use reference::{PercentileTable, Sex};
pub use sleep::SleepDay;

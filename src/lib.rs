//! # Pace Agent
//!
//! A running pace lookup service: give it a 5k race time in any common
//! format and it returns the stored VDOT training-pace row whose reference
//! 5k time is numerically closest.
//!
//! ## Architecture
//!
//! - **normalize**: time parsing into canonical seconds
//! - **lookup**: storage-convention detection and nearest-match scan
//! - **source**: row sources (local JSONL table, Supabase REST table)
//! - **api**: REST API endpoints
//! - **config**: configuration loading and validation

pub mod api;
pub mod config;
pub mod lookup;
pub mod normalize;
pub mod source;

pub use lookup::{detect_convention, find_closest, Row, StorageConvention};
pub use normalize::{parse_stored_time, parse_time_to_seconds};

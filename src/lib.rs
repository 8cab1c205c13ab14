//! Crime-incident statistics: load incident records and code lookups,
//! normalize them under an explicit schema, and summarise them by year,
//! crime type and victim demographics.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use error::{CrimeStatsError, Result};

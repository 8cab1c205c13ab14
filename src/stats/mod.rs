//! Aggregations over the normalized tables. Every operation is a pure
//! function of borrowed inputs.

pub mod crime_types;
pub mod demographics;
pub mod yearly;

pub use crime_types::{left_join, top_crime_types, CrimeTypeCount, JoinedIncident};
pub use demographics::{demographic_breakdown, DemographicBreakdown};
pub use yearly::{yearly_counts, YearCount};

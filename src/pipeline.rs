//! Load → normalize → aggregate, as one call.

use log::info;
use serde::Serialize;

use crate::config::{PipelineConfig, YearCutoff};
use crate::data::loader::{load_sources, Sources};
use crate::data::model::{CrimeCodeTable, IncidentTable, MoCodeTable};
use crate::data::normalize::{normalize_crime_codes, normalize_incidents, normalize_mo_codes};
use crate::error::Result;
use crate::stats::{
    demographic_breakdown, top_crime_types, yearly_counts, CrimeTypeCount, DemographicBreakdown,
    YearCount,
};

// ---------------------------------------------------------------------------
// Dataset – normalized inputs
// ---------------------------------------------------------------------------

/// The three inputs after the schema has been applied.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub incidents: IncidentTable,
    pub crime_codes: CrimeCodeTable,
    pub mo_codes: MoCodeTable,
}

impl Dataset {
    pub fn from_sources(sources: Sources) -> Result<Self> {
        let crime_codes = normalize_crime_codes(&sources.crime_codes)?;
        let mo_codes = normalize_mo_codes(&sources.mo_codes)?;
        let incidents = normalize_incidents(sources.incidents)?;
        Ok(Self {
            incidents,
            crime_codes,
            mo_codes,
        })
    }
}

// ---------------------------------------------------------------------------
// Analysis – everything the presenter needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub total_incidents: usize,
    pub year_cutoff: YearCutoff,
    pub yearly: Vec<YearCount>,
    pub top_crime_types: Vec<CrimeTypeCount>,
    pub demographics: DemographicBreakdown,
}

/// Run the three aggregations over a prepared dataset.
pub fn analyze(dataset: &Dataset, config: &PipelineConfig) -> Analysis {
    let yearly = yearly_counts(&dataset.incidents, config.year_cutoff);
    let top_crime_types = top_crime_types(&dataset.incidents, &dataset.crime_codes, config.top_n);
    let demographics = demographic_breakdown(&dataset.incidents, config.top_areas);
    info!(
        "Summarised {} incidents: {} years, {} crime types, {} demographic groups",
        dataset.incidents.len(),
        yearly.len(),
        top_crime_types.len(),
        demographics.counts.len()
    );

    Analysis {
        total_incidents: dataset.incidents.len(),
        year_cutoff: config.year_cutoff,
        yearly,
        top_crime_types,
        demographics,
    }
}

/// Load the configured inputs and summarise them.
pub fn run(config: &PipelineConfig) -> Result<Analysis> {
    config.validate()?;
    let sources = load_sources(&config.sources)?;
    let dataset = Dataset::from_sources(sources)?;
    Ok(analyze(&dataset, config))
}

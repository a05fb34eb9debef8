use std::collections::HashMap;
use tracing::{debug, warn};

use super::api::GeoError;
use super::catalog::fallback_countries;
use super::types::{sort_unique_by_name, Country, StateEntry};

/// Session-lifetime cache of directory answers.
///
/// Lookups never fail: a failed country fetch resolves to the bundled
/// fallback list and a failed state fetch to no states. Neither failure is
/// cached, so the next lookup asks the directory again. Answers are applied in
/// the order they arrive; for two overlapping lookups of the same key the one
/// resolved last is what stays cached.
#[derive(Clone, Debug, Default)]
pub struct GeoLookupCache {
    countries: Vec<Country>,
    states: HashMap<String, Vec<StateEntry>>,
}

impl GeoLookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until a non-empty list has been fetched.
    pub fn cached_countries(&self) -> Option<&[Country]> {
        if self.countries.is_empty() {
            None
        } else {
            Some(&self.countries)
        }
    }

    pub fn cached_states(&self, country: &str) -> Option<&[StateEntry]> {
        self.states.get(country).map(Vec::as_slice)
    }

    pub fn has_countries(&self) -> bool {
        !self.countries.is_empty()
    }

    pub fn has_states_for(&self, country: &str) -> bool {
        self.states.contains_key(country)
    }

    /// All countries, alphabetical.
    pub fn resolve_countries(&mut self, fetched: Result<Vec<Country>, GeoError>) -> Vec<Country> {
        match fetched {
            Ok(mut countries) => {
                sort_unique_by_name(&mut countries);
                debug!(count = countries.len(), "country list fetched");
                if !countries.is_empty() {
                    self.countries.clone_from(&countries);
                }
                countries
            }
            Err(e) => {
                warn!(
                    error = %e,
                    retryable = e.is_retryable(),
                    "country lookup failed, serving bundled list"
                );
                fallback_countries()
            }
        }
    }

    /// States of `country`, alphabetical. Empty when the lookup failed or
    /// the country has none.
    pub fn resolve_states(
        &mut self,
        country: &str,
        fetched: Result<Vec<StateEntry>, GeoError>,
    ) -> Vec<StateEntry> {
        match fetched {
            Ok(mut states) => {
                sort_unique_by_name(&mut states);
                debug!(country, count = states.len(), "state list fetched");
                self.states.insert(country.to_string(), states.clone());
                states
            }
            Err(e) => {
                warn!(
                    country,
                    error = %e,
                    retryable = e.is_retryable(),
                    "state lookup failed"
                );
                Vec::new()
            }
        }
    }
}

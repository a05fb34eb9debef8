use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::popular_first;
use super::types::{Country, StateEntry};

/// Identifies one state lookup started by [`AddressPicker::select_country`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatesTicket {
    pub seq: u64,
    pub country: String,
}

/// Country and state selection for the address step.
///
/// State lookups resolve in any order. Only the ticket from the most recent
/// selection may fill the state list, so a slow answer for a country the
/// user already moved away from is dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPicker {
    countries: Vec<Country>,
    selected_country: Option<String>,
    states: Vec<StateEntry>,
    selected_state: Option<String>,
    loading_countries: bool,
    loading_states: bool,
    latest_seq: u64,
}

impl AddressPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn states(&self) -> &[StateEntry] {
        &self.states
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.selected_country.as_deref()
    }

    pub fn selected_state(&self) -> Option<&str> {
        self.selected_state.as_deref()
    }

    pub fn is_loading_countries(&self) -> bool {
        self.loading_countries
    }

    pub fn is_loading_states(&self) -> bool {
        self.loading_states
    }

    /// With no states to choose from, the form falls back to free text.
    pub fn has_state_options(&self) -> bool {
        !self.states.is_empty()
    }

    pub fn begin_loading_countries(&mut self) {
        self.loading_countries = true;
    }

    /// Takes the alphabetical list and shows the popular countries first.
    pub fn set_countries(&mut self, countries: &[Country]) {
        self.countries = popular_first(countries);
        self.loading_countries = false;
    }

    pub fn select_country(&mut self, country: impl Into<String>) -> StatesTicket {
        let country = country.into();
        self.latest_seq += 1;
        self.selected_country = Some(country.clone());
        self.selected_state = None;
        self.states.clear();
        self.loading_states = true;
        StatesTicket {
            seq: self.latest_seq,
            country,
        }
    }

    /// Returns whether `ticket` was current and its states were applied.
    pub fn apply_states(&mut self, ticket: &StatesTicket, states: Vec<StateEntry>) -> bool {
        if ticket.seq != self.latest_seq {
            debug!(
                stale = ticket.seq,
                latest = self.latest_seq,
                country = %ticket.country,
                "dropping superseded state list"
            );
            return false;
        }
        self.states = states;
        self.loading_states = false;
        true
    }

    /// Returns `false` for a name that is not among the current options.
    pub fn select_state(&mut self, state: &str) -> bool {
        if self.states.iter().any(|s| s.name == state) {
            self.selected_state = Some(state.to_string());
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ticket_is_dropped() {
        let mut picker = AddressPicker::new();
        let india = picker.select_country("India");
        let canada = picker.select_country("Canada");

        assert!(picker.apply_states(&canada, vec![StateEntry::new("Ontario", None)]));
        assert!(!picker.apply_states(&india, vec![StateEntry::new("Goa", None)]));

        assert_eq!(picker.selected_country(), Some("Canada"));
        assert_eq!(picker.states(), &[StateEntry::new("Ontario", None)]);
        assert!(!picker.is_loading_states());
    }

    #[test]
    fn stale_ticket_does_not_clear_loading() {
        let mut picker = AddressPicker::new();
        let first = picker.select_country("India");
        let _second = picker.select_country("Canada");
        picker.apply_states(&first, Vec::new());
        assert!(picker.is_loading_states());
    }

    #[test]
    fn countries_are_shown_popular_first() {
        let mut picker = AddressPicker::new();
        picker.begin_loading_countries();
        assert!(picker.is_loading_countries());

        picker.set_countries(&[
            Country::new("Austria", "AT", "AUT"),
            Country::new("Canada", "CA", "CAN"),
            Country::new("India", "IN", "IND"),
        ]);
        let names: Vec<&str> = picker.countries().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["India", "Canada", "Austria"]);
        assert!(!picker.is_loading_countries());
    }

    #[test]
    fn changing_country_clears_state_selection() {
        let mut picker = AddressPicker::new();
        let ticket = picker.select_country("Canada");
        picker.apply_states(&ticket, vec![StateEntry::new("Ontario", Some("ON".into()))]);
        assert!(picker.select_state("Ontario"));
        assert!(!picker.select_state("Bavaria"));
        assert_eq!(picker.selected_state(), Some("Ontario"));

        picker.select_country("Germany");
        assert_eq!(picker.selected_state(), None);
        assert!(!picker.has_state_options());
    }
}

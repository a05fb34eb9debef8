use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub iso2: String,
    pub iso3: String,
}

impl Country {
    pub fn new(name: impl Into<String>, iso2: impl Into<String>, iso3: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iso2: iso2.into(),
            iso3: iso3.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateEntry {
    pub name: String,
    pub code: Option<String>,
}

impl StateEntry {
    pub fn new(name: impl Into<String>, code: Option<String>) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

/// Anything listed in a picker by display name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Country {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for StateEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sorts alphabetically (case-insensitive) and drops repeated names, keeping
/// the first occurrence.
pub fn sort_unique_by_name<T: Named>(items: &mut Vec<T>) {
    items.sort_by(|a, b| compare_names(a.name(), b.name()));
    items.dedup_by(|a, b| a.name() == b.name());
}

// --- Wire shapes ---

#[derive(Debug, Deserialize)]
pub(crate) struct CountriesEnvelope {
    pub data: Vec<CountryRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountryRecord {
    pub country: String,
    #[serde(default)]
    pub iso2: String,
    #[serde(default)]
    pub iso3: String,
}

impl From<CountryRecord> for Country {
    fn from(record: CountryRecord) -> Self {
        Self::new(record.country, record.iso2, record.iso3)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatesQuery<'a> {
    pub country: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StateRecord {
    pub name: String,
    #[serde(default)]
    pub state_code: Option<String>,
}

impl From<StateRecord> for StateEntry {
    fn from(record: StateRecord) -> Self {
        Self::new(record.name, record.state_code)
    }
}

/// `{data: {states: [...]}}`, with every level optional: a missing or
/// mistyped level reads as no states.
pub(crate) fn states_from_value(value: serde_json::Value) -> Vec<StateEntry> {
    let states = match value {
        serde_json::Value::Object(mut root) => match root.remove("data") {
            Some(serde_json::Value::Object(mut data)) => data.remove("states"),
            _ => None,
        },
        _ => None,
    };

    match states {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<StateRecord>(item).ok())
            .map(StateEntry::from)
            .collect(),
        _ => Vec::new(),
    }
}

//! Bundled country data: the offline fallback and the popular ordering.

use super::types::Country;

/// Served when the directory is unreachable. Never cached.
pub const FALLBACK_COUNTRIES: [(&str, &str, &str); 10] = [
    ("India", "IN", "IND"),
    ("United States", "US", "USA"),
    ("United Kingdom", "GB", "GBR"),
    ("Canada", "CA", "CAN"),
    ("Australia", "AU", "AUS"),
    ("Germany", "DE", "DEU"),
    ("France", "FR", "FRA"),
    ("Japan", "JP", "JPN"),
    ("Singapore", "SG", "SGP"),
    ("United Arab Emirates", "AE", "ARE"),
];

/// Listed first in the country picker, in this order.
pub const POPULAR_COUNTRIES: [&str; 9] = [
    "India",
    "United States",
    "United Kingdom",
    "Canada",
    "Australia",
    "Germany",
    "France",
    "Singapore",
    "United Arab Emirates",
];

#[must_use]
pub fn fallback_countries() -> Vec<Country> {
    FALLBACK_COUNTRIES
        .iter()
        .map(|(name, iso2, iso3)| Country::new(*name, *iso2, *iso3))
        .collect()
}

fn popular_rank(name: &str) -> Option<usize> {
    POPULAR_COUNTRIES.iter().position(|popular| *popular == name)
}

/// Popular countries in popular-list order, then everyone else in their
/// original order.
#[must_use]
pub fn popular_first(countries: &[Country]) -> Vec<Country> {
    let mut popular: Vec<(usize, &Country)> = countries
        .iter()
        .filter_map(|c| popular_rank(&c.name).map(|rank| (rank, c)))
        .collect();
    popular.sort_by_key(|(rank, _)| *rank);

    popular
        .into_iter()
        .map(|(_, c)| c.clone())
        .chain(
            countries
                .iter()
                .filter(|c| popular_rank(&c.name).is_none())
                .cloned(),
        )
        .collect()
}

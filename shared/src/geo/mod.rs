//! Country and state lookup for the address step.

mod api;
mod cache;
mod catalog;
mod picker;
mod types;

pub use self::api::{
    countries_from_response, request_countries, request_states, states_from_response,
    GeoEndpoints, GeoError, GeoResponse,
};
pub use self::cache::GeoLookupCache;
pub use self::catalog::{
    fallback_countries, popular_first, FALLBACK_COUNTRIES, POPULAR_COUNTRIES,
};
pub use self::picker::{AddressPicker, StatesTicket};
pub use self::types::{sort_unique_by_name, Country, Named, StateEntry};

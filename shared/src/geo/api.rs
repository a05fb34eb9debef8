//! Requests to the countries API, sent out through the shell's HTTP
//! capability, and the mapping of its answers back into domain values.

use crux_http::{Http, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::types::{states_from_value, CountriesEnvelope, Country, StateEntry, StatesQuery};
use crate::DEFAULT_GEO_BASE_URL;

pub type GeoResponse = crux_http::Result<Response<serde_json::Value>>;

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoError {
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("could not build request: {reason}")]
    InvalidRequest { reason: String },

    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("directory answered with status {status}")]
    Status { status: u16 },

    #[error("unexpected response: {reason}")]
    InvalidResponse { reason: String },

    #[error("directory returned no countries")]
    EmptyCountryList,
}

impl GeoError {
    /// Whether asking again later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::EmptyCountryList => true,
            Self::Status { status } => *status == 429 || *status >= 500,
            Self::InvalidBaseUrl { .. } | Self::InvalidRequest { .. } | Self::InvalidResponse { .. } => {
                false
            }
        }
    }
}

/// The two endpoints, resolved once from the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoEndpoints {
    countries_url: String,
    states_url: String,
}

impl GeoEndpoints {
    pub fn new(base_url: &str) -> Result<Self, GeoError> {
        let invalid = |reason: String| GeoError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials are not allowed".into()));
        }

        let base = parsed.as_str().trim_end_matches('/');
        Ok(Self {
            countries_url: format!("{base}/countries"),
            states_url: format!("{base}/countries/states"),
        })
    }

    pub fn countries_url(&self) -> &str {
        &self.countries_url
    }

    pub fn states_url(&self) -> &str {
        &self.states_url
    }
}

impl Default for GeoEndpoints {
    fn default() -> Self {
        Self {
            countries_url: format!("{DEFAULT_GEO_BASE_URL}/countries"),
            states_url: format!("{DEFAULT_GEO_BASE_URL}/countries/states"),
        }
    }
}

/// `GET {base}/countries`.
pub fn request_countries<Ev, F>(http: &Http<Ev>, endpoints: &GeoEndpoints, make_event: F)
where
    Ev: Send + 'static,
    F: FnOnce(Result<Vec<Country>, GeoError>) -> Ev + Send + 'static,
{
    http.get(endpoints.countries_url())
        .header("Accept", "application/json")
        .expect_json::<serde_json::Value>()
        .send(move |response| make_event(countries_from_response(response)));
}

/// `POST {base}/countries/states` with `{"country": ...}`.
pub fn request_states<Ev, F>(
    http: &Http<Ev>,
    endpoints: &GeoEndpoints,
    country: &str,
    make_event: F,
) -> Result<(), GeoError>
where
    Ev: Send + 'static,
    F: FnOnce(Result<Vec<StateEntry>, GeoError>) -> Ev + Send + 'static,
{
    http.post(endpoints.states_url())
        .header("Accept", "application/json")
        .body_json(&StatesQuery { country })
        .map_err(|e| GeoError::InvalidRequest {
            reason: e.to_string(),
        })?
        .expect_json::<serde_json::Value>()
        .send(move |response| make_event(states_from_response(response)));
    Ok(())
}

fn json_body(response: GeoResponse) -> Result<serde_json::Value, GeoError> {
    let mut response = response.map_err(|e| GeoError::Transport {
        message: e.to_string(),
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(GeoError::Status {
            status: status.into(),
        });
    }
    response.take_body().ok_or_else(|| GeoError::InvalidResponse {
        reason: "empty body".into(),
    })
}

/// A body without a `data` array is an error; so is an empty one.
pub fn countries_from_response(response: GeoResponse) -> Result<Vec<Country>, GeoError> {
    let body = json_body(response)?;
    let envelope: CountriesEnvelope =
        serde_json::from_value(body).map_err(|e| GeoError::InvalidResponse {
            reason: e.to_string(),
        })?;

    if envelope.data.is_empty() {
        return Err(GeoError::EmptyCountryList);
    }
    Ok(envelope.data.into_iter().map(Country::from).collect())
}

/// A country the directory does not know reads as `Ok` with no states.
pub fn states_from_response(response: GeoResponse) -> Result<Vec<StateEntry>, GeoError> {
    json_body(response).map(states_from_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crux_http::testing::ResponseBuilder;
    use serde_json::json;

    fn ok(body: serde_json::Value) -> GeoResponse {
        Ok(ResponseBuilder::ok().body(body).build())
    }

    #[test]
    fn endpoints_hang_off_base_url() {
        let endpoints = GeoEndpoints::new("https://geo.example.com/api/v0.1/").unwrap();
        assert_eq!(
            endpoints.countries_url(),
            "https://geo.example.com/api/v0.1/countries"
        );
        assert_eq!(
            endpoints.states_url(),
            "https://geo.example.com/api/v0.1/countries/states"
        );

        let bare = GeoEndpoints::new("https://geo.example.com").unwrap();
        assert_eq!(bare.countries_url(), "https://geo.example.com/countries");
    }

    #[test]
    fn default_endpoints_match_default_base() {
        assert_eq!(
            GeoEndpoints::default(),
            GeoEndpoints::new(DEFAULT_GEO_BASE_URL).unwrap()
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for url in ["", "ftp://geo.example.com", "https://user:pw@geo.example.com", "not a url"] {
            assert!(
                matches!(GeoEndpoints::new(url), Err(GeoError::InvalidBaseUrl { .. })),
                "{url}"
            );
        }
    }

    #[test]
    fn parses_country_list() {
        let countries = countries_from_response(ok(json!({
            "error": false,
            "data": [
                {"country": "Norway", "iso2": "NO", "iso3": "NOR"},
                {"country": "Chile", "iso2": "CL", "iso3": "CHL"}
            ]
        })))
        .unwrap();

        assert_eq!(countries[0], Country::new("Norway", "NO", "NOR"));
        assert_eq!(countries.len(), 2);
    }

    #[test]
    fn missing_country_data_is_an_error() {
        let result = countries_from_response(ok(json!({"error": true, "msg": "maintenance"})));
        assert!(matches!(result, Err(GeoError::InvalidResponse { .. })));
    }

    #[test]
    fn empty_country_data_is_an_error() {
        let result = countries_from_response(ok(json!({"data": []})));
        assert_eq!(result, Err(GeoError::EmptyCountryList));
    }

    #[test]
    fn parses_states() {
        let states = states_from_response(ok(json!({
            "data": {"name": "Norway", "states": [{"name": "Oslo", "state_code": "03"}]}
        })))
        .unwrap();
        assert_eq!(states, vec![StateEntry::new("Oslo", Some("03".into()))]);
    }

    #[test]
    fn unknown_country_has_no_states() {
        let states = states_from_response(ok(
            json!({"error": true, "msg": "country not found", "data": null}),
        ))
        .unwrap();
        assert!(states.is_empty());
    }

    #[test]
    fn retryable_errors() {
        assert!(GeoError::Status { status: 503 }.is_retryable());
        assert!(GeoError::Status { status: 429 }.is_retryable());
        assert!(!GeoError::Status { status: 404 }.is_retryable());
        assert!(GeoError::Transport {
            message: "offline".into()
        }
        .is_retryable());
        assert!(!GeoError::InvalidResponse {
            reason: "bad json".into()
        }
        .is_retryable());
    }
}

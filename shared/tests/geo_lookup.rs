use crux_core::testing::AppTester;
use crux_http::testing::ResponseBuilder;
use registration_core::geo::{countries_from_response, states_from_response, GeoResponse};
use registration_core::{
    AddressApp, AddressEffect, AddressEvent, AddressModel, GeoError, StateEntry, StatesTicket,
};
use serde_json::json;

/// Answers like the public countries API.
fn countries_api() -> GeoResponse {
    Ok(ResponseBuilder::ok()
        .body(json!({
            "error": false,
            "data": [
                {"country": "Zambia", "iso2": "ZM", "iso3": "ZMB"},
                {"country": "India", "iso2": "IN", "iso3": "IND"},
                {"country": "austria", "iso2": "AT", "iso3": "AUT"},
                {"country": "Canada", "iso2": "CA", "iso3": "CAN"},
                {"country": "India", "iso2": "IN", "iso3": "IND"}
            ]
        }))
        .build())
}

fn states_api(country: &str) -> GeoResponse {
    let body = match country {
        "Canada" => json!({"data": {"name": "Canada", "states": [
            {"name": "Quebec", "state_code": "QC"},
            {"name": "British Columbia", "state_code": "BC"}
        ]}}),
        "India" => json!({"data": {"name": "India", "states": [
            {"name": "Kerala", "state_code": "KL"}
        ]}}),
        _ => json!({"error": true, "msg": "country not found"}),
    };
    Ok(ResponseBuilder::ok().body(body).build())
}

fn select(app: &AppTester<AddressApp, AddressEffect>, model: &mut AddressModel, name: &str) {
    app.update(AddressEvent::SelectCountry { name: name.into() }, model);
}

fn answer_states(
    app: &AppTester<AddressApp, AddressEffect>,
    model: &mut AddressModel,
    seq: u64,
    country: &str,
) {
    app.update(
        AddressEvent::StatesFetched {
            ticket: StatesTicket {
                seq,
                country: country.into(),
            },
            result: states_from_response(states_api(country)),
        },
        model,
    );
}

#[test]
fn countries_are_sorted_deduped_and_shown_popular_first() {
    let app = AppTester::<AddressApp, AddressEffect>::default();
    let mut model = AddressModel::default();

    app.update(AddressEvent::LoadCountries, &mut model);
    app.update(
        AddressEvent::CountriesFetched(countries_from_response(countries_api())),
        &mut model,
    );

    let cached: Vec<&str> = model
        .cache
        .cached_countries()
        .unwrap()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(cached, vec!["austria", "Canada", "India", "Zambia"]);

    let view = app.view(&model);
    let shown: Vec<&str> = view.countries.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(shown, vec!["India", "Canada", "austria", "Zambia"]);
    assert!(!view.loading_countries);
}

#[test]
fn offline_start_falls_back_then_recovers() {
    let app = AppTester::<AddressApp, AddressEffect>::default();
    let mut model = AddressModel::default();

    app.update(AddressEvent::LoadCountries, &mut model);
    app.update(
        AddressEvent::CountriesFetched(Err(GeoError::Transport {
            message: "network unreachable".into(),
        })),
        &mut model,
    );
    assert_eq!(app.view(&model).countries.len(), 10);
    assert!(!model.cache.has_countries());

    // nothing was cached, so the next load goes back to the directory
    let update = app.update(AddressEvent::LoadCountries, &mut model);
    assert!(update
        .effects
        .iter()
        .any(|e| matches!(e, AddressEffect::Http(_))));
    app.update(
        AddressEvent::CountriesFetched(countries_from_response(countries_api())),
        &mut model,
    );
    assert_eq!(app.view(&model).countries.len(), 4);
    assert!(model.cache.has_countries());
}

#[test]
fn states_are_cached_per_country() {
    let app = AppTester::<AddressApp, AddressEffect>::default();
    let mut model = AddressModel::default();

    select(&app, &mut model, "Canada");
    answer_states(&app, &mut model, 1, "Canada");
    let view = app.view(&model);
    assert_eq!(
        view.states,
        vec![
            StateEntry::new("British Columbia", Some("BC".into())),
            StateEntry::new("Quebec", Some("QC".into())),
        ]
    );

    app.update(
        AddressEvent::SelectState {
            name: "Quebec".into(),
        },
        &mut model,
    );
    assert_eq!(app.view(&model).selected_state.as_deref(), Some("Quebec"));

    select(&app, &mut model, "India");
    answer_states(&app, &mut model, 2, "India");

    // back to Canada: answered from the cache, no request
    let update = app.update(
        AddressEvent::SelectCountry {
            name: "Canada".into(),
        },
        &mut model,
    );
    assert!(update
        .effects
        .iter()
        .all(|e| matches!(e, AddressEffect::Render(_))));
    let view = app.view(&model);
    assert_eq!(view.states.len(), 2);
    assert_eq!(view.selected_state, None);
    assert!(!view.loading_states);
}

#[test]
fn slow_answer_for_abandoned_country_is_dropped() {
    let app = AppTester::<AddressApp, AddressEffect>::default();
    let mut model = AddressModel::default();

    select(&app, &mut model, "India");
    select(&app, &mut model, "Canada");
    answer_states(&app, &mut model, 2, "Canada");
    answer_states(&app, &mut model, 1, "India");

    let view = app.view(&model);
    assert_eq!(view.selected_country.as_deref(), Some("Canada"));
    let names: Vec<&str> = view.states.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["British Columbia", "Quebec"]);
}

#[test]
fn unknown_country_gets_free_text_state() {
    let app = AppTester::<AddressApp, AddressEffect>::default();
    let mut model = AddressModel::default();

    select(&app, &mut model, "Atlantis");
    assert!(!app.view(&model).state_is_free_text);
    answer_states(&app, &mut model, 1, "Atlantis");

    let view = app.view(&model);
    assert!(view.states.is_empty());
    assert!(view.state_is_free_text);
    assert!(model.cache.has_states_for("Atlantis"));
}

//! The Crux apps the shell drives: one for the crop view, one for the
//! address step.

use crux_core::App;
use tracing::{debug, info, trace, warn};

use crate::capabilities::{AddressCapabilities, CropCapabilities};
use crate::event::{AddressEvent, CropEvent};
use crate::geo::{request_countries, request_states, GeoEndpoints};
use crate::model::{AddressModel, AddressViewModel, CropSession, CropViewModel};

#[derive(Default)]
pub struct CropApp;

impl App for CropApp {
    type Event = CropEvent;
    type Model = CropSession;
    type ViewModel = CropViewModel;
    type Capabilities = CropCapabilities;

    fn update(&self, event: CropEvent, model: &mut CropSession, caps: &CropCapabilities) {
        let event_name = event.name();
        if event.is_high_frequency() {
            trace!(event = event_name, "crop event");
        } else if event.is_user_initiated() {
            info!(event = event_name, "crop user action");
        } else {
            debug!(event = event_name, "crop event");
        }

        model.update(event);
        caps.render.render();
    }

    fn view(&self, model: &CropSession) -> CropViewModel {
        model.view()
    }
}

#[derive(Default)]
pub struct AddressApp;

impl App for AddressApp {
    type Event = AddressEvent;
    type Model = AddressModel;
    type ViewModel = AddressViewModel;
    type Capabilities = AddressCapabilities;

    fn update(&self, event: AddressEvent, model: &mut AddressModel, caps: &AddressCapabilities) {
        debug!(event = event.name(), "address event");

        match event {
            AddressEvent::Configure { base_url } => match GeoEndpoints::new(&base_url) {
                Ok(endpoints) => model.endpoints = endpoints,
                Err(e) => warn!(error = %e, "keeping previous directory endpoints"),
            },

            AddressEvent::LoadCountries => {
                if let Some(cached) = model.cache.cached_countries() {
                    model.picker.set_countries(cached);
                } else {
                    model.picker.begin_loading_countries();
                    request_countries(
                        &caps.http,
                        &model.endpoints,
                        AddressEvent::CountriesFetched,
                    );
                }
            }

            AddressEvent::CountriesFetched(result) => {
                let countries = model.cache.resolve_countries(result);
                model.picker.set_countries(&countries);
            }

            AddressEvent::SelectCountry { name } => {
                let ticket = model.picker.select_country(name);
                if let Some(states) = model.cache.cached_states(&ticket.country) {
                    model.picker.apply_states(&ticket, states.to_vec());
                } else {
                    let pending = ticket.clone();
                    let sent = request_states(
                        &caps.http,
                        &model.endpoints,
                        &ticket.country,
                        move |result| AddressEvent::StatesFetched {
                            ticket: pending,
                            result,
                        },
                    );
                    if let Err(e) = sent {
                        let states = model.cache.resolve_states(&ticket.country, Err(e));
                        model.picker.apply_states(&ticket, states);
                    }
                }
            }

            AddressEvent::StatesFetched { ticket, result } => {
                let states = model.cache.resolve_states(&ticket.country, result);
                model.picker.apply_states(&ticket, states);
            }

            AddressEvent::SelectState { name } => {
                if !model.picker.select_state(&name) {
                    warn!("selected state is not among the options, ignoring");
                }
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &AddressModel) -> AddressViewModel {
        model.view()
    }
}

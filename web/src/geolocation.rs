use core::fmt;

use geocoin_core::LatLng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Geolocation, Position as GeolocationPosition, PositionError as GeolocationPositionError,
    PositionOptions,
};
use yew::Callback;

/// A running high-accuracy position watch. Dropping it stops the watch.
pub(crate) struct PositionWatch {
    geolocation: Geolocation,
    watch_id: i32,
    _on_position: Closure<dyn FnMut(GeolocationPosition)>,
    _on_error: Closure<dyn FnMut(GeolocationPositionError)>,
}

impl PositionWatch {
    pub(crate) fn start(
        on_position: Callback<LatLng>,
        on_error: Callback<String>,
    ) -> Result<Self, String> {
        let geolocation = gloo::utils::window()
            .navigator()
            .geolocation()
            .map_err(|err| format!("geolocation unavailable: {:?}", err))?;

        let on_position = Closure::<dyn FnMut(GeolocationPosition)>::new(
            move |position: GeolocationPosition| {
                let coords = position.coords();
                on_position.emit(LatLng::new(coords.latitude(), coords.longitude()));
            },
        );
        let on_error = Closure::<dyn FnMut(GeolocationPositionError)>::new(
            move |err: GeolocationPositionError| on_error.emit(err.message()),
        );

        let options = PositionOptions::new();
        options.set_enable_high_accuracy(true);
        let watch_id = geolocation
            .watch_position_with_error_callback_and_options(
                on_position.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &options,
            )
            .map_err(|err| format!("could not watch position: {:?}", err))?;
        log::debug!("position watch {} started", watch_id);

        Ok(Self {
            geolocation,
            watch_id,
            _on_position: on_position,
            _on_error: on_error,
        })
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        log::debug!("position watch {} stopped", self.watch_id);
        self.geolocation.clear_watch(self.watch_id);
    }
}

impl fmt::Debug for PositionWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionWatch")
            .field("watch_id", &self.watch_id)
            .finish_non_exhaustive()
    }
}

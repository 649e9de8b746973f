use clap::Parser;
use geocoin_core::{Coord, GameConfig, LatLng};
use wasm_bindgen::prelude::*;

mod game;
mod geolocation;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Start latitude instead of the default
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Start longitude instead of the default
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Neighbourhood half-width in cells
    #[arg(short, long)]
    radius: Option<Coord>,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        let mut config = GameConfig::default();
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            config = config.with_start(LatLng::new(lat, lng));
        }
        if let Some(radius) = self.radius {
            config = config.with_visibility_radius(radius);
        }
        config
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = Args::try_parse_from(location_hash.split(['#', '&'])).expect("Could not parse args");
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    let config = args.game_config();
    log::debug!("config: {:?}", config);

    let root = document()
        .get_element_by_id("game")
        .expect("Could not find id=\"game\" element");

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(root, game::GameProps { config }).render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_args_override_start_and_radius() {
        let args = Args::try_parse_from("#--lat=10.5&--lng=-20.25&-r3".split(['#', '&'])).unwrap();

        let config = args.game_config();

        assert_eq!(config.start, LatLng::new(10.5, -20.25));
        assert_eq!(config.visibility_radius, 3);
    }

    #[test]
    fn empty_hash_uses_defaults() {
        let args = Args::try_parse_from("".split(['#', '&'])).unwrap();

        assert_eq!(args.game_config(), GameConfig::default());
    }
}

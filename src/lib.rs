#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Bioluminescent sea background: a wave-field and creature simulation with
//! a thin canvas presentation layer.
//!
//! The simulation core is plain Rust and runs anywhere; the browser bindings
//! live in the private `wasm` module.

pub mod config;
pub mod creature;
pub mod driver;
pub mod error;
pub mod glow;
pub mod navigation;
pub mod persist;
pub mod pointer;
pub mod sea;
pub mod watchdog;
pub mod wave;

pub use config::{Preset, SeaConfig};
pub use driver::{Directive, Driver, SeaEvent, Visibility};
pub use persist::{KeyValueStore, MemoryStore, Persistence, Snapshot};
pub use sea::Sea;

#[cfg(target_arch = "wasm32")]
pub use wasm::LocalStore;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use crate::config::{Preset, SeaConfig};
    use crate::driver::{Directive, Driver, SeaEvent, Visibility};

    mod events;
    mod render;
    mod storage;
    mod watchdog;

    pub use storage::LocalStore;

    /// The page's simulation context, shared by every DOM callback.
    pub type SeaContext = Rc<RefCell<Driver<LocalStore>>>;

    pub const CANVAS_ID: &str = "sea-background";

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let body = document.body().ok_or("no body")?;
        let canvas = render::mount_canvas(&document, &body)?;
        let config = page_config(&body);

        let width = window.inner_width()?.as_f64().unwrap_or(0.0);
        let height = window.inner_height()?.as_f64().unwrap_or(0.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let store = LocalStore::from_window(&window);
        let context: SeaContext = Rc::new(RefCell::new(Driver::boot(
            config,
            width,
            height,
            seed,
            store,
            js_sys::Date::now(),
        )));

        let frames = render::start(canvas.clone(), context.clone())?;
        events::install(&window, &document, &body, context.clone(), frames.clone())?;
        let frame_config = context.borrow().sea().config().frame.clone();
        watchdog::install(&document, canvas, &frame_config)?;

        let initial = if document.visibility_state() == web_sys::VisibilityState::Hidden {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };
        let directive = context
            .borrow_mut()
            .handle_event(SeaEvent::Visibility(initial), js_sys::Date::now());
        if directive == Directive::ResumeLoop {
            frames.request()?;
        }
        Ok(())
    }

    /// Preset from `data-sea-preset`, overlaid with JSON from `data-sea-config`.
    fn page_config(body: &web_sys::HtmlElement) -> SeaConfig {
        let preset = match body.get_attribute("data-sea-preset") {
            Some(name) => name.parse().unwrap_or_else(|err| {
                log::warn!("{err}; using calm preset");
                Preset::Calm
            }),
            None => Preset::Calm,
        };
        match body.get_attribute("data-sea-config") {
            Some(overlay) => SeaConfig::from_preset_and_json(preset, &overlay).unwrap_or_else(|err| {
                log::warn!("ignoring data-sea-config: {err}");
                SeaConfig::preset(preset)
            }),
            None => SeaConfig::preset(preset),
        }
    }
}

//! Cyber Deck core crate.
//!
//! Client-side effects layer for the MRDJKeremCan portfolio pages: boot
//! overlay, matrix rain, procedural drum sounds, scripted chat, Konami easter
//! egg and a handful of page toggles. `start_site()` is the single entry point;
//! everything else is wired up from there.

use wasm_bindgen::prelude::*;

mod app;
pub mod boot;
pub mod chat;
pub mod config;
mod error;
pub mod input;
pub mod konami;
pub mod launchpad;
pub mod matrix;
pub mod rng;
pub mod site;
pub mod surface;
pub mod synth;
pub mod toggles;

pub use error::{Result, SiteError};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (hot reload) just keeps the existing logger.
    console_log::init_with_level(log::Level::Info).ok();
}

// -----------------------------------------------------------------------------
// Site datasets
// -----------------------------------------------------------------------------

pub const BOOT_LINES: &[&str] = &[
    "SYSTEM_CHECK_INIT...",
    "CPU: OK",
    "RAM: OK",
    "LOADING_AUDIO_ENGINE...",
    "AUDIO_ENGINE: ONLINE",
    "CONNECTING_TO_CYBER_GRID...",
    "ACCESS_GRANTED.",
];

/// Key sequence (`KeyboardEvent.key` values) that unlocks the easter egg.
pub const SECRET_CODE: &[&str] = &[
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "b",
    "a",
];

pub const RAIN_GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*";

// -----------------------------------------------------------------------------
// Page entrypoints
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_site() -> std::result::Result<(), JsValue> {
    app::launch(config::SiteConfig::default()).map_err(Into::into)
}

/// Start with overrides from a (possibly partial) JSON object.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_site_with_config(json: &str) -> std::result::Result<(), JsValue> {
    let cfg = config::SiteConfig::from_json(json)?;
    app::launch(cfg).map_err(Into::into)
}

#[wasm_bindgen]
pub fn open_nav() {
    if let Some(Err(e)) = app::with_site(|s| s.open_nav()) {
        log::warn!("open_nav: {e}");
    }
}

#[wasm_bindgen]
pub fn close_nav() {
    if let Some(Err(e)) = app::with_site(|s| s.close_nav()) {
        log::warn!("close_nav: {e}");
    }
}

/// Switch the biography language (`"tr"` or `"en"`).
#[wasm_bindgen]
pub fn set_lang(lang: &str) -> std::result::Result<(), JsValue> {
    match app::with_site(|s| s.set_lang(lang)) {
        Some(res) => res.map_err(Into::into),
        None => Ok(()),
    }
}

//! Browser glue: owns the live `Site`, turns DOM events into site calls and
//! runs deferred work on timers.

use std::cell::RefCell;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent,
    MouseEvent, Window,
};

use crate::chat;
use crate::config::SiteConfig;
use crate::input::{Focus, KeyPress};
use crate::konami;
use crate::matrix::{self, CANVAS_ID};
use crate::rng::EntropyRandom;
use crate::site::{Deferred, Scheduled, Site, Viewport};
use crate::surface::DomSurface;
use crate::synth::WebAudioBackend;
use crate::toggles::{CURSOR_HOVER_SELECTOR, UI_SOUND_SELECTOR};
use crate::{Result, SiteError};

type BrowserSite = Site<DomSurface, WebAudioBackend>;

thread_local! {
    static SITE: RefCell<Option<BrowserSite>> = const { RefCell::new(None) };
}

/// Attach a listener that lives for the rest of the page.
macro_rules! listen {
    ($target:expr, $event:expr, $ty:ty, $handler:expr) => {{
        let cb = Closure::wrap(Box::new($handler) as Box<dyn FnMut($ty)>);
        $target.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Run `f` against the live site. `None` before launch or while another
/// callback holds it.
pub(crate) fn with_site<R>(f: impl FnOnce(&mut BrowserSite) -> R) -> Option<R> {
    SITE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

/// Unwrap a site call made from an event handler, logging what went wrong.
fn report<T>(what: &str, outcome: Option<Result<T>>) -> Option<T> {
    match outcome {
        Some(Ok(v)) => Some(v),
        Some(Err(e)) => {
            log::warn!("{what}: {e}");
            None
        }
        None => {
            log::debug!("{what}: site not available");
            None
        }
    }
}

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| SiteError::MissingElement("window".into()))
}

fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| SiteError::MissingElement("document".into()))
}

fn viewport(win: &Window) -> Viewport {
    let dim = |v: std::result::Result<JsValue, JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0) as u32
    };
    Viewport {
        width: dim(win.inner_width()),
        height: dim(win.inner_height()),
    }
}

fn is_coarse_pointer(win: &Window) -> bool {
    win.match_media("(pointer: coarse)")
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false)
}

/// Build the site against `document.body` and start the boot overlay.
pub fn launch(config: SiteConfig) -> Result<()> {
    if SITE.with(|cell| cell.borrow().is_some()) {
        log::warn!("site already running");
        return Ok(());
    }
    let win = window()?;
    let coarse = is_coarse_pointer(&win);
    let mut site = Site::new(
        config,
        DomSurface::from_body()?,
        WebAudioBackend::new(),
        Box::new(EntropyRandom::new()),
        viewport(&win),
        coarse,
    );
    let boot = site.begin_boot()?;
    SITE.with(|cell| *cell.borrow_mut() = Some(site));
    // Bound before the hand-off so the rain mounts at the size the window has then.
    bind_resize(&win)?;
    schedule(boot);
    Ok(())
}

fn bind_resize(win: &Window) -> Result<()> {
    let resize_win = win.clone();
    listen!(win, "resize", web_sys::Event, move |_: web_sys::Event| {
        let vp = viewport(&resize_win);
        let outcome = with_site(|s| if s.viewport() == vp { Ok(()) } else { s.resize(vp) });
        report("resize", outcome);
    });
    Ok(())
}

/// Fire each task after its delay.
fn schedule(tasks: Vec<Scheduled>) {
    for Scheduled { delay_ms, task } in tasks {
        Timeout::new(delay_ms.max(0.0) as u32, move || run(task)).forget();
    }
}

fn run(task: Deferred) {
    // Yields the pointer kind when this task was the boot hand-off.
    let outcome = with_site(|site| {
        let was_started = site.is_started();
        site.run_deferred(task)
            .map(|()| (!was_started && site.is_started()).then(|| site.is_coarse_pointer()))
    });
    if let Some(Some(coarse)) = report("deferred task", outcome) {
        if let Err(e) = bind_main_systems(coarse) {
            log::warn!("binding page events failed: {e}");
        }
    }
}

/// Hook the mounted components up to the page once boot hands off.
fn bind_main_systems(coarse: bool) -> Result<()> {
    let win = window()?;
    let doc = document()?;

    bind_rain(&doc)?;

    listen!(win, "keydown", KeyboardEvent, move |evt: KeyboardEvent| {
        let press = KeyPress::new(evt.key(), current_focus());
        if let Some(tasks) = report("keydown", with_site(|s| s.handle_key(&press))) {
            schedule(tasks);
        }
    });

    if let Some(send) = doc.get_element_by_id(chat::SEND_ID) {
        listen!(send, "click", MouseEvent, move |_: MouseEvent| {
            if let Some(tasks) = report("chat send", with_site(|s| s.submit_chat())) {
                schedule(tasks);
            }
        });
    }
    if let Some(header) = doc.get_element_by_id(chat::HEADER_ID) {
        listen!(header, "click", MouseEvent, move |_: MouseEvent| {
            report("chat toggle", with_site(|s| s.toggle_chat()));
        });
    }

    if !coarse {
        listen!(doc, "mousemove", MouseEvent, move |evt: MouseEvent| {
            report(
                "cursor",
                with_site(|s| s.move_cursor(evt.client_x(), evt.client_y())),
            );
        });
        listen!(doc, "mousedown", MouseEvent, move |_: MouseEvent| {
            report("cursor", with_site(|s| s.press_cursor(true)));
        });
        listen!(doc, "mouseup", MouseEvent, move |_: MouseEvent| {
            report("cursor", with_site(|s| s.press_cursor(false)));
        });
        let hoverable = doc.query_selector_all(CURSOR_HOVER_SELECTOR)?;
        for i in 0..hoverable.length() {
            let Some(el) = hoverable.get(i) else { continue };
            listen!(el, "mouseenter", MouseEvent, move |_: MouseEvent| {
                report("hover", with_site(|s| s.hover_interactive(true)));
            });
            listen!(el, "mouseleave", MouseEvent, move |_: MouseEvent| {
                report("hover", with_site(|s| s.hover_interactive(false)));
            });
        }
    }

    bind_ui_sounds(&doc, coarse)?;

    if let Some(logo) = doc.query_selector(".logo")? {
        listen!(logo, "click", MouseEvent, move |_: MouseEvent| {
            report("hero", with_site(|s| s.toggle_hero()));
        });
    }
    if let Some(close) = doc.get_element_by_id(konami::CLOSE_ID) {
        listen!(close, "click", MouseEvent, move |_: MouseEvent| {
            report("hack modal", with_site(|s| s.close_hack_modal()));
        });
    }

    log::info!("page systems online");
    Ok(())
}

fn bind_rain(doc: &Document) -> Result<()> {
    let Some(canvas) = doc.get_element_by_id(CANVAS_ID) else {
        return Ok(());
    };
    let canvas: HtmlCanvasElement = canvas
        .dyn_into()
        .map_err(|_| SiteError::Js("matrix canvas is not a <canvas>".into()))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| SiteError::Js("2d context unavailable".into()))?
        .dyn_into()
        .map_err(|_| SiteError::Js("unexpected 2d context type".into()))?;
    let period = with_site(|s| s.rain_period_ms()).unwrap_or(50);
    Interval::new(period, move || {
        if let Some(Some(frame)) = with_site(|s| s.rain_tick()) {
            if let Err(e) = matrix::paint(&ctx, &frame) {
                log::warn!("rain paint failed: {e}");
            }
        }
    })
    .forget();
    Ok(())
}

fn bind_ui_sounds(doc: &Document, coarse: bool) -> Result<()> {
    if let Some(body) = doc.body() {
        let cb = Closure::wrap(Box::new(move |_: MouseEvent| {
            report("audio unlock", with_site(|s| s.unlock_audio()));
        }) as Box<dyn FnMut(MouseEvent)>);
        let opts = AddEventListenerOptions::new();
        opts.set_once(true);
        body.add_event_listener_with_callback_and_add_event_listener_options(
            "click",
            cb.as_ref().unchecked_ref(),
            &opts,
        )?;
        cb.forget();
    }

    let buttons = doc.query_selector_all(UI_SOUND_SELECTOR)?;
    for i in 0..buttons.length() {
        let Some(el) = buttons.get(i) else { continue };
        if !coarse {
            listen!(el, "mouseenter", MouseEvent, move |_: MouseEvent| {
                report("ui hover", with_site(|s| s.ui_hover()));
            });
        }
        listen!(el, "click", MouseEvent, move |_: MouseEvent| {
            report("ui click", with_site(|s| s.ui_click()));
        });
    }
    Ok(())
}

fn current_focus() -> Focus {
    let active = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.active_element());
    match active {
        Some(el) if el.tag_name().eq_ignore_ascii_case("input") => {
            let id = el.id();
            Focus::TextInput((!id.is_empty()).then_some(id))
        }
        _ => Focus::Page,
    }
}

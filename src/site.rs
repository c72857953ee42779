//! The whole page, minus the browser.
//!
//! `Site` owns every component plus the shared synth, surface and randomness.
//! It never waits: anything that should happen later comes back to the caller
//! as a [`Scheduled`] task, and the caller feeds it to [`Site::run_deferred`]
//! when the delay has passed.

use crate::boot::{BootPlayer, BootStep};
use crate::chat::{self, ChatMessage, ChatWidget};
use crate::config::SiteConfig;
use crate::input::{InputDispatcher, KeyOutcome, KeyPress};
use crate::konami::KonamiEgg;
use crate::launchpad::{Launchpad, Pad};
use crate::matrix::{MatrixRain, RainFrame};
use crate::rng::RandomSource;
use crate::surface::{Component, Surface};
use crate::synth::{AudioBackend, ToneSynth};
use crate::toggles::{self, CursorFollower, HomeEffects, UiSounds};
use crate::{Result, SiteError};

/// Keyboard consumers, highest priority first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRoute {
    Konami,
    ChatSubmit,
    Launchpad,
}

impl KeyRoute {
    pub fn priority(self) -> i32 {
        match self {
            KeyRoute::Konami => 30,
            KeyRoute::ChatSubmit => 20,
            KeyRoute::Launchpad => 10,
        }
    }

    /// Only chat submission listens while the user is typing.
    pub fn in_text_input(self) -> bool {
        matches!(self, KeyRoute::ChatSubmit)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Deferred {
    Boot(BootStep),
    ChatReply { prompt: String },
    PadRelease(Pad),
    RestoreInvert,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scheduled {
    pub delay_ms: f64,
    pub task: Deferred,
}

impl Scheduled {
    pub fn after(delay_ms: f64, task: Deferred) -> Self {
        Self { delay_ms, task }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub struct Site<S, B> {
    config: SiteConfig,
    surface: S,
    synth: ToneSynth<B>,
    rng: Box<dyn RandomSource>,
    viewport: Viewport,
    coarse_pointer: bool,
    input: InputDispatcher<KeyRoute>,
    started: bool,

    boot: BootPlayer,
    home: HomeEffects,
    rain: MatrixRain,
    chat: ChatWidget,
    konami: KonamiEgg,
    cursor: CursorFollower,
    launchpad: Launchpad,
    ui: UiSounds,
}

impl<S: Surface, B: AudioBackend> Site<S, B> {
    pub fn new(
        config: SiteConfig,
        surface: S,
        backend: B,
        rng: Box<dyn RandomSource>,
        viewport: Viewport,
        coarse_pointer: bool,
    ) -> Self {
        let mut input = InputDispatcher::new();
        for route in [KeyRoute::Konami, KeyRoute::ChatSubmit, KeyRoute::Launchpad] {
            input.register(route, route.priority(), route.in_text_input());
        }
        Self {
            boot: BootPlayer::new(config.boot_lines.clone(), config.boot.clone()),
            home: HomeEffects::new(),
            rain: MatrixRain::new(config.rain.clone(), viewport.width, viewport.height),
            chat: ChatWidget::new(),
            konami: KonamiEgg::new(config.secret_code.clone()),
            cursor: CursorFollower::new(coarse_pointer),
            launchpad: Launchpad::new(),
            ui: UiSounds::new(coarse_pointer),
            config,
            surface,
            synth: ToneSynth::new(backend),
            rng,
            viewport,
            coarse_pointer,
            input,
            started: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn synth(&self) -> &ToneSynth<B> {
        &self.synth
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_coarse_pointer(&self) -> bool {
        self.coarse_pointer
    }

    /// Whether the boot overlay has handed off to the rest of the page.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn chat_messages(&self) -> &[ChatMessage] {
        self.chat.messages()
    }

    pub fn hack_reveals(&self) -> usize {
        self.konami.reveals()
    }

    /// Show the boot overlay and return its timeline.
    pub fn begin_boot(&mut self) -> Result<Vec<Scheduled>> {
        let steps = self.boot.start(&mut self.surface, self.rng.as_mut())?;
        log::info!("boot sequence: {} steps", steps.len());
        Ok(steps
            .into_iter()
            .map(|s| Scheduled::after(s.at_ms, Deferred::Boot(s.step)))
            .collect())
    }

    /// Mount everything that runs after boot, in page order. Later calls do nothing.
    pub fn start_components(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        let Self {
            surface,
            home,
            rain,
            chat,
            konami,
            cursor,
            launchpad,
            ui,
            ..
        } = self;
        let components: [&mut dyn Component; 7] = [home, rain, chat, konami, cursor, launchpad, ui];
        for component in components {
            component.mount(&mut *surface)?;
            log::debug!(
                "{}: {}",
                component.name(),
                if component.is_mounted() { "mounted" } else { "skipped" }
            );
        }
        self.started = true;
        Ok(())
    }

    /// Names of the post-boot components that are currently live.
    pub fn active_components(&self) -> Vec<&'static str> {
        let components: [&dyn Component; 7] = [
            &self.home,
            &self.rain,
            &self.chat,
            &self.konami,
            &self.cursor,
            &self.launchpad,
            &self.ui,
        ];
        components
            .iter()
            .filter(|c| c.is_mounted())
            .map(|c| c.name())
            .collect()
    }

    pub fn run_deferred(&mut self, task: Deferred) -> Result<()> {
        match task {
            Deferred::Boot(step) => {
                if self.boot.step(step, &mut self.surface, &mut self.synth)? {
                    self.start_components()?;
                }
            }
            Deferred::ChatReply { prompt } => {
                self.chat
                    .deliver(&mut self.surface, &mut self.synth, &prompt, self.rng.as_mut())?;
            }
            Deferred::PadRelease(pad) => self.launchpad.release(&mut self.surface, pad)?,
            Deferred::RestoreInvert => self.konami.restore(&mut self.surface)?,
        }
        Ok(())
    }

    /// Route one keydown through the dispatcher.
    pub fn handle_key(&mut self, press: &KeyPress) -> Result<Vec<Scheduled>> {
        let Self {
            config,
            surface,
            synth,
            rng,
            input,
            chat,
            konami,
            launchpad,
            ..
        } = self;
        let mut out = Vec::new();
        let mut failure: Option<SiteError> = None;

        let reacted = input.dispatch(press, |route, press| {
            let outcome = match route {
                KeyRoute::Konami if konami.is_mounted() => {
                    if !konami.observe(&press.key) {
                        Ok(KeyOutcome::Observed)
                    } else {
                        konami.reveal(&mut *surface, &mut *synth).map(|()| {
                            out.push(Scheduled::after(
                                config.invert_ms as f64,
                                Deferred::RestoreInvert,
                            ));
                            KeyOutcome::Consumed
                        })
                    }
                }
                KeyRoute::ChatSubmit
                    if chat.is_mounted()
                        && press.key == "Enter"
                        && press.focus.is_input(chat::INPUT_ID) =>
                {
                    chat.submit(&mut *surface, &mut *synth).map(|prompt| {
                        if let Some(prompt) = prompt {
                            let delay = rng.range(config.chat_delay_min_ms, config.chat_delay_max_ms);
                            out.push(Scheduled::after(delay, Deferred::ChatReply { prompt }));
                        }
                        KeyOutcome::Consumed
                    })
                }
                KeyRoute::Launchpad if launchpad.is_mounted() => match Pad::from_key(&press.key) {
                    Some(pad) => launchpad
                        .hit(&mut *surface, &mut *synth, &mut **rng, pad)
                        .map(|()| {
                            out.push(Scheduled::after(
                                config.pad_flash_ms as f64,
                                Deferred::PadRelease(pad),
                            ));
                            KeyOutcome::Consumed
                        }),
                    None => Ok(KeyOutcome::Ignored),
                },
                _ => Ok(KeyOutcome::Ignored),
            };
            outcome.unwrap_or_else(|e| {
                failure = Some(e);
                KeyOutcome::Consumed
            })
        });

        if let Some(e) = failure {
            return Err(e);
        }
        if !reacted.is_empty() {
            log::debug!("key {:?} -> {:?}", press.key, reacted);
        }
        Ok(out)
    }

    fn reply_later(&mut self, prompt: Option<String>) -> Vec<Scheduled> {
        prompt
            .map(|prompt| {
                let delay = self
                    .rng
                    .range(self.config.chat_delay_min_ms, self.config.chat_delay_max_ms);
                Scheduled::after(delay, Deferred::ChatReply { prompt })
            })
            .into_iter()
            .collect()
    }

    /// Send button: post whatever is typed.
    pub fn submit_chat(&mut self) -> Result<Vec<Scheduled>> {
        let prompt = self.chat.submit(&mut self.surface, &mut self.synth)?;
        Ok(self.reply_later(prompt))
    }

    pub fn send_chat(&mut self, text: &str) -> Result<Vec<Scheduled>> {
        let prompt = self.chat.send(&mut self.surface, &mut self.synth, text)?;
        Ok(self.reply_later(prompt))
    }

    pub fn toggle_chat(&mut self) -> Result<()> {
        self.chat.toggle(&mut self.surface)
    }

    pub fn rain_period_ms(&self) -> u32 {
        self.rain.period_ms()
    }

    /// Advance the rain one frame; `None` until the canvas is mounted.
    pub fn rain_tick(&mut self) -> Option<RainFrame> {
        self.rain.tick(self.rng.as_mut())
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        self.viewport = viewport;
        self.rain
            .resize(&mut self.surface, viewport.width, viewport.height)
    }

    pub fn toggle_hero(&mut self) -> Result<Option<bool>> {
        self.home.toggle_hero(&mut self.surface)
    }

    pub fn set_lang(&mut self, code: &str) -> Result<()> {
        toggles::set_lang(&mut self.surface, code)
    }

    pub fn open_nav(&mut self) -> Result<()> {
        toggles::open_nav(
            &mut self.surface,
            self.viewport.width as f64,
            self.config.mobile_breakpoint,
        )
    }

    pub fn close_nav(&mut self) -> Result<()> {
        toggles::close_nav(&mut self.surface)
    }

    pub fn move_cursor(&mut self, x: i32, y: i32) -> Result<()> {
        self.cursor.move_to(&mut self.surface, x, y)
    }

    pub fn press_cursor(&mut self, down: bool) -> Result<()> {
        self.cursor.press(&mut self.surface, down)
    }

    pub fn hover_interactive(&mut self, over: bool) -> Result<()> {
        self.cursor.hover(&mut self.surface, over)
    }

    pub fn ui_hover(&mut self) -> Result<()> {
        self.ui.hover(&mut self.synth)
    }

    pub fn ui_click(&mut self) -> Result<()> {
        self.ui.click(&mut self.synth)
    }

    /// First gesture on the page: let a suspended audio context play.
    pub fn unlock_audio(&mut self) -> Result<bool> {
        self.synth.unlock()
    }

    pub fn close_hack_modal(&mut self) -> Result<()> {
        self.konami.close_modal(&mut self.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Focus;
    use crate::matrix;
    use crate::rng::SequenceRandom;
    use crate::surface::MemorySurface;
    use crate::synth::RecordingBackend;

    fn site() -> Site<MemorySurface, RecordingBackend> {
        Site::new(
            SiteConfig::default(),
            MemorySurface::new(),
            RecordingBackend::new(),
            Box::new(SequenceRandom::constant(0.5)),
            Viewport {
                width: 280,
                height: 140,
            },
            false,
        )
    }

    fn started() -> Site<MemorySurface, RecordingBackend> {
        let mut s = site();
        s.start_components().unwrap();
        s
    }

    #[test]
    fn test_nothing_active_before_boot() {
        let s = site();
        assert!(s.active_components().is_empty());
        assert!(!s.is_started());
    }

    #[test]
    fn test_keys_ignored_before_start() {
        let mut s = site();
        let out = s.handle_key(&KeyPress::on_page("a")).unwrap();
        assert!(out.is_empty());
        assert!(s.synth().backend().voices.is_empty());
    }

    #[test]
    fn test_pad_key_schedules_release() {
        let mut s = started();
        let out = s.handle_key(&KeyPress::on_page("A")).unwrap();
        assert_eq!(out, vec![Scheduled::after(100.0, Deferred::PadRelease(Pad::Kick))]);
        let el = s.surface_mut().by_id("key-a").unwrap();
        assert!(s.surface().has_class(el, "active").unwrap());
        s.run_deferred(Deferred::PadRelease(Pad::Kick)).unwrap();
        assert!(!s.surface().has_class(el, "active").unwrap());
    }

    #[test]
    fn test_pad_keys_ignored_while_typing() {
        let mut s = started();
        let press = KeyPress::new("a", Focus::TextInput(Some("chat-input".into())));
        assert!(s.handle_key(&press).unwrap().is_empty());
        assert!(s.synth().backend().voices.is_empty());
    }

    #[test]
    fn test_enter_in_chat_input_sends() {
        let mut s = started();
        let input = s.surface_mut().by_id(chat::INPUT_ID).unwrap();
        s.surface_mut().set_input_value(input, "hello").unwrap();
        let press = KeyPress::new("Enter", Focus::TextInput(Some(chat::INPUT_ID.into())));
        let out = s.handle_key(&press).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].delay_ms, 1000.0);
        assert_eq!(
            out[0].task,
            Deferred::ChatReply {
                prompt: "hello".into()
            }
        );
    }

    #[test]
    fn test_enter_elsewhere_does_nothing() {
        let mut s = started();
        assert!(s.handle_key(&KeyPress::on_page("Enter")).unwrap().is_empty());
        let other = KeyPress::new("Enter", Focus::TextInput(Some("search".into())));
        assert!(s.handle_key(&other).unwrap().is_empty());
    }

    #[test]
    fn test_completing_konami_key_does_not_hit_pad() {
        let mut s = started();
        let mut last = Vec::new();
        for key in crate::SECRET_CODE {
            last = s.handle_key(&KeyPress::on_page(*key)).unwrap();
        }
        assert_eq!(last, vec![Scheduled::after(200.0, Deferred::RestoreInvert)]);
        assert_eq!(s.hack_reveals(), 1);
        // 'b' is not a pad; the final 'a' went to the egg only.
        assert_eq!(s.synth().backend().voices.len(), 1);
    }

    #[test]
    fn test_nav_uses_viewport_width() {
        let mut s = site();
        let nav = s.surface_mut().seed("div", Some("mySidenav"), &[], "");
        s.open_nav().unwrap();
        assert_eq!(s.surface().style(nav, "width").unwrap().as_deref(), Some("100%"));
        s.resize(Viewport {
            width: 1280,
            height: 720,
        })
        .unwrap();
        s.open_nav().unwrap();
        assert_eq!(s.surface().style(nav, "width").unwrap().as_deref(), Some("250px"));
    }

    #[test]
    fn test_resize_during_boot_sizes_rain_at_mount() {
        let mut s = site();
        s.begin_boot().unwrap();
        let phone = Viewport {
            width: 390,
            height: 844,
        };
        s.resize(phone).unwrap();
        assert_eq!(s.viewport(), phone);
        s.start_components().unwrap();

        let canvas = s.surface_mut().by_id(matrix::CANVAS_ID).unwrap();
        assert_eq!(s.surface().attribute(canvas, "width"), Some("390"));
        assert_eq!(s.surface().attribute(canvas, "height"), Some("844"));
        // 390 / 14 rounded up
        let frame = s.rain_tick().unwrap();
        assert_eq!(frame.glyphs.len(), 28);
        assert_eq!((frame.width, frame.height), (390, 844));
    }

    #[test]
    fn test_rain_period_follows_config() {
        let mut cfg = SiteConfig::default();
        cfg.rain.period_ms = 80;
        let s = Site::new(
            cfg,
            MemorySurface::new(),
            RecordingBackend::new(),
            Box::new(SequenceRandom::constant(0.5)),
            Viewport {
                width: 280,
                height: 140,
            },
            false,
        );
        assert_eq!(s.rain_period_ms(), 80);
    }
}

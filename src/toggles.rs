//! Small page behaviours: sidebar, bio language, hero slide-down, custom cursor
//! and UI sound cues.
//!
//! Most of these act on markup that only some pages carry, so a missing element
//! means "this page doesn't have that feature" and is skipped quietly.

use std::fmt;
use std::str::FromStr;

use crate::surface::{Component, NodeId, Surface};
use crate::synth::{AudioBackend, ToneSynth};
use crate::{Result, SiteError};

pub const SIDENAV_ID: &str = "mySidenav";
pub const CURSOR_ID: &str = "custom-cursor";

/// Elements that put the cursor in its hover state.
pub const CURSOR_HOVER_SELECTOR: &str = "a, button, .logo, .music-card";
/// Elements that get hover and click cues.
pub const UI_SOUND_SELECTOR: &str = "a, button, .cyber-btn, .lang-btn, .social-btn";

const ACTIVE: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Tr,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Tr => "tr",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tr" => Ok(Language::Tr),
            "en" => Ok(Language::En),
            other => Err(SiteError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Show the biography panel for `code` and highlight its button.
pub fn set_lang(surface: &mut dyn Surface, code: &str) -> Result<()> {
    let lang: Language = code.parse()?;
    let panels = surface.by_class("bio-content");
    if panels.is_empty() {
        return Ok(());
    }
    let panel_id = format!("bio-{lang}");
    let target = surface
        .by_id(&panel_id)
        .ok_or(SiteError::MissingElement(panel_id))?;
    for panel in panels {
        surface.remove_class(panel, ACTIVE)?;
    }
    surface.add_class(target, ACTIVE)?;

    for btn in surface.by_class("lang-btn") {
        surface.remove_class(btn, ACTIVE)?;
    }
    for btn in surface.by_class("lang-btn") {
        if surface.text(btn)?.trim().to_lowercase() == lang.code() {
            surface.add_class(btn, ACTIVE)?;
            break;
        }
    }
    Ok(())
}

pub fn open_nav(surface: &mut dyn Surface, viewport_width: f64, breakpoint: f64) -> Result<()> {
    let Some(nav) = surface.by_id(SIDENAV_ID) else {
        return Ok(());
    };
    let width = if viewport_width <= breakpoint { "100%" } else { "250px" };
    surface.set_style(nav, "width", width)
}

pub fn close_nav(surface: &mut dyn Surface) -> Result<()> {
    match surface.by_id(SIDENAV_ID) {
        Some(nav) => surface.set_style(nav, "width", "0"),
        None => Ok(()),
    }
}

/// Page markup uses classes for these; fall back to an id of the same name.
fn find(surface: &mut dyn Surface, name: &str) -> Option<NodeId> {
    surface
        .by_class(name)
        .first()
        .copied()
        .or_else(|| surface.by_id(name))
}

/// Logo-driven hero slide-down and default bio language.
#[derive(Default)]
pub struct HomeEffects {
    mounted: bool,
}

impl HomeEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the hero between its resting and slid-down state. Returns the new
    /// state, or `None` when the page has no hero.
    pub fn toggle_hero(&self, surface: &mut dyn Surface) -> Result<Option<bool>> {
        let (Some(logo), Some(hero), Some(photo)) = (
            find(surface, "logo"),
            find(surface, "hero-box"),
            find(surface, "photo-circle"),
        ) else {
            return Ok(None);
        };
        let quote = find(surface, "reveal-quote");
        let down = !surface.has_class(hero, "slide-down")?;
        let apply = |s: &mut dyn Surface, node: NodeId, class: &str| {
            if down {
                s.add_class(node, class)
            } else {
                s.remove_class(node, class)
            }
        };
        apply(surface, hero, "slide-down")?;
        apply(surface, photo, "slide-down")?;
        if let Some(quote) = quote {
            apply(surface, quote, "visible")?;
        }
        if down {
            surface.set_text(logo, "SYSTEM_CRITICAL // GRAVITY_LOSS")?;
            surface.set_style(logo, "color", "#fff")?;
            surface.set_style(logo, "text-shadow", "0 0 20px #fff, 0 0 40px #ff003c")?;
        } else {
            surface.set_text(logo, "SYSTEM.OVRD // MRDJKeremCan")?;
            surface.set_style(logo, "color", "var(--neon-red)")?;
            surface.set_style(logo, "text-shadow", "0 0 10px var(--neon-red)")?;
        }
        Ok(Some(down))
    }
}

impl Component for HomeEffects {
    fn name(&self) -> &'static str {
        "home-effects"
    }

    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.mounted {
            return Ok(());
        }
        if surface.exists("bio-tr") {
            let mut any_active = false;
            for panel in surface.by_class("bio-content") {
                any_active |= surface.has_class(panel, ACTIVE)?;
            }
            if !any_active {
                set_lang(surface, Language::Tr.code())?;
            }
        }
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self, _surface: &mut dyn Surface) -> Result<()> {
        self.mounted = false;
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// A div that trails the mouse. Not used on touch screens.
pub struct CursorFollower {
    coarse: bool,
    node: Option<NodeId>,
}

impl CursorFollower {
    pub fn new(coarse_pointer: bool) -> Self {
        Self {
            coarse: coarse_pointer,
            node: None,
        }
    }

    pub fn move_to(&self, surface: &mut dyn Surface, x: i32, y: i32) -> Result<()> {
        if let Some(node) = self.node {
            surface.set_style(node, "left", &format!("{x}px"))?;
            surface.set_style(node, "top", &format!("{y}px"))?;
        }
        Ok(())
    }

    pub fn press(&self, surface: &mut dyn Surface, down: bool) -> Result<()> {
        match self.node {
            Some(node) if down => surface.add_class(node, "click"),
            Some(node) => surface.remove_class(node, "click"),
            None => Ok(()),
        }
    }

    /// Pointer entered or left an interactive element.
    pub fn hover(&self, surface: &mut dyn Surface, over: bool) -> Result<()> {
        if self.node.is_none() {
            return Ok(());
        }
        let root = surface.root();
        if over {
            surface.add_class(root, "hovering")
        } else {
            surface.remove_class(root, "hovering")
        }
    }
}

impl Component for CursorFollower {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.coarse || self.node.is_some() {
            return Ok(());
        }
        let root = surface.root();
        self.node = Some(surface.spawn(root, "div", Some(CURSOR_ID), &[], None)?);
        Ok(())
    }

    fn unmount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if let Some(node) = self.node.take() {
            surface.remove(node)?;
        }
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.node.is_some()
    }
}

/// Hover and click cues for button-like elements.
pub struct UiSounds {
    coarse: bool,
    mounted: bool,
}

impl UiSounds {
    pub fn new(coarse_pointer: bool) -> Self {
        Self {
            coarse: coarse_pointer,
            mounted: false,
        }
    }

    pub fn hover<B: AudioBackend>(&self, synth: &mut ToneSynth<B>) -> Result<()> {
        if !self.mounted || self.coarse {
            return Ok(());
        }
        synth.play_ui_hover()
    }

    pub fn click<B: AudioBackend>(&self, synth: &mut ToneSynth<B>) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        synth.play_ui_click()
    }
}

impl Component for UiSounds {
    fn name(&self) -> &'static str {
        "ui-sounds"
    }

    fn mount(&mut self, _surface: &mut dyn Surface) -> Result<()> {
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self, _surface: &mut dyn Surface) -> Result<()> {
        self.mounted = false;
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}

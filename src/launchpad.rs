//! Keyboard launchpad: four keys, four drum sounds.

use crate::rng::RandomSource;
use crate::surface::{Component, NodeId, Surface};
use crate::synth::{AudioBackend, ToneSynth};
use crate::Result;

pub const OVERLAY_ID: &str = "launchpad-overlay";
pub const ACTIVE_CLASS: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pad {
    Kick,
    Snare,
    HiHat,
    BassDrop,
}

impl Pad {
    pub const ALL: [Pad; 4] = [Pad::Kick, Pad::Snare, Pad::HiHat, Pad::BassDrop];

    /// Map a `KeyboardEvent.key` to a pad, ignoring case.
    pub fn from_key(key: &str) -> Option<Pad> {
        match key.to_ascii_lowercase().as_str() {
            "a" => Some(Pad::Kick),
            "s" => Some(Pad::Snare),
            "d" => Some(Pad::HiHat),
            "f" => Some(Pad::BassDrop),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pad::Kick => "A",
            Pad::Snare => "S",
            Pad::HiHat => "D",
            Pad::BassDrop => "F",
        }
    }

    pub fn indicator_id(self) -> &'static str {
        match self {
            Pad::Kick => "key-a",
            Pad::Snare => "key-s",
            Pad::HiHat => "key-d",
            Pad::BassDrop => "key-f",
        }
    }
}

#[derive(Default)]
pub struct Launchpad {
    overlay: Option<NodeId>,
    hits: usize,
}

impl Launchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Play the pad and light its indicator. The caller schedules `release`.
    pub fn hit<B: AudioBackend>(
        &mut self,
        surface: &mut dyn Surface,
        synth: &mut ToneSynth<B>,
        rng: &mut dyn RandomSource,
        pad: Pad,
    ) -> Result<()> {
        let played = match pad {
            Pad::Kick => synth.play_kick(),
            Pad::Snare => synth.play_snare(rng),
            Pad::HiHat => synth.play_hihat(),
            Pad::BassDrop => synth.play_bass_drop(),
        };
        if let Err(e) = played {
            log::warn!("{pad:?} pad failed: {e}");
        }
        if let Some(el) = surface.by_id(pad.indicator_id()) {
            surface.add_class(el, ACTIVE_CLASS)?;
        }
        self.hits += 1;
        Ok(())
    }

    pub fn release(&self, surface: &mut dyn Surface, pad: Pad) -> Result<()> {
        if let Some(el) = surface.by_id(pad.indicator_id()) {
            surface.remove_class(el, ACTIVE_CLASS)?;
        }
        Ok(())
    }
}

impl Component for Launchpad {
    fn name(&self) -> &'static str {
        "launchpad"
    }

    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.overlay.is_some() {
            return Ok(());
        }
        let root = surface.root();
        let overlay = surface.spawn(root, "div", Some(OVERLAY_ID), &[], None)?;
        for pad in Pad::ALL {
            surface.spawn(
                overlay,
                "div",
                Some(pad.indicator_id()),
                &["pad-key"],
                Some(pad.label()),
            )?;
        }
        self.overlay = Some(overlay);
        Ok(())
    }

    fn unmount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if let Some(overlay) = self.overlay.take() {
            surface.remove(overlay)?;
        }
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.overlay.is_some()
    }
}

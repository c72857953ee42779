//! Konami code easter egg.

use std::collections::VecDeque;

use crate::surface::{Component, NodeId, Surface};
use crate::synth::{AudioBackend, ToneSynth};
use crate::Result;

pub const MODAL_ID: &str = "hack-modal";
pub const CLOSE_ID: &str = "hack-close";
pub const SCAN_CLASS: &str = "overlay-scan";

/// Sliding window over the most recent keys, compared against a secret.
#[derive(Clone, Debug)]
pub struct KeyBuffer {
    secret: Vec<String>,
    recent: VecDeque<String>,
}

impl KeyBuffer {
    pub fn new(secret: Vec<String>) -> Self {
        let cap = secret.len();
        Self {
            secret,
            recent: VecDeque::with_capacity(cap + 1),
        }
    }

    /// Record a key; `true` when the window now equals the secret.
    pub fn push(&mut self, key: &str) -> bool {
        self.recent.push_back(key.to_string());
        while self.recent.len() > self.secret.len() {
            self.recent.pop_front();
        }
        !self.secret.is_empty() && self.recent.iter().eq(self.secret.iter())
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }
}

pub struct KonamiEgg {
    buffer: KeyBuffer,
    created: Vec<NodeId>,
    mounted: bool,
    reveals: usize,
}

impl KonamiEgg {
    pub fn new(secret: Vec<String>) -> Self {
        Self {
            buffer: KeyBuffer::new(secret),
            created: Vec::new(),
            mounted: false,
            reveals: 0,
        }
    }

    /// How many times the modal has been revealed.
    pub fn reveals(&self) -> usize {
        self.reveals
    }

    pub fn observe(&mut self, key: &str) -> bool {
        self.buffer.push(key)
    }

    /// Show the modal and scan lines, drop the bass and invert the page.
    /// The caller restores the page colours after the flash.
    pub fn reveal<B: AudioBackend>(
        &mut self,
        surface: &mut dyn Surface,
        synth: &mut ToneSynth<B>,
    ) -> Result<()> {
        if let Some(modal) = surface.by_id(MODAL_ID) {
            surface.set_style(modal, "display", "block")?;
        }
        if let Some(&scan) = surface.by_class(SCAN_CLASS).first() {
            surface.set_style(scan, "display", "block")?;
        }
        if let Err(e) = synth.play_bass_drop() {
            log::warn!("bass drop failed: {e}");
        }
        let root = surface.root();
        surface.set_style(root, "filter", "invert(1)")?;
        self.reveals += 1;
        log::info!("konami code accepted");
        Ok(())
    }

    pub fn restore(&self, surface: &mut dyn Surface) -> Result<()> {
        let root = surface.root();
        surface.set_style(root, "filter", "none")
    }

    pub fn close_modal(&self, surface: &mut dyn Surface) -> Result<()> {
        if let Some(modal) = surface.by_id(MODAL_ID) {
            surface.set_style(modal, "display", "none")?;
        }
        Ok(())
    }
}

impl Component for KonamiEgg {
    fn name(&self) -> &'static str {
        "easter-egg"
    }

    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.mounted {
            return Ok(());
        }
        if !surface.exists(MODAL_ID) {
            let root = surface.root();
            let modal = surface.spawn(root, "div", Some(MODAL_ID), &[], None)?;
            surface.spawn(modal, "div", None, &["hack-text"], Some("SYSTEM HACKED"))?;
            let access = surface.spawn(modal, "p", None, &[], Some("ACCESS LEVEL: ROOT_ADMIN"))?;
            surface.set_style(access, "color", "#fff")?;
            surface.set_style(access, "margin-bottom", "20px")?;
            let unlocked =
                surface.spawn(modal, "p", None, &[], Some("UNLOCKED: SECRET_SET_001.mp3"))?;
            surface.set_style(unlocked, "color", "var(--neon-green)")?;
            let close = surface.spawn(modal, "button", Some(CLOSE_ID), &["cyber-btn"], Some("CLOSE"))?;
            surface.set_style(close, "margin-top", "20px")?;
            let scan = surface.spawn(root, "div", None, &[SCAN_CLASS], None)?;
            self.created = vec![modal, scan];
        }
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        for node in self.created.drain(..) {
            surface.remove(node)?;
        }
        self.mounted = false;
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use crate::synth::RecordingBackend;
    use crate::SECRET_CODE;

    fn secret() -> Vec<String> {
        SECRET_CODE.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_buffer_never_exceeds_secret_length() {
        let mut b = KeyBuffer::new(secret());
        for i in 0..50 {
            b.push(if i % 2 == 0 { "x" } else { "ArrowUp" });
            assert!(b.len() <= SECRET_CODE.len());
        }
        assert_eq!(b.len(), SECRET_CODE.len());
    }

    #[test]
    fn test_exact_sequence_matches_on_last_key() {
        let mut b = KeyBuffer::new(secret());
        let hits: Vec<bool> = SECRET_CODE.iter().map(|k| b.push(k)).collect();
        assert_eq!(hits.iter().filter(|&&h| h).count(), 1);
        assert!(hits[SECRET_CODE.len() - 1]);
    }

    #[test]
    fn test_match_after_noise_prefix() {
        let mut b = KeyBuffer::new(secret());
        for k in ["a", "b", "Enter", "ArrowUp"] {
            assert!(!b.push(k));
        }
        let last = SECRET_CODE.iter().map(|k| b.push(k)).last();
        assert_eq!(last, Some(true));
    }

    #[test]
    fn test_interleaved_key_breaks_match() {
        let mut b = KeyBuffer::new(secret());
        let mut matched = false;
        for (i, k) in SECRET_CODE.iter().enumerate() {
            if i == 5 {
                matched |= b.push("x");
            }
            matched |= b.push(k);
        }
        assert!(!matched);
    }

    #[test]
    fn test_repeat_retriggers() {
        let mut b = KeyBuffer::new(secret());
        let mut count = 0;
        for _ in 0..2 {
            for k in SECRET_CODE {
                if b.push(k) {
                    count += 1;
                }
            }
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_case_sensitive_letters() {
        let mut b = KeyBuffer::new(secret());
        let keys: Vec<&str> = SECRET_CODE
            .iter()
            .map(|k| if *k == "a" { "A" } else { *k })
            .collect();
        assert!(!keys.iter().any(|k| b.push(k)));
    }

    #[test]
    fn test_empty_secret_never_matches() {
        let mut b = KeyBuffer::new(Vec::new());
        assert!(!b.push("a"));
        assert!(b.is_empty());
    }

    #[test]
    fn test_mount_builds_modal_once() {
        let mut surface = MemorySurface::new();
        let mut egg = KonamiEgg::new(secret());
        egg.mount(&mut surface).unwrap();
        egg.mount(&mut surface).unwrap();
        assert_eq!(surface.by_class(SCAN_CLASS).len(), 1);
        let modal = surface.by_id(MODAL_ID).unwrap();
        assert!(surface.text(modal).unwrap().contains("SYSTEM HACKED"));
        assert!(surface.by_id(CLOSE_ID).is_some());
    }

    #[test]
    fn test_reveal_and_restore() {
        let mut surface = MemorySurface::new();
        let mut synth = ToneSynth::new(RecordingBackend::new());
        let mut egg = KonamiEgg::new(secret());
        egg.mount(&mut surface).unwrap();
        egg.reveal(&mut surface, &mut synth).unwrap();
        let modal = surface.by_id(MODAL_ID).unwrap();
        let scan = surface.by_class(SCAN_CLASS)[0];
        assert_eq!(surface.style(modal, "display").unwrap().as_deref(), Some("block"));
        assert_eq!(surface.style(scan, "display").unwrap().as_deref(), Some("block"));
        assert_eq!(surface.style(0, "filter").unwrap().as_deref(), Some("invert(1)"));
        assert_eq!(synth.backend().voices.len(), 1);
        egg.restore(&mut surface).unwrap();
        assert_eq!(surface.style(0, "filter").unwrap().as_deref(), Some("none"));
        egg.close_modal(&mut surface).unwrap();
        assert_eq!(surface.style(modal, "display").unwrap().as_deref(), Some("none"));
    }

    #[test]
    fn test_unmount_removes_created_nodes() {
        let mut surface = MemorySurface::new();
        let mut egg = KonamiEgg::new(secret());
        egg.mount(&mut surface).unwrap();
        egg.unmount(&mut surface).unwrap();
        assert!(surface.by_id(MODAL_ID).is_none());
        assert!(surface.by_class(SCAN_CLASS).is_empty());
        assert!(!egg.is_mounted());
    }
}

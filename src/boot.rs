//! Boot overlay shown on first paint.
//!
//! Lines print one by one at randomly paced offsets, each with a short chirp,
//! then the overlay fades and is removed. Removal is the hand-off point: the
//! rest of the site only starts after it.

use crate::config::BootTiming;
use crate::rng::RandomSource;
use crate::surface::{Component, NodeId, Surface};
use crate::synth::{AudioBackend, ToneSynth, Waveform};
use crate::Result;

pub const OVERLAY_ID: &str = "boot-screen";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootPhase {
    Idle,
    Printing(usize),
    Revealing,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootStep {
    PrintLine(usize),
    BeginFade,
    RemoveOverlay,
}

/// A step and its offset from boot start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledStep {
    pub at_ms: f64,
    pub step: BootStep,
}

/// Build the full timeline: line `i` lands after the sum of the `i` previous
/// random gaps; the fade starts `settle_ms` after the last line.
pub fn build_schedule(
    line_count: usize,
    timing: &BootTiming,
    rng: &mut dyn RandomSource,
) -> Vec<ScheduledStep> {
    let mut steps = Vec::with_capacity(line_count + 2);
    let mut at = 0.0;
    for i in 0..line_count {
        if i > 0 {
            at += rng.range(timing.step_min_ms, timing.step_max_ms);
        }
        steps.push(ScheduledStep {
            at_ms: at,
            step: BootStep::PrintLine(i),
        });
    }
    let fade_at = at + timing.settle_ms;
    steps.push(ScheduledStep {
        at_ms: fade_at,
        step: BootStep::BeginFade,
    });
    steps.push(ScheduledStep {
        at_ms: fade_at + timing.fade_ms,
        step: BootStep::RemoveOverlay,
    });
    steps
}

pub struct BootPlayer {
    lines: Vec<String>,
    timing: BootTiming,
    phase: BootPhase,
    overlay: Option<NodeId>,
}

impl BootPlayer {
    pub fn new(lines: Vec<String>, timing: BootTiming) -> Self {
        Self {
            lines,
            timing,
            phase: BootPhase::Idle,
            overlay: None,
        }
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    /// Mount the overlay and return the steps to run, in order.
    pub fn start(
        &mut self,
        surface: &mut dyn Surface,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<ScheduledStep>> {
        if self.phase != BootPhase::Idle {
            return Ok(Vec::new());
        }
        self.mount(surface)?;
        Ok(build_schedule(self.lines.len(), &self.timing, rng))
    }

    /// Run one step. Returns `true` exactly once, when the overlay is gone and
    /// the rest of the site should start.
    pub fn step<B: AudioBackend>(
        &mut self,
        step: BootStep,
        surface: &mut dyn Surface,
        synth: &mut ToneSynth<B>,
    ) -> Result<bool> {
        if self.phase == BootPhase::Done {
            return Ok(false);
        }
        match step {
            BootStep::PrintLine(i) => {
                let Some(line) = self.lines.get(i) else {
                    return Ok(false);
                };
                if let Some(overlay) = self.overlay {
                    let text = format!("> {line}");
                    surface.spawn(overlay, "div", None, &["boot-line"], Some(&text))?;
                }
                self.chirp(i, synth);
                self.phase = BootPhase::Printing(i);
            }
            BootStep::BeginFade => {
                if let Some(overlay) = self.overlay {
                    let transition = format!("opacity {}s", self.timing.fade_ms / 1000.0);
                    surface.set_style(overlay, "transition", &transition)?;
                    surface.set_style(overlay, "opacity", "0")?;
                }
                self.phase = BootPhase::Revealing;
            }
            BootStep::RemoveOverlay => {
                self.unmount(surface)?;
                self.phase = BootPhase::Done;
                log::info!("boot sequence complete");
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn chirp<B: AudioBackend>(&self, i: usize, synth: &mut ToneSynth<B>) {
        // Audio may be blocked until a user gesture; boot never waits on it.
        if i < 3 {
            if let Err(e) = synth.play_tone(400.0 + 100.0 * i as f32, Waveform::Square, 0.05, 0.1) {
                log::debug!("boot chirp skipped: {e}");
            }
        }
        if i + 1 == self.lines.len() {
            if let Err(e) = synth.play_tone(1000.0, Waveform::Sine, 0.5, 0.2) {
                log::debug!("boot chime skipped: {e}");
            }
        }
    }
}

impl Component for BootPlayer {
    fn name(&self) -> &'static str {
        "boot"
    }

    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.overlay.is_some() {
            return Ok(());
        }
        let root = surface.root();
        let overlay = surface.spawn(root, "div", Some(OVERLAY_ID), &[], None)?;
        surface.set_style(root, "overflow", "hidden")?;
        self.overlay = Some(overlay);
        Ok(())
    }

    fn unmount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if let Some(overlay) = self.overlay.take() {
            surface.remove(overlay)?;
            let root = surface.root();
            surface.set_style(root, "overflow", "")?;
        }
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.overlay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;
    use crate::surface::MemorySurface;
    use crate::synth::RecordingBackend;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("LINE_{i}")).collect()
    }

    #[test]
    fn test_schedule_accumulates_gaps() {
        let mut rng = SequenceRandom::new(vec![0.0, 0.5, 0.999]);
        let steps = build_schedule(4, &BootTiming::default(), &mut rng);
        let at: Vec<f64> = steps.iter().map(|s| s.at_ms).collect();
        assert_eq!(at[0], 0.0);
        assert_eq!(at[1], 100.0);
        assert_eq!(at[2], 350.0);
        assert!(at[3] > 749.0 && at[3] < 750.0);
        assert_eq!(steps[4].step, BootStep::BeginFade);
        assert_eq!(steps[4].at_ms, at[3] + 500.0);
        assert_eq!(steps[5].step, BootStep::RemoveOverlay);
        assert!((steps[5].at_ms - (at[3] + 1000.0)).abs() < 1e-9);
    }

    #[test]
    fn test_schedule_gaps_within_bounds() {
        let mut rng = crate::rng::SeededRandom::new(3);
        let steps = build_schedule(7, &BootTiming::default(), &mut rng);
        for pair in steps[..7].windows(2) {
            let gap = pair[1].at_ms - pair[0].at_ms;
            assert!((100.0..400.0).contains(&gap), "gap {gap}");
        }
    }

    #[test]
    fn test_full_run_removes_overlay_and_hands_off_once() {
        let mut surface = MemorySurface::new();
        let mut synth = ToneSynth::new(RecordingBackend::new());
        let mut rng = SequenceRandom::constant(0.3);
        let mut boot = BootPlayer::new(lines(7), BootTiming::default());

        let steps = boot.start(&mut surface, &mut rng).unwrap();
        assert_eq!(surface.style(0, "overflow").unwrap().as_deref(), Some("hidden"));
        let overlay = surface.by_id(OVERLAY_ID).unwrap();

        let mut handoffs = 0;
        for s in &steps {
            if s.step == BootStep::PrintLine(2) {
                assert_eq!(surface.children(overlay).len(), 2);
            }
            if boot.step(s.step, &mut surface, &mut synth).unwrap() {
                handoffs += 1;
            }
        }
        assert_eq!(handoffs, 1);
        assert_eq!(boot.phase(), BootPhase::Done);
        assert!(surface.by_id(OVERLAY_ID).is_none());
        assert_eq!(surface.style(0, "overflow").unwrap(), None);
        assert_eq!(surface.children(overlay).len(), 7);

        // Replayed removal does not hand off again.
        assert!(!boot.step(BootStep::RemoveOverlay, &mut surface, &mut synth).unwrap());
    }

    #[test]
    fn test_chirps_ascend_then_chime() {
        let mut surface = MemorySurface::new();
        let mut synth = ToneSynth::new(RecordingBackend::new());
        let mut rng = SequenceRandom::constant(0.0);
        let mut boot = BootPlayer::new(lines(7), BootTiming::default());
        for s in boot.start(&mut surface, &mut rng).unwrap() {
            boot.step(s.step, &mut surface, &mut synth).unwrap();
        }
        let freqs: Vec<f32> = synth
            .backend()
            .voices
            .iter()
            .map(|v| match &v.source {
                crate::synth::Source::Oscillator { frequency, .. } => frequency.initial,
                _ => 0.0,
            })
            .collect();
        assert_eq!(freqs, vec![400.0, 500.0, 600.0, 1000.0]);
    }

    #[test]
    fn test_boot_survives_missing_audio() {
        let mut surface = MemorySurface::new();
        let mut backend = RecordingBackend::new();
        backend.fail_open = true;
        let mut synth = ToneSynth::new(backend);
        let mut rng = SequenceRandom::constant(0.5);
        let mut boot = BootPlayer::new(lines(3), BootTiming::default());
        let mut done = false;
        for s in boot.start(&mut surface, &mut rng).unwrap() {
            done |= boot.step(s.step, &mut surface, &mut synth).unwrap();
        }
        assert!(done);
    }

    #[test]
    fn test_fade_sets_transition() {
        let mut surface = MemorySurface::new();
        let mut synth = ToneSynth::new(RecordingBackend::new());
        let mut rng = SequenceRandom::constant(0.5);
        let mut boot = BootPlayer::new(lines(1), BootTiming::default());
        boot.start(&mut surface, &mut rng).unwrap();
        let overlay = surface.by_id(OVERLAY_ID).unwrap();
        boot.step(BootStep::BeginFade, &mut surface, &mut synth).unwrap();
        assert_eq!(boot.phase(), BootPhase::Revealing);
        assert_eq!(surface.style(overlay, "opacity").unwrap().as_deref(), Some("0"));
        assert_eq!(
            surface.style(overlay, "transition").unwrap().as_deref(),
            Some("opacity 0.5s")
        );
    }
}

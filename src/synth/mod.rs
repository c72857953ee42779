//! Procedural sound effects.
//!
//! Nothing is sampled from disk: every sound is an oscillator or a noise burst
//! shaped by parameter automation. A [`Voice`] is the plain-data plan for one
//! sound; an [`AudioBackend`] turns plans into real audio nodes (Web Audio in
//! the browser, a recorder in tests).
//!
//! Automation follows Web Audio ramp semantics: a ramp runs from the previous
//! event's value and time to its own target value and end time.

mod recording;
mod voices;
mod web_audio;

pub use recording::RecordingBackend;
pub use voices::{
    bass_drop_voice, kick_voice, snare_voice, tone_voice, ENVELOPE_FLOOR, SNARE_SECONDS,
};
pub use web_audio::WebAudioBackend;

use crate::Result;
use crate::rng::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// One automation segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ramp {
    Exponential { target: f32, end: f64 },
    Linear { target: f32, end: f64 },
}

impl Ramp {
    fn end(&self) -> f64 {
        match *self {
            Ramp::Exponential { end, .. } | Ramp::Linear { end, .. } => end,
        }
    }

    fn target(&self) -> f32 {
        match *self {
            Ramp::Exponential { target, .. } | Ramp::Linear { target, .. } => target,
        }
    }
}

/// Value of an audio parameter over time: a starting value plus ramps.
#[derive(Clone, Debug, PartialEq)]
pub struct Automation {
    pub start: f64,
    pub initial: f32,
    pub ramps: Vec<Ramp>,
}

impl Automation {
    pub fn at(start: f64, initial: f32) -> Self {
        Self {
            start,
            initial,
            ramps: Vec::new(),
        }
    }

    pub fn exponential_to(mut self, target: f32, end: f64) -> Self {
        self.ramps.push(Ramp::Exponential { target, end });
        self
    }

    pub fn linear_to(mut self, target: f32, end: f64) -> Self {
        self.ramps.push(Ramp::Linear { target, end });
        self
    }

    /// Time at which the last ramp settles.
    pub fn end(&self) -> f64 {
        self.ramps.last().map(Ramp::end).unwrap_or(self.start)
    }

    /// Evaluate the parameter at time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        if t <= self.start {
            return self.initial;
        }
        let (mut t0, mut v0) = (self.start, self.initial);
        for ramp in &self.ramps {
            let (t1, v1) = (ramp.end(), ramp.target());
            if t < t1 && t1 > t0 {
                let frac = (t - t0) / (t1 - t0);
                return match ramp {
                    Ramp::Linear { .. } => v0 + (v1 - v0) * frac as f32,
                    Ramp::Exponential { .. } => {
                        // Undefined across zero or a sign change; the param holds instead.
                        if v0 * v1 <= 0.0 {
                            v0
                        } else {
                            (v0 as f64 * (v1 as f64 / v0 as f64).powf(frac)) as f32
                        }
                    }
                };
            }
            t0 = t1;
            v0 = v1;
        }
        v0
    }
}

/// What produces the signal before the gain stage.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Oscillator {
        waveform: Waveform,
        frequency: Automation,
    },
    /// Mono sample buffer played once through a high-pass biquad.
    Noise { samples: Vec<f32>, highpass_hz: f32 },
}

/// Plan for a single sound: source → gain → destination.
#[derive(Clone, Debug, PartialEq)]
pub struct Voice {
    pub source: Source,
    pub gain: Automation,
    pub start: f64,
    /// `None` lets the source run out on its own (noise buffers).
    pub stop: Option<f64>,
}

/// The platform audio graph.
pub trait AudioBackend {
    /// Create the underlying context. Called at most once per successful open.
    fn open(&mut self) -> Result<()>;
    fn current_time(&self) -> f64;
    fn sample_rate(&self) -> f32;
    fn is_suspended(&self) -> bool;
    fn resume(&mut self) -> Result<()>;
    fn play(&mut self, voice: &Voice) -> Result<()>;
}

/// Shared sound engine. One per page; every component borrows it.
pub struct ToneSynth<B> {
    backend: B,
    opened: bool,
    unlocked: bool,
}

impl<B: AudioBackend> ToneSynth<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            opened: false,
            unlocked: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    fn ensure_open(&mut self) -> Result<f64> {
        if !self.opened {
            self.backend.open()?;
            self.opened = true;
            log::debug!("audio context opened");
        }
        Ok(self.backend.current_time())
    }

    fn submit(&mut self, voice: Option<Voice>) -> Result<()> {
        match voice {
            Some(v) => self.backend.play(&v),
            None => Ok(()),
        }
    }

    /// Resume a suspended context. Only the first call does anything; the page
    /// wires it to the first click anywhere. Returns whether a resume was issued.
    pub fn unlock(&mut self) -> Result<bool> {
        if self.unlocked {
            return Ok(false);
        }
        self.unlocked = true;
        if self.opened && self.backend.is_suspended() {
            self.backend.resume()?;
            log::info!("audio context resumed");
            return Ok(true);
        }
        Ok(false)
    }

    pub fn play_tone(
        &mut self,
        frequency: f32,
        waveform: Waveform,
        duration: f64,
        volume: f32,
    ) -> Result<()> {
        let now = self.ensure_open()?;
        self.submit(tone_voice(now, frequency, waveform, duration, volume))
    }

    pub fn play_kick(&mut self) -> Result<()> {
        let now = self.ensure_open()?;
        self.submit(Some(kick_voice(now)))
    }

    pub fn play_snare(&mut self, rng: &mut dyn RandomSource) -> Result<()> {
        let now = self.ensure_open()?;
        let rate = self.backend.sample_rate();
        self.submit(Some(snare_voice(now, rate, rng)))
    }

    pub fn play_hihat(&mut self) -> Result<()> {
        self.play_tone(8000.0, Waveform::Square, 0.05, 0.3)
    }

    pub fn play_bass_drop(&mut self) -> Result<()> {
        let now = self.ensure_open()?;
        self.submit(Some(bass_drop_voice(now)))
    }

    /// High chirp for pointer hover and incoming chat lines.
    pub fn play_ui_hover(&mut self) -> Result<()> {
        self.play_tone(2000.0, Waveform::Sine, 0.05, 0.05)
    }

    /// Electric click for buttons and sent chat lines.
    pub fn play_ui_click(&mut self) -> Result<()> {
        self.play_tone(800.0, Waveform::Sawtooth, 0.1, 0.1)
    }
}

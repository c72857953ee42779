//! Web Audio implementation of [`AudioBackend`].

use web_sys::{
    AudioContext, AudioContextState, AudioParam, AudioScheduledSourceNode, BiquadFilterType,
    OscillatorType,
};

use super::{AudioBackend, Automation, Ramp, Source, Voice, Waveform};
use crate::{Result, SiteError};

/// Owns the page's single `AudioContext`, created lazily on `open`.
#[derive(Default)]
pub struct WebAudioBackend {
    ctx: Option<AudioContext>,
}

impl WebAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn ctx(&self) -> Result<&AudioContext> {
        self.ctx
            .as_ref()
            .ok_or_else(|| SiteError::AudioUnavailable("context not opened".into()))
    }
}

fn oscillator_type(w: Waveform) -> OscillatorType {
    match w {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}

fn apply(param: &AudioParam, automation: &Automation) -> Result<()> {
    param.set_value_at_time(automation.initial, automation.start)?;
    for ramp in &automation.ramps {
        match *ramp {
            Ramp::Exponential { target, end } => {
                param.exponential_ramp_to_value_at_time(target, end)?;
            }
            Ramp::Linear { target, end } => {
                param.linear_ramp_to_value_at_time(target, end)?;
            }
        }
    }
    Ok(())
}

/// Start a source node, and stop it too when the voice has a fixed end.
fn run_source(node: &AudioScheduledSourceNode, start: f64, stop: Option<f64>) -> Result<()> {
    node.start_with_when(start)?;
    if let Some(stop) = stop {
        node.stop_with_when(stop)?;
    }
    Ok(())
}

impl AudioBackend for WebAudioBackend {
    fn open(&mut self) -> Result<()> {
        if self.ctx.is_none() {
            let ctx = AudioContext::new()
                .map_err(|e| SiteError::AudioUnavailable(SiteError::from(e).to_string()))?;
            self.ctx = Some(ctx);
        }
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.ctx.as_ref().map(|c| c.current_time()).unwrap_or(0.0)
    }

    fn sample_rate(&self) -> f32 {
        self.ctx.as_ref().map(|c| c.sample_rate()).unwrap_or(44_100.0)
    }

    fn is_suspended(&self) -> bool {
        self.ctx
            .as_ref()
            .map(|c| c.state() == AudioContextState::Suspended)
            .unwrap_or(false)
    }

    fn resume(&mut self) -> Result<()> {
        // The returned promise settles whenever the browser allows playback.
        let _ = self.ctx()?.resume()?;
        Ok(())
    }

    fn play(&mut self, voice: &Voice) -> Result<()> {
        let ctx = self.ctx()?;
        let gain = ctx.create_gain()?;
        apply(&gain.gain(), &voice.gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;

        match &voice.source {
            Source::Oscillator {
                waveform,
                frequency,
            } => {
                let osc = ctx.create_oscillator()?;
                osc.set_type(oscillator_type(*waveform));
                apply(&osc.frequency(), frequency)?;
                osc.connect_with_audio_node(&gain)?;
                run_source(&osc, voice.start, voice.stop)?;
            }
            Source::Noise {
                samples,
                highpass_hz,
            } => {
                if samples.is_empty() {
                    return Ok(());
                }
                let buffer = ctx.create_buffer(1, samples.len() as u32, ctx.sample_rate())?;
                let mut data = samples.clone();
                buffer.copy_to_channel(&mut data[..], 0)?;

                let noise = ctx.create_buffer_source()?;
                noise.set_buffer(Some(&buffer));
                let filter = ctx.create_biquad_filter()?;
                filter.set_type(BiquadFilterType::Highpass);
                filter.frequency().set_value(*highpass_hz);

                noise.connect_with_audio_node(&filter)?;
                filter.connect_with_audio_node(&gain)?;
                run_source(&noise, voice.start, voice.stop)?;
            }
        }
        Ok(())
    }
}

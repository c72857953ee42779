//! Fixed sound recipes.
//!
//! Each function returns the [`Voice`] plan for one sound starting at `now`
//! (audio-clock seconds).

use super::{Automation, Source, Voice, Waveform};
use crate::rng::RandomSource;

/// Exponential envelopes decay to this instead of zero.
pub const ENVELOPE_FLOOR: f32 = 0.01;

pub const SNARE_SECONDS: f64 = 0.2;

const KICK_SECONDS: f64 = 0.5;
const BASS_DROP_SECONDS: f64 = 2.0;

/// Plain oscillator with an exponential decay from `volume` to the floor.
///
/// Returns `None` for a non-positive volume or duration: an exponential ramp
/// cannot start at zero.
pub fn tone_voice(
    now: f64,
    frequency: f32,
    waveform: Waveform,
    duration: f64,
    volume: f32,
) -> Option<Voice> {
    if volume.is_nan() || volume <= 0.0 || duration <= 0.0 {
        return None;
    }
    let end = now + duration;
    Some(Voice {
        source: Source::Oscillator {
            waveform,
            frequency: Automation::at(now, frequency),
        },
        gain: Automation::at(now, volume).exponential_to(ENVELOPE_FLOOR, end),
        start: now,
        stop: Some(end),
    })
}

/// Sine body sweeping 150 Hz to nearly nothing.
pub fn kick_voice(now: f64) -> Voice {
    let end = now + KICK_SECONDS;
    Voice {
        source: Source::Oscillator {
            waveform: Waveform::Sine,
            frequency: Automation::at(now, 150.0).exponential_to(0.01, end),
        },
        gain: Automation::at(now, 1.0).exponential_to(ENVELOPE_FLOOR, end),
        start: now,
        stop: Some(end),
    }
}

/// White noise burst through a 1 kHz high-pass.
pub fn snare_voice(now: f64, sample_rate: f32, rng: &mut dyn RandomSource) -> Voice {
    let len = (sample_rate as f64 * SNARE_SECONDS) as usize;
    let samples = (0..len)
        .map(|_| (rng.next_f64() * 2.0 - 1.0) as f32)
        .collect();
    Voice {
        source: Source::Noise {
            samples,
            highpass_hz: 1000.0,
        },
        gain: Automation::at(now, 1.0).exponential_to(ENVELOPE_FLOOR, now + SNARE_SECONDS),
        start: now,
        stop: None,
    }
}

/// Slow linear slide 100 Hz → 30 Hz with a linear fade to silence.
pub fn bass_drop_voice(now: f64) -> Voice {
    let end = now + BASS_DROP_SECONDS;
    Voice {
        source: Source::Oscillator {
            waveform: Waveform::Sine,
            frequency: Automation::at(now, 100.0).linear_to(30.0, end),
        },
        gain: Automation::at(now, 1.0).linear_to(0.0, end),
        start: now,
        stop: Some(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRandom;

    #[test]
    fn test_tone_envelope_starts_at_volume_and_hits_floor() {
        for &(d, v) in &[(0.05, 0.1f32), (0.5, 0.2), (0.1, 1.0), (2.0, 0.3)] {
            let voice = tone_voice(10.0, 440.0, Waveform::Square, d, v).unwrap();
            assert_eq!(voice.gain.value_at(10.0), v);
            assert!((voice.gain.value_at(10.0 + d) - ENVELOPE_FLOOR).abs() < 1e-6);
            assert_eq!(voice.stop, Some(10.0 + d));
        }
    }

    #[test]
    fn test_tone_envelope_decays_exponentially() {
        let voice = tone_voice(0.0, 800.0, Waveform::Sawtooth, 1.0, 0.5).unwrap();
        // Equal time steps shrink the gain by equal ratios.
        let r1 = voice.gain.value_at(0.25) / voice.gain.value_at(0.0);
        let r2 = voice.gain.value_at(0.5) / voice.gain.value_at(0.25);
        let r3 = voice.gain.value_at(1.0) / voice.gain.value_at(0.75);
        assert!((r1 - r2).abs() < 1e-4);
        assert!((r2 - r3).abs() < 1e-4);
        assert!(r1 < 1.0);
    }

    #[test]
    fn test_tone_volume_is_passed_through() {
        // Gain above unity is legal Web Audio.
        let loud = tone_voice(0.0, 440.0, Waveform::Sine, 0.5, 2.0).unwrap();
        assert_eq!(loud.gain.value_at(0.0), 2.0);
        assert!((loud.gain.value_at(0.5) - ENVELOPE_FLOOR).abs() < 1e-6);

        // Below the floor the ramp rises to it instead.
        let quiet = tone_voice(0.0, 440.0, Waveform::Sine, 0.5, 0.005).unwrap();
        assert_eq!(quiet.gain.value_at(0.0), 0.005);
        assert!((quiet.gain.value_at(0.5) - ENVELOPE_FLOOR).abs() < 1e-6);
    }

    #[test]
    fn test_tone_needs_positive_volume_and_duration() {
        assert!(tone_voice(0.0, 440.0, Waveform::Sine, 0.1, 0.0).is_none());
        assert!(tone_voice(0.0, 440.0, Waveform::Sine, 0.1, -0.3).is_none());
        assert!(tone_voice(0.0, 440.0, Waveform::Sine, 0.0, 0.5).is_none());
    }

    #[test]
    fn test_kick_sweeps_down() {
        let v = kick_voice(0.0);
        match &v.source {
            Source::Oscillator { waveform, frequency } => {
                assert_eq!(*waveform, Waveform::Sine);
                assert_eq!(frequency.value_at(0.0), 150.0);
                assert!((frequency.value_at(0.5) - 0.01).abs() < 1e-6);
                assert!(frequency.value_at(0.25) < 150.0);
            }
            other => panic!("unexpected source {other:?}"),
        }
        assert_eq!(v.stop, Some(0.5));
    }

    #[test]
    fn test_snare_noise_in_range() {
        let mut rng = SeededRandom::new(99);
        let v = snare_voice(0.0, 44_100.0, &mut rng);
        match &v.source {
            Source::Noise { samples, .. } => {
                assert_eq!(samples.len(), 8820);
                assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
                assert!(samples.iter().any(|&s| s < 0.0));
                assert!(samples.iter().any(|&s| s > 0.0));
            }
            other => panic!("unexpected source {other:?}"),
        }
        assert!(v.stop.is_none());
        assert!((v.gain.value_at(SNARE_SECONDS) - ENVELOPE_FLOOR).abs() < 1e-6);
    }

    #[test]
    fn test_bass_drop_is_linear() {
        let v = bass_drop_voice(1.0);
        match &v.source {
            Source::Oscillator { frequency, .. } => {
                assert!((frequency.value_at(2.0) - 65.0).abs() < 1e-3);
                assert_eq!(frequency.value_at(3.0), 30.0);
            }
            other => panic!("unexpected source {other:?}"),
        }
        assert!((v.gain.value_at(2.0) - 0.5).abs() < 1e-6);
        assert_eq!(v.gain.value_at(3.0), 0.0);
        assert_eq!(v.stop, Some(3.0));
    }
}

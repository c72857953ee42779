use super::{AudioBackend, Voice};
use crate::{Result, SiteError};

/// Backend that keeps every voice it is asked to play. Used off-browser.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    pub voices: Vec<Voice>,
    pub opens: usize,
    pub resumes: usize,
    pub suspended: bool,
    pub time: f64,
    pub rate: f32,
    /// Make `open` fail, as a browser without Web Audio would.
    pub fail_open: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            voices: Vec::new(),
            opens: 0,
            resumes: 0,
            suspended: false,
            time: 0.0,
            rate: 44_100.0,
            fail_open: false,
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for RecordingBackend {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(SiteError::AudioUnavailable("recording backend disabled".into()));
        }
        self.opens += 1;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn sample_rate(&self) -> f32 {
        self.rate
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<()> {
        self.resumes += 1;
        self.suspended = false;
        Ok(())
    }

    fn play(&mut self, voice: &Voice) -> Result<()> {
        self.voices.push(voice.clone());
        Ok(())
    }
}

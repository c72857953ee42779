//! Site configuration.
//!
//! Defaults reproduce the live site. With the `serde_json` feature the page can
//! pass a partial JSON object to `start_site_with_config`; omitted fields keep
//! their defaults.

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{BOOT_LINES, RAIN_GLYPHS, SECRET_CODE};

/// Pacing of the boot overlay, in milliseconds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BootTiming {
    /// Random gap between consecutive lines is drawn from `[step_min_ms, step_max_ms)`.
    pub step_min_ms: f64,
    pub step_max_ms: f64,
    /// Pause after the last line before the fade starts.
    pub settle_ms: f64,
    pub fade_ms: f64,
}

impl Default for BootTiming {
    fn default() -> Self {
        Self {
            step_min_ms: 100.0,
            step_max_ms: 400.0,
            settle_ms: 500.0,
            fade_ms: 500.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RainConfig {
    pub glyph_size: u32,
    pub period_ms: u32,
    pub glyphs: String,
    /// Probability a glyph is painted red instead of green.
    pub red_chance: f64,
    /// Probability a column past the bottom restarts at the top.
    pub reset_chance: f64,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            glyph_size: 14,
            period_ms: 50,
            glyphs: RAIN_GLYPHS.to_string(),
            red_chance: 0.02,
            reset_chance: 0.025,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SiteConfig {
    pub boot_lines: Vec<String>,
    pub boot: BootTiming,
    pub rain: RainConfig,
    pub chat_delay_min_ms: f64,
    pub chat_delay_max_ms: f64,
    pub secret_code: Vec<String>,
    pub pad_flash_ms: u32,
    pub invert_ms: u32,
    /// Viewports at or below this width get a full-width sidebar.
    pub mobile_breakpoint: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            boot_lines: BOOT_LINES.iter().map(|l| l.to_string()).collect(),
            boot: BootTiming::default(),
            rain: RainConfig::default(),
            chat_delay_min_ms: 500.0,
            chat_delay_max_ms: 1500.0,
            secret_code: SECRET_CODE.iter().map(|k| k.to_string()).collect(),
            pad_flash_ms: 100,
            invert_ms: 200,
            mobile_breakpoint: 768.0,
        }
    }
}

impl SiteConfig {
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let cfg: SiteConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make a component misbehave rather than just look odd.
    pub fn validate(&self) -> crate::Result<()> {
        use crate::SiteError::Config;
        if self.boot.step_min_ms < 0.0 || self.boot.step_max_ms < self.boot.step_min_ms {
            return Err(Config("boot step range is empty or negative".into()));
        }
        if self.rain.glyph_size == 0 {
            return Err(Config("rain glyph_size must be positive".into()));
        }
        if self.rain.period_ms == 0 {
            return Err(Config("rain period_ms must be positive".into()));
        }
        if self.rain.glyphs.is_empty() {
            return Err(Config("rain glyph set is empty".into()));
        }
        if self.chat_delay_max_ms < self.chat_delay_min_ms {
            return Err(Config("chat delay range is inverted".into()));
        }
        if self.secret_code.is_empty() {
            return Err(Config("secret code is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site() {
        let cfg = SiteConfig::default();
        assert_eq!(cfg.boot_lines.len(), 7);
        assert_eq!(cfg.secret_code.len(), 10);
        assert_eq!(cfg.rain.glyph_size, 14);
        assert_eq!(cfg.rain.period_ms, 50);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_glyph() {
        let mut cfg = SiteConfig::default();
        cfg.rain.glyph_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_chat_delay() {
        let cfg = SiteConfig {
            chat_delay_min_ms: 900.0,
            chat_delay_max_ms: 100.0,
            ..SiteConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = SiteConfig::from_json(r#"{"pad_flash_ms": 250, "rain": {"glyph_size": 20}}"#)
            .unwrap();
        assert_eq!(cfg.pad_flash_ms, 250);
        assert_eq!(cfg.rain.glyph_size, 20);
        assert_eq!(cfg.rain.period_ms, 50);
        assert_eq!(cfg.boot_lines.len(), 7);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_json_validation_error() {
        let err = SiteConfig::from_json(r#"{"secret_code": []}"#).unwrap_err();
        assert!(matches!(err, crate::SiteError::Config(_)));
    }
}

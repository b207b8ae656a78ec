//! Environment-driven runtime configuration.

use std::time::Duration;

use fourcut_capture::{CaptureError, SequenceSettings, VideoConstraints};
use fourcut_compose::FrameStyle;
use fourcut_core::CAPTURE_COUNT;
use thiserror::Error;

/// Countdown steps per shot.
pub const ENV_COUNTDOWN_STEPS: &str = "FOURCUT_COUNTDOWN_STEPS";
/// Countdown tick length in milliseconds.
pub const ENV_TICK_MS: &str = "FOURCUT_TICK_MS";
/// Pause between shots in milliseconds.
pub const ENV_SHOT_DELAY_MS: &str = "FOURCUT_SHOT_DELAY_MS";
/// Requested stream width.
pub const ENV_VIDEO_WIDTH: &str = "FOURCUT_VIDEO_WIDTH";
/// Requested stream height.
pub const ENV_VIDEO_HEIGHT: &str = "FOURCUT_VIDEO_HEIGHT";
/// Initial frame style name.
pub const ENV_FRAME_STYLE: &str = "FOURCUT_FRAME_STYLE";
/// Camera kill switch.
pub const ENV_CAMERA_ENABLED: &str = "FOURCUT_CAMERA_ENABLED";

/// Photo booth runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothConfig {
    /// Countdown and shot timing.
    pub sequence: SequenceSettings,
    /// Resolution hint sent with every stream request.
    pub video: VideoConstraints,
    /// Style applied to fresh composites.
    pub frame_style: FrameStyle,
    /// When `false`, capture requests fail as if the camera were denied.
    pub camera_enabled: bool,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            sequence: SequenceSettings::default(),
            video: VideoConstraints::default(),
            frame_style: FrameStyle::default(),
            camera_enabled: true,
        }
    }
}

impl BoothConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// See [`BoothConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidNumber`] for malformed numbers and
    /// [`ConfigError::Sequence`] when the resulting timing is degenerate.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let steps = parse_or(&lookup, ENV_COUNTDOWN_STEPS, defaults.sequence.countdown_steps)?;
        let tick_ms = parse_or(&lookup, ENV_TICK_MS, millis(defaults.sequence.tick))?;
        let delay_ms = parse_or(
            &lookup,
            ENV_SHOT_DELAY_MS,
            millis(defaults.sequence.inter_shot_delay),
        )?;
        let sequence = SequenceSettings::new(
            CAPTURE_COUNT,
            steps,
            Duration::from_millis(tick_ms),
            Duration::from_millis(delay_ms),
        )
        .map_err(ConfigError::Sequence)?;

        let video = VideoConstraints {
            ideal_width: parse_or(&lookup, ENV_VIDEO_WIDTH, defaults.video.ideal_width)?,
            ideal_height: parse_or(&lookup, ENV_VIDEO_HEIGHT, defaults.video.ideal_height)?,
            audio: false,
        };

        let frame_style = lookup(ENV_FRAME_STYLE)
            .map(|name| FrameStyle::from_name(&name))
            .unwrap_or(defaults.frame_style);

        Ok(Self {
            sequence,
            video,
            frame_style,
            camera_enabled: camera_enabled(lookup(ENV_CAMERA_ENABLED).as_deref()),
        })
    }
}

/// Interprets the camera kill switch.
///
/// - Unset => enabled.
/// - `0`, `false`, `off` (case-insensitive) => disabled.
/// - Any other value => enabled.
pub fn camera_enabled(value: Option<&str>) -> bool {
    match value {
        Some(raw) => {
            let normalized = raw.trim().to_ascii_lowercase();
            !matches!(normalized.as_str(), "0" | "false" | "off")
        }
        None => true,
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            variable: name,
            value: raw,
        }),
        None => Ok(default),
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable did not parse.
    #[error("{variable} must be a non-negative integer, got {value:?}")]
    InvalidNumber {
        /// Variable name.
        variable: &'static str,
        /// Raw value.
        value: String,
    },
    /// Timing values were rejected.
    #[error("invalid capture timing: {0}")]
    Sequence(CaptureError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_switch_values() {
        assert!(camera_enabled(None));
        assert!(camera_enabled(Some("yes")));
        assert!(!camera_enabled(Some(" OFF ")));
        assert!(!camera_enabled(Some("0")));
        assert!(!camera_enabled(Some("False")));
    }
}

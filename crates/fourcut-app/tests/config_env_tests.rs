//! Integration tests for environment-driven configuration.

use std::collections::HashMap;
use std::time::Duration;

use fourcut_app::{BoothConfig, ConfigError};
use fourcut_compose::FrameStyle;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn config_env_defaults_match_booth_timing() {
    let config = BoothConfig::from_lookup(lookup(&[])).expect("defaults are valid");
    assert_eq!(config, BoothConfig::default());
    assert_eq!(config.sequence.countdown_steps, 3);
    assert_eq!(config.sequence.tick, Duration::from_secs(1));
    assert_eq!(config.video.ideal_width, 1280);
    assert!(config.camera_enabled);
}

#[test]
fn config_env_overrides_are_applied() {
    let config = BoothConfig::from_lookup(lookup(&[
        ("FOURCUT_COUNTDOWN_STEPS", "5"),
        ("FOURCUT_TICK_MS", "250"),
        ("FOURCUT_SHOT_DELAY_MS", "0"),
        ("FOURCUT_VIDEO_WIDTH", "640"),
        ("FOURCUT_VIDEO_HEIGHT", "480"),
        ("FOURCUT_FRAME_STYLE", "Black"),
        ("FOURCUT_CAMERA_ENABLED", "off"),
    ]))
    .expect("overrides are valid");

    assert_eq!(config.sequence.countdown_steps, 5);
    assert_eq!(config.sequence.tick, Duration::from_millis(250));
    assert_eq!(config.sequence.inter_shot_delay, Duration::ZERO);
    assert_eq!((config.video.ideal_width, config.video.ideal_height), (640, 480));
    assert_eq!(config.frame_style, FrameStyle::Black);
    assert!(!config.camera_enabled);
}

#[test]
fn config_env_unknown_style_falls_back() {
    let config = BoothConfig::from_lookup(lookup(&[("FOURCUT_FRAME_STYLE", "neon")]))
        .expect("style never fails");
    assert_eq!(config.frame_style, FrameStyle::White);
}

#[test]
fn config_env_rejects_malformed_and_degenerate_values() {
    let malformed = BoothConfig::from_lookup(lookup(&[("FOURCUT_TICK_MS", "fast")]));
    assert!(matches!(
        malformed,
        Err(ConfigError::InvalidNumber {
            variable: "FOURCUT_TICK_MS",
            ..
        })
    ));

    let degenerate = BoothConfig::from_lookup(lookup(&[("FOURCUT_COUNTDOWN_STEPS", "0")]));
    assert!(matches!(degenerate, Err(ConfigError::Sequence(_))));
}

//! Profile snapshots and configuration through serde_json

use morse_core::test_utils::KeyingScript;
use morse_core::*;

use crate::run_session;

fn small_lesson() -> EngineConfig {
    EngineConfig {
        lesson: LessonConfig {
            window_size: 5,
            ..LessonConfig::default()
        },
        ..default_config()
    }
}

#[test]
fn session_resumes_from_saved_profile() {
    let mut session = TrainingSession::new(small_lesson()).unwrap();
    session.extend_target("KMKMKMK");
    let mut script = KeyingScript::new(70, 0);
    script.text("KMKMKMK").flush();
    run_session(&mut session, script.events());

    // Five correct advanced the lesson, two more sit in the window
    assert_eq!(session.koch().active_count(), 3);
    assert_eq!(session.koch().window_len(), 2);

    let json = serde_json::to_string(&session.snapshot()).unwrap();
    let saved: ProfileSnapshot = serde_json::from_str(&json).unwrap();

    let mut resumed = TrainingSession::new(small_lesson()).unwrap();
    resumed.restore(&saved).unwrap();
    assert_eq!(resumed.unit_ms(), session.unit_ms());
    assert_eq!(resumed.koch().active_characters(), &['K', 'M', 'R']);
    assert_eq!(resumed.koch().window().collect::<Vec<_>>(), vec![true, true]);
}

#[test]
fn snapshot_json_shape() {
    let snapshot = ProfileSnapshot {
        unit_ms: 80.0,
        lesson_active_count: 4,
        accuracy_window: heapless::Vec::from_slice(&[true, false]).unwrap(),
    };
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "unit_ms": 80.0,
            "lesson_active_count": 4,
            "accuracy_window": [true, false]
        })
    );
}

#[test]
fn corrupt_profile_is_rejected() {
    let mut session = TrainingSession::new(small_lesson()).unwrap();
    let saved: ProfileSnapshot =
        serde_json::from_str(r#"{"unit_ms": 60.0, "lesson_active_count": 99, "accuracy_window": []}"#).unwrap();
    assert!(matches!(session.restore(&saved), Err(MorseError::InvalidConfig(_))));
    assert_eq!(session.koch().active_count(), KOCH_MIN_ACTIVE);

    // Window longer than the configured size
    let saved: ProfileSnapshot = serde_json::from_str(
        r#"{"unit_ms": 60.0, "lesson_active_count": 2, "accuracy_window": [true, true, true, true, true, true]}"#,
    )
    .unwrap();
    assert!(session.restore(&saved).is_err());
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let config: EngineConfig = serde_json::from_str(r#"{"timing": {"initial_unit_ms": 80.0}}"#).unwrap();
    assert_eq!(config.timing.initial_wpm(), 15.0);
    assert_eq!(config.timing.smoothing, 0.25);
    assert_eq!(config.decoder, DecoderConfig::default());
    assert_eq!(config.lesson.window_size, 50);
    assert!(config.validate().is_ok());

    let session = TrainingSession::new(config).unwrap();
    assert_eq!(session.wpm(), 15.0);
}

#[test]
fn invalid_config_is_refused() {
    let config: EngineConfig = serde_json::from_str(r#"{"lesson": {"window_size": 500}}"#).unwrap();
    assert!(matches!(TrainingSession::new(config), Err(MorseError::InvalidConfig(_))));
}

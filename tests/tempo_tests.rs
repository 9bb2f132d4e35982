mod common;

use bpmsyncrs::config::EngineConfig;
use bpmsyncrs::tempo::{
    instantaneous_bpm, BpmEngine, BpmSample, FixedTimebase, MicrosecondTimebase, MovingAverager,
    RegressionEstimator, TimebaseRatio, DEFAULT_CALIBRATION_OFFSET,
};
use common::{inline_notifier, pulse_times, RecordingObserver};
use std::sync::Arc;
use std::time::Duration;

const BPM_TOLERANCE: f64 = 0.5;

fn engine_with(config: EngineConfig) -> (BpmEngine, Arc<RecordingObserver>) {
    common::init_logging();
    let (notifier, recorder) = inline_notifier();
    let engine = BpmEngine::new(&config, Arc::new(MicrosecondTimebase), notifier).unwrap();
    (engine, recorder)
}

fn feed(engine: &BpmEngine, pulses: &[u64]) {
    for &pulse in pulses {
        engine.record_pulse(pulse);
    }
}

#[test]
fn test_instantaneous_formula_matches_closed_form() {
    for interval in [5_000.0, 10_417.0, 20_833.0, 41_667.0, 250_000.0] {
        let bpm = instantaneous_bpm(interval, DEFAULT_CALIBRATION_OFFSET).unwrap();
        let expected = 60_000_000.0 / (interval * 24.0) + DEFAULT_CALIBRATION_OFFSET;
        assert!(
            (bpm - expected).abs() < 1e-9,
            "interval {}: got {}, expected {}",
            interval,
            bpm,
            expected
        );
    }
}

#[test]
fn test_fixed_interval_reports_formula_value() {
    let (engine, _) = engine_with(EngineConfig::default());
    engine.record_pulse(1_000_000);
    let reading = engine.record_pulse(1_020_833).unwrap();

    let expected = 60_000_000.0 / (20_833.0 * 24.0) + DEFAULT_CALIBRATION_OFFSET;
    assert!((reading.bpm - expected).abs() < 1e-9);
    assert_eq!(reading.formatted, format!("{:.2}", expected));
}

#[test]
fn test_equal_or_decreasing_timestamps_produce_nothing() {
    let (engine, recorder) = engine_with(EngineConfig::default());

    assert_eq!(engine.record_pulse(50_000), None);
    assert_eq!(engine.record_pulse(50_000), None);
    assert_eq!(engine.record_pulse(40_000), None);

    assert_eq!(engine.current_bpm(), None);
    assert_eq!(engine.last_formatted(), None);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_regression_needs_two_samples() {
    let mut estimator = RegressionEstimator::new(24, None);
    estimator.push(BpmSample::new(1_000.0, 120.0));
    assert_eq!(estimator.fit(), None);
    assert_eq!(estimator.estimate(0.8), None);
}

#[test]
fn test_regression_reproduces_collinear_samples() {
    let mut estimator = RegressionEstimator::new(24, None);
    let line = |t: f64| 100.0 + 0.002 * t;
    for i in 0..10 {
        let t = 5_000_000.0 + i as f64 * 20_833.0;
        estimator.push(BpmSample::new(t, line(t)));
    }

    for ratio in [0.0, 0.25, 0.5, 0.8, 1.0] {
        let t = estimator.time_at(ratio).unwrap();
        let estimate = estimator.estimate(ratio).unwrap();
        assert!(
            (estimate - line(t)).abs() < 1e-6,
            "ratio {}: got {}, expected {}",
            ratio,
            estimate,
            line(t)
        );
    }
}

#[test]
fn test_moving_average_evicts_oldest() {
    let mut averager = MovingAverager::new(3).unwrap();
    for value in [100.0, 110.0, 120.0, 130.0] {
        averager.record(value);
    }
    assert_eq!(averager.len(), 3);
    assert!((averager.average().unwrap() - 120.0).abs() < 1e-9);
}

#[test]
fn test_steady_clock_notifies_once() {
    let (engine, recorder) = engine_with(EngineConfig::default());
    let pulses: Vec<u64> = (0..100).map(|i| 2_000_000 + i * 20_833).collect();
    feed(&engine, &pulses);

    let updates = recorder.bpm_updates();
    assert_eq!(updates.len(), 1, "updates: {:?}", updates);
    assert_eq!(updates[0], "120.06");
}

#[test]
fn test_converges_to_120_bpm() {
    let (engine, recorder) = engine_with(EngineConfig::default());
    feed(&engine, &pulse_times(0, 120.0, 24 * 8));

    let bpm = engine.current_bpm().unwrap();
    assert!(
        (bpm - 120.0).abs() < BPM_TOLERANCE,
        "Expected ~120 BPM, got {}",
        bpm
    );

    let last: f64 = recorder.bpm_updates().last().unwrap().parse().unwrap();
    assert!((last - 120.0).abs() < BPM_TOLERANCE);
}

#[test]
fn test_tempo_change_is_followed() {
    let (engine, _) = engine_with(EngineConfig::default());
    let mut pulses = pulse_times(0, 120.0, 48);
    let start = *pulses.last().unwrap();
    pulses.extend(pulse_times(start, 140.0, 200).into_iter().skip(1));
    feed(&engine, &pulses);

    let bpm = engine.current_bpm().unwrap();
    assert!(
        (bpm - 140.0).abs() < BPM_TOLERANCE,
        "Expected ~140 BPM, got {}",
        bpm
    );
}

#[test]
fn test_smoothing_stage_keeps_convergence() {
    let config = EngineConfig {
        smooth_raw_bpm: true,
        smoothing_factor: 0.3,
        ..EngineConfig::default()
    };
    let (engine, _) = engine_with(config);
    feed(&engine, &pulse_times(0, 96.0, 24 * 8));

    let bpm = engine.current_bpm().unwrap();
    assert!((bpm - 96.0).abs() < BPM_TOLERANCE, "got {}", bpm);
}

#[test]
fn test_jitter_is_suppressed() {
    let (engine, _) = engine_with(EngineConfig::default());
    // +-300us of alternating jitter around 120 BPM
    let pulses: Vec<u64> = pulse_times(1_000_000, 120.0, 24 * 10)
        .into_iter()
        .enumerate()
        .map(|(i, t)| if i % 2 == 0 { t + 300 } else { t - 300 })
        .collect();
    feed(&engine, &pulses);

    let bpm = engine.current_bpm().unwrap();
    assert!((bpm - 120.0).abs() < BPM_TOLERANCE, "got {}", bpm);
}

#[test]
fn test_gap_longer_than_timeout_is_not_a_tempo() {
    let (engine, recorder) = engine_with(EngineConfig::default());
    let mut pulses = pulse_times(0, 120.0, 96);
    let resume = pulses.last().unwrap() + 3_000_000;
    pulses.extend(pulse_times(resume, 120.0, 96));
    feed(&engine, &pulses);

    for formatted in recorder.bpm_updates() {
        let value: f64 = formatted.parse().unwrap();
        assert!((value - 120.0).abs() < BPM_TOLERANCE, "got {}", value);
    }
}

#[test]
fn test_uncalibrated_timebase_skips_samples() {
    common::init_logging();
    let (notifier, recorder) = inline_notifier();
    let engine = BpmEngine::new(
        &EngineConfig::default(),
        Arc::new(FixedTimebase(TimebaseRatio::UNAVAILABLE)),
        notifier,
    )
    .unwrap();

    for pulse in pulse_times(0, 120.0, 48) {
        assert_eq!(engine.record_pulse(pulse), None);
    }
    assert_eq!(engine.current_bpm(), None);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_transport_start_keeps_newest_pulse() {
    let (engine, _) = engine_with(EngineConfig {
        event_window: 4,
        ..EngineConfig::default()
    });
    engine.record_pulse(100);
    engine.record_pulse(100);
    assert_eq!(engine.pending_pulses(), 2);

    engine.on_transport_start();
    assert_eq!(engine.pending_pulses(), 1);

    engine.on_transport_stop();
    assert_eq!(engine.pending_pulses(), 0);
}

fn converged_after_restart(restart_at: u64) -> f64 {
    let (engine, _) = engine_with(EngineConfig::default());
    feed(&engine, &pulse_times(0, 90.0, 100));
    engine.on_transport_stop();
    engine.on_transport_start();
    feed(&engine, &pulse_times(restart_at, 120.0, 300));
    engine.current_bpm().unwrap()
}

#[test]
fn test_stop_start_matches_cold_start() {
    let (cold, _) = engine_with(EngineConfig::default());
    feed(&cold, &pulse_times(10_000_000, 120.0, 300));
    let cold_bpm = cold.current_bpm().unwrap();

    let restarted_bpm = converged_after_restart(10_000_000);
    assert!((cold_bpm - restarted_bpm).abs() < 1e-6);
}

#[test]
fn test_stop_start_with_rewound_timestamps_matches_cold_start() {
    let (cold, _) = engine_with(EngineConfig::default());
    feed(&cold, &pulse_times(0, 120.0, 300));
    let cold_bpm = cold.current_bpm().unwrap();

    // The new stream starts before the old one ended
    let restarted_bpm = converged_after_restart(0);
    assert!((cold_bpm - restarted_bpm).abs() < 1e-6);
}

#[test]
fn test_first_readings_after_restart_match_cold_start() {
    let fresh_stream = pulse_times(10_000_000, 120.0, 60);

    let (cold, cold_recorder) = engine_with(EngineConfig::default());
    feed(&cold, &fresh_stream);
    let cold_updates = cold_recorder.bpm_updates();

    let (restarted, recorder) = engine_with(EngineConfig::default());
    feed(&restarted, &pulse_times(0, 90.0, 100));
    restarted.on_transport_stop();
    assert_eq!(restarted.current_bpm(), None);
    restarted.on_transport_start();

    let before = recorder.bpm_updates().len();
    feed(&restarted, &fresh_stream);
    let restarted_updates = recorder.bpm_updates().split_off(before);

    assert!(!cold_updates.is_empty());
    assert_eq!(restarted_updates, cold_updates);
    assert_eq!(restarted.current_bpm(), cold.current_bpm());
}

#[test]
fn test_restart_with_smoothing_matches_cold_start() {
    let config = EngineConfig {
        smooth_raw_bpm: true,
        ..EngineConfig::default()
    };
    let fresh_stream = pulse_times(0, 120.0, 48);

    let (cold, cold_recorder) = engine_with(config.clone());
    feed(&cold, &fresh_stream);

    let (restarted, recorder) = engine_with(config);
    feed(&restarted, &pulse_times(0, 90.0, 100));
    restarted.on_transport_stop();
    restarted.on_transport_start();
    let before = recorder.bpm_updates().len();
    feed(&restarted, &fresh_stream);

    assert_eq!(
        recorder.bpm_updates().split_off(before),
        cold_recorder.bpm_updates()
    );
}

#[test]
fn test_regression_span_limits_window() {
    let config = EngineConfig {
        regression_span: Some(Duration::from_millis(100)),
        ..EngineConfig::default()
    };
    let (engine, _) = engine_with(config);
    feed(&engine, &pulse_times(0, 120.0, 24 * 4));
    let bpm = engine.current_bpm().unwrap();
    assert!((bpm - 120.0).abs() < BPM_TOLERANCE);
}

#[test]
fn test_invalid_config_rejected_by_engine() {
    let (notifier, _) = inline_notifier();
    let config = EngineConfig {
        history_capacity: 0,
        ..EngineConfig::default()
    };
    assert!(BpmEngine::new(&config, Arc::new(MicrosecondTimebase), notifier).is_err());
}

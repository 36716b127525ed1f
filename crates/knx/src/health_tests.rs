// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

use super::*;

#[yare::parameterized(
    running  = { 'R' },
    sleeping = { 'S' },
    idle     = { 'I' },
)]
fn healthy_states_pass_and_reset_streak(state: char) {
    let (streak, verdict) = evaluate_process_state(state, 2);
    assert_eq!(streak, 0);
    assert!(verdict.is_ok());
}

#[yare::parameterized(
    stopped = { 'T' },
    traced  = { 't' },
    zombie  = { 'Z' },
    dead    = { 'X' },
    dead_lc = { 'x' },
)]
fn terminal_states_fail_recoverably(state: char) {
    let (_, verdict) = evaluate_process_state(state, 0);
    let err = verdict.unwrap_err();
    assert_eq!(err.layer, LAYER_PROCESS_STATE);
    assert!(err.recoverable);
}

#[test]
fn disk_sleep_tolerated_below_streak_limit() {
    let (streak, verdict) = evaluate_process_state('D', 0);
    assert_eq!(streak, 1);
    assert!(verdict.is_ok());

    let (streak, verdict) = evaluate_process_state('D', 1);
    assert_eq!(streak, 2);
    assert!(verdict.is_ok());
}

#[test]
fn disk_sleep_fails_at_streak_limit() {
    let (streak, verdict) = evaluate_process_state('D', 2);
    assert_eq!(streak, 3);
    let err = verdict.unwrap_err();
    assert_eq!(err.layer, LAYER_PROCESS_STATE);
    assert!(err.recoverable);
    assert!(err.message.contains("uninterruptible"));
}

#[test]
fn healthy_observation_interrupts_disk_sleep_streak() {
    let (streak, _) = evaluate_process_state('D', 1);
    assert_eq!(streak, 2);
    let (streak, _) = evaluate_process_state('S', streak);
    assert_eq!(streak, 0);
    let (streak, verdict) = evaluate_process_state('D', streak);
    assert_eq!(streak, 1);
    assert!(verdict.is_ok());
}

#[test]
fn health_error_display_includes_layer_and_recoverability() {
    let err = HealthError::fatal(LAYER_USB_PRESENCE, "usb interface 0e77:0104 not enumerated");
    let text = err.to_string();
    assert!(text.contains("layer 0"), "got: {text}");
    assert!(text.contains("recoverable: false"), "got: {text}");
}

#[tokio::test]
async fn usb_probe_fails_for_absent_interface() {
    // ffff:ffff is a reserved pair no host enumerates; the probe must fail
    // whether or not lsusb itself is installed
    let err = check_usb_presence("ffff", "ffff").await.unwrap_err();
    assert_eq!(err.layer, LAYER_USB_PRESENCE);
    assert!(!err.recoverable);
}

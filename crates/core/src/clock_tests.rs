// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_both_instant_and_utc() {
    let clock = FakeClock::new();
    let before_instant = clock.now();
    let before_utc = clock.utc_now();

    clock.advance(std::time::Duration::from_secs(5));

    assert!(clock.now() > before_instant);
    assert!(clock.utc_now() > before_utc);
}

#[test]
fn system_clock_moves_forward() {
    let clock = SystemClock;
    let a = clock.utc_now();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = clock.utc_now();
    assert!(b >= a);
}

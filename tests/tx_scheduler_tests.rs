//! Pulse scheduler tests
//!
//! Drive `NecTransmitter` against the simulated timer, calling the
//! compare-match handler where the hardware interrupt would fire.

use rust_nec_tx::context::TxPhase;
use rust_nec_tx::scheduler::NecTransmitter;
use rust_nec_tx::sim::SimTimer;
use rust_nec_tx::timing::{
    Shape, TimerClock, BIT_ONE, BIT_ZERO, LEADER, REPEAT_GAP, REPEAT_PULSE, TRAILER,
};
use rust_nec_tx::NecError;

// 1MHz source with AVR-style prescalers: 8µs ticks
fn make_tx() -> NecTransmitter<SimTimer> {
    let clock = TimerClock::derive(1_000_000, &[1, 8, 64]).unwrap();
    let tx = NecTransmitter::new(SimTimer::new(), clock);
    tx.prime();
    tx
}

fn ticks(tx: &NecTransmitter<SimTimer>, shape: Shape) -> (u16, u16) {
    tx.clock().shape_ticks(shape)
}

/// Run one interrupt step, return what it programmed.
fn step(tx: &NecTransmitter<SimTimer>) -> (u16, u16) {
    tx.on_compare_match();
    tx.timer().next_cycle()
}

#[test]
fn test_initial_state() {
    let tx = make_tx();
    assert!(!tx.is_busy());
    assert!(tx.status().is_idle());
    assert_eq!(tx.phase(), TxPhase::Idle);
    assert_eq!(tx.timer().next_cycle(), ticks(&tx, LEADER));
}

#[test]
fn test_start_arms_timer() {
    let tx = make_tx();
    assert_eq!(tx.start(0x1234_5678, false), Ok(()));
    assert!(tx.is_busy());
    assert_eq!(tx.status().remaining_bits(), 33);
    assert!(!tx.status().repeat_enabled());
    assert!(!tx.status().repeat_phase());
    assert_eq!(tx.pending_code(), 0x1234_5678);
    assert_eq!(tx.timer().starts(), 1);
}

#[test]
fn test_start_while_busy_is_rejected() {
    let tx = make_tx();
    tx.start(0xAAAA_AAAA, true).unwrap();
    step(&tx);
    step(&tx);

    let status = tx.status();
    let code = tx.pending_code();

    assert_eq!(tx.start(0x5555_5555, false), Err(NecError::Busy));
    assert_eq!(tx.status(), status);
    assert_eq!(tx.pending_code(), code);
    assert_eq!(tx.timer().starts(), 1);
}

#[test]
fn test_frame_takes_33_steps() {
    let tx = make_tx();
    tx.start(0, false).unwrap();

    for i in 0..32 {
        assert_eq!(step(&tx), ticks(&tx, BIT_ZERO), "bit step {}", i);
        assert!(!tx.status().is_idle());
    }

    // 33rd step emits the trailer and leaves the status idle
    assert_eq!(step(&tx), ticks(&tx, TRAILER));
    assert!(tx.status().is_idle());
    assert!(tx.is_busy(), "trailer still on the wire");

    // Next compare halts and primes the leader
    assert_eq!(step(&tx), ticks(&tx, LEADER));
    assert!(!tx.is_busy());
    assert_eq!(tx.timer().halts(), 1);
}

#[test]
fn test_bits_leave_lsb_first() {
    let tx = make_tx();
    let code = 0xEF10_CB34u32;
    tx.start(code, false).unwrap();

    for bit in 0..32 {
        let expected = if (code >> bit) & 1 == 1 { BIT_ONE } else { BIT_ZERO };
        assert_eq!(step(&tx), ticks(&tx, expected), "bit {}", bit);
    }
}

#[test]
fn test_repeat_alternates_until_abort() {
    let tx = make_tx();
    tx.start(0xFFFF_FFFF, true).unwrap();

    for _ in 0..32 {
        assert_eq!(step(&tx), ticks(&tx, BIT_ONE));
    }
    assert_eq!(step(&tx), ticks(&tx, TRAILER));
    assert_eq!(tx.phase(), TxPhase::RepeatGap);

    for _ in 0..10 {
        assert_eq!(step(&tx), ticks(&tx, REPEAT_PULSE));
        assert_eq!(tx.phase(), TxPhase::RepeatPulse);
        assert_eq!(step(&tx), ticks(&tx, REPEAT_GAP));
        assert_eq!(tx.phase(), TxPhase::RepeatGap);
        assert!(tx.is_busy());
    }

    tx.abort();
    assert!(tx.status().is_idle());
    assert!(tx.is_busy(), "abort leaves the pulse in flight");

    assert_eq!(step(&tx), ticks(&tx, LEADER));
    assert!(!tx.is_busy());
    assert_eq!(tx.timer().halts(), 1);
}

#[test]
fn test_abort_mid_frame() {
    let tx = make_tx();
    tx.start(0x1234_5678, false).unwrap();
    for _ in 0..5 {
        step(&tx);
    }

    tx.abort();
    assert_eq!(tx.phase(), TxPhase::Idle);

    // No more bits: straight to idle
    assert_eq!(step(&tx), ticks(&tx, LEADER));
    assert!(!tx.is_busy());

    // Accepts a new frame afterwards
    assert_eq!(tx.start(0x1, false), Ok(()));
    assert_eq!(step(&tx), ticks(&tx, BIT_ONE));
}

#[test]
fn test_abort_when_idle_is_noop() {
    let tx = make_tx();
    let loads = tx.timer().loads();

    tx.abort();

    assert!(tx.status().is_idle());
    assert!(!tx.is_busy());
    assert_eq!(tx.timer().loads(), loads);
    assert_eq!(tx.timer().starts(), 0);
    assert_eq!(tx.timer().halts(), 0);
    assert_eq!(tx.stats().snapshot().aborts, 0);
}

#[test]
fn test_busy_until_halt_not_until_status_idle() {
    let tx = make_tx();
    tx.start(0, false).unwrap();
    for _ in 0..33 {
        step(&tx);
    }

    // Status idle but timer still finishing the trailer
    assert!(tx.status().is_idle());
    assert_eq!(tx.start(0x42, false), Err(NecError::Busy));

    step(&tx);
    assert_eq!(tx.start(0x42, false), Ok(()));
}

#[test]
fn test_send_variants_encode() {
    let tx = make_tx();

    tx.send(0x10, 0x34, false).unwrap();
    assert_eq!(tx.pending_code(), 0xEF10_CB34);
    tx.abort();
    step(&tx);

    tx.send_extended(0x10, 0xBEEF, false).unwrap();
    assert_eq!(tx.pending_code(), 0xEF10_BEEF);
    tx.abort();
    step(&tx);

    tx.send_raw(0xDEAD_BEEF, true).unwrap();
    assert_eq!(tx.pending_code(), 0xDEAD_BEEF);
    assert!(tx.status().repeat_enabled());
}

#[test]
fn test_start_fails_when_timer_does_not_run() {
    let tx = make_tx();
    tx.timer().set_fault(true);

    assert_eq!(tx.send(0x10, 0x34, false), Err(NecError::Busy));
    assert!(!tx.is_busy());
    assert!(tx.status().is_idle());
    assert_eq!(tx.stats().snapshot().accepted, 0);
    assert_eq!(tx.stats().snapshot().rejected, 1);

    // Not stuck: works once the timer starts
    tx.timer().set_fault(false);
    assert_eq!(tx.send(0x10, 0x34, false), Ok(()));
    assert!(tx.is_busy());
}

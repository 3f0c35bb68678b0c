// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! One-shot gate with a deadline
//!
//! Callers park on [`TokenGate::wait`] until either [`TokenGate::open`] is
//! called or the deadline passes. Whichever happens first resolves the gate;
//! the other becomes a no-op, so the gate never resolves twice.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

const PENDING: u8 = 0;
const OPENED: u8 = 1;
const TIMED_OUT: u8 = 2;

/// How a gate was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// A new value was supplied before the deadline
    Opened,
    /// The deadline passed first
    TimedOut,
}

pub struct TokenGate {
    state: AtomicU8,
    notify: Notify,
    deadline: Instant,
}

impl TokenGate {
    /// Create a pending gate that resolves by itself after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            notify: Notify::new(),
            deadline: Instant::now() + timeout,
        }
    }

    /// Resolve the gate as opened; returns false when it was already resolved
    pub fn open(&self) -> bool {
        self.resolve(OPENED)
    }

    /// Resolved either way, or past its deadline
    pub fn is_resolved(&self) -> bool {
        self.state.load(Ordering::SeqCst) != PENDING || Instant::now() >= self.deadline
    }

    pub fn outcome(&self) -> Option<GateOutcome> {
        match self.state.load(Ordering::SeqCst) {
            OPENED => Some(GateOutcome::Opened),
            TIMED_OUT => Some(GateOutcome::TimedOut),
            _ => None,
        }
    }

    /// Wait until the gate is opened or the deadline passes
    pub async fn wait(&self) -> GateOutcome {
        loop {
            // Register for notification before checking state
            let notified = self.notify.notified();

            if let Some(outcome) = self.outcome() {
                return outcome;
            }

            if tokio::time::timeout_at(self.deadline, notified).await.is_err() {
                self.resolve(TIMED_OUT);
            }
        }
    }

    fn resolve(&self, outcome: u8) -> bool {
        let won = self
            .state
            .compare_exchange(PENDING, outcome, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            self.notify.notify_waiters();
        }
        won
    }
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGate")
            .field("outcome", &self.outcome())
            .field("deadline", &self.deadline)
            .finish()
    }
}

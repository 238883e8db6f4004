// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Reference model and operation generator for exercising a [`Ledger`]

use crate::{
    ledger::Ledger,
    window::{Window, MAX_WINDOW},
};
use bolero_generator::*;

/// An action the session layer can take on a receive window
#[derive(Clone, Copy, Debug, TypeGenerator)]
pub enum Operation {
    /// Grows or shrinks the window by an amount near the default window size
    Adjust {
        #[generator(-131_070..=131_070)]
        delta: i32,
    },
    /// Grows or shrinks the window by any amount
    AdjustAny { delta: i32 },
    /// Moves the window to an absolute size
    SetWindow { target: Window },
    /// The peer sent `len` bytes of payload
    Receive {
        #[generator(0..=70_000)]
        len: u32,
    },
    /// The peer sent `len` bytes of payload, with `len` being unconstrained
    ReceiveAny { len: u32 },
    /// The session layer flushes a `WINDOW_UPDATE` if one is due
    TakeWindowUpdate,
}

/// A straightforward 64-bit rendition of the receive window recurrence
///
/// Bounds are checked after the fact against the 32-bit limits rather than
/// through checked arithmetic so it can be used to cross-check [`Ledger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Model {
    pub advertised_window: i64,
    pub consumed_credit: i64,
    pub pending_shrink_debt: i64,
}

const MIN: i64 = i32::MIN as i64;
const MAX: i64 = i32::MAX as i64;

impl Model {
    pub fn new(initial_window: Window) -> Self {
        Self {
            advertised_window: initial_window.as_i32() as i64,
            consumed_credit: 0,
            pending_shrink_debt: 0,
        }
    }

    pub fn adjust(&mut self, delta: i64) -> Option<i64> {
        if delta > 0 {
            let unused = self.consumed_credit.max(0) - delta;

            if unused >= 0 {
                self.consumed_credit = unused;
                return Some(delta);
            }

            if self.advertised_window - unused > MAX_WINDOW as i64 {
                return None;
            }

            self.advertised_window -= unused;
            let resolved = self.pending_shrink_debt.min(-unused);
            self.pending_shrink_debt -= resolved;
            if self.consumed_credit < 0 {
                self.consumed_credit += resolved;
            } else {
                self.consumed_credit = resolved;
            }

            Some(delta - resolved)
        } else {
            if self.advertised_window + delta < 0
                || self.consumed_credit + delta < MIN
                || self.pending_shrink_debt - delta > MAX
            {
                return None;
            }

            self.advertised_window += delta;
            self.consumed_credit += delta;
            self.pending_shrink_debt -= delta;

            Some(0)
        }
    }

    pub fn on_data_received(&mut self, len: i64) -> Option<()> {
        let consumed_credit = self.consumed_credit + len;

        if consumed_credit > MAX || consumed_credit > self.advertised_window {
            return None;
        }

        self.consumed_credit = consumed_credit;
        Some(())
    }

    pub fn take_window_update(&mut self) -> Option<i64> {
        if self.consumed_credit <= 0 {
            return None;
        }

        // truncating division, matching the ledger
        if self.consumed_credit < self.advertised_window / 2 {
            return None;
        }

        let increment = self.consumed_credit;
        self.consumed_credit = 0;
        Some(increment)
    }

    /// Asserts the model and the ledger agree on every field
    #[track_caller]
    pub fn assert_eq(&self, ledger: &Ledger) {
        assert_eq!(
            self.advertised_window,
            ledger.advertised_window() as i64,
            "advertised_window mismatch"
        );
        assert_eq!(
            self.consumed_credit,
            ledger.consumed_credit() as i64,
            "consumed_credit mismatch"
        );
        assert_eq!(
            self.pending_shrink_debt,
            ledger.pending_shrink_debt() as i64,
            "pending_shrink_debt mismatch"
        );
    }
}

/// Applies `operation` to both the ledger and the model, asserting they agree
#[track_caller]
pub fn apply(ledger: &mut Ledger, model: &mut Model, operation: Operation) {
    let before = *ledger;

    match operation {
        Operation::Adjust { delta } | Operation::AdjustAny { delta } => {
            let actual = ledger.adjust(delta);
            let expected = model.adjust(delta as i64);
            assert_eq!(actual.ok().map(|v| v as i64), expected);
            if actual.is_err() {
                assert_eq!(*ledger, before, "failed adjustments must not mutate");
            }
        }
        Operation::SetWindow { target } => {
            let mut delta = target.as_i32() as i64 - model.advertised_window;
            if delta > 0 {
                delta += model.consumed_credit.max(0);
            }
            let actual = ledger.set_window(target);
            let expected = model.adjust(delta);
            assert_eq!(actual.ok().map(|v| v as i64), expected);
            if actual.is_ok() {
                assert_eq!(ledger.advertised_window(), target.as_i32());
            } else {
                assert_eq!(*ledger, before, "failed adjustments must not mutate");
            }
        }
        Operation::Receive { len } | Operation::ReceiveAny { len } => {
            let actual = ledger.on_data_received(len);
            let expected = model.on_data_received(len as i64);
            assert_eq!(actual.ok(), expected);
            if actual.is_err() {
                assert_eq!(*ledger, before, "rejected data must not mutate");
            }
        }
        Operation::TakeWindowUpdate => {
            let actual = ledger.take_window_update();
            let expected = model.take_window_update();
            assert_eq!(actual.map(|v| v as i64), expected);
        }
    }

    model.assert_eq(ledger);

    assert!(ledger.advertised_window() >= 0);
    assert!(ledger.pending_shrink_debt() >= 0);
    assert!(ledger.remaining() >= 0, "consumed credit exceeds the window");
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Tracks the receive window of a single stream or connection

use crate::{
    error::FlowControlViolation,
    macros::_debug,
    window::Window,
    window_update,
};


/// The receive-side flow control state for a stream or the connection
///
/// The ledger starts out advertising an initial window and is updated as the
/// peer sends data and as local policy grows or shrinks the window.
///
/// Shrinking is applied without telling the peer. Bytes it already sent
/// against the larger window are absorbed by lowering `consumed_credit`,
/// which holds back the next `WINDOW_UPDATE` until the reduction is paid off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ledger {
    /// The window currently promised to the peer
    advertised_window: i32,
    /// Bytes received since the last `WINDOW_UPDATE`
    ///
    /// Negative while a shrink has not been absorbed by incoming data.
    consumed_credit: i32,
    /// The portion of earlier shrinks not yet resolved by a later grow
    pending_shrink_debt: i32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Window::DEFAULT)
    }
}

impl Ledger {
    /// Creates a ledger advertising `initial_window` to the peer
    pub const fn new(initial_window: Window) -> Self {
        Self {
            advertised_window: initial_window.as_i32(),
            consumed_credit: 0,
            pending_shrink_debt: 0,
        }
    }

    #[inline]
    pub const fn advertised_window(&self) -> i32 {
        self.advertised_window
    }

    #[inline]
    pub const fn consumed_credit(&self) -> i32 {
        self.consumed_credit
    }

    #[inline]
    pub const fn pending_shrink_debt(&self) -> i32 {
        self.pending_shrink_debt
    }

    /// Returns the number of bytes the peer is still allowed to send
    #[inline]
    pub const fn remaining(&self) -> i64 {
        self.advertised_window as i64 - self.consumed_credit as i64
    }

    /// Applies `delta` to the advertised window
    ///
    /// A positive `delta` grows the window. Any part of the growth which
    /// pays off an earlier shrink is withheld from the return value and
    /// folded into `consumed_credit` instead. A negative `delta` shrinks the
    /// window without notifying the peer.
    ///
    /// Returns the increment which should be sent to the peer in a
    /// `WINDOW_UPDATE` right away. This is always `0` for shrinks.
    ///
    /// On error the ledger is left unchanged.
    pub fn adjust(&mut self, delta: i32) -> Result<u32, FlowControlViolation> {
        let result = if delta > 0 {
            self.grow(delta)
        } else {
            self.shrink(delta)
        };

        self.debug_check_invariants();

        result
            .map(|increment| {
                _debug!(
                    delta,
                    increment,
                    advertised_window = self.advertised_window,
                    consumed_credit = self.consumed_credit,
                    pending_shrink_debt = self.pending_shrink_debt,
                    "adjusted receive window"
                );
                increment
            })
            .map_err(|error| {
                _debug!(
                    delta,
                    advertised_window = self.advertised_window,
                    consumed_credit = self.consumed_credit,
                    pending_shrink_debt = self.pending_shrink_debt,
                    reason = error.reason,
                    "rejected receive window adjustment"
                );
                error
            })
    }

    /// Moves the advertised window to `target`
    ///
    /// Growing the window also returns all of the credit consumed so far, since
    /// [`Self::adjust`] only widens the window by the part of a positive delta
    /// which exceeds the consumed credit.
    pub fn set_window(&mut self, target: Window) -> Result<u32, FlowControlViolation> {
        // both values are in `0..=MAX_WINDOW` so the difference fits in an i32
        let mut delta = target.as_i32() - self.advertised_window;

        if delta > 0 {
            delta = delta
                .checked_add(self.consumed_credit.max(0))
                .ok_or(FlowControlViolation::WINDOW_OVERFLOW)?;
        }

        self.adjust(delta)
    }

    #[inline]
    fn grow(&mut self, delta: i32) -> Result<u32, FlowControlViolation> {
        debug_assert!(delta > 0);

        let unused = self.consumed_credit.max(0) - delta;

        if unused >= 0 {
            self.consumed_credit = unused;
            return Ok(delta as u32);
        }

        // The growth exceeds the credit consumed so far so the remainder needs
        // to be added to the advertised window.
        let growth = -unused;

        // `MAX_WINDOW` is `i32::MAX` so the checked addition enforces the limit
        let advertised_window = self
            .advertised_window
            .checked_add(growth)
            .ok_or(FlowControlViolation::WINDOW_OVERFLOW)?;

        // Part of the growth pays off any outstanding shrink. Those bytes were
        // never withdrawn from the peer so they can't be sent again.
        let resolved = self.pending_shrink_debt.min(growth);

        self.advertised_window = advertised_window;
        self.pending_shrink_debt -= resolved;

        if self.consumed_credit < 0 {
            self.consumed_credit += resolved;
        } else {
            // Bytes consumed up until now are returned to the peer by this
            // update so only the resolved debt is still owed.
            self.consumed_credit = resolved;
        }

        Ok((delta - resolved) as u32)
    }

    #[inline]
    fn shrink(&mut self, delta: i32) -> Result<u32, FlowControlViolation> {
        debug_assert!(delta <= 0);

        let advertised_window = self
            .advertised_window
            .checked_add(delta)
            .filter(|window| *window >= 0)
            .ok_or(FlowControlViolation::NEGATIVE_WINDOW)?;
        let consumed_credit = self
            .consumed_credit
            .checked_add(delta)
            .ok_or(FlowControlViolation::CREDIT_OVERFLOW)?;
        let pending_shrink_debt = self
            .pending_shrink_debt
            .checked_sub(delta)
            .ok_or(FlowControlViolation::DEBT_OVERFLOW)?;

        //= https://www.rfc-editor.org/rfc/rfc9113#section-6.9.3
        //# A receiver that wishes to use a smaller flow-control window than the
        //# current size can send a new SETTINGS frame.  However, the receiver
        //# MUST be prepared to receive data that exceeds this window size,
        //# since the sender might send data that exceeds the lower limit prior
        //# to processing the SETTINGS frame.

        // The peer is not told about the shrink. Lowering the consumed credit
        // holds back `-delta` bytes worth of `WINDOW_UPDATE`s instead.
        self.advertised_window = advertised_window;
        self.consumed_credit = consumed_credit;
        self.pending_shrink_debt = pending_shrink_debt;

        Ok(0)
    }

    /// Records `len` bytes of flow-controlled payload received from the peer
    ///
    /// Fails if the peer sent more than the window allows.
    pub fn on_data_received(&mut self, len: u32) -> Result<(), FlowControlViolation> {
        //= https://www.rfc-editor.org/rfc/rfc9113#section-6.9.1
        //# A receiver MAY respond with a stream error (Section 5.4.2) or
        //# connection error (Section 5.4.1) of type FLOW_CONTROL_ERROR if it
        //# is unable to accept a frame.
        let consumed_credit = i32::try_from(len)
            .ok()
            .and_then(|len| self.consumed_credit.checked_add(len))
            .ok_or(FlowControlViolation::CREDIT_OVERFLOW)
            .and_then(|consumed_credit| {
                if consumed_credit > self.advertised_window {
                    Err(FlowControlViolation::WINDOW_EXCEEDED)
                } else {
                    Ok(consumed_credit)
                }
            })
            .map_err(|error| {
                _debug!(
                    len,
                    advertised_window = self.advertised_window,
                    consumed_credit = self.consumed_credit,
                    reason = error.reason,
                    "rejected received data"
                );
                error
            })?;

        self.consumed_credit = consumed_credit;

        Ok(())
    }

    /// Returns `true` if enough credit was consumed to warrant a `WINDOW_UPDATE`
    #[inline]
    pub fn should_send_window_update(&self) -> bool {
        window_update::should_send(self.advertised_window, self.consumed_credit)
    }

    /// Returns the `WINDOW_UPDATE` increment to send to the peer, if one is due
    ///
    /// The consumed credit is considered returned once this returns `Some`.
    pub fn take_window_update(&mut self) -> Option<u32> {
        if self.consumed_credit <= 0 || !self.should_send_window_update() {
            return None;
        }

        let increment = self.consumed_credit as u32;
        self.consumed_credit = 0;

        _debug!(
            increment,
            advertised_window = self.advertised_window,
            pending_shrink_debt = self.pending_shrink_debt,
            "releasing receive window"
        );

        Some(increment)
    }

    #[inline]
    fn debug_check_invariants(&self) {
        debug_assert!(self.advertised_window >= 0);
        debug_assert!(self.pending_shrink_debt >= 0);
    }
}

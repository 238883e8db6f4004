// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Decides when consumed credit should be returned to the peer

/// Returns `true` once the peer has consumed at least half of the advertised
/// window since the last `WINDOW_UPDATE`.
///
/// Smaller amounts are held back so updates are batched instead of sent for
/// every `DATA` frame.
#[inline]
pub const fn should_send(advertised_window: i32, consumed_credit: i32) -> bool {
    consumed_credit >= advertised_window / 2
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Receive-side flow control accounting for HTTP/2
//!
//! Each stream and the connection itself own a [`Ledger`] which tracks the
//! window advertised to the peer, the credit the peer has consumed since the
//! last `WINDOW_UPDATE` and any window reduction which has not yet been
//! absorbed by incoming data. Frame encoding and the stream state machine
//! driving the ledger live outside of this crate.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

mod macros;

pub mod error;
pub mod ledger;
pub mod limits;
pub mod window;
pub mod window_update;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{FlowControlViolation, ValidationError};
pub use ledger::Ledger;
pub use limits::Limits;
pub use window::{Window, DEFAULT_WINDOW, MAX_WINDOW};

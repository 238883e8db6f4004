// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{error::ValidationError, ledger::Ledger, window::Window};
use core::convert::TryInto;

/// Initial receive windows for the connection and for newly created streams
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub(crate) stream_window: Window,
    pub(crate) connection_window: Window,
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! setter {
    ($name:ident, $field:ident, $inner:ty) => {
        pub fn $name(mut self, value: $inner) -> Result<Self, ValidationError> {
            self.$field = value.try_into()?;
            Ok(self)
        }
    };
}

impl Limits {
    pub const fn new() -> Self {
        Self {
            stream_window: Window::DEFAULT,
            connection_window: Window::DEFAULT,
        }
    }

    //= https://www.rfc-editor.org/rfc/rfc9113#section-6.5.2
    //# Values above the maximum flow-control window size of 2^31-1 MUST
    //# be treated as a connection error (Section 5.4.1) of type
    //# FLOW_CONTROL_ERROR.
    setter!(with_stream_window, stream_window, u32);
    setter!(with_connection_window, connection_window, u32);

    #[inline]
    pub const fn stream_window(&self) -> Window {
        self.stream_window
    }

    #[inline]
    pub const fn connection_window(&self) -> Window {
        self.connection_window
    }

    /// Creates the receive ledger for a newly opened stream
    #[inline]
    pub const fn stream_ledger(&self) -> Ledger {
        Ledger::new(self.stream_window)
    }

    /// Creates the receive ledger for the connection
    #[inline]
    pub const fn connection_ledger(&self) -> Ledger {
        Ledger::new(self.connection_window)
    }
}

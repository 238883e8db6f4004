// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

//= https://www.rfc-editor.org/rfc/rfc9113#section-7
//# FLOW_CONTROL_ERROR (0x03):  The endpoint detected that its peer
//#    violated the flow-control protocol.

/// A window adjustment or data receipt which would break the flow control
/// ledger.
///
/// The ledger is never modified when this error is returned. Callers must
/// treat it as fatal for the owning stream or connection.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FlowControlViolation {
    pub reason: &'static str,
}

impl FlowControlViolation {
    /// The HTTP/2 error code carried in `RST_STREAM` or `GOAWAY`
    pub const CODE: u32 = 0x3;

    pub const NEGATIVE_WINDOW: Self = Self::new().with_reason("window would become negative");
    pub const WINDOW_OVERFLOW: Self =
        Self::new().with_reason("window would exceed the maximum window size");
    pub const CREDIT_OVERFLOW: Self = Self::new().with_reason("consumed credit out of range");
    pub const DEBT_OVERFLOW: Self = Self::new().with_reason("shrink debt out of range");
    pub const WINDOW_EXCEEDED: Self =
        Self::new().with_reason("peer sent more data than the advertised window");

    /// Creates a new `FlowControlViolation`
    pub const fn new() -> Self {
        Self { reason: "" }
    }

    /// Updates the `FlowControlViolation` with the specified `reason`
    pub const fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = reason;
        self
    }

    #[inline]
    pub const fn code(&self) -> u32 {
        Self::CODE
    }
}

impl Default for FlowControlViolation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlowControlViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "FLOW_CONTROL_ERROR")
        } else {
            write!(f, "FLOW_CONTROL_ERROR: {}", self.reason)
        }
    }
}

impl fmt::Debug for FlowControlViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("FlowControlViolation");

        d.field("code", &Self::CODE);

        if !self.reason.is_empty() {
            d.field("reason", &self.reason);
        }

        d.finish()
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FlowControlViolation {}

/// Returned when a configured window size can not be represented on the wire
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValidationError(pub(crate) &'static str);

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_test() {
        assert_eq!(FlowControlViolation::new().to_string(), "FLOW_CONTROL_ERROR");
        assert_eq!(
            FlowControlViolation::NEGATIVE_WINDOW.to_string(),
            "FLOW_CONTROL_ERROR: window would become negative"
        );
        assert_eq!(
            ValidationError("window too large").to_string(),
            "window too large"
        );
    }

    #[test]
    fn code_test() {
        assert_eq!(FlowControlViolation::WINDOW_EXCEEDED.code(), 0x3);
        assert_eq!(
            format!("{:?}", FlowControlViolation::DEBT_OVERFLOW),
            r#"FlowControlViolation { code: 3, reason: "shrink debt out of range" }"#
        );
    }
}

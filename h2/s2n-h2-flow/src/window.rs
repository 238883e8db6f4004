// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::error::ValidationError;
use core::{convert::TryFrom, fmt};

#[cfg(any(test, feature = "generator"))]
use bolero_generator::*;

//= https://www.rfc-editor.org/rfc/rfc9113#section-6.9.1
//# A sender MUST NOT allow a flow-control window to exceed 2^31-1
//# octets.

pub const MAX_WINDOW: i32 = i32::MAX;

//= https://www.rfc-editor.org/rfc/rfc9113#section-6.9.2
//# When an HTTP/2 connection is first established, new streams are
//# created with an initial flow-control window size of 65,535 octets.
//# The connection flow-control window is also 65,535 octets.

pub const DEFAULT_WINDOW: i32 = 65_535;

/// A flow control window size which can be advertised on the wire
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[cfg_attr(any(feature = "generator", test), derive(TypeGenerator))]
pub struct Window(#[cfg_attr(any(feature = "generator", test), generator(Self::GENERATOR))] i32);

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Window {
    pub const ZERO: Self = Self(0);
    pub const DEFAULT: Self = Self(DEFAULT_WINDOW);
    pub const MAX: Self = Self(MAX_WINDOW);

    #[cfg(any(feature = "generator", test))]
    const GENERATOR: core::ops::RangeInclusive<i32> = 0..=MAX_WINDOW;

    pub const fn new(value: u32) -> Result<Self, ValidationError> {
        if value > MAX_WINDOW as u32 {
            return Err(ValidationError("window exceeds 2^31-1"));
        }
        Ok(Self(value as i32))
    }

    pub const fn from_u16(value: u16) -> Self {
        Self(value as i32)
    }

    #[inline]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u32> for Window {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for Window {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(ValidationError("window can not be negative"));
        }
        Ok(Self(value))
    }
}

impl From<Window> for i32 {
    fn from(window: Window) -> Self {
        window.0
    }
}

impl From<Window> for u32 {
    fn from(window: Window) -> Self {
        window.as_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolero::check;

    #[test]
    fn bounds_test() {
        assert_eq!(Window::new(0), Ok(Window::ZERO));
        assert_eq!(Window::new(65_535), Ok(Window::DEFAULT));
        assert_eq!(Window::new(MAX_WINDOW as u32), Ok(Window::MAX));
        assert!(Window::new(MAX_WINDOW as u32 + 1).is_err());
        assert!(Window::new(u32::MAX).is_err());
        assert!(Window::try_from(-1i32).is_err());
        assert_eq!(Window::from_u16(u16::MAX), Window::DEFAULT);
    }

    #[test]
    #[cfg_attr(kani, kani::proof, kani::unwind(1))]
    fn new_test() {
        check!().with_type::<u32>().cloned().for_each(|value| {
            match Window::new(value) {
                Ok(window) => {
                    assert!(value <= MAX_WINDOW as u32);
                    assert_eq!(window.as_u32(), value);
                    assert!(window.as_i32() >= 0);
                }
                Err(_) => assert!(value > MAX_WINDOW as u32),
            }
        });
    }

    #[test]
    fn generator_test() {
        check!().with_type::<Window>().cloned().for_each(|window| {
            assert!((0..=MAX_WINDOW).contains(&window.as_i32()));
        });
    }
}

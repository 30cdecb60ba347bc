/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::Utf8Error;

use thiserror::Error;

mod name;
pub use name::NodeName;

mod tag;
pub use tag::{DisplayTagMap, MetricTagMap, MetricTagName, MetricTagValue};

mod identity;
pub use identity::{IdentityPool, identity};

/// Written after a non-empty prefix in an identity string.
pub const PREFIX_SEPARATOR: char = '+';
/// Written between a tag name and its value in an identity string.
pub const NAME_SEPARATOR: char = '=';
/// Written between two tag pairs in an identity string.
pub const PAIR_SEPARATOR: char = ',';

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty string")]
    Empty,
    #[error("invalid graphic char: {0}")]
    InvalidGraphic(char),
    #[error("not printable char")]
    NotPrintable,
    #[error("invalid utf-8 string: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

fn chars_allowed_in_identity(s: &str) -> Result<(), ParseError> {
    for c in s.chars() {
        match c {
            PREFIX_SEPARATOR | NAME_SEPARATOR | PAIR_SEPARATOR => {
                return Err(ParseError::InvalidGraphic(c));
            }
            _ if c.is_control() => return Err(ParseError::NotPrintable),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_chars() {
        assert!(chars_allowed_in_identity("abc-1.x/y_z").is_ok());
        assert!(chars_allowed_in_identity("us east").is_ok());
        assert!(chars_allowed_in_identity("").is_ok());

        assert!(matches!(
            chars_allowed_in_identity("a+b"),
            Err(ParseError::InvalidGraphic('+'))
        ));
        assert!(matches!(
            chars_allowed_in_identity("a=b"),
            Err(ParseError::InvalidGraphic('='))
        ));
        assert!(matches!(
            chars_allowed_in_identity("a,b"),
            Err(ParseError::InvalidGraphic(','))
        ));
        assert!(matches!(
            chars_allowed_in_identity("a\nb"),
            Err(ParseError::NotPrintable)
        ));
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::metrics::{ParseError, chars_allowed_in_identity};

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct MetricTagName(SmolStr);

impl MetricTagName {
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn parse_buf(buf: &[u8]) -> Result<Self, ParseError> {
        let name = std::str::from_utf8(buf)?;
        MetricTagName::from_str(name)
    }
}

impl AsRef<str> for MetricTagName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for MetricTagName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        chars_allowed_in_identity(s)?;
        Ok(MetricTagName(s.into()))
    }
}

impl fmt::Display for MetricTagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_tag_name() {
        assert_eq!(MetricTagName::from_str("region").unwrap().as_str(), "region");
        assert_eq!(MetricTagName::parse_buf(b"host").unwrap().as_str(), "host");

        assert!(MetricTagName::from_str("").is_err());
        assert!(MetricTagName::from_str("a=b").is_err());
        assert!(MetricTagName::from_str("a,b").is_err());
    }
}

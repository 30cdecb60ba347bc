/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use humanize_rs::ParseError;
use yaml_rust::Yaml;

/// Parse a duration such as `10s`, `1m30s`, or a bare number of seconds.
pub fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        Yaml::Real(s) => {
            let f = f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))?;
            Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer' or 'real'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_duration() {
        assert_eq!(
            as_duration(&yaml_str!("1m30s")).unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(as_duration(&yaml_str!("250ms")).unwrap(), Duration::from_millis(250));
        assert_eq!(as_duration(&yaml_str!("10")).unwrap(), Duration::from_secs(10));
        assert_eq!(as_duration(&Yaml::Integer(0)).unwrap(), Duration::ZERO);
        assert_eq!(
            as_duration(&Yaml::Real("0.5".to_string())).unwrap(),
            Duration::from_millis(500)
        );

        assert!(as_duration(&yaml_str!("-10")).is_err());
        assert!(as_duration(&yaml_str!("10x")).is_err());
        assert!(as_duration(&Yaml::Integer(-1)).is_err());
        assert!(as_duration(&Yaml::Array(vec![Yaml::Integer(1)])).is_err());
    }
}

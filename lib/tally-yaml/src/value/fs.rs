/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::anyhow;
use yaml_rust::Yaml;

pub fn as_absolute_path(v: &Yaml) -> anyhow::Result<PathBuf> {
    if let Yaml::String(path) = v {
        let path = PathBuf::from(path);
        if path.is_relative() {
            return Err(anyhow!(
                "invalid value: {} is not an absolute path",
                path.display()
            ));
        }
        Ok(path)
    } else {
        Err(anyhow!(
            "yaml value type for absolute path should be string"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn t_absolute_path() {
        assert_eq!(
            as_absolute_path(&yaml_str!("/run/statsd.sock")).unwrap(),
            PathBuf::from("/run/statsd.sock")
        );
        assert!(as_absolute_path(&yaml_str!("statsd.sock")).is_err());
        assert!(as_absolute_path(&Yaml::Integer(1)).is_err());
    }
}

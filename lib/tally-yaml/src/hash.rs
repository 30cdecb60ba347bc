/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

pub fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    #[test]
    fn foreach_kv_ok() {
        let yaml = yaml_doc!("prefix: svc\nreport_interval: 5");
        let hash = yaml.as_hash().unwrap();
        let mut keys = Vec::new();
        foreach_kv(hash, |k, _| {
            keys.push(k.to_owned());
            Ok(())
        })
        .unwrap();
        assert_eq!(keys, vec!["prefix", "report_interval"]);
    }

    #[test]
    fn foreach_kv_err() {
        let yaml = yaml_doc!("123: 1");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |_, _| Ok(())).is_err());

        let yaml = yaml_doc!("a: 1");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |k, _| Err(anyhow!("error at {k}"))).is_err());
    }
}

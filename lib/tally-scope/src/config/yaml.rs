/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use log::warn;
use yaml_rust::Yaml;

use super::ScopeConfig;

impl ScopeConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = v {
            let mut config = ScopeConfig::default();
            tally_yaml::foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
            Ok(config)
        } else {
            Err(anyhow!(
                "yaml value type for 'metrics scope config' should be 'map'"
            ))
        }
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match tally_yaml::key::normalize(k).as_str() {
            "prefix" => {
                let prefix = tally_yaml::value::as_node_name(v)
                    .context(format!("invalid node name value for key {k}"))?;
                self.set_prefix(prefix);
            }
            "tags" | "static_tags" => {
                let tags = tally_yaml::value::as_metric_tag_map(v)
                    .context(format!("invalid metric tags value for key {k}"))?;
                self.set_tags(tags);
            }
            "separator" => {
                let s = tally_yaml::value::as_string(v)
                    .context(format!("invalid string value for key {k}"))?;
                self.set_separator(&s)
                    .map_err(|e| anyhow!("invalid separator {s}: {e}"))?;
            }
            "emit_interval" => {
                warn!("deprecated config key '{k}', please use 'report_interval' instead");
                return self.set_by_yaml_kv("report_interval", v);
            }
            "report_interval" => {
                self.report_interval = tally_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
            }
            _ => return Err(anyhow!("invalid key {k}")),
        }
        Ok(())
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{StatsdBackend, StatsdClientConfig};

impl StatsdBackend {
    /// Accepts `host:port`, or a map with `address` and an optional `bind_ip`.
    pub fn parse_udp_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            let addr = tally_yaml::value::as_sockaddr(v)
                .context("invalid yaml value for udp statsd backend")?;
            return Ok(StatsdBackend::Udp(addr, None));
        };

        let mut addr: Option<SocketAddr> = None;
        let mut bind: Option<IpAddr> = None;
        tally_yaml::foreach_kv(map, |k, v| match tally_yaml::key::normalize(k).as_str() {
            "address" => {
                addr = Some(tally_yaml::value::as_sockaddr(v)?);
                Ok(())
            }
            "bind_ip" => {
                bind = Some(tally_yaml::value::as_ipaddr(v)?);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        let addr = addr.ok_or_else(|| anyhow!("no udp peer address set"))?;
        Ok(StatsdBackend::Udp(addr, bind))
    }
}

impl StatsdClientConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!(
                "yaml value type for 'statsd client config' should be 'map'"
            ));
        };
        let mut config = StatsdClientConfig::default();
        tally_yaml::foreach_kv(map, |k, v| {
            config
                .set_by_yaml_kv(k, v)
                .context(format!("invalid value for key {k}"))
        })?;
        Ok(config)
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match tally_yaml::key::normalize(k).as_str() {
            "target_udp" => self.set_backend(StatsdBackend::parse_udp_yaml(v)?),
            #[cfg(unix)]
            "target_unix" => {
                let path = tally_yaml::value::as_absolute_path(v)?;
                self.set_backend(StatsdBackend::Unix(path));
            }
            "prefix" => self.set_prefix(tally_yaml::value::as_node_name(v)?),
            "cache_size" => self.cache_size = tally_yaml::humanize::as_usize(v)?,
            "max_segment_size" => {
                self.max_segment_size = Some(tally_yaml::humanize::as_usize(v)?);
            }
            _ => return Err(anyhow!("invalid key {k}")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    #[cfg(unix)]
    use std::path::PathBuf;
    use std::str::FromStr;
    use tally_yaml::yaml_doc;
    use yaml_rust::YamlLoader;

    #[test]
    fn parse_udp_yaml() {
        let yaml = yaml_doc!(
            r#"
                address: "127.0.0.1:8125"
                bind_ip: "127.0.0.1"
            "#
        );
        assert_eq!(
            StatsdBackend::parse_udp_yaml(&yaml).unwrap(),
            StatsdBackend::Udp(
                SocketAddr::from_str("127.0.0.1:8125").unwrap(),
                Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
            )
        );

        let yaml = Yaml::String("10.0.0.1:9125".to_string());
        assert_eq!(
            StatsdBackend::parse_udp_yaml(&yaml).unwrap(),
            StatsdBackend::Udp(SocketAddr::from_str("10.0.0.1:9125").unwrap(), None)
        );

        assert!(StatsdBackend::parse_udp_yaml(&yaml_doc!("addr: 127.0.0.1:8125")).is_err());
        assert!(StatsdBackend::parse_udp_yaml(&yaml_doc!("bind_ip: 127.0.0.1")).is_err());
        assert!(StatsdBackend::parse_udp_yaml(&Yaml::Integer(1)).is_err());
    }

    #[test]
    fn parse_yaml_udp() {
        let yaml = yaml_doc!(
            r#"
                target_udp: "127.0.0.1:9125"
                prefix: agent
                cache-size: 4KiB
                max_segment_size: 1000
            "#
        );
        let config = StatsdClientConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(
            config.backend(),
            &StatsdBackend::Udp(SocketAddr::from_str("127.0.0.1:9125").unwrap(), None)
        );
        assert_eq!(config.cache_size, 4096);
        assert_eq!(config.max_segment_size, Some(1000));
        assert!(config.build().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn parse_yaml_unix() {
        let config = StatsdClientConfig::parse_yaml(&yaml_doc!("target_unix: /run/statsd.sock"))
            .unwrap();
        assert_eq!(
            config.backend(),
            &StatsdBackend::Unix(PathBuf::from("/run/statsd.sock"))
        );

        assert!(StatsdClientConfig::parse_yaml(&yaml_doc!("target_unix: statsd.sock")).is_err());
    }

    #[test]
    fn parse_yaml_err() {
        let yaml = yaml_doc!("target: 127.0.0.1:8125");
        assert!(StatsdClientConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("prefix: 'a,b'");
        assert!(StatsdClientConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!("emit_interval: 10s");
        assert!(StatsdClientConfig::parse_yaml(&yaml).is_err());

        assert!(StatsdClientConfig::parse_yaml(&Yaml::Null).is_err());
    }
}

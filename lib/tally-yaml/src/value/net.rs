/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use anyhow::anyhow;
use yaml_rust::Yaml;

pub fn as_sockaddr(v: &Yaml) -> anyhow::Result<SocketAddr> {
    if let Yaml::String(s) = v {
        SocketAddr::from_str(s).map_err(|e| anyhow!("invalid socket address {s}: {e}"))
    } else {
        Err(anyhow!(
            "yaml value type for 'SocketAddr' should be 'string'"
        ))
    }
}

pub fn as_ipaddr(v: &Yaml) -> anyhow::Result<IpAddr> {
    if let Yaml::String(s) = v {
        IpAddr::from_str(s).map_err(|e| anyhow!("invalid ip address {s}: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'IpAddr' should be 'string'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn t_sockaddr() {
        assert_eq!(
            as_sockaddr(&yaml_str!("127.0.0.1:8125")).unwrap(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8125)
        );
        assert!(as_sockaddr(&yaml_str!("[::1]:8125")).unwrap().is_ipv6());
        assert!(as_sockaddr(&yaml_str!("localhost")).is_err());
        assert!(as_sockaddr(&Yaml::Integer(8125)).is_err());
    }

    #[test]
    fn t_ipaddr() {
        assert_eq!(
            as_ipaddr(&yaml_str!("10.0.0.1")).unwrap(),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert!(as_ipaddr(&yaml_str!("10.0.0")).is_err());
    }
}

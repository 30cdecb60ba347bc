/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;
#[cfg(unix)]
use std::path::PathBuf;

use log::debug;

use tally_types::metrics::NodeName;

use crate::{StatsdMetricsSink, StatsdReporter};

#[cfg(feature = "yaml")]
mod yaml;

const UDP_DEFAULT_PORT: u16 = 8125;
const DEFAULT_CACHE_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsdBackend {
    /// Peer address and optional local bind ip.
    Udp(SocketAddr, Option<IpAddr>),
    #[cfg(unix)]
    Unix(PathBuf),
}

impl Default for StatsdBackend {
    fn default() -> Self {
        StatsdBackend::Udp(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), UDP_DEFAULT_PORT),
            None,
        )
    }
}

#[derive(Debug, Clone)]
pub struct StatsdClientConfig {
    backend: StatsdBackend,
    prefix: Option<NodeName>,
    pub cache_size: usize,
    pub max_segment_size: Option<usize>,
}

impl Default for StatsdClientConfig {
    fn default() -> Self {
        StatsdClientConfig {
            backend: StatsdBackend::default(),
            prefix: None,
            cache_size: DEFAULT_CACHE_SIZE,
            max_segment_size: None,
        }
    }
}

impl StatsdClientConfig {
    pub fn with_prefix(prefix: NodeName) -> Self {
        StatsdClientConfig {
            prefix: Some(prefix),
            ..Default::default()
        }
    }

    pub fn set_backend(&mut self, target: StatsdBackend) {
        self.backend = target;
    }

    pub fn set_prefix(&mut self, prefix: NodeName) {
        self.prefix = Some(prefix);
    }

    pub fn backend(&self) -> &StatsdBackend {
        &self.backend
    }

    pub fn build(&self) -> io::Result<StatsdReporter> {
        let sink = match &self.backend {
            StatsdBackend::Udp(addr, bind) => {
                let bind_ip = bind.unwrap_or(match addr {
                    SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
                });
                let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0))?;
                debug!("statsd reporter will send to udp {addr}");
                StatsdMetricsSink::udp_with_capacity(
                    *addr,
                    socket,
                    self.cache_size,
                    self.max_segment_size,
                )
            }
            #[cfg(unix)]
            StatsdBackend::Unix(path) => {
                let socket = UnixDatagram::unbound()?;
                debug!("statsd reporter will send to unix {}", path.display());
                StatsdMetricsSink::unix_with_capacity(
                    path.clone(),
                    socket,
                    self.cache_size,
                    self.max_segment_size,
                )
            }
        };

        let prefix = self.prefix.clone().unwrap_or_default();
        Ok(StatsdReporter::new(prefix, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::time::Duration;

    use tally_scope::StatsReporter;
    use tally_types::metrics::MetricTagMap;

    #[test]
    fn default() {
        let config = StatsdClientConfig::default();
        assert_eq!(
            config.backend(),
            &StatsdBackend::Udp(SocketAddr::from_str("127.0.0.1:8125").unwrap(), None)
        );
        assert_eq!(config.cache_size, DEFAULT_CACHE_SIZE);
        assert!(config.max_segment_size.is_none());
    }

    #[test]
    fn build_udp() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();

        let mut config = StatsdClientConfig::with_prefix(NodeName::from_str("agent").unwrap());
        config.set_backend(StatsdBackend::Udp(server.local_addr().unwrap(), None));
        let mut reporter = config.build().unwrap().with_tag("daemon_group", "test");

        let tags = MetricTagMap::try_from_pairs([("host", "a")]).unwrap();
        reporter.report_counter("PollCount", &tags, 3).unwrap();
        reporter.flush().unwrap();

        let mut buf = [0u8; 1024];
        let (len, _) = server.recv_from(&mut buf).unwrap();
        assert_eq!(
            &buf[..len],
            b"agent.PollCount:3|c|#daemon_group:test,host:a"
        );
    }

    #[cfg(unix)]
    #[test]
    fn build_unix() {
        let path = std::env::temp_dir().join(format!("tally-statsd-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let server = UnixDatagram::bind(&path).unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();

        let mut config = StatsdClientConfig::default();
        config.set_backend(StatsdBackend::Unix(path.clone()));
        let mut reporter = config.build().unwrap();
        reporter
            .report_gauge("Alloc", &MetricTagMap::default(), 0.5)
            .unwrap();
        reporter.flush().unwrap();

        let mut buf = [0u8; 1024];
        let len = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"Alloc:0.5|g");
        let _ = std::fs::remove_file(&path);
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{SocketAddr, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;
#[cfg(unix)]
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Arc, Mutex};

const DEFAULT_UDP_SEGMENT_SIZE: usize = 1400;
#[cfg(unix)]
const DEFAULT_UNIX_SEGMENT_SIZE: usize = 4096;

enum MetricsSinkIo {
    #[cfg(test)]
    Buf(Arc<Mutex<Vec<Vec<u8>>>>),
    Udp(UdpSocket, SocketAddr),
    #[cfg(unix)]
    Unix(UnixDatagram, PathBuf),
}

impl MetricsSinkIo {
    fn send_packet(&self, packet: &[u8]) -> io::Result<()> {
        match self {
            #[cfg(test)]
            MetricsSinkIo::Buf(packets) => {
                packets.lock().unwrap().push(packet.to_vec());
                Ok(())
            }
            MetricsSinkIo::Udp(socket, addr) => socket.send_to(packet, addr).map(|_| ()),
            #[cfg(unix)]
            MetricsSinkIo::Unix(socket, path) => socket.send_to(packet, path).map(|_| ()),
        }
    }
}

/// Split a batch of `\n` joined lines into packets of at most `max_size`
/// bytes, cutting only at line boundaries.
///
/// A single line longer than `max_size` is yielded on its own.
struct SegmentIter<'a> {
    buf: &'a [u8],
    max_size: usize,
}

impl<'a> SegmentIter<'a> {
    fn new(buf: &'a [u8], max_size: usize) -> Self {
        SegmentIter { buf, max_size }
    }
}

impl<'a> Iterator for SegmentIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }
        if self.buf.len() <= self.max_size {
            let packet = self.buf;
            self.buf = &[];
            return Some(packet);
        }

        let window = &self.buf[..=self.max_size];
        let cut = match window.iter().rposition(|b| *b == b'\n') {
            Some(p) => p,
            None => match self.buf.iter().position(|b| *b == b'\n') {
                Some(p) => p,
                None => {
                    let packet = self.buf;
                    self.buf = &[];
                    return Some(packet);
                }
            },
        };
        let packet = &self.buf[..cut];
        self.buf = &self.buf[cut + 1..];
        Some(packet)
    }
}

pub(crate) struct StatsdMetricsSink {
    cache_size: usize,
    max_segment_size: usize,
    buf: Vec<u8>,
    io: MetricsSinkIo,
}

impl StatsdMetricsSink {
    #[cfg(test)]
    pub(crate) fn buf_with_capacity(
        buf: Arc<Mutex<Vec<Vec<u8>>>>,
        cache_size: usize,
        max_segment_size: usize,
    ) -> Self {
        StatsdMetricsSink {
            cache_size,
            max_segment_size,
            buf: Vec::with_capacity(cache_size),
            io: MetricsSinkIo::Buf(buf),
        }
    }

    pub(crate) fn udp_with_capacity(
        addr: SocketAddr,
        socket: UdpSocket,
        cache_size: usize,
        max_segment_size: Option<usize>,
    ) -> Self {
        StatsdMetricsSink {
            cache_size,
            max_segment_size: max_segment_size.unwrap_or(DEFAULT_UDP_SEGMENT_SIZE),
            buf: Vec::with_capacity(cache_size),
            io: MetricsSinkIo::Udp(socket, addr),
        }
    }

    #[cfg(unix)]
    pub(crate) fn unix_with_capacity(
        path: PathBuf,
        socket: UnixDatagram,
        cache_size: usize,
        max_segment_size: Option<usize>,
    ) -> Self {
        StatsdMetricsSink {
            cache_size,
            max_segment_size: max_segment_size.unwrap_or(DEFAULT_UNIX_SEGMENT_SIZE),
            buf: Vec::with_capacity(cache_size),
            io: MetricsSinkIo::Unix(socket, path),
        }
    }

    /// Append one line, sending the cached batch first if it would overflow.
    pub(crate) fn emit(&mut self, msg: &[u8]) -> io::Result<()> {
        if self.buf.is_empty() {
            self.buf.extend_from_slice(msg);
        } else if self.buf.len() + 1 + msg.len() > self.cache_size {
            let r = self.flush_buf();
            self.buf.extend_from_slice(msg);
            r?;
        } else {
            self.buf.push(b'\n');
            self.buf.extend_from_slice(msg);
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.flush_buf()
    }

    /// The batch is dropped even if sending fails.
    fn flush_buf(&mut self) -> io::Result<()> {
        let r = SegmentIter::new(&self.buf, self.max_segment_size)
            .try_for_each(|packet| self.io.send_packet(packet));
        self.buf.clear();
        r
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::{Host, Url};

use crate::{HekaConfigError, protocol};

const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;
const MAX_UDP_PAYLOAD_SIZE: usize = 65507;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HekaTransport {
    Tcp,
    Udp,
}

impl HekaTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            HekaTransport::Tcp => "tcp",
            HekaTransport::Udp => "udp",
        }
    }
}

impl FromStr for HekaTransport {
    type Err = HekaConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(HekaTransport::Tcp),
            "udp" => Ok(HekaTransport::Udp),
            _ => Err(HekaConfigError::UnsupportedScheme(s.to_string())),
        }
    }
}

/// The remote heka listener, parsed from `tcp://<host>:<port>` or `udp://<host>:<port>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HekaEndpoint {
    transport: HekaTransport,
    host: String,
    port: u16,
}

impl HekaEndpoint {
    #[inline]
    pub fn transport(&self) -> HekaTransport {
        self.transport
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for HekaEndpoint {
    type Err = HekaConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s)?;
        let transport = HekaTransport::from_str(url.scheme())?;
        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => return Err(HekaConfigError::NoHost),
        };
        let port = url.port().ok_or(HekaConfigError::NoPort)?;
        Ok(HekaEndpoint {
            transport,
            host,
            port,
        })
    }
}

impl fmt::Display for HekaEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.transport.as_str(), self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.transport.as_str(), self.host, self.port)
        }
    }
}

#[derive(Clone, Debug)]
pub struct HekaClientConfig {
    endpoint: HekaEndpoint,
    msg_type: String,
    hostname: Option<String>,
    pub(crate) emit_interval: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) write_timeout: Duration,
    pub(crate) max_message_size: usize,
}

impl HekaClientConfig {
    /// Create a config with the connect string and the heka `Type` set for all messages
    pub fn new(connect: &str, msg_type: &str) -> Result<Self, HekaConfigError> {
        let endpoint = HekaEndpoint::from_str(connect)?;
        Ok(HekaClientConfig::with_endpoint(endpoint, msg_type))
    }

    pub fn with_endpoint(endpoint: HekaEndpoint, msg_type: &str) -> Self {
        HekaClientConfig {
            endpoint,
            msg_type: msg_type.to_string(),
            hostname: None,
            emit_interval: DEFAULT_EMIT_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    #[inline]
    pub fn endpoint(&self) -> &HekaEndpoint {
        &self.endpoint
    }

    #[inline]
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    #[inline]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    #[inline]
    pub fn emit_interval(&self) -> Duration {
        self.emit_interval
    }

    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[inline]
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// The configured max message size, capped so that a frame fits in a
    /// single datagram for udp
    pub fn max_message_size(&self) -> usize {
        match self.endpoint.transport {
            HekaTransport::Tcp => self.max_message_size,
            HekaTransport::Udp => self
                .max_message_size
                .min(MAX_UDP_PAYLOAD_SIZE - protocol::MAX_FRAME_OVERHEAD),
        }
    }

    pub fn set_hostname(&mut self, hostname: String) {
        self.hostname = Some(hostname);
    }

    pub fn set_emit_interval(&mut self, interval: Duration) -> Result<(), HekaConfigError> {
        if interval.is_zero() {
            return Err(HekaConfigError::ZeroDuration("emit_interval"));
        }
        self.emit_interval = interval;
        Ok(())
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    pub fn set_write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = timeout;
    }

    pub fn set_max_message_size(&mut self, size: usize) {
        self.max_message_size = size;
    }
}

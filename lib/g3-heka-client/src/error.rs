/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::HekaEndpoint;

#[derive(Debug, Error)]
pub enum HekaConfigError {
    #[error("invalid connect string: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("scheme '{0}' not supported, try 'tcp://<host>:<port>' or 'udp://<host>:<port>'")]
    UnsupportedScheme(String),
    #[error("no host set in connect string")]
    NoHost,
    #[error("no port set in connect string")]
    NoPort,
    #[error("zero duration is not allowed for {0}")]
    ZeroDuration(&'static str),
}

#[derive(Debug, Error)]
pub enum HekaEncodeError {
    #[error("message header too big, requires {size} (max header size {max})")]
    HeaderTooLarge { size: usize, max: usize },
    #[error("message too big, requires {size} (max message size {max})")]
    MessageTooLarge { size: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum HekaSendError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: HekaEndpoint,
        #[source]
        source: io::Error,
    },
    #[error("failed to send message to {endpoint}: {source}")]
    Transmit {
        endpoint: HekaEndpoint,
        #[source]
        source: io::Error,
    },
}

impl HekaSendError {
    pub fn endpoint(&self) -> &HekaEndpoint {
        match self {
            HekaSendError::Connect { endpoint, .. } => endpoint,
            HekaSendError::Transmit { endpoint, .. } => endpoint,
        }
    }
}

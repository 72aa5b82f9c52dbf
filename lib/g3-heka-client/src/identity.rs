/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::HekaClientConfig;

const NO_HOSTNAME: &str = "<no hostname>";

/// The process identity put into the envelope of every message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HekaIdentity {
    pub pid: i32,
    pub hostname: String,
    pub msg_type: String,
}

impl HekaIdentity {
    pub fn new(msg_type: &str) -> Self {
        HekaIdentity {
            pid: i32::try_from(std::process::id()).unwrap_or(i32::MAX),
            hostname: local_hostname(),
            msg_type: msg_type.to_string(),
        }
    }

    pub fn from_config(config: &HekaClientConfig) -> Self {
        let mut identity = HekaIdentity::new(config.msg_type());
        if let Some(hostname) = config.hostname() {
            identity.hostname = hostname.to_string();
        }
        identity
    }
}

#[cfg(unix)]
fn local_hostname() -> String {
    let uname = rustix::system::uname();
    let hostname = uname.nodename().to_string_lossy();
    if hostname.is_empty() {
        NO_HOSTNAME.to_string()
    } else {
        hostname.into_owned()
    }
}

#[cfg(not(unix))]
fn local_hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| NO_HOSTNAME.to_string())
}

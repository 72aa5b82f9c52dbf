/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;

use log::{debug, warn};

use crate::{HekaEncodeError, HekaEndpoint, HekaSendError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSkipReason {
    /// the snapshot supplied fewer values than expected field names
    MissingValue,
    EmptyName,
    DuplicateName,
}

impl FieldSkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSkipReason::MissingValue => "no value",
            FieldSkipReason::EmptyName => "empty name",
            FieldSkipReason::DuplicateName => "duplicate name",
        }
    }
}

impl fmt::Display for FieldSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSkip {
    pub name: String,
    pub reason: FieldSkipReason,
}

/// Receiver of the diagnostics emitted while encoding and sending.
///
/// Every method is called from the context driving the emitter, so
/// implementations should return quickly.
pub trait HekaEventHandler: Send + Sync {
    fn connecting(&self, _endpoint: &HekaEndpoint) {}

    /// The first transmit attempt failed, a reconnect and resend will follow
    fn transmit_retry(&self, _endpoint: &HekaEndpoint, _e: &io::Error) {}

    fn field_skipped(&self, skip: &FieldSkip);

    fn encode_failed(&self, e: &HekaEncodeError);

    fn send_failed(&self, e: &HekaSendError);
}

/// Forward all events to the `log` facade
#[derive(Clone, Copy, Debug, Default)]
pub struct LogEventHandler;

impl HekaEventHandler for LogEventHandler {
    fn connecting(&self, endpoint: &HekaEndpoint) {
        debug!("connecting to heka server {endpoint}");
    }

    fn transmit_retry(&self, endpoint: &HekaEndpoint, e: &io::Error) {
        debug!("send message to heka server {endpoint} failed, will reconnect: {e}");
    }

    fn field_skipped(&self, skip: &FieldSkip) {
        warn!("skipping heka field {}: {}", skip.name, skip.reason);
    }

    fn encode_failed(&self, e: &HekaEncodeError) {
        warn!("failed to encode heka message: {e}");
    }

    fn send_failed(&self, e: &HekaSendError) {
        warn!("sending metrics error: {e}");
    }
}

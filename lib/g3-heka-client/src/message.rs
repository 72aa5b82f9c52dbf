/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashSet;

use uuid::Uuid;

use crate::{FieldSkipReason, HekaIdentity};

/// The heka `Logger` of all messages sent by this client
pub const LOGGER_NAME: &str = "g3-heka-client";
/// The heka `Severity` of all messages sent by this client
pub const SEVERITY: i32 = 100;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Double(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HekaField {
    name: String,
    value: FieldValue,
}

impl HekaField {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> FieldValue {
        self.value
    }
}

#[derive(Clone, Debug)]
pub struct HekaMessage {
    uuid: Uuid,
    timestamp: i64,
    msg_type: String,
    pid: i32,
    hostname: String,
    fields: Vec<HekaField>,
    field_names: HashSet<String>,
    skipped_fields: usize,
}

impl HekaMessage {
    pub(crate) fn new(identity: &HekaIdentity, timestamp: i64) -> Self {
        HekaMessage {
            uuid: Uuid::new_v4(),
            timestamp,
            msg_type: identity.msg_type.clone(),
            pid: identity.pid,
            hostname: identity.hostname.clone(),
            fields: Vec::new(),
            field_names: HashSet::new(),
            skipped_fields: 0,
        }
    }

    pub(crate) fn add_field(
        &mut self,
        name: String,
        value: FieldValue,
    ) -> Result<(), FieldSkipReason> {
        if name.is_empty() {
            return Err(FieldSkipReason::EmptyName);
        }
        if self.field_names.contains(&name) {
            return Err(FieldSkipReason::DuplicateName);
        }
        self.field_names.insert(name.clone());
        self.fields.push(HekaField { name, value });
        Ok(())
    }

    pub(crate) fn add_skipped(&mut self) {
        self.skipped_fields += 1;
    }

    #[inline]
    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    /// Nanoseconds since the unix epoch
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[inline]
    pub fn logger(&self) -> &'static str {
        LOGGER_NAME
    }

    #[inline]
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    #[inline]
    pub fn pid(&self) -> i32 {
        self.pid
    }

    #[inline]
    pub fn severity(&self) -> i32 {
        SEVERITY
    }

    #[inline]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    #[inline]
    pub fn payload(&self) -> &str {
        ""
    }

    #[inline]
    pub fn fields(&self) -> &[HekaField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value)
    }

    /// Number of fields dropped while encoding, not part of the wire message
    #[inline]
    pub fn skipped_fields(&self) -> usize {
        self.skipped_fields
    }
}

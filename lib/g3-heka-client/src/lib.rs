/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::{HekaClientConfig, HekaEndpoint, HekaTransport};

mod error;
pub use error::{HekaConfigError, HekaEncodeError, HekaSendError};

mod event;
pub use event::{FieldSkip, FieldSkipReason, HekaEventHandler, LogEventHandler};

pub mod metric;

mod identity;
pub use identity::HekaIdentity;

mod message;
pub use message::{FieldValue, HekaField, HekaMessage, LOGGER_NAME, SEVERITY};

mod encode;
pub use encode::SnapshotEncoder;

pub mod protocol;

mod sender;
pub use sender::{
    HekaConnection, HekaConnector, HekaSender, NetworkConnection, NetworkConnector, SenderState,
};

mod emit;
pub use emit::{HekaEmitStats, HekaEmitter, HekaStopHandle, spawn_working_thread};

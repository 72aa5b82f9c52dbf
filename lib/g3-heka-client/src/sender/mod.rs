/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{HekaClientConfig, HekaEndpoint, HekaEventHandler, HekaSendError};

mod net;
pub use net::{NetworkConnection, NetworkConnector};

#[async_trait]
pub trait HekaConnection: Send {
    async fn send_msg(&mut self, msg: &[u8]) -> io::Result<()>;
    async fn close(&mut self) -> io::Result<()>;
}

#[async_trait]
pub trait HekaConnector: Send + Sync {
    type Connection: HekaConnection;

    async fn connect(&self) -> io::Result<Self::Connection>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderState {
    Disconnected,
    Connected,
}

/// Send encoded messages over a single reusable connection.
///
/// A failed transmit closes the connection and is retried once on a new one,
/// so each [`HekaSender::send`] call makes at most two connect attempts and
/// at most two transmit attempts.
pub struct HekaSender<C: HekaConnector = NetworkConnector> {
    endpoint: HekaEndpoint,
    connector: C,
    connection: Option<C::Connection>,
    handler: Arc<dyn HekaEventHandler>,
}

impl HekaSender<NetworkConnector> {
    pub fn new(config: &HekaClientConfig, handler: Arc<dyn HekaEventHandler>) -> Self {
        HekaSender::with_connector(
            config.endpoint().clone(),
            NetworkConnector::new(config),
            handler,
        )
    }
}

impl<C: HekaConnector> HekaSender<C> {
    pub fn with_connector(
        endpoint: HekaEndpoint,
        connector: C,
        handler: Arc<dyn HekaEventHandler>,
    ) -> Self {
        HekaSender {
            endpoint,
            connector,
            connection: None,
            handler,
        }
    }

    #[inline]
    pub fn endpoint(&self) -> &HekaEndpoint {
        &self.endpoint
    }

    pub fn state(&self) -> SenderState {
        if self.connection.is_some() {
            SenderState::Connected
        } else {
            SenderState::Disconnected
        }
    }

    pub async fn send(&mut self, msg: &[u8]) -> Result<(), HekaSendError> {
        match self.send_once(msg).await {
            Err(HekaSendError::Transmit { source, .. }) => {
                self.handler.transmit_retry(&self.endpoint, &source);
                self.send_once(msg).await
            }
            r => r,
        }
    }

    /// Close the current connection if any, errors are ignored
    pub async fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            let _ = connection.close().await;
        }
    }

    async fn send_once(&mut self, msg: &[u8]) -> Result<(), HekaSendError> {
        let mut connection = match self.connection.take() {
            Some(connection) => connection,
            None => self.connect().await?,
        };

        match connection.send_msg(msg).await {
            Ok(_) => {
                self.connection = Some(connection);
                Ok(())
            }
            Err(e) => {
                let _ = connection.close().await;
                Err(HekaSendError::Transmit {
                    endpoint: self.endpoint.clone(),
                    source: e,
                })
            }
        }
    }

    async fn connect(&self) -> Result<C::Connection, HekaSendError> {
        self.handler.connecting(&self.endpoint);
        self.connector
            .connect()
            .await
            .map_err(|e| HekaSendError::Connect {
                endpoint: self.endpoint.clone(),
                source: e,
            })
    }
}

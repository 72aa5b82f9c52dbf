/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::Utc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::metric::MetricsRegistry;
use crate::sender::{HekaConnector, HekaSender, NetworkConnector};
use crate::{HekaClientConfig, HekaEventHandler, HekaIdentity, SnapshotEncoder, protocol};

// roughly 30 years, large enough to never fire while still fitting in an Instant
const MAX_EMIT_INTERVAL: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Clone, Debug)]
pub struct HekaStopHandle(CancellationToken);

impl HekaStopHandle {
    /// Stop the emit loop, it is safe to call this more than once
    pub fn stop(&self) {
        self.0.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.0.is_cancelled()
    }
}

#[derive(Debug, Default)]
pub struct HekaEmitStats {
    flush: AtomicU64,
    encode_failed: AtomicU64,
    send_failed: AtomicU64,
    skipped_fields: AtomicU64,
}

impl HekaEmitStats {
    #[inline]
    pub fn flush_total(&self) -> u64 {
        self.flush.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn encode_failed_total(&self) -> u64 {
        self.encode_failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn send_failed_total(&self) -> u64 {
        self.send_failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn skipped_fields_total(&self) -> u64 {
        self.skipped_fields.load(Ordering::Relaxed)
    }
}

/// Periodically snapshot a registry and send it to the heka server
pub struct HekaEmitter<C: HekaConnector = NetworkConnector> {
    encoder: SnapshotEncoder,
    sender: HekaSender<C>,
    handler: Arc<dyn HekaEventHandler>,
    emit_interval: Duration,
    max_message_size: usize,
    stop: CancellationToken,
    stats: Arc<HekaEmitStats>,
    write_buf: Vec<u8>,
}

impl HekaEmitter<NetworkConnector> {
    pub fn new(config: &HekaClientConfig, handler: Arc<dyn HekaEventHandler>) -> Self {
        let sender = HekaSender::new(config, handler.clone());
        HekaEmitter::with_sender(config, sender, handler)
    }
}

impl<C: HekaConnector> HekaEmitter<C> {
    pub fn with_sender(
        config: &HekaClientConfig,
        sender: HekaSender<C>,
        handler: Arc<dyn HekaEventHandler>,
    ) -> Self {
        let identity = HekaIdentity::from_config(config);
        HekaEmitter {
            encoder: SnapshotEncoder::new(identity, handler.clone()),
            sender,
            handler,
            emit_interval: config.emit_interval,
            max_message_size: config.max_message_size(),
            stop: CancellationToken::new(),
            stats: Arc::new(HekaEmitStats::default()),
            write_buf: Vec::with_capacity(4096),
        }
    }

    pub fn stop_handle(&self) -> HekaStopHandle {
        HekaStopHandle(self.stop.clone())
    }

    pub fn stats(&self) -> Arc<HekaEmitStats> {
        self.stats.clone()
    }

    #[inline]
    pub fn sender(&self) -> &HekaSender<C> {
        &self.sender
    }

    /// Flush the registry once per emit interval until stopped.
    ///
    /// The first flush happens one interval after the call. Errors are
    /// reported to the event handler and never end the loop.
    pub async fn run<R>(&mut self, registry: &R)
    where
        R: MetricsRegistry + ?Sized,
    {
        let period = self.emit_interval.min(MAX_EMIT_INTERVAL);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop = self.stop.clone();
        loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => break,
                _ = interval.tick() => self.flush(registry).await,
            }
        }

        self.sender.disconnect().await;
    }

    /// Encode and send one snapshot of the registry
    pub async fn flush<R>(&mut self, registry: &R)
    where
        R: MetricsRegistry + ?Sized,
    {
        self.stats.flush.fetch_add(1, Ordering::Relaxed);

        let msg = self.encoder.encode(registry, Utc::now());
        self.stats
            .skipped_fields
            .fetch_add(msg.skipped_fields() as u64, Ordering::Relaxed);

        if let Err(e) = protocol::encode_stream(&msg, self.max_message_size, &mut self.write_buf) {
            self.stats.encode_failed.fetch_add(1, Ordering::Relaxed);
            self.handler.encode_failed(&e);
            return;
        }

        if let Err(e) = self.sender.send(&self.write_buf).await {
            self.stats.send_failed.fetch_add(1, Ordering::Relaxed);
            self.handler.send_failed(&e);
        }
    }
}

/// Run the emitter on a dedicated thread named `heka-emit`
pub fn spawn_working_thread<R>(
    config: &HekaClientConfig,
    registry: Arc<R>,
    handler: Arc<dyn HekaEventHandler>,
) -> anyhow::Result<(JoinHandle<()>, HekaStopHandle)>
where
    R: MetricsRegistry + Send + Sync + ?Sized + 'static,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build heka emit runtime")?;

    let mut emitter = HekaEmitter::new(config, handler);
    let stop_handle = emitter.stop_handle();
    let handle = std::thread::Builder::new()
        .name("heka-emit".to_string())
        .spawn(move || {
            rt.block_on(emitter.run(&*registry));
        })
        .map_err(|e| anyhow!("failed to spawn thread: {e:?}"))?;
    Ok((handle, stop_handle))
}

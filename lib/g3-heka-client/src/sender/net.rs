/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};

use super::{HekaConnection, HekaConnector};
use crate::{HekaClientConfig, HekaEndpoint, HekaTransport};

enum ConnectionIo {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

pub struct NetworkConnection {
    io: ConnectionIo,
    write_timeout: Duration,
}

#[async_trait]
impl HekaConnection for NetworkConnection {
    async fn send_msg(&mut self, msg: &[u8]) -> io::Result<()> {
        let write = async {
            match &mut self.io {
                ConnectionIo::Tcp(stream) => {
                    stream.write_all(msg).await?;
                    stream.flush().await
                }
                ConnectionIo::Udp(socket) => {
                    let nw = socket.send(msg).await?;
                    if nw != msg.len() {
                        return Err(io::Error::new(
                            io::ErrorKind::WriteZero,
                            format!("only {nw} of {} bytes sent", msg.len()),
                        ));
                    }
                    Ok(())
                }
            }
        };
        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(r) => r,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out")),
        }
    }

    async fn close(&mut self) -> io::Result<()> {
        match &mut self.io {
            ConnectionIo::Tcp(stream) => stream.shutdown().await,
            ConnectionIo::Udp(_) => Ok(()),
        }
    }
}

/// Connect to the configured endpoint over real tcp or udp sockets
pub struct NetworkConnector {
    endpoint: HekaEndpoint,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl NetworkConnector {
    pub fn new(config: &HekaClientConfig) -> Self {
        NetworkConnector {
            endpoint: config.endpoint().clone(),
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
        }
    }

    async fn connect_io(&self) -> io::Result<ConnectionIo> {
        let peer = (self.endpoint.host(), self.endpoint.port());
        match self.endpoint.transport() {
            HekaTransport::Tcp => {
                let stream = TcpStream::connect(peer).await?;
                Ok(ConnectionIo::Tcp(stream))
            }
            HekaTransport::Udp => {
                let mut last_err = None;
                for addr in tokio::net::lookup_host(peer).await? {
                    match connect_udp(addr).await {
                        Ok(socket) => return Ok(ConnectionIo::Udp(socket)),
                        Err(e) => last_err = Some(e),
                    }
                }
                Err(last_err.unwrap_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "could not resolve to any address",
                    )
                }))
            }
        }
    }
}

async fn connect_udp(peer: SocketAddr) -> io::Result<UdpSocket> {
    let bind_ip = match peer {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0)).await?;
    socket.connect(peer).await?;
    Ok(socket)
}

#[async_trait]
impl HekaConnector for NetworkConnector {
    type Connection = NetworkConnection;

    async fn connect(&self) -> io::Result<NetworkConnection> {
        match tokio::time::timeout(self.connect_timeout, self.connect_io()).await {
            Ok(Ok(io)) => Ok(NetworkConnection {
                io,
                write_timeout: self.write_timeout,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
        }
    }
}

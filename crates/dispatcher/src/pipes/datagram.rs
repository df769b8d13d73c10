//! Datagram pipe - UDP fire-and-forget across processes
//!
//! One payload per datagram, serialized as JSON or bincode.

use std::collections::HashMap;
use std::fmt;
use std::net::{SocketAddr, UdpSocket as StdUdpSocket};
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use contracts::{DispatchTarget, Payload, Sink};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, trace, warn};

use crate::error::PipeError;
use crate::metrics::PipeMetrics;

/// Largest UDP payload over IPv4
const MAX_DATAGRAM: usize = 65507;

/// Serialization format for datagrams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

impl FromStr for WireFormat {
    type Err = PipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "bincode" => Ok(Self::Bincode),
            other => Err(PipeError::config(format!("unknown format '{other}'"))),
        }
    }
}

/// Serialize one payload
pub fn encode_payload(payload: &Payload, format: WireFormat) -> Result<Bytes, PipeError> {
    let data = match format {
        WireFormat::Json => {
            serde_json::to_vec(payload).map_err(|e| PipeError::encode(format!("json error: {e}")))?
        }
        WireFormat::Bincode => bincode::serialize(payload)
            .map_err(|e| PipeError::encode(format!("bincode error: {e}")))?,
    };
    Ok(Bytes::from(data))
}

/// Deserialize one payload
pub fn decode_payload(data: &[u8], format: WireFormat) -> Result<Payload, PipeError> {
    match format {
        WireFormat::Json => {
            serde_json::from_slice(data).map_err(|e| PipeError::decode(format!("json error: {e}")))
        }
        WireFormat::Bincode => bincode::deserialize(data)
            .map_err(|e| PipeError::decode(format!("bincode error: {e}"))),
    }
}

/// Configuration for the datagram pipe
#[derive(Debug, Clone)]
pub struct DatagramConfig {
    /// Peer address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: WireFormat,
    /// Max datagram size, larger payloads are dropped
    pub max_packet_size: usize,
}

impl DatagramConfig {
    pub fn new(addr: SocketAddr, format: WireFormat) -> Self {
        Self {
            addr,
            format,
            max_packet_size: 65000,
        }
    }

    /// Create config from a params map (`addr`, `format`, `max_packet_size`)
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, PipeError> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| PipeError::config("missing 'addr' parameter"))?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| PipeError::config(format!("invalid address '{addr_str}': {e}")))?;

        let format = match params.get("format") {
            Some(format) => format.parse()?,
            None => WireFormat::Json,
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000)
            .min(MAX_DATAGRAM);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends each payload as one UDP datagram
///
/// Sending never blocks the caller: UDP send either completes immediately
/// or fails, and failures are only logged.
pub struct DatagramSink {
    name: String,
    config: DatagramConfig,
    socket: StdUdpSocket,
    metrics: Arc<PipeMetrics>,
}

impl DatagramSink {
    /// Bind an ephemeral local port and connect to `config.addr`
    #[instrument(name = "datagram_sink_connect", skip(name, config), fields(peer = %config.addr))]
    pub fn connect(name: impl Into<String>, config: DatagramConfig) -> Result<Self, PipeError> {
        let name = name.into();
        let local: SocketAddr = if config.addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = StdUdpSocket::bind(local)?;
        socket.connect(config.addr)?;

        debug!(pipe = %name, peer = %config.addr, "DatagramSink connected");

        Ok(Self {
            name,
            config,
            socket,
            metrics: Arc::new(PipeMetrics::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<PipeMetrics> {
        &self.metrics
    }

    fn drop_payload(&self) {
        self.metrics.inc_dropped();
        observability::record_pipe_dropped(&self.name);
    }
}

impl Sink for DatagramSink {
    fn send(&self, payload: Payload) {
        let data = match encode_payload(&payload, self.config.format) {
            Ok(data) => data,
            Err(e) => {
                self.drop_payload();
                warn!(pipe = %self.name, error = %e, "Payload not serializable, dropped");
                return;
            }
        };

        if data.len() > self.config.max_packet_size {
            self.drop_payload();
            warn!(
                pipe = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Datagram too large, dropped"
            );
            return;
        }

        match self.socket.send(&data) {
            Ok(sent) => {
                self.metrics.inc_delivered();
                trace!(pipe = %self.name, bytes = sent, "Sent");
            }
            Err(e) => {
                // UDP is best-effort
                self.drop_payload();
                error!(pipe = %self.name, error = %e, "UDP send failed");
            }
        }
    }
}

impl fmt::Debug for DatagramSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatagramSink")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

/// Receiving side: decodes datagrams and dispatches them
pub struct DatagramReceiver {
    name: String,
    socket: UdpSocket,
    format: WireFormat,
    metrics: Arc<PipeMetrics>,
}

impl DatagramReceiver {
    /// Bind to `addr` (port 0 picks a free port)
    pub async fn bind(
        name: impl Into<String>,
        addr: SocketAddr,
        format: WireFormat,
    ) -> Result<Self, PipeError> {
        let name = name.into();
        let socket = UdpSocket::bind(addr).await?;
        let local = socket.local_addr()?;
        debug!(pipe = %name, addr = %local, "DatagramReceiver bound");

        Ok(Self {
            name,
            socket,
            format,
            metrics: Arc::new(PipeMetrics::new()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, PipeError> {
        Ok(self.socket.local_addr()?)
    }

    pub fn metrics(&self) -> &Arc<PipeMetrics> {
        &self.metrics
    }

    /// Receive and dispatch until the socket fails
    #[instrument(name = "datagram_receiver_loop", skip(self, target), fields(pipe = %self.name))]
    pub async fn run<T: DispatchTarget>(self, target: T) -> Result<(), PipeError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let (len, peer) = self.socket.recv_from(&mut buf).await?;

            let payload = match decode_payload(&buf[..len], self.format) {
                Ok(payload) => payload,
                Err(e) => {
                    self.metrics.inc_faults();
                    warn!(pipe = %self.name, %peer, error = %e, "Undecodable datagram");
                    continue;
                }
            };

            match target.dispatch(&payload) {
                Ok(true) => self.metrics.inc_delivered(),
                Ok(false) => {
                    self.metrics.inc_unmatched();
                    debug!(
                        pipe = %self.name,
                        class_name = ?payload.class_name(),
                        "No receiver consumed payload"
                    );
                }
                Err(e) => {
                    self.metrics.inc_faults();
                    warn!(pipe = %self.name, %peer, error = %e, "Dispatch failed");
                }
            }
        }
    }

    /// Run the receive loop on a tokio task
    pub fn spawn<T: DispatchTarget + 'static>(
        self,
        target: T,
    ) -> JoinHandle<Result<(), PipeError>> {
        tokio::spawn(self.run(target))
    }
}

impl fmt::Debug for DatagramReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatagramReceiver")
            .field("name", &self.name)
            .field("format", &self.format)
            .finish()
    }
}

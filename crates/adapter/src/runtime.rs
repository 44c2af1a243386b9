//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::core::GameSnapshot;
use crate::protocol::{build_observation, create_ack, AckMessage, LayoutInfo, ObservationMessage};
use crate::server::{run_server, ServerConfig, ServerStatus};
use crate::types::Intent;

/// Command delivered to the game loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    /// Apply in order, then ack with the number that changed the game.
    Intents(Vec<Intent>),
    /// A client just subscribed and wants the current state.
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Ack { client_id: usize, ack: AckMessage },
    Observation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<ServerStatus>,
    local_addr: SocketAddr,
    seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `BALANCE_ADAPTER_DISABLED` is set.
    pub fn start_from_env(layout: LayoutInfo) -> Result<Option<Self>> {
        let config = ServerConfig::from_env();
        if config.disabled {
            info!("adapter disabled via BALANCE_ADAPTER_DISABLED");
            return Ok(None);
        }
        Self::start(config, layout).map(Some)
    }

    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig, layout: LayoutInfo) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();
        let status = Arc::new(ServerStatus::default());

        let rt = Runtime::new().context("creating adapter runtime")?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            if let Err(e) = run_server(config, layout, cmd_tx, out_rx, server_status, Some(ready_tx)).await {
                error!(error = %e, "adapter server stopped");
            }
        });
        let local_addr = rt
            .block_on(ready_rx)
            .context("adapter server failed to start")?;

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
            local_addr,
            seq: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn ack(&mut self, client_id: usize, ack_seq: u64, applied: usize) {
        let ack = create_ack(self.next_seq(), ack_seq, applied);
        self.send(OutboundMessage::Ack { client_id, ack });
    }

    /// Send the current state to one client.
    pub fn send_snapshot(&mut self, client_id: usize, snap: &GameSnapshot) {
        let obs = build_observation(snap, self.next_seq());
        self.send(OutboundMessage::Observation { client_id, obs });
    }

    /// Send the current state to every streaming client.
    pub fn broadcast_snapshot(&mut self, snap: &GameSnapshot) {
        if self.status.streaming_count() == 0 {
            return;
        }
        let obs = build_observation(snap, self.next_seq());
        self.send(OutboundMessage::BroadcastObservation { obs });
    }

    pub fn client_count(&self) -> usize {
        self.status.client_count()
    }

    pub fn streaming_count(&self) -> usize {
        self.status.streaming_count()
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

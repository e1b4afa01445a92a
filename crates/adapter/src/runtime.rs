//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server. The server
//! runs on its own tokio runtime; the loop polls commands with
//! [`Adapter::try_recv`] and answers through [`Adapter::send`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::GameSnapshot;
use crate::protocol::{AckMessage, ErrorMessage, ObservationMessage};
use crate::server::{build_observation, run_server_with_status, ServerConfig};
use crate::types::{CoreEvent, GameAction};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundPayload {
    Command(GameAction),
    /// A client that asked for observations wants one right away.
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
}

/// Connection counters shared between the server and the game loop.
#[derive(Debug, Default)]
pub struct AdapterStatus {
    client_count: AtomicUsize,
    /// Controller client id, 0 when there is none.
    controller_id: AtomicU64,
}

impl AdapterStatus {
    pub fn client_count(&self) -> usize {
        self.client_count.load(Ordering::Relaxed)
    }

    pub fn controller_id(&self) -> Option<usize> {
        match self.controller_id.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id as usize),
        }
    }

    pub(crate) fn set_client_count(&self, n: usize) {
        self.client_count.store(n, Ordering::Relaxed);
    }

    pub(crate) fn set_controller(&self, id: Option<usize>) {
        self.controller_id
            .store(id.map_or(0, |id| id as u64), Ordering::Relaxed);
    }
}

/// Observation numbering for the game loop.
///
/// Direct replies and broadcasts share one counter, so every observation a
/// client receives has a larger `seq` than the one before it.
#[derive(Debug, Default)]
pub struct ObservationFeed {
    seq: u64,
    last_broadcast: Option<u64>,
}

impl ObservationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seq of the most recent observation.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Observation for one client that asked for a snapshot.
    pub fn reply(&mut self, client_id: usize, snap: &GameSnapshot) -> OutboundMessage {
        self.seq += 1;
        OutboundMessage::ToClientObservation {
            client_id,
            obs: build_observation(snap, self.seq, None),
        }
    }

    /// Broadcast when an event fired or the state changed since the last one.
    pub fn broadcast(
        &mut self,
        snap: &GameSnapshot,
        event: Option<CoreEvent>,
    ) -> Option<OutboundMessage> {
        let fingerprint = snap.fingerprint();
        if event.is_none() && self.last_broadcast == Some(fingerprint) {
            return None;
        }
        self.seq += 1;
        self.last_broadcast = Some(fingerprint);
        Some(OutboundMessage::BroadcastObservation {
            obs: build_observation(snap, self.seq, event),
        })
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<AdapterStatus>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `MEMORY_ADAPTER_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            log::info!("adapter disabled via MEMORY_ADAPTER_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let status = Arc::new(AdapterStatus::default());

        let rt = Runtime::new().context("creating tokio runtime for the adapter")?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            let served = run_server_with_status(config, server_status, cmd_tx, out_rx, None).await;
            if let Err(e) = served {
                log::error!("adapter server stopped: {:#}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> &AdapterStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameState;

    #[test]
    fn status_reports_controller() {
        let st = AdapterStatus::default();
        assert_eq!(st.controller_id(), None);
        st.set_controller(Some(3));
        st.set_client_count(2);
        assert_eq!(st.controller_id(), Some(3));
        assert_eq!(st.client_count(), 2);
        st.set_controller(None);
        assert_eq!(st.controller_id(), None);
    }

    fn obs_seq(msg: &OutboundMessage) -> u64 {
        match msg {
            OutboundMessage::ToClientObservation { obs, .. }
            | OutboundMessage::BroadcastObservation { obs } => obs.seq,
            other => panic!("expected an observation, got {:?}", other),
        }
    }

    #[test]
    fn snapshot_replies_share_the_observation_counter() {
        let mut gs = GameState::new(5, 4);
        gs.start();
        let mut feed = ObservationFeed::new();

        let first = feed.broadcast(&gs.snapshot(), None).unwrap();
        assert_eq!(obs_seq(&first), 1);

        // A client seq far ahead of the loop must not leak into the reply.
        let reply = feed.reply(7, &gs.snapshot());
        assert!(matches!(
            reply,
            OutboundMessage::ToClientObservation { client_id: 7, .. }
        ));
        assert_eq!(obs_seq(&reply), 2);

        gs.apply_action(GameAction::Select(0));
        let next = feed.broadcast(&gs.snapshot(), gs.take_last_event()).unwrap();
        assert_eq!(obs_seq(&next), 3);
        assert_eq!(feed.seq(), 3);
    }

    #[test]
    fn unchanged_state_is_not_broadcast_twice() {
        let mut gs = GameState::new(5, 4);
        gs.start();
        let mut feed = ObservationFeed::new();

        assert!(feed.broadcast(&gs.snapshot(), None).is_some());
        assert!(feed.broadcast(&gs.snapshot(), None).is_none());
        feed.reply(1, &gs.snapshot());
        assert!(feed.broadcast(&gs.snapshot(), None).is_none());
        assert_eq!(feed.seq(), 2);
    }
}

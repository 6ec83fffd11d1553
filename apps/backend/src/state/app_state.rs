use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::engine::EngineConfig;
use crate::services::clock::{Clock, SystemClock};
use crate::services::ledger::InMemoryLedger;
use crate::services::lobby::Lobby;
use crate::services::match_registry::MatchRegistry;
use crate::services::transport::Transport;
use crate::ws::hub::WsRegistry;

/// Shared resources handed to every HTTP handler and WebSocket session.
#[derive(Clone)]
pub struct AppState {
    pub config: EngineConfig,
    pub ledger: Arc<InMemoryLedger>,
    pub registry: Arc<MatchRegistry>,
    pub lobby: Arc<Lobby>,
    pub ws: Arc<WsRegistry>,
    /// Cancels background tasks (deadline sweeper) on shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the production graph: WebSocket transport, system clock and an
    /// in-memory ledger.
    pub fn new(config: EngineConfig) -> Self {
        let ws = Arc::new(WsRegistry::new());
        Self::with_parts(config, ws.clone(), ws, Arc::new(SystemClock))
    }

    /// Wire with an explicit transport and clock; `ws` still tracks
    /// connections for the health endpoint.
    pub fn with_parts(
        config: EngineConfig,
        ws: Arc<WsRegistry>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = Arc::new(InMemoryLedger::new(config.starting_balance));
        let registry = MatchRegistry::new(ledger.clone(), transport, clock, config.action_window);
        let lobby = Arc::new(Lobby::new(
            registry.clone(),
            config.min_stake,
            config.max_stake,
        ));
        Self {
            config,
            ledger,
            registry,
            lobby,
            ws,
            shutdown: CancellationToken::new(),
        }
    }
}

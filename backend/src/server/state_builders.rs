//! Builders wiring repositories and domain services into adapter state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    CodeRepository, EventPublisher, EventSubscriber, PlayerRepository, PrizeRepository,
    SpinLogRepository,
};
use crate::domain::{
    AdminCredentials, CodeAdminService, ConfiguredAdminAuthenticator, DrawSource, HISTORY_LIMIT,
    LiveStatsBroadcaster, PlayerAccessService, PlayerAdminService, PresenceService, PresenceTracker,
    PrizeAdminService, RedemptionPorts, RedemptionService, SpinHistoryService, StatsService,
    ThreadRngDraw,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::ws::origin::OriginPolicy;
use crate::inbound::ws::state::WsState;
use crate::outbound::events::BroadcastHub;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselCodeRepository, DieselPlayerRepository, DieselPrizeRepository,
    DieselSpinLogRepository,
};

/// Storage backend label reported by the health probes.
pub const MEMORY_STORAGE: &str = "memory";
pub const POSTGRES_STORAGE: &str = "postgres";

/// Driven repository ports shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub codes: Arc<dyn CodeRepository>,
    pub prizes: Arc<dyn PrizeRepository>,
    pub logs: Arc<dyn SpinLogRepository>,
    pub players: Arc<dyn PlayerRepository>,
    pub storage: &'static str,
}

impl Repositories {
    /// Every port backed by one in-process store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            codes: store.clone(),
            prizes: store.clone(),
            logs: store.clone(),
            players: store,
            storage: MEMORY_STORAGE,
        }
    }

    /// Every port backed by PostgreSQL.
    pub fn postgres(pool: &DbPool) -> Self {
        Self {
            codes: Arc::new(DieselCodeRepository::new(pool.clone())),
            prizes: Arc::new(DieselPrizeRepository::new(pool.clone())),
            logs: Arc::new(DieselSpinLogRepository::new(pool.clone())),
            players: Arc::new(DieselPlayerRepository::new(pool.clone())),
            storage: POSTGRES_STORAGE,
        }
    }

    /// PostgreSQL when a pool is available, otherwise a fresh in-memory store.
    pub fn from_pool(pool: Option<&DbPool>) -> Self {
        match pool {
            Some(pool) => Self::postgres(pool),
            None => Self::in_memory(Arc::new(InMemoryStore::new())),
        }
    }
}

/// Tunables for the service graph.
#[derive(Clone)]
pub struct ServiceOptions {
    pub admin: AdminCredentials,
    pub history_limit: u32,
    pub origins: OriginPolicy,
    pub clock: Arc<dyn Clock>,
    pub draw: Arc<dyn DrawSource>,
}

impl ServiceOptions {
    /// Defaults: the wall clock, thread-local draws, the standard history
    /// size and an empty origin allow-list.
    pub fn new(admin: AdminCredentials) -> Self {
        Self {
            admin,
            history_limit: HISTORY_LIMIT,
            origins: OriginPolicy::default(),
            clock: Arc::new(DefaultClock),
            draw: Arc::new(ThreadRngDraw),
        }
    }

    #[must_use]
    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub fn with_origins(mut self, origins: OriginPolicy) -> Self {
        self.origins = origins;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_draw(mut self, draw: Arc<dyn DrawSource>) -> Self {
        self.draw = draw;
        self
    }
}

/// State handed to the HTTP and WebSocket adapters.
#[derive(Clone)]
pub struct AdapterStates {
    pub http: HttpState,
    pub ws: WsState,
}

/// Assemble the domain services over `repos`, publishing through `hub`.
pub fn build_states(
    repos: &Repositories,
    hub: Arc<BroadcastHub>,
    options: ServiceOptions,
) -> AdapterStates {
    let ServiceOptions {
        admin,
        history_limit,
        origins,
        clock,
        draw,
    } = options;
    let publisher: Arc<dyn EventPublisher> = hub.clone();
    let subscriber: Arc<dyn EventSubscriber> = hub;
    let presence = Arc::new(PresenceTracker::default());
    let broadcaster = LiveStatsBroadcaster::new(
        repos.players.clone(),
        repos.codes.clone(),
        repos.logs.clone(),
        presence.clone(),
        publisher,
    );

    let spins = RedemptionService::new(
        RedemptionPorts {
            codes: repos.codes.clone(),
            prizes: repos.prizes.clone(),
            logs: repos.logs.clone(),
            players: repos.players.clone(),
        },
        broadcaster.clone(),
        clock.clone(),
        draw,
    );
    let history =
        SpinHistoryService::new(repos.logs.clone(), clock.clone()).with_history_limit(history_limit);

    let http = HttpState {
        spins: Arc::new(spins),
        history: Arc::new(history),
        players: Arc::new(PlayerAccessService::new(
            repos.players.clone(),
            broadcaster.clone(),
            clock.clone(),
        )),
        player_admin: Arc::new(PlayerAdminService::new(
            repos.players.clone(),
            broadcaster.clone(),
        )),
        admin_auth: Arc::new(ConfiguredAdminAuthenticator::new(admin)),
        codes: Arc::new(CodeAdminService::new(
            repos.codes.clone(),
            broadcaster.clone(),
            clock.clone(),
        )),
        prizes: Arc::new(PrizeAdminService::new(
            repos.prizes.clone(),
            broadcaster.clone(),
            clock,
        )),
        stats: Arc::new(StatsService::new(repos.codes.clone(), repos.players.clone())),
    };
    let ws = WsState::new(
        Arc::new(PresenceService::new(presence, broadcaster)),
        subscriber,
        origins,
    );
    AdapterStates { http, ws }
}

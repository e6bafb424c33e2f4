//! Core Roulette struct: canonical in-memory roster plus its persistence.

use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tracing::info;
use tracing::warn;

use crate::config::BaseConfig;
use crate::selector;
use crate::store::RosterStoreVariant;
use crate::traits::RosterStore;
use crate::types::Member;
use crate::types::MemberChance;
use crate::types::Roster;

/// In-memory roster and whether it ever came from the store.
#[derive(Debug)]
struct RosterState {
    roster: Roster,
    loaded: bool,
}

/// What a pending notice is about. A successful save only clears save failures;
/// a load failure stays until a reload succeeds or the user dismisses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Load,
    Save,
}

/// Application orchestrator.
///
/// Holds the authoritative roster. Every mutation runs under one lock held across
/// both the change and the save, so at most one mutation is in flight at a time.
/// Store failures never undo a mutation; they leave a notice for the user instead.
#[derive(Clone)]
pub struct Roulette {
    /// Roster store implementation.
    pub store: Arc<Mutex<RosterStoreVariant>>,

    /// Global/base configuration.
    pub config: BaseConfig,

    state: Arc<Mutex<RosterState>>,
    notice: Arc<Mutex<Option<(NoticeKind, String)>>>,
    rng: Arc<Mutex<StdRng>>,
}

impl Roulette {
    /// Create a Roulette over an already opened store. Call [`Roulette::refresh`]
    /// to pull the stored roster.
    pub fn new(store: RosterStoreVariant, config: BaseConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            config,
            state: Arc::new(Mutex::new(RosterState {
                roster: Roster::seeded(),
                loaded: false,
            })),
            notice: Arc::new(Mutex::new(None)),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(self, rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
            ..self
        }
    }

    /// Resolve the store from `config`, open it and load the roster.
    pub async fn initialize(config: BaseConfig) -> Result<Self> {
        let store = RosterStoreVariant::resolve(&config).await?;
        info!("Roster store ready: {}", store.name());

        let roulette = Self::new(store, config);
        roulette.refresh().await;
        Ok(roulette)
    }

    /// Reload from the store. Also the "try again" action after a failed load.
    ///
    /// On failure the last loaded roster is kept, or the seeded roster if nothing
    /// was ever loaded, and a notice is recorded.
    pub async fn refresh(&self) -> Roster {
        let mut state = self.state.lock().await;
        let result = self.store.lock().await.load().await;

        match result {
            Ok(roster) => {
                info!("Loaded roster with {} members", roster.len());
                state.roster = roster;
                state.loaded = true;
                self.set_notice(None).await;
            }
            Err(e) => {
                warn!("Failed to load roster: {}", e);
                if !state.loaded {
                    state.roster = Roster::seeded();
                }
                self.set_notice(Some((
                    NoticeKind::Load,
                    format!("Failed to load roster: {}", e),
                )))
                .await;
            }
        }

        state.roster.clone()
    }

    /// Current roster snapshot.
    pub async fn roster(&self) -> Roster {
        self.state.lock().await.roster.clone()
    }

    /// Chance rows for display, in roster order.
    pub async fn chances(&self) -> Vec<MemberChance> {
        selector::chances(&self.state.lock().await.roster)
    }

    /// Add a member. Blank names are ignored without touching the store.
    pub async fn add_member(&self, name: &str) -> Roster {
        let mut state = self.state.lock().await;
        let updated = selector::add_member(&state.roster, name);
        if updated == state.roster {
            return updated;
        }

        state.roster = updated;
        self.persist(&state.roster).await;
        state.roster.clone()
    }

    /// Remove a member. Unknown ids are ignored without touching the store.
    pub async fn remove_member(&self, id: &str) -> Roster {
        let mut state = self.state.lock().await;
        if state.roster.get(id).is_none() {
            return state.roster.clone();
        }

        state.roster = selector::remove_member(&state.roster, id);
        self.persist(&state.roster).await;
        state.roster.clone()
    }

    /// Pick a member fairly and persist the reweighted roster.
    /// `None` means the roster is empty.
    pub async fn select(&self) -> Option<Member> {
        let mut state = self.state.lock().await;
        if state.roster.is_empty() {
            return None;
        }

        let selection = {
            let mut rng = self.rng.lock().await;
            selector::select_fairly(&state.roster, &mut *rng)
        };

        state.roster = selection.roster;
        if let Some(member) = &selection.selected {
            info!("Selected {} ({})", member.name, member.id);
        }
        self.persist(&state.roster).await;
        selection.selected
    }

    /// Pending user-facing notice about a persistence failure, if any.
    ///
    /// A failed load is reported until [`Roulette::refresh`] succeeds or the notice
    /// is dismissed; later saves do not clear it. A failed save is cleared by the
    /// next successful one.
    pub async fn notice(&self) -> Option<String> {
        self.notice
            .lock()
            .await
            .as_ref()
            .map(|(_, message)| message.clone())
    }

    pub async fn dismiss_notice(&self) {
        self.set_notice(None).await;
    }

    /// Close the underlying store.
    pub async fn close(&self) -> Result<()> {
        self.store.lock().await.close().await
    }

    async fn persist(&self, roster: &Roster) {
        let result = self.store.lock().await.save(roster).await;
        match result {
            Ok(()) => {
                let mut notice = self.notice.lock().await;
                if matches!(notice.as_ref(), Some((NoticeKind::Save, _))) {
                    *notice = None;
                }
            }
            Err(e) => {
                warn!("Failed to save roster, keeping in-memory copy: {}", e);
                let mut notice = self.notice.lock().await;
                if !matches!(notice.as_ref(), Some((NoticeKind::Load, _))) {
                    *notice = Some((NoticeKind::Save, format!("Failed to save roster: {}", e)));
                }
            }
        }
    }

    async fn set_notice(&self, notice: Option<(NoticeKind, String)>) {
        *self.notice.lock().await = notice;
    }
}

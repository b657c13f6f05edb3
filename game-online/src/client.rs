use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use game_core::avatars::{next_avatar, random_avatar};
use game_core::rules::{VoteTally, tally_votes};
use game_core::validation::validate_player_name;
use game_types::{
    DEFAULT_CATEGORIES, DEFAULT_GAME_DURATION_SECS, OnlineGameState, OnlinePlayer, OnlineRoom,
    PlayerId, RoomSettings, RoomSettingsPatch, RoomStatus, ValidationError, VoteOutcome,
};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::errors::RoomError;
use crate::expiry::{RoomExpiry, now_millis};
use crate::identity::IdentityProvider;
use crate::room_code::{generate_room_code, is_valid_room_code, normalize_room_code};
use crate::store::{RoomStore, Subscription, SubscriptionId, TransactOutcome, room_path};
use crate::sync;

pub const ROOM_CLOSED: &str = "room closed";

/// Client view shared with the subscription task.
struct SharedState {
    state: RwLock<OnlineGameState>,
    snapshots: watch::Sender<OnlineGameState>,
}

impl SharedState {
    async fn modify(&self, f: impl FnOnce(&mut OnlineGameState)) {
        let mut state = self.state.write().await;
        f(&mut state);
        self.snapshots.send_replace(state.clone());
    }
}

struct ActiveSubscription {
    code: String,
    id: SubscriptionId,
    task: JoinHandle<()>,
}

/// One device's handle on the online protocol.
///
/// Every host-only operation re-reads the room and quietly does nothing when
/// this device is not the host. At most one room subscription is live.
pub struct RoomClient {
    store: Arc<dyn RoomStore>,
    config: Config,
    expiry: RoomExpiry,
    player_id: PlayerId,
    is_premium: bool,
    shared: Arc<SharedState>,
    subscription: Mutex<Option<ActiveSubscription>>,
}

impl RoomClient {
    pub async fn connect(
        store: Arc<dyn RoomStore>,
        identity: &dyn IdentityProvider,
        config: Config,
        is_premium: bool,
    ) -> Result<Self, RoomError> {
        let player_id = identity.player_id().await?;
        let initial = OnlineGameState {
            player_id: Some(player_id.clone()),
            ..Default::default()
        };
        let (snapshots, _) = watch::channel(initial.clone());

        Ok(Self {
            store,
            expiry: RoomExpiry::from_config(&config),
            config,
            player_id,
            is_premium,
            shared: Arc::new(SharedState {
                state: RwLock::new(initial),
                snapshots,
            }),
            subscription: Mutex::new(None),
        })
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub async fn state(&self) -> OnlineGameState {
        self.shared.state.read().await.clone()
    }

    /// Receiver that sees every change to the client view.
    pub fn snapshots(&self) -> watch::Receiver<OnlineGameState> {
        self.shared.snapshots.subscribe()
    }

    pub async fn create_room(&self, player_name: &str) -> Result<String, RoomError> {
        let name = validate_player_name(player_name)?;
        let code = self.allocate_code().await?;
        let avatar = {
            let mut rng = rand::thread_rng();
            random_avatar(&mut rng)
        };

        let host = OnlinePlayer::new(self.player_id.clone(), name, avatar, true);
        let room = OnlineRoom {
            id: code.clone(),
            host_id: self.player_id.clone(),
            status: RoomStatus::Waiting,
            players: [(self.player_id.clone(), host)].into_iter().collect(),
            settings: RoomSettings {
                impostor_count: 1,
                game_duration: Some(DEFAULT_GAME_DURATION_SECS),
                language: self.config.default_language,
                categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
                custom_categories: Vec::new(),
                is_premium_room: self.is_premium,
            },
            current_word: None,
            current_impostors: Vec::new(),
            winner: None,
            created_at: now_millis(),
        };

        self.store
            .write(&room_path(&code), serde_json::to_value(&room)?)
            .await?;
        info!("Room {} created by {}", code, self.player_id);

        self.enter_room(&code, room).await?;
        Ok(code)
    }

    /// Join (or rejoin) a room. `Ok(false)` when the room does not exist or
    /// has expired.
    pub async fn join_room(&self, code: &str, player_name: &str) -> Result<bool, RoomError> {
        let name = validate_player_name(player_name)?;
        let code = normalize_room_code(code);
        if !is_valid_room_code(&code, self.config.room_code_length) {
            debug!("Rejecting malformed room code {:?}", code);
            return Ok(false);
        }

        let Some(room) = self.fetch_room(&code).await? else {
            return Ok(false);
        };

        if self.expiry.is_expired(&room, now_millis()) {
            info!("Room {} expired, deleting it", code);
            self.store.delete(&room_path(&code)).await?;
            return Ok(false);
        }
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::AlreadyStarted);
        }

        let player_path = format!("{}/players/{}", room_path(&code), self.player_id);
        if room.players.contains_key(&self.player_id) {
            let mut patch = Map::new();
            patch.insert("name".to_string(), Value::String(name));
            self.store.update(&player_path, patch).await?;
            info!("{} rejoined room {}", self.player_id, code);
        } else {
            if room.players.len() >= self.config.max_players_per_room {
                return Err(RoomError::RoomFull {
                    max: self.config.max_players_per_room,
                });
            }
            let avatar = {
                let mut rng = rand::thread_rng();
                next_avatar(room.players.values().map(|p| &p.avatar), &mut rng)
            };
            let player = OnlinePlayer::new(self.player_id.clone(), name, avatar, false);
            self.store
                .write(&player_path, serde_json::to_value(&player)?)
                .await?;
            info!("{} joined room {}", self.player_id, code);
        }

        self.enter_room(&code, room).await?;
        Ok(true)
    }

    /// Leave the current room. A leaving host closes the room for everyone;
    /// the last regular player out deletes it too.
    pub async fn leave_room(&self) -> Result<(), RoomError> {
        let Some(code) = self.shared.state.read().await.room_code.clone() else {
            return Ok(());
        };
        self.teardown_subscription().await;

        let result = self.remove_self(&code).await;
        if let Err(e) = &result {
            warn!("Error leaving room {}: {}", code, e);
        }

        self.shared
            .modify(|state| {
                state.room_code = None;
                state.room = None;
                state.is_host = false;
            })
            .await;
        result
    }

    async fn remove_self(&self, code: &str) -> Result<(), RoomError> {
        let Some(room) = self.fetch_room(code).await? else {
            return Ok(());
        };

        if room.is_host(&self.player_id) {
            info!("Host {} closed room {}", self.player_id, code);
            return Ok(self.store.delete(&room_path(code)).await?);
        }

        let players_path = format!("{}/players", room_path(code));
        self.store
            .delete(&format!("{}/{}", players_path, self.player_id))
            .await?;
        info!("{} left room {}", self.player_id, code);

        // Another player can join between these two calls and lose the room.
        if self.store.read(&players_path).await?.is_none() {
            info!("Room {} is empty, deleting it", code);
            self.store.delete(&room_path(code)).await?;
        }
        Ok(())
    }

    pub async fn update_settings(&self, settings: RoomSettingsPatch) -> Result<(), RoomError> {
        let Some((code, _)) = self.host_room("update_settings").await? else {
            return Ok(());
        };

        if settings.categories.as_ref().is_some_and(|c| c.is_empty()) {
            return Err(ValidationError::NoCategorySelected.into());
        }

        let patch = match serde_json::to_value(&settings)? {
            Value::Object(patch) => patch,
            _ => Map::new(),
        };
        if patch.is_empty() {
            return Ok(());
        }
        self.store
            .update(&format!("{}/settings", room_path(&code)), patch)
            .await?;
        Ok(())
    }

    pub async fn start_game(&self) -> Result<(), RoomError> {
        let Some((code, room)) = self.host_room("start_game").await? else {
            return Ok(());
        };

        let required = self.config.min_players_to_start;
        if room.players.len() < required {
            return Err(ValidationError::NotEnoughPlayers {
                required: required as u32,
                actual: room.players.len() as u32,
            }
            .into());
        }

        let patch = {
            let mut rng = rand::thread_rng();
            sync::start_round_patch(&room, &mut rng)?
        };
        self.store.update(&room_path(&code), patch).await?;
        info!("Round started in room {} with {} players", code, room.players.len());
        Ok(())
    }

    pub async fn start_voting(&self) -> Result<(), RoomError> {
        let Some((code, room)) = self.host_room("start_voting").await? else {
            return Ok(());
        };
        if room.status != RoomStatus::Playing {
            debug!("Room {} is {:?}, not starting a vote", code, room.status);
            return Ok(());
        }
        self.store
            .update(&room_path(&code), sync::start_voting_patch())
            .await?;
        Ok(())
    }

    pub async fn submit_vote(&self, target: &str) -> Result<(), RoomError> {
        let code = self.current_code().await?;
        let room = self.fetch_room(&code).await?.ok_or(RoomError::NotFound)?;

        if room.status != RoomStatus::Voting {
            debug!("Room {} is not voting, dropping vote", code);
            return Ok(());
        }
        let voter = room.players.get(&self.player_id).ok_or(RoomError::NotInRoom)?;
        if voter.is_eliminated {
            debug!("{} is eliminated and cannot vote", self.player_id);
            return Ok(());
        }
        let valid_target = target != self.player_id
            && room.players.get(target).is_some_and(|p| !p.is_eliminated);
        if !valid_target {
            return Err(ValidationError::InvalidVoteTarget.into());
        }

        self.store
            .update(&room_path(&code), sync::vote_patch(&self.player_id, target))
            .await?;
        Ok(())
    }

    /// Eliminate a player and settle the round atomically against the
    /// latest room document.
    pub async fn eliminate_player(
        &self,
        player_id: &str,
    ) -> Result<Option<VoteOutcome>, RoomError> {
        let Some((code, room)) = self.host_room("eliminate_player").await? else {
            return Ok(None);
        };
        if room.status != RoomStatus::Voting {
            debug!("Room {} is {:?}, not eliminating", code, room.status);
            return Ok(None);
        }

        let (sender, receiver) = oneshot::channel();
        let target = player_id.to_string();
        let committed = self
            .store
            .transact(
                &room_path(&code),
                Box::new(move |current| {
                    let Some(mut room) =
                        current.and_then(|v| serde_json::from_value::<OnlineRoom>(v).ok())
                    else {
                        return TransactOutcome::Abort;
                    };
                    let Some(outcome) = sync::apply_elimination(&mut room, &target) else {
                        return TransactOutcome::Abort;
                    };
                    match serde_json::to_value(&room) {
                        Ok(value) => {
                            let _ = sender.send(outcome);
                            TransactOutcome::Commit(value)
                        }
                        Err(_) => TransactOutcome::Abort,
                    }
                }),
            )
            .await?;

        if !committed {
            return Ok(None);
        }
        let outcome = receiver.await.ok();
        if let Some(outcome) = &outcome {
            info!(
                "Eliminated {} in room {} (impostor: {}, winner: {:?})",
                outcome.eliminated, code, outcome.was_impostor, outcome.winner
            );
        }
        Ok(outcome)
    }

    /// Clear the votes and go back to discussing the same word.
    pub async fn resume_discussion(&self) -> Result<(), RoomError> {
        let Some((code, room)) = self.host_room("resume_discussion").await? else {
            return Ok(());
        };
        if room.status != RoomStatus::Voting {
            debug!("Room {} is {:?}, nothing to resume", code, room.status);
            return Ok(());
        }
        self.store
            .update(&room_path(&code), sync::resume_discussion_patch(&room))
            .await?;
        Ok(())
    }

    /// Deal new roles and draw a new word.
    pub async fn new_round(&self) -> Result<(), RoomError> {
        self.start_game().await
    }

    pub async fn play_again(&self) -> Result<(), RoomError> {
        self.new_round().await
    }

    /// Votes cast by active players in the last room snapshot.
    pub async fn vote_tally(&self) -> Option<VoteTally> {
        let state = self.shared.state.read().await;
        let room = state.room.as_ref()?;
        let roster = room.roster();
        let eligible: Vec<&str> = roster
            .iter()
            .filter(|p| !p.is_eliminated)
            .map(|p| p.id.as_str())
            .collect();
        let votes = roster
            .iter()
            .filter_map(|p| p.vote.as_deref().map(|target| (p.id.as_str(), target)));
        Some(tally_votes(votes, &eligible))
    }

    async fn allocate_code(&self) -> Result<String, RoomError> {
        let attempts = self.config.room_code_attempts.max(1);
        for _ in 0..attempts {
            let code = {
                let mut rng = rand::thread_rng();
                generate_room_code(&mut rng, self.config.room_code_length)
            };
            if self.store.read(&room_path(&code)).await?.is_none() {
                return Ok(code);
            }
            debug!("Room code {} is taken", code);
        }
        Err(RoomError::NoFreeCode { attempts })
    }

    async fn fetch_room(&self, code: &str) -> Result<Option<OnlineRoom>, RoomError> {
        match self.store.read(&room_path(code)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn current_code(&self) -> Result<String, RoomError> {
        self.shared
            .state
            .read()
            .await
            .room_code
            .clone()
            .ok_or(RoomError::NotInRoom)
    }

    /// The current room if this device hosts it. `None` (logged) otherwise.
    async fn host_room(&self, operation: &str) -> Result<Option<(String, OnlineRoom)>, RoomError> {
        let code = self.current_code().await?;
        let room = self.fetch_room(&code).await?.ok_or(RoomError::NotFound)?;
        if !room.is_host(&self.player_id) {
            debug!("Ignoring {} from non-host {}", operation, self.player_id);
            return Ok(None);
        }
        Ok(Some((code, room)))
    }

    async fn enter_room(&self, code: &str, room: OnlineRoom) -> Result<(), RoomError> {
        let is_host = room.is_host(&self.player_id);
        let code_owned = code.to_string();
        self.shared
            .modify(|state| {
                state.room_code = Some(code_owned);
                state.is_host = is_host;
                state.room = Some(room);
                state.error = None;
            })
            .await;
        self.ensure_subscribed(code).await
    }

    async fn ensure_subscribed(&self, code: &str) -> Result<(), RoomError> {
        let mut active = self.subscription.lock().await;
        if let Some(current) = active.as_ref() {
            if current.code == code && !current.task.is_finished() {
                return Ok(());
            }
        }
        if let Some(previous) = active.take() {
            previous.task.abort();
            self.store.unsubscribe(previous.id).await;
        }

        let subscription = self.store.subscribe(&room_path(code)).await?;
        let id = subscription.id;
        let task = tokio::spawn(follow_room(
            subscription,
            code.to_string(),
            self.player_id.clone(),
            self.shared.clone(),
            self.store.clone(),
        ));
        *active = Some(ActiveSubscription {
            code: code.to_string(),
            id,
            task,
        });
        Ok(())
    }

    async fn teardown_subscription(&self) {
        if let Some(previous) = self.subscription.lock().await.take() {
            previous.task.abort();
            self.store.unsubscribe(previous.id).await;
        }
    }
}

/// Mirror the room document into the client view until it disappears.
/// Updates are dropped once the client has moved on to another room.
async fn follow_room(
    mut subscription: Subscription,
    code: String,
    player_id: PlayerId,
    shared: Arc<SharedState>,
    store: Arc<dyn RoomStore>,
) {
    while let Some(update) = subscription.updates.recv().await {
        match update {
            Some(value) => match serde_json::from_value::<OnlineRoom>(value) {
                Ok(room) => {
                    let is_host = room.is_host(&player_id);
                    shared
                        .modify(|state| {
                            if state.room_code.as_deref() == Some(code.as_str()) {
                                state.is_host = is_host;
                                state.room = Some(room);
                            }
                        })
                        .await;
                }
                Err(e) => error!("Malformed update for room {}: {}", code, e),
            },
            None => {
                info!("Room {} closed", code);
                shared
                    .modify(|state| {
                        if state.room_code.as_deref() != Some(code.as_str()) {
                            return;
                        }
                        state.room = None;
                        state.room_code = None;
                        state.is_host = false;
                        state.error = Some(ROOM_CLOSED.to_string());
                    })
                    .await;
                break;
            }
        }
    }
    store.unsubscribe(subscription.id).await;
}

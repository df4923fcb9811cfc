// Authoritative player roster for the running game session.

use crate::domain::{GameError, NewPlayer, Player};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Rules applied when players are created and hit.
#[derive(Debug, Clone, Copy)]
pub struct RosterSettings {
    /// Health every player starts with unless registration says otherwise.
    pub max_health: i32,
    /// Score credited to the shooter for each adjudicated hit.
    pub hit_score: u32,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            max_health: 100,
            hit_score: 10,
        }
    }
}

/// Both sides of a hit after it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitResult {
    pub shooter: Player,
    pub target: Player,
}

/// Proof that the roster was found empty; only `reset_all` hands one out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetConfirmed {
    _private: (),
}

/// Thread-safe registry of players keyed by id.
#[derive(Debug)]
pub struct UserRegistry {
    settings: RosterSettings,
    players: RwLock<BTreeMap<String, Player>>,
}

impl UserRegistry {
    pub fn new(mut settings: RosterSettings) -> Self {
        if settings.max_health < 1 {
            warn!(max_health = settings.max_health, "max health below 1, using default");
            settings.max_health = RosterSettings::default().max_health;
        }
        Self {
            settings,
            players: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn settings(&self) -> RosterSettings {
        self.settings
    }

    /// Registers a new player; an existing id is never overwritten.
    pub async fn create(&self, new_player: NewPlayer) -> Result<Player, GameError> {
        let id = new_player.id.trim();
        if id.is_empty() {
            return Err(GameError::InvalidPlayer("id is required"));
        }
        let name = new_player.name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidPlayer("name is required"));
        }
        let health = new_player.health.unwrap_or(self.settings.max_health);
        if !(1..=self.settings.max_health).contains(&health) {
            return Err(GameError::InvalidPlayer("health is out of range"));
        }

        let mut players = self.players.write().await;
        if players.contains_key(id) {
            return Err(GameError::DuplicateId(id.to_string()));
        }

        let player = Player::new(id, name, health);
        players.insert(player.id.clone(), player.clone());
        info!(player_id = %player.id, name = %player.name, "player registered");
        Ok(player)
    }

    pub async fn get(&self, id: &str) -> Result<Player, GameError> {
        let players = self.players.read().await;
        players
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(id.to_string()))
    }

    /// Owned snapshot of every player, ordered by id.
    pub async fn list(&self) -> Vec<Player> {
        let players = self.players.read().await;
        players.values().cloned().collect()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.players.read().await.contains_key(id)
    }

    /// Ids a shot from `shooter_id` may legitimately hit.
    pub async fn target_ids_for(&self, shooter_id: &str) -> Vec<String> {
        let players = self.players.read().await;
        players
            .keys()
            .filter(|id| id.as_str() != shooter_id)
            .cloned()
            .collect()
    }

    pub async fn remove(&self, id: &str) -> Result<Player, GameError> {
        let mut players = self.players.write().await;
        let removed = players
            .remove(id)
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;
        info!(player_id = %removed.id, remaining = players.len(), "player removed");
        Ok(removed)
    }

    /// Applies one hit atomically: either both players change or neither does.
    pub async fn apply_hit(
        &self,
        shooter_id: &str,
        target_id: &str,
        damage: i32,
    ) -> Result<HitResult, GameError> {
        let mut players = self.players.write().await;

        // Validate everything before touching either entry.
        let target = players
            .get(target_id)
            .ok_or_else(|| GameError::TargetNotFound(target_id.to_string()))?;
        let shooter = players
            .get(shooter_id)
            .ok_or_else(|| GameError::ShooterNotFound(shooter_id.to_string()))?;
        if shooter_id == target_id {
            return Err(GameError::SelfHit(shooter_id.to_string()));
        }
        if !target.is_live {
            return Err(GameError::TargetEliminated(target_id.to_string()));
        }
        if !shooter.is_live {
            return Err(GameError::ShooterEliminated(shooter_id.to_string()));
        }

        let target = players
            .get_mut(target_id)
            .ok_or_else(|| GameError::TargetNotFound(target_id.to_string()))?;
        target.take_hit(damage);
        let target = target.clone();

        let shooter = players
            .get_mut(shooter_id)
            .ok_or_else(|| GameError::ShooterNotFound(shooter_id.to_string()))?;
        shooter.credit_hit(self.settings.hit_score);
        let shooter = shooter.clone();

        if !target.is_live {
            info!(shooter_id, target_id, "player eliminated");
        }
        Ok(HitResult { shooter, target })
    }

    /// Confirms a reset once every player has been removed.
    ///
    /// Eliminated players still count: each one must be deleted before the game can
    /// be reset. Fails without mutation otherwise.
    pub async fn reset_all(&self) -> Result<ResetConfirmed, GameError> {
        let players = self.players.read().await;
        if !players.is_empty() {
            return Err(GameError::PlayersRemaining(players.len()));
        }
        Ok(ResetConfirmed { _private: () })
    }
}

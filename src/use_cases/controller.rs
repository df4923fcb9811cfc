// Game orchestration: shot submission fan-out and the admin reset protocol.

use crate::domain::GameError;
use crate::use_cases::adjudicator::{ShotAdjudicator, ShotSubmission, ShotVerdict};
use crate::use_cases::audit::ImageAudit;
use crate::use_cases::connections::ConnectionManager;
use crate::use_cases::roster::UserRegistry;
use crate::use_cases::ServerEvent;
use std::sync::Arc;
use tracing::{info, warn};

pub const RESET_MESSAGE: &str = "The game has been reset";

/// Public summary of a confirmed hit, returned to the shooter.
#[derive(Debug, Clone, PartialEq)]
pub struct HitSummary {
    pub shooter: String,
    pub target: String,
    pub distance: f64,
}

/// Private acknowledgment for the submitting channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotAck {
    pub success: bool,
    pub message: String,
    pub hit: Option<HitSummary>,
    pub verdict: Option<ShotVerdict>,
}

impl ShotAck {
    fn rejected(err: GameError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            hit: None,
            verdict: None,
        }
    }
}

/// Result of a successful reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    pub channels_closed: usize,
}

pub struct GameController {
    registry: Arc<UserRegistry>,
    audit: Arc<ImageAudit>,
    connections: Arc<ConnectionManager>,
    adjudicator: ShotAdjudicator,
}

impl GameController {
    pub fn new(
        registry: Arc<UserRegistry>,
        audit: Arc<ImageAudit>,
        connections: Arc<ConnectionManager>,
        adjudicator: ShotAdjudicator,
    ) -> Self {
        Self {
            registry,
            audit,
            connections,
            adjudicator,
        }
    }

    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    pub fn audit(&self) -> &Arc<ImageAudit> {
        &self.audit
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Adjudicates a shot sent over `channel_player_id`'s channel.
    ///
    /// Confirmed hits are broadcast as a shot event to every channel; the returned
    /// ack is meant for the submitter only.
    pub async fn submit_shot(&self, channel_player_id: &str, submission: ShotSubmission) -> ShotAck {
        let claimed = submission.shooter_id.as_deref().map(str::trim).unwrap_or("");
        if !claimed.is_empty() && claimed != channel_player_id {
            warn!(
                player_id = channel_player_id,
                claimed, "shot submitted for another player"
            );
            return ShotAck::rejected(GameError::InvalidSubmission(
                "player_id does not match connection",
            ));
        }

        let outcome = match self.adjudicator.adjudicate(submission).await {
            Ok(outcome) => outcome,
            Err(err) => return ShotAck::rejected(err),
        };

        let hit = match (&outcome.hit, &outcome.target, outcome.distance) {
            (Some(players), Some(target), Some(distance)) => {
                let report = self
                    .connections
                    .broadcast(ServerEvent::ShotEvent {
                        killer: players.shooter.clone(),
                        target: players.target.clone(),
                    })
                    .await;
                info!(
                    shooter_id = %outcome.shooter,
                    target_id = %target,
                    delivered = report.delivered,
                    dropped = report.dropped.len(),
                    "shot event broadcast"
                );
                Some(HitSummary {
                    shooter: outcome.shooter.clone(),
                    target: target.clone(),
                    distance,
                })
            }
            _ => None,
        };

        ShotAck {
            success: outcome.success,
            message: outcome.message,
            hit,
            verdict: Some(outcome.verdict),
        }
    }

    /// Runs the reset protocol.
    ///
    /// Only proceeds once every player has been removed. On success every channel gets the
    /// reset notice first and is closed afterwards; on failure nothing is sent or closed.
    pub async fn admin_reset(&self) -> Result<ResetReport, GameError> {
        self.registry.reset_all().await.inspect_err(|err| {
            warn!(error = %err, "reset refused");
        })?;
        self.audit.clear().await;

        self.connections
            .broadcast(ServerEvent::GameReset {
                message: RESET_MESSAGE.to_string(),
            })
            .await;
        let channels_closed = self.connections.disconnect_all().await;

        info!(channels_closed, "game reset");
        Ok(ResetReport { channels_closed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPlayer;
    use crate::use_cases::adjudicator::AdjudicatorSettings;
    use crate::use_cases::roster::RosterSettings;
    use crate::use_cases::test_support::{Scripted, ScriptedDetector, TEST_IMAGE};
    use crate::use_cases::CloseReason;

    async fn controller(script: Vec<Scripted>, players: &[&str]) -> GameController {
        let registry = Arc::new(UserRegistry::new(RosterSettings::default()));
        for id in players {
            registry
                .create(NewPlayer {
                    id: id.to_string(),
                    name: format!("Pilot {id}"),
                    health: None,
                })
                .await
                .unwrap();
        }
        let audit = Arc::new(ImageAudit::new(10));
        let connections = Arc::new(ConnectionManager::new(8));
        let adjudicator = ShotAdjudicator::new(
            registry.clone(),
            audit.clone(),
            Arc::new(ScriptedDetector::new(script)),
            AdjudicatorSettings::default(),
        );
        GameController::new(registry, audit, connections, adjudicator)
    }

    fn shot(shooter: &str) -> ShotSubmission {
        ShotSubmission {
            shooter_id: Some(shooter.to_string()),
            image: Some(TEST_IMAGE.to_string()),
            timestamp: Some(1_700_000_000_000.0),
        }
    }

    #[tokio::test]
    async fn when_shot_hits_then_ack_carries_hit_and_event_reaches_all_channels() {
        let game = controller(vec![Scripted::Hit("A2", 42.5)], &["A1", "A2"]).await;
        let mut a1 = game.connections().connect("A1").await;
        let mut a2 = game.connections().connect("A2").await;

        let ack = game.submit_shot("A1", shot("A1")).await;

        assert!(ack.success);
        assert_eq!(
            ack.hit,
            Some(HitSummary {
                shooter: "A1".to_string(),
                target: "A2".to_string(),
                distance: 42.5,
            })
        );
        for channel in [&mut a1, &mut a2] {
            let event = channel.events.recv().await.expect("expected shot event");
            match &*event {
                ServerEvent::ShotEvent { killer, target } => {
                    assert_eq!(killer.id, "A1");
                    assert_eq!(killer.kills, 1);
                    assert_eq!(killer.score, 10);
                    assert_eq!(target.id, "A2");
                    assert_eq!(target.health, 99);
                    assert_eq!(target.deaths, 1);
                }
                other => panic!("expected shot event, got {other:?}"),
            }
        }
        assert_eq!(game.audit().count().await, 1);
    }

    #[tokio::test]
    async fn when_shot_misses_then_nothing_is_broadcast() {
        let game = controller(vec![Scripted::Nothing], &["A1", "A2"]).await;
        let mut a2 = game.connections().connect("A2").await;

        let ack = game.submit_shot("A1", shot("A1")).await;

        assert!(!ack.success);
        assert_eq!(ack.message, "no target detected");
        assert_eq!(ack.hit, None);
        assert!(a2.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn when_claimed_shooter_differs_from_channel_then_shot_is_rejected() {
        let game = controller(vec![Scripted::Hit("A2", 1.0)], &["A1", "A2", "A3"]).await;

        let ack = game.submit_shot("A3", shot("A1")).await;

        assert!(!ack.success);
        assert_eq!(
            ack.message,
            "invalid submission: player_id does not match connection"
        );
        assert_eq!(game.registry().get("A2").await.unwrap().health, 100);
    }

    #[tokio::test]
    async fn when_players_remain_then_reset_fails_without_broadcast_or_disconnect() {
        let game = controller(vec![], &["A1"]).await;
        let mut a1 = game.connections().connect("A1").await;
        game.audit().record(TEST_IMAGE.to_string()).await;

        let result = game.admin_reset().await;

        assert_eq!(result, Err(GameError::PlayersRemaining(1)));
        assert_eq!(game.connections().active_count().await, 1);
        assert!(a1.events.try_recv().is_err());
        assert_eq!(*a1.close_rx.borrow_and_update(), None);
        assert_eq!(game.audit().count().await, 1);
    }

    #[tokio::test]
    async fn when_roster_is_empty_then_reset_notifies_before_disconnecting() {
        let game = controller(vec![], &[]).await;
        let mut a1 = game.connections().connect("A1").await;
        let mut a2 = game.connections().connect("A2").await;
        game.audit().record(TEST_IMAGE.to_string()).await;

        let report = game.admin_reset().await.expect("expected reset to succeed");

        assert_eq!(report.channels_closed, 2);
        assert_eq!(game.connections().active_count().await, 0);
        assert_eq!(game.audit().count().await, 0);
        for channel in [&mut a1, &mut a2] {
            // The notice is already queued by the time the close signal is visible.
            assert_eq!(*channel.close_rx.borrow_and_update(), Some(CloseReason::Reset));
            let event = channel.events.recv().await.expect("expected reset notice");
            assert_eq!(
                *event,
                ServerEvent::GameReset {
                    message: RESET_MESSAGE.to_string(),
                }
            );
            assert!(channel.events.recv().await.is_none());
        }
    }
}

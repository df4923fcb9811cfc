// Shot adjudication: detection result in, validated state transition out.

use crate::domain::{Detection, Detector, GameError, ShotImage};
use crate::use_cases::audit::ImageAudit;
use crate::use_cases::roster::{HitResult, UserRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct AdjudicatorSettings {
    /// Health removed from the target per confirmed hit.
    pub damage: i32,
    /// Upper bound on a single detector call.
    pub detect_timeout: Duration,
}

impl Default for AdjudicatorSettings {
    fn default() -> Self {
        Self {
            damage: 1,
            detect_timeout: Duration::from_millis(2000),
        }
    }
}

/// Raw shot as submitted by a client; fields are validated during adjudication.
#[derive(Debug, Clone, Default)]
pub struct ShotSubmission {
    pub shooter_id: Option<String>,
    pub image: Option<String>,
    // Client clock at capture time, kept for logs only.
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotVerdict {
    Hit,
    NoDetection,
    DetectionTimeout,
    DetectionFailed,
    TargetNotFound,
    ShooterNotFound,
    SelfHit,
    TargetEliminated,
    ShooterEliminated,
}

impl ShotVerdict {
    fn message(self) -> &'static str {
        match self {
            ShotVerdict::Hit => "hit",
            ShotVerdict::NoDetection => "no target detected",
            ShotVerdict::DetectionTimeout => "detection timed out",
            ShotVerdict::DetectionFailed => "detection failed",
            ShotVerdict::TargetNotFound => "target not found",
            ShotVerdict::ShooterNotFound => "shooter not found",
            ShotVerdict::SelfHit => "cannot hit yourself",
            ShotVerdict::TargetEliminated => "target already eliminated",
            ShotVerdict::ShooterEliminated => "shooter eliminated",
        }
    }
}

/// Result of adjudicating one shot. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotOutcome {
    pub success: bool,
    pub verdict: ShotVerdict,
    pub shooter: String,
    pub target: Option<String>,
    pub distance: Option<f64>,
    pub message: String,
    /// Post-hit state of both players, present only on success.
    pub hit: Option<HitResult>,
}

impl ShotOutcome {
    fn miss(shooter: String, detection: Option<&Detection>, verdict: ShotVerdict) -> Self {
        Self {
            success: false,
            verdict,
            shooter,
            target: detection.map(|d| d.target_id.clone()),
            distance: detection.map(|d| d.distance),
            message: verdict.message().to_string(),
            hit: None,
        }
    }
}

pub struct ShotAdjudicator {
    registry: Arc<UserRegistry>,
    audit: Arc<ImageAudit>,
    detector: Arc<dyn Detector>,
    settings: AdjudicatorSettings,
}

impl ShotAdjudicator {
    pub fn new(
        registry: Arc<UserRegistry>,
        audit: Arc<ImageAudit>,
        detector: Arc<dyn Detector>,
        mut settings: AdjudicatorSettings,
    ) -> Self {
        if settings.damage < 1 {
            warn!(damage = settings.damage, "hit damage below 1, using 1");
            settings.damage = 1;
        }
        Self {
            registry,
            audit,
            detector,
            settings,
        }
    }

    /// Adjudicates one shot.
    ///
    /// Only malformed submissions are errors; every other rejection is a failed
    /// outcome. Failed outcomes leave the roster and the audit log untouched.
    pub async fn adjudicate(&self, submission: ShotSubmission) -> Result<ShotOutcome, GameError> {
        let shooter_id = submission
            .shooter_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(GameError::InvalidSubmission("player_id is required"))?;
        let image = submission
            .image
            .ok_or(GameError::InvalidSubmission("image is required"))
            .and_then(|raw| ShotImage::parse(raw))?;
        debug!(
            shooter_id = %shooter_id,
            image_bytes = image.bytes().len(),
            client_timestamp = ?submission.timestamp,
            "adjudicating shot"
        );

        // Snapshot the candidate set, then release the roster before the detector call.
        let valid_targets = self.registry.target_ids_for(&shooter_id).await;
        let detection = match timeout(
            self.settings.detect_timeout,
            self.detector.detect(&image, &valid_targets),
        )
        .await
        {
            Ok(Ok(Some(detection))) => detection,
            Ok(Ok(None)) => {
                return Ok(ShotOutcome::miss(shooter_id, None, ShotVerdict::NoDetection));
            }
            Ok(Err(err)) => {
                warn!(shooter_id = %shooter_id, error = %err, "detector call failed");
                return Ok(ShotOutcome::miss(
                    shooter_id,
                    None,
                    ShotVerdict::DetectionFailed,
                ));
            }
            Err(_) => {
                warn!(
                    shooter_id = %shooter_id,
                    timeout_ms = self.settings.detect_timeout.as_millis(),
                    "detector call timed out"
                );
                return Ok(ShotOutcome::miss(
                    shooter_id,
                    None,
                    ShotVerdict::DetectionTimeout,
                ));
            }
        };

        let hit = match self
            .registry
            .apply_hit(&shooter_id, &detection.target_id, self.settings.damage)
            .await
        {
            Ok(hit) => hit,
            Err(err) => {
                let verdict = match err {
                    GameError::TargetNotFound(_) => ShotVerdict::TargetNotFound,
                    GameError::ShooterNotFound(_) => ShotVerdict::ShooterNotFound,
                    GameError::SelfHit(_) => ShotVerdict::SelfHit,
                    GameError::TargetEliminated(_) => ShotVerdict::TargetEliminated,
                    GameError::ShooterEliminated(_) => ShotVerdict::ShooterEliminated,
                    other => return Err(other),
                };
                debug!(shooter_id = %shooter_id, target_id = %detection.target_id, ?verdict, "shot rejected");
                return Ok(ShotOutcome::miss(shooter_id, Some(&detection), verdict));
            }
        };

        self.audit.record(image.into_raw()).await;
        info!(
            shooter_id = %shooter_id,
            target_id = %detection.target_id,
            distance = detection.distance,
            target_health = hit.target.health,
            "shot confirmed"
        );

        Ok(ShotOutcome {
            success: true,
            verdict: ShotVerdict::Hit,
            message: format!(
                "{} hit {} at distance {:.1}",
                hit.shooter.name, hit.target.name, detection.distance
            ),
            shooter: shooter_id,
            target: Some(detection.target_id),
            distance: Some(detection.distance),
            hit: Some(hit),
        })
    }
}

// Domain-level player state and detector output.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    // Externally assigned id, usually the number printed on the player's marker.
    pub id: String,
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub health: i32,
    pub score: u32,
    // True while health > 0; never flips back within a session.
    pub is_live: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, health: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kills: 0,
            deaths: 0,
            health,
            score: 0,
            is_live: health > 0,
        }
    }

    /// Applies one adjudicated hit to this player as the target.
    ///
    /// Every hit costs at least one point of health; health never goes up.
    pub(crate) fn take_hit(&mut self, damage: i32) {
        self.health = self.health.saturating_sub(damage.max(1)).max(0);
        self.deaths += 1;
        if self.health <= 0 {
            self.is_live = false;
        }
    }

    /// Credits this player as the shooter of an adjudicated hit.
    pub(crate) fn credit_hit(&mut self, points: u32) {
        self.kills += 1;
        self.score = self.score.saturating_add(points);
    }
}

/// Registration input; counters always start at zero.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub id: String,
    pub name: String,
    // Falls back to the configured maximum when absent.
    pub health: Option<i32>,
}

/// Best-matching visible target reported by the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub target_id: String,
    // Apparent distance; smaller is closer. Only meaningful relative to other markers.
    pub distance: f64,
}

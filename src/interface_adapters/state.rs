use crate::use_cases::GameController;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Owns the roster, audit log, channels and adjudicator for this session.
    pub game: Arc<GameController>,
}

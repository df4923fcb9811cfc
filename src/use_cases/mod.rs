// Use cases layer: roster, adjudication, channels and game orchestration.

pub mod adjudicator;
pub mod audit;
pub mod connections;
pub mod controller;
pub mod roster;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use adjudicator::{AdjudicatorSettings, ShotAdjudicator, ShotOutcome, ShotSubmission, ShotVerdict};
pub use audit::ImageAudit;
pub use connections::{BroadcastReport, ChannelHandle, ConnectionManager};
pub use controller::{GameController, HitSummary, ResetReport, ShotAck};
pub use roster::{HitResult, ResetConfirmed, RosterSettings, UserRegistry};
pub use types::{ChannelState, CloseReason, ServerEvent};

use async_trait::async_trait;

use crate::domain::{Detection, ShotImage};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectorError {
    #[error("detector unavailable: {0}")]
    Unavailable(String),
    #[error("detector returned an invalid response: {0}")]
    InvalidResponse(String),
}

// The adjudicator depends on this trait, not on the concrete vision backend.
// `Ok(None)` means the frame was processed and nothing plausible was visible;
// `Err` means the frame could not be processed at all.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(
        &self,
        image: &ShotImage,
        valid_targets: &[String],
    ) -> Result<Option<Detection>, DetectorError>;
}

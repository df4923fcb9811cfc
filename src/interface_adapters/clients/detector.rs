use crate::domain::{
    Detection, Detector, DetectorError, MarkerObservation, ShotImage, closest_target,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct LocateMarkersRequest<'a> {
    // Base64 frame without any data-URL prefix.
    image: &'a str,
}

// Marker locations reported by the vision service for one frame.
#[derive(Debug, Clone, Deserialize)]
pub struct LocateMarkersResponse {
    pub image_width: u32,
    #[serde(default)]
    pub markers: Vec<MarkerDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkerDto {
    pub id: MarkerIdDto,
    pub corners: [[f64; 2]; 4],
}

// Marker dictionaries number their markers; some deployments label them with strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MarkerIdDto {
    Number(i64),
    Text(String),
}

impl From<MarkerDto> for MarkerObservation {
    fn from(marker: MarkerDto) -> Self {
        let id = match marker.id {
            MarkerIdDto::Number(id) => id.to_string(),
            MarkerIdDto::Text(id) => id,
        };
        Self {
            id,
            corners: marker.corners,
        }
    }
}

impl LocateMarkersResponse {
    /// Ranks the reported markers and returns the closest valid target.
    pub fn closest(self, marker_size: f64, valid_targets: &[String]) -> Option<Detection> {
        let markers: Vec<MarkerObservation> =
            self.markers.into_iter().map(MarkerObservation::from).collect();
        closest_target(&markers, self.image_width, marker_size, valid_targets)
    }
}

// Thin reqwest client for the marker-locating vision service.
#[derive(Clone)]
pub struct DetectorClient {
    http: reqwest::Client,
    base_url: String,
    // Physical marker edge length; sets the unit of reported distances.
    marker_size: f64,
}

impl DetectorClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        marker_size: f64,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            marker_size,
        })
    }
}

#[async_trait]
impl Detector for DetectorClient {
    async fn detect(
        &self,
        image: &ShotImage,
        valid_targets: &[String],
    ) -> Result<Option<Detection>, DetectorError> {
        if valid_targets.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/markers", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&LocateMarkersRequest {
                image: image.base64(),
            })
            .send()
            .await
            .map_err(|e| DetectorError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DetectorError::Unavailable(format!(
                "vision service returned {}",
                response.status()
            )));
        }

        let located = response
            .json::<LocateMarkersResponse>()
            .await
            .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?;
        Ok(located.closest(self.marker_size, valid_targets))
    }
}

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Detection, Detector, DetectorError, ShotImage};

/// What the scripted detector does for one call.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Hit(&'static str, f64),
    Nothing,
    Fail,
    Hang,
}

/// Detector fake that replays a fixed script and records what it was asked.
pub(crate) struct ScriptedDetector {
    script: Mutex<VecDeque<Scripted>>,
    // Valid target sets seen on each call, in order.
    pub(crate) calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedDetector {
    pub(crate) fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls mutex poisoned").len()
    }

    pub(crate) fn last_targets(&self) -> Option<Vec<String>> {
        self.calls.lock().expect("calls mutex poisoned").last().cloned()
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn detect(
        &self,
        _image: &ShotImage,
        valid_targets: &[String],
    ) -> Result<Option<Detection>, DetectorError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(valid_targets.to_vec());
        let next = self
            .script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(Scripted::Nothing);

        match next {
            Scripted::Hit(target_id, distance) => Ok(Some(Detection {
                target_id: target_id.to_string(),
                distance,
            })),
            Scripted::Nothing => Ok(None),
            Scripted::Fail => Err(DetectorError::Unavailable("scripted failure".to_string())),
            Scripted::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

/// Base64 for a tiny non-empty payload.
pub(crate) const TEST_IMAGE: &str = "data:image/jpeg;base64,QTI=";

// Recent hit images kept for admin review.

use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Bounded newest-first log of images from confirmed hits.
#[derive(Debug)]
pub struct ImageAudit {
    capacity: usize,
    images: Mutex<VecDeque<String>>,
}

impl ImageAudit {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            images: Mutex::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stores `image` as the newest entry, evicting the oldest past capacity.
    pub async fn record(&self, image: String) {
        let mut images = self.images.lock().await;
        images.push_front(image);
        images.truncate(self.capacity);
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<String> {
        let images = self.images.lock().await;
        images.iter().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.images.lock().await.len()
    }

    pub async fn clear(&self) {
        self.images.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn when_capacity_is_unbounded_then_audit_still_records() {
        let audit = ImageAudit::new(usize::MAX);

        audit.record("img-0".to_string()).await;

        assert_eq!(audit.count().await, 1);
    }

    #[tokio::test]
    async fn when_capacity_is_exceeded_then_oldest_image_is_evicted() {
        let audit = ImageAudit::new(3);

        for i in 0..4 {
            audit.record(format!("img-{i}")).await;
        }

        assert_eq!(audit.list().await, vec!["img-3", "img-2", "img-1"]);
    }

    #[tokio::test]
    async fn when_capacity_is_ten_then_eleventh_record_keeps_ten() {
        let audit = ImageAudit::new(10);

        for i in 0..11 {
            audit.record(format!("img-{i}")).await;
        }

        let images = audit.list().await;
        assert_eq!(images.len(), 10);
        assert_eq!(images.first().map(String::as_str), Some("img-10"));
        assert_eq!(images.last().map(String::as_str), Some("img-1"));
    }

    #[tokio::test]
    async fn when_cleared_then_log_is_empty() {
        let audit = ImageAudit::new(2);
        audit.record("img".to_string()).await;

        audit.clear().await;

        assert_eq!(audit.count().await, 0);
    }
}

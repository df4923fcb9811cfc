use std::{env, time::Duration};

// Runtime settings read from the environment, with defaults for local play.

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

// Settings that must be at least 1; anything else falls back to the default.
fn positive_or(raw: Option<&str>, default: i32) -> i32 {
    match raw.and_then(|value| value.trim().parse::<i32>().ok()) {
        Some(value) if value >= 1 => value,
        Some(value) => {
            tracing::warn!(value, default, "non-positive setting ignored");
            default
        }
        None => default,
    }
}

fn positive(key: &str, default: i32) -> i32 {
    positive_or(env::var(key).ok().as_deref(), default)
}

pub fn http_port() -> u16 {
    parsed("LASER_SERVER_PORT", 3001)
}

pub fn http_host() -> String {
    env::var("LASER_SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn detector_service_url() -> String {
    env::var("DETECTOR_SERVICE_URL").unwrap_or_else(|_| "http://127.0.0.1:8001".to_string())
}

pub fn detector_timeout() -> Duration {
    Duration::from_millis(parsed("DETECTOR_TIMEOUT_MS", 2000u64))
}

// Printed marker edge in centimetres.
pub fn marker_size_cm() -> f64 {
    parsed("MARKER_SIZE_CM", DEFAULT_MARKER_SIZE_CM)
}

pub fn player_max_health() -> i32 {
    positive("PLAYER_MAX_HEALTH", 100)
}

pub fn hit_damage() -> i32 {
    positive("HIT_DAMAGE", 1)
}

pub fn hit_score() -> u32 {
    parsed("HIT_SCORE", 10)
}

pub fn image_audit_capacity() -> usize {
    parsed("IMAGE_AUDIT_CAPACITY", 10)
}

pub fn outbound_queue_capacity() -> usize {
    parsed("OUTBOUND_QUEUE_CAPACITY", 64)
}

pub const DEFAULT_MARKER_SIZE_CM: f64 = 18.7;

// Extra headroom the detector HTTP client gets over the adjudication timeout.
pub const DETECT_TIMEOUT_GRACE: Duration = Duration::from_millis(250);

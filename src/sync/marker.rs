use std::sync::{Mutex, PoisonError};

use chrono::Utc;

/// Issues refresh markers for one context and remembers the latest one.
///
/// Markers are millisecond timestamps, strictly increasing within a context.
#[derive(Debug, Default)]
pub struct MarkerClock {
    last_issued: Mutex<Option<i64>>,
}

impl MarkerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> String {
        let mut last = self
            .last_issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now().timestamp_millis();
        let next = match *last {
            Some(prev) if prev >= now => prev + 1,
            _ => now,
        };
        *last = Some(next);
        next.to_string()
    }

    /// Whether `marker` is the latest one this context wrote.
    pub fn is_own(&self, marker: &str) -> bool {
        let last = self
            .last_issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match (*last, marker.trim().parse::<i64>()) {
            (Some(own), Ok(seen)) => own == seen,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_strictly_increase() {
        let clock = MarkerClock::new();
        let markers: Vec<i64> = (0..50).map(|_| clock.issue().parse().unwrap()).collect();
        assert!(markers.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_is_own_tracks_latest() {
        let clock = MarkerClock::new();
        assert!(!clock.is_own("123"));

        let first = clock.issue();
        assert!(clock.is_own(&first));

        let second = clock.issue();
        assert!(clock.is_own(&second));
        assert!(!clock.is_own(&first));
        assert!(!clock.is_own("not-a-number"));
    }
}

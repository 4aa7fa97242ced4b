//! Plate recognition providers
//!
//! Capture is the only operation in the system that suspends: the desk
//! asks the lane camera for a read and waits. There is no cancellation,
//! only the coordinator's re-entrancy guard and the provider's own
//! latency bound.

use crate::domain::error::{DeskError, Result};
use crate::domain::types::PlateCapture;
use crate::infra::config::Config;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// External plate-recognition capability
#[async_trait]
pub trait PlateRecognizer: Send + Sync {
    /// Run one recognition attempt against the desk lane
    async fn capture(&self) -> Result<PlateCapture>;
}

/// Simulator standing in for the camera integration
///
/// Cycles through the configured plates with a fixed latency. With
/// `miss_every = n`, every nth request reports no detection.
pub struct SimulatedRecognizer {
    latency: Duration,
    confidence: f64,
    miss_every: u64,
    plates: Vec<String>,
    requests: AtomicU64,
}

impl SimulatedRecognizer {
    pub fn new(config: &Config) -> Self {
        Self {
            latency: Duration::from_millis(config.capture_latency_ms()),
            confidence: config.capture_confidence(),
            miss_every: config.capture_miss_every(),
            plates: config.capture_plates().to_vec(),
            requests: AtomicU64::new(0),
        }
    }

    /// Builder method for tests to avoid real sleeps
    #[cfg(test)]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl PlateRecognizer for SimulatedRecognizer {
    async fn capture(&self) -> Result<PlateCapture> {
        let seq = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        tokio::time::sleep(self.latency).await;

        if self.miss_every > 0 && seq % self.miss_every == 0 {
            return Err(DeskError::NoDetection);
        }
        if self.plates.is_empty() {
            return Err(DeskError::NoDetection);
        }

        let plate = &self.plates[((seq - 1) as usize) % self.plates.len()];
        Ok(PlateCapture::new(&format!("sim://lane/{seq}"), plate, self.confidence))
    }
}

/// Outcome a scripted recognizer replays
#[derive(Debug, Clone)]
pub enum ScriptedRead {
    Plate { plate: String, confidence: f64 },
    Miss,
    Failure(String),
}

/// Recognizer that replays a fixed script, for deterministic tests
///
/// Resolves immediately; an exhausted script reports no detection.
#[derive(Default)]
pub struct ScriptedRecognizer {
    script: Mutex<VecDeque<ScriptedRead>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_plate(&self, plate: &str, confidence: f64) {
        self.script
            .lock()
            .push_back(ScriptedRead::Plate { plate: plate.to_string(), confidence });
    }

    pub fn push_miss(&self) {
        self.script.lock().push_back(ScriptedRead::Miss);
    }

    pub fn push_failure(&self, reason: &str) {
        self.script.lock().push_back(ScriptedRead::Failure(reason.to_string()));
    }
}

#[async_trait]
impl PlateRecognizer for ScriptedRecognizer {
    async fn capture(&self) -> Result<PlateCapture> {
        let next = self.script.lock().pop_front();
        match next {
            Some(ScriptedRead::Plate { plate, confidence }) => {
                Ok(PlateCapture::new("script://lane/0", &plate, confidence))
            }
            Some(ScriptedRead::Miss) | None => Err(DeskError::NoDetection),
            Some(ScriptedRead::Failure(reason)) => Err(DeskError::CaptureFailed(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulator_rotates_plates() {
        let recognizer =
            SimulatedRecognizer::new(&Config::default()).with_latency(Duration::ZERO);

        let first = recognizer.capture().await.unwrap();
        let second = recognizer.capture().await.unwrap();
        assert_eq!(first.plate, "KJ-482");
        assert_eq!(second.plate, "MX-917");
        assert!((first.confidence - 0.88).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_simulator_miss_every_third() {
        let mut recognizer =
            SimulatedRecognizer::new(&Config::default()).with_latency(Duration::ZERO);
        recognizer.miss_every = 3;

        assert!(recognizer.capture().await.is_ok());
        assert!(recognizer.capture().await.is_ok());
        assert_eq!(recognizer.capture().await.unwrap_err(), DeskError::NoDetection);
        assert!(recognizer.capture().await.is_ok());
    }

    #[tokio::test]
    async fn test_scripted_replays_in_order() {
        let recognizer = ScriptedRecognizer::new();
        recognizer.push_plate("ABC-1234", 0.85);
        recognizer.push_miss();
        recognizer.push_failure("lane offline");

        let read = recognizer.capture().await.unwrap();
        assert_eq!(read.plate, "ABC-1234");
        assert!((read.confidence - 0.85).abs() < f64::EPSILON);

        assert_eq!(recognizer.capture().await.unwrap_err(), DeskError::NoDetection);
        assert_eq!(
            recognizer.capture().await.unwrap_err(),
            DeskError::CaptureFailed("lane offline".to_string())
        );
        // exhausted script keeps reporting no detection
        assert_eq!(recognizer.capture().await.unwrap_err(), DeskError::NoDetection);
    }
}

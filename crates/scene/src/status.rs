use std::time::{Duration, Instant};

/// Where the scene is in its load-and-reveal lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneStatus {
    /// Assets are still loading; show the placeholder.
    Loading,
    /// Assets are in; hold the placeholder until the reveal time.
    Revealing { until: Instant },
    /// Scene is visible.
    Ready,
    /// Loading failed; the message is shown instead of the scene.
    Failed(String),
}

/// Tracks loading and the cosmetic reveal delay.
#[derive(Debug, Clone)]
pub struct LoadState {
    status: SceneStatus,
    reveal_delay: Duration,
    started: Instant,
}

impl LoadState {
    pub fn new(reveal_delay: Duration, now: Instant) -> Self {
        Self {
            status: SceneStatus::Loading,
            reveal_delay,
            started: now,
        }
    }

    pub fn status(&self) -> &SceneStatus {
        &self.status
    }

    /// Whether the scene itself (not the placeholder) should be drawn.
    pub fn is_visible(&self) -> bool {
        self.status == SceneStatus::Ready
    }

    pub fn loaded(&mut self, now: Instant) {
        if self.status != SceneStatus::Loading {
            return;
        }
        tracing::info!(
            elapsed_ms = now.saturating_duration_since(self.started).as_millis() as u64,
            "assets loaded"
        );
        self.status = SceneStatus::Revealing {
            until: now + self.reveal_delay,
        };
        self.tick(now);
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("scene load failed: {message}");
        self.status = SceneStatus::Failed(message);
    }

    /// Advance the reveal timer. Returns true on the frame the scene becomes visible.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.status {
            SceneStatus::Revealing { until } if now >= until => {
                self.status = SceneStatus::Ready;
                tracing::debug!("scene revealed");
                true
            }
            _ => false,
        }
    }
}

// Posture confirmation - debounces per-frame matches into posture events

use crate::models::posture::{Posture, PostureEvent};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Receives the per-frame outcome of posture classification.
/// Exactly one of the two methods is called for every frame.
pub trait PostureSink {
    /// The current frame matched `posture`
    fn report(&mut self, posture: Posture);

    /// The current frame matched no posture
    fn reset(&mut self);
}

pub type PostureCallback = Arc<dyn Fn(&PostureEvent) + Send + Sync>;

const DEFAULT_EVENT_CAPACITY: usize = 64;

// ==============================================================================
// Posture Detector
// ==============================================================================

/// Confirms a posture once it has been reported on `confirmation_frames`
/// consecutive frames, then notifies every observer. A posture that stays
/// held is announced only once; a reset frame clears both the streak and the
/// confirmed posture.
pub struct PostureDetector {
    confirmation_frames: u32,
    streak: Option<(Posture, u32)>,
    current_posture: Option<Posture>,
    callbacks: Vec<PostureCallback>,
    event_tx: broadcast::Sender<PostureEvent>,
}

impl PostureDetector {
    /// Create a new posture detector
    ///
    /// # Arguments
    /// * `confirmation_frames` - Consecutive matching frames before a posture is confirmed.
    ///   Zero is treated as one.
    pub fn new(confirmation_frames: u32) -> Self {
        Self::with_capacity(confirmation_frames, DEFAULT_EVENT_CAPACITY)
    }

    /// Same as [`PostureDetector::new`] with an explicit broadcast buffer size
    pub fn with_capacity(confirmation_frames: u32, event_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity.max(1));
        Self::with_sender(confirmation_frames, event_tx)
    }

    /// Publish confirmed postures on an existing broadcast channel
    pub fn with_sender(confirmation_frames: u32, event_tx: broadcast::Sender<PostureEvent>) -> Self {
        Self {
            confirmation_frames: confirmation_frames.max(1),
            streak: None,
            current_posture: None,
            callbacks: Vec::new(),
            event_tx,
        }
    }

    /// Register a callback invoked for every confirmed posture
    pub fn on_posture_detected<F>(&mut self, callback: F)
    where
        F: Fn(&PostureEvent) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
    }

    /// Subscribe to confirmed postures through a broadcast channel
    pub fn subscribe(&self) -> broadcast::Receiver<PostureEvent> {
        self.event_tx.subscribe()
    }

    /// Sender half, for handing out subscriptions after the detector has moved
    pub fn event_sender(&self) -> broadcast::Sender<PostureEvent> {
        self.event_tx.clone()
    }

    /// Last confirmed posture since the most recent reset
    pub fn current_posture(&self) -> Option<Posture> {
        self.current_posture
    }

    pub fn confirmation_frames(&self) -> u32 {
        self.confirmation_frames
    }

    fn raise_posture_detected(&mut self, posture: Posture) {
        self.current_posture = Some(posture);

        let event = PostureEvent::new(posture);
        tracing::debug!(posture = posture.as_str(), id = %event.id, "posture confirmed");

        for callback in &self.callbacks {
            callback(&event);
        }

        // No receivers is not an error
        let _ = self.event_tx.send(event);
    }
}

impl PostureSink for PostureDetector {
    fn report(&mut self, posture: Posture) {
        let count = match self.streak {
            Some((streak_posture, count)) if streak_posture == posture => count.saturating_add(1),
            _ => 1,
        };
        self.streak = Some((posture, count));

        if count >= self.confirmation_frames && self.current_posture != Some(posture) {
            self.raise_posture_detected(posture);
        }
    }

    fn reset(&mut self) {
        if self.streak.is_some() || self.current_posture.is_some() {
            tracing::debug!(
                previous = self.current_posture.map(|p| p.as_str()),
                "posture streak reset"
            );
        }

        self.streak = None;
        self.current_posture = None;
    }
}

use crate::core::config::Config;
use crate::core::posture_classifier::AlgorithmicPostureDetector;
use crate::core::posture_detector::PostureDetector;
use crate::models::posture::{PostureError, PostureEvent, PostureResult};
use crate::models::skeleton::SkeletonFrame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

// ==============================================================================
// Frame Sources
// ==============================================================================

/// Supplies skeleton frames, one at a time, from a sensor or a recording
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `None` once the source is exhausted
    async fn next_frame(&mut self) -> PostureResult<Option<SkeletonFrame>>;
}

/// Frame source backed by frames held in memory
#[derive(Debug, Clone, Default)]
pub struct VecFrameSource {
    frames: VecDeque<SkeletonFrame>,
}

impl VecFrameSource {
    pub fn new(frames: Vec<SkeletonFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl FrameSource for VecFrameSource {
    async fn next_frame(&mut self) -> PostureResult<Option<SkeletonFrame>> {
        Ok(self.frames.pop_front())
    }
}

// ==============================================================================
// Posture Tracker
// ==============================================================================

/// Counters gathered by one tracking run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStats {
    pub frames_processed: u64,
    pub frames_with_posture: u64,
}

/// Runs posture detection on a background task fed through a frame channel
pub struct PostureTracker {
    config: Arc<RwLock<Config>>,
    is_tracking: Arc<RwLock<bool>>,
    frame_tx: Arc<RwLock<Option<mpsc::Sender<SkeletonFrame>>>>,
    worker: Mutex<Option<JoinHandle<TrackingStats>>>,
    event_tx: broadcast::Sender<PostureEvent>,
}

impl PostureTracker {
    pub fn new(config: Config) -> PostureResult<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            is_tracking: Arc::new(RwLock::new(false)),
            frame_tx: Arc::new(RwLock::new(None)),
            worker: Mutex::new(None),
            event_tx,
        })
    }

    /// Subscribe to confirmed postures. Valid across tracking runs.
    pub fn subscribe(&self) -> broadcast::Receiver<PostureEvent> {
        self.event_tx.subscribe()
    }

    pub async fn is_tracking(&self) -> bool {
        *self.is_tracking.read().await
    }

    /// Replace the configuration used by the next tracking run
    pub async fn update_config(&self, config: Config) -> PostureResult<()> {
        config.validate()?;
        *self.config.write().await = config;
        Ok(())
    }

    /// Start posture tracking
    pub async fn start_tracking(&self) -> PostureResult<()> {
        let mut is_tracking = self.is_tracking.write().await;
        if *is_tracking {
            return Err(PostureError::AlreadyRunning);
        }

        let config = self.config.read().await.clone();

        let (tx, rx) = mpsc::channel::<SkeletonFrame>(config.frame_queue_capacity);
        *self.frame_tx.write().await = Some(tx);

        let detector = AlgorithmicPostureDetector::with_config(
            PostureDetector::with_sender(config.confirmation_frames, self.event_tx.clone()),
            &config,
        );

        let handle = tokio::spawn(async move { Self::process_frames(rx, detector).await });
        *self.worker.lock().await = Some(handle);

        *is_tracking = true;

        tracing::info!(
            confirmation_frames = config.confirmation_frames,
            "started posture tracking"
        );
        Ok(())
    }

    /// Stop tracking, wait for queued frames to drain and return run statistics
    pub async fn stop_tracking(&self) -> PostureResult<TrackingStats> {
        let mut is_tracking = self.is_tracking.write().await;
        if !*is_tracking {
            return Ok(TrackingStats::default());
        }

        // Dropping the sender lets the worker finish the remaining frames and exit
        *self.frame_tx.write().await = None;
        *is_tracking = false;

        let handle = self.worker.lock().await.take();
        let stats = match handle {
            Some(handle) => Self::join_worker(handle).await?,
            None => TrackingStats::default(),
        };

        tracing::info!(
            frames_processed = stats.frames_processed,
            frames_with_posture = stats.frames_with_posture,
            "stopped posture tracking"
        );
        Ok(stats)
    }

    /// Queue a frame for classification
    pub async fn process_frame(&self, frame: SkeletonFrame) -> PostureResult<()> {
        let tx = self.frame_tx.read().await.clone();
        let tx = tx.ok_or(PostureError::NotTracking)?;

        tx.send(frame)
            .await
            .map_err(|_| PostureError::ChannelClosed)
    }

    /// Feed every frame from `source` into the tracker; returns the number of frames queued
    pub async fn run_source<F: FrameSource + ?Sized>(&self, source: &mut F) -> PostureResult<u64> {
        let mut queued = 0;

        loop {
            let frame = match source.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, queued, "frame source failed");
                    return Err(e);
                }
            };

            self.process_frame(frame).await?;
            queued += 1;
        }

        Ok(queued)
    }

    async fn join_worker(handle: JoinHandle<TrackingStats>) -> PostureResult<TrackingStats> {
        handle.await.map_err(|e| {
            tracing::warn!(error = %e, panicked = e.is_panic(), "posture tracking worker failed");
            PostureError::WorkerFailed(e.to_string())
        })
    }

    /// Background task classifying frames until the channel closes
    async fn process_frames(
        mut rx: mpsc::Receiver<SkeletonFrame>,
        mut detector: AlgorithmicPostureDetector<PostureDetector>,
    ) -> TrackingStats {
        let mut stats = TrackingStats::default();

        while let Some(frame) = rx.recv().await {
            stats.frames_processed += 1;
            if detector.track_postures(&frame).is_some() {
                stats.frames_with_posture += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posture::Posture;
    use crate::models::skeleton::{
        Joint, JointId, JointTrackingState, SkeletonTrackingState, Vector4,
    };

    fn hands_joined_frame(timestamp: i64) -> SkeletonFrame {
        let mut frame = SkeletonFrame::new(
            SkeletonTrackingState::Tracked,
            vec![
                Joint::new(
                    JointId::HandLeft,
                    Vector4::new(0.0, 0.0, 0.0, 1.0),
                    JointTrackingState::Tracked,
                ),
                Joint::new(
                    JointId::HandRight,
                    Vector4::new(0.0, 0.0, 0.05, 1.0),
                    JointTrackingState::Tracked,
                ),
            ],
        );
        frame.timestamp = timestamp;
        frame
    }

    fn empty_frame() -> SkeletonFrame {
        SkeletonFrame::new(SkeletonTrackingState::NotTracked, vec![])
    }

    fn test_config(confirmation_frames: u32) -> Config {
        Config {
            confirmation_frames,
            ..Config::default()
        }
    }

    struct FailingSource;

    #[async_trait]
    impl FrameSource for FailingSource {
        async fn next_frame(&mut self) -> PostureResult<Option<SkeletonFrame>> {
            Err(PostureError::FrameSource("sensor unplugged".to_string()))
        }
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let tracker = PostureTracker::new(Config::default()).unwrap();
        tracker.start_tracking().await.unwrap();
        assert!(tracker.is_tracking().await);

        assert!(matches!(
            tracker.start_tracking().await,
            Err(PostureError::AlreadyRunning)
        ));

        tracker.stop_tracking().await.unwrap();
        assert!(!tracker.is_tracking().await);
    }

    #[tokio::test]
    async fn test_process_frame_requires_tracking() {
        let tracker = PostureTracker::new(Config::default()).unwrap();
        assert!(matches!(
            tracker.process_frame(empty_frame()).await,
            Err(PostureError::NotTracking)
        ));
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let tracker = PostureTracker::new(Config::default()).unwrap();
        assert_eq!(tracker.stop_tracking().await.unwrap(), TrackingStats::default());
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        assert!(PostureTracker::new(test_config(0)).is_err());

        let tracker = PostureTracker::new(Config::default()).unwrap();
        assert!(tracker.update_config(test_config(0)).await.is_err());
    }

    #[tokio::test]
    async fn test_confirms_posture_after_threshold() {
        let tracker = PostureTracker::new(test_config(3)).unwrap();
        let mut rx = tracker.subscribe();
        tracker.start_tracking().await.unwrap();

        for ts in 0..3 {
            tracker.process_frame(hands_joined_frame(ts)).await.unwrap();
        }
        tracker.process_frame(empty_frame()).await.unwrap();

        let stats = tracker.stop_tracking().await.unwrap();
        assert_eq!(stats.frames_processed, 4);
        assert_eq!(stats.frames_with_posture, 3);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.posture, Posture::HandsJoined);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_interrupted_streak_not_confirmed() {
        let tracker = PostureTracker::new(test_config(3)).unwrap();
        let mut rx = tracker.subscribe();
        tracker.start_tracking().await.unwrap();

        let frames = vec![
            hands_joined_frame(0),
            hands_joined_frame(1),
            empty_frame(),
            hands_joined_frame(3),
            hands_joined_frame(4),
        ];
        let mut source = VecFrameSource::new(frames);
        assert_eq!(tracker.run_source(&mut source).await.unwrap(), 5);
        assert_eq!(source.remaining(), 0);

        tracker.stop_tracking().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let tracker = PostureTracker::new(Config::default()).unwrap();
        tracker.start_tracking().await.unwrap();

        let result = tracker.run_source(&mut FailingSource).await;
        assert!(matches!(result, Err(PostureError::FrameSource(_))));

        tracker.stop_tracking().await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_panic_reported() {
        let handle: JoinHandle<TrackingStats> = tokio::spawn(async {
            if true {
                panic!("detector crashed");
            }
            TrackingStats::default()
        });

        let result = PostureTracker::join_worker(handle).await;
        assert!(matches!(result, Err(PostureError::WorkerFailed(_))));
    }

    #[tokio::test]
    async fn test_worker_stats_returned() {
        let handle = tokio::spawn(async {
            TrackingStats {
                frames_processed: 2,
                frames_with_posture: 1,
            }
        });

        let stats = PostureTracker::join_worker(handle).await.unwrap();
        assert_eq!(stats.frames_processed, 2);
    }

    #[tokio::test]
    async fn test_tracker_restarts() {
        let tracker = PostureTracker::new(test_config(1)).unwrap();
        let mut rx = tracker.subscribe();

        for _ in 0..2 {
            tracker.start_tracking().await.unwrap();
            tracker.process_frame(hands_joined_frame(0)).await.unwrap();
            tracker.stop_tracking().await.unwrap();
        }

        // Each run starts with a fresh detector, so each run confirms once
        assert_eq!(rx.try_recv().unwrap().posture, Posture::HandsJoined);
        assert_eq!(rx.try_recv().unwrap().posture, Posture::HandsJoined);
    }
}

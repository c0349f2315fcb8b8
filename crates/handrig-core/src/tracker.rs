//! The hand tracker: one object owning every piece of per-session state
//!
//! Drive it by calling [`HandTracker::tick`] (or [`HandTracker::poll`]) once
//! per host frame. Readers on other threads subscribe to the snapshot
//! channel; a new snapshot is only sent once a tick has fully completed, so
//! a half-reconciled pool is never observable.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::normalize::Normalizer;
use crate::pool::HandSlotPool;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::scene::{EntityId, SceneGraph};
use crate::sensor::{SensorError, SensorFrame, SensorSource};
use crate::snapshot::HandsSnapshot;

/// Hands tracked at once when not configured otherwise
pub const DEFAULT_CAPACITY: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Maximum number of simultaneously tracked hands
    pub capacity: usize,
    pub normalizer: Normalizer,
    /// Scene node every created entity is attached to
    pub parent: Option<EntityId>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            normalizer: Normalizer::default(),
            parent: None,
        }
    }
}

impl TrackerConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

/// Running totals across the tracker's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerStats {
    pub ticks: u64,
    pub added: usize,
    pub removed: usize,
    pub dropped: usize,
    pub duplicates: usize,
}

impl TrackerStats {
    fn record(&mut self, report: &ReconcileReport) {
        self.ticks += 1;
        self.added += report.added;
        self.removed += report.removed;
        self.dropped += report.dropped;
        self.duplicates += report.duplicates;
    }
}

pub struct HandTracker<S: SceneGraph> {
    config: TrackerConfig,
    pool: HandSlotPool,
    scene: S,
    frame: SensorFrame,
    last_frame: SensorFrame,
    tick: u64,
    stats: TrackerStats,
    snapshot_tx: watch::Sender<Arc<HandsSnapshot>>,
}

impl<S: SceneGraph> HandTracker<S> {
    pub fn new(config: TrackerConfig, scene: S) -> Self {
        let mut pool = HandSlotPool::new(config.capacity);
        if let Some(parent) = config.parent {
            pool = pool.with_parent(parent);
        }
        let (snapshot_tx, _) = watch::channel(Arc::new(HandsSnapshot::capture(&pool, 0, 0)));

        Self {
            config,
            pool,
            scene,
            frame: SensorFrame::empty(),
            last_frame: SensorFrame::empty(),
            tick: 0,
            stats: TrackerStats::default(),
            snapshot_tx,
        }
    }

    /// Reconcile against `frame` and publish the result
    pub fn tick(&mut self, frame: SensorFrame) -> ReconcileReport {
        self.tick += 1;
        self.last_frame = std::mem::replace(&mut self.frame, frame);

        let report = reconcile(
            &mut self.pool,
            &self.frame,
            &self.config.normalizer,
            &mut self.scene,
            self.tick,
        );
        self.stats.record(&report);

        if report.changed() || report.dropped > 0 {
            debug!(
                tick = self.tick,
                frame = self.frame.id,
                added = report.added,
                removed = report.removed,
                dropped = report.dropped,
                occupied = self.pool.occupied_count(),
                "Hands changed"
            );
        } else {
            trace!(tick = self.tick, updated = report.updated, "Tick");
        }

        let snapshot = HandsSnapshot::capture(&self.pool, self.tick, self.frame.id);
        self.snapshot_tx.send_replace(Arc::new(snapshot));
        report
    }

    /// Pull the latest frame from `source` and reconcile against it
    pub fn poll<Src: SensorSource + ?Sized>(
        &mut self,
        source: &mut Src,
    ) -> Result<ReconcileReport, SensorError> {
        let frame = source.latest_frame()?;
        Ok(self.tick(frame))
    }

    /// Release every hand, destroying all entities
    pub fn clear(&mut self) -> usize {
        let released = self.pool.release_all(&mut self.scene);
        self.stats.removed += released;
        let snapshot = HandsSnapshot::capture(&self.pool, self.tick, self.frame.id);
        self.snapshot_tx.send_replace(Arc::new(snapshot));
        released
    }

    /// Receive a snapshot after every completed tick
    pub fn subscribe(&self) -> watch::Receiver<Arc<HandsSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Most recently published snapshot
    pub fn snapshot(&self) -> Arc<HandsSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// The frame reconciled by the latest tick
    pub fn frame(&self) -> &SensorFrame {
        &self.frame
    }

    /// The frame reconciled by the tick before that
    pub fn last_frame(&self) -> &SensorFrame {
        &self.last_frame
    }

    pub fn pool(&self) -> &HandSlotPool {
        &self.pool
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Tear down every hand and hand back the scene
    pub fn into_scene(mut self) -> S {
        self.clear();
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, Template};
    use crate::sensor::{HandId, Handedness, ScriptedSource, SensorHand};
    use crate::spatial::{InteractionBox, Point3D};

    fn frame(id: u64, hand_ids: &[i32]) -> SensorFrame {
        let hands = hand_ids
            .iter()
            .map(|&h| SensorHand::new(HandId(h), Handedness::Left, Point3D::new(0.0, 200.0, 0.0)))
            .collect();
        SensorFrame::new(id, InteractionBox::default(), hands)
    }

    #[test]
    fn test_frame_history() {
        let mut tracker = HandTracker::new(TrackerConfig::default(), MemoryScene::new());
        tracker.tick(frame(1, &[1]));
        tracker.tick(frame(2, &[]));

        assert_eq!(tracker.frame().id, 2);
        assert_eq!(tracker.last_frame().id, 1);
        assert_eq!(tracker.tick_count(), 2);
        assert_eq!(tracker.stats().added, 1);
        assert_eq!(tracker.stats().removed, 1);
    }

    #[test]
    fn test_snapshot_published_per_tick() {
        let mut tracker = HandTracker::new(TrackerConfig::default(), MemoryScene::new());
        let mut rx = tracker.subscribe();
        assert!(rx.borrow_and_update().hands.is_empty());

        tracker.tick(frame(1, &[3]));
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.by_id(HandId(3)).unwrap().slot, 0);
        assert_eq!(tracker.snapshot(), snapshot);
    }

    #[test]
    fn test_poll_from_source() {
        let mut tracker = HandTracker::new(TrackerConfig::default(), MemoryScene::new());
        let mut source = ScriptedSource::new(vec![frame(1, &[1, 2])]);

        let report = tracker.poll(&mut source).unwrap();
        assert_eq!(report.added, 2);
        let report = tracker.poll(&mut source).unwrap();
        assert_eq!(report.removed, 2);
    }

    #[test]
    fn test_parented_entities() {
        let mut scene = MemoryScene::new();
        let root = scene.instantiate(Template::Palm, None).unwrap();
        let config = TrackerConfig {
            parent: Some(root),
            ..TrackerConfig::default()
        };
        let mut tracker = HandTracker::new(config, scene);
        tracker.tick(frame(1, &[1]));

        let palm = tracker.snapshot().hands[0].palm.entity;
        assert_eq!(tracker.scene().get(palm).unwrap().parent, Some(root));

        let scene = tracker.into_scene();
        assert_eq!(scene.len(), 1);
    }
}

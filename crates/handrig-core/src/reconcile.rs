//! Per-frame reconciliation of sensor hands against pool slots
//!
//! Runs in three passes, always in this order:
//!
//! 1. bind every hand whose identity no slot holds yet,
//! 2. refresh every slot whose identity is still in the frame,
//! 3. release every slot whose identity left the frame.
//!
//! A hand bound in pass 1 is therefore positioned in the same tick, and a
//! slot whose hand vanished is torn down without being refreshed first.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::normalize::Normalizer;
use crate::pool::HandSlotPool;
use crate::scene::SceneGraph;
use crate::sensor::{HandId, SensorFrame, SensorHand};

/// What one reconciliation pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    /// Hands that could not get a slot
    pub dropped: usize,
    /// Hands ignored because an earlier hand in the frame had the same id
    pub duplicates: usize,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

/// First hand per identity, in frame order
fn distinct_hands(frame: &SensorFrame) -> (Vec<&SensorHand>, usize) {
    let mut seen = HashSet::with_capacity(frame.hands.len());
    let mut duplicates = 0;
    let hands = frame
        .hands
        .iter()
        .filter(|hand| {
            let first = seen.insert(hand.id);
            if !first {
                duplicates += 1;
            }
            first
        })
        .collect();
    (hands, duplicates)
}

/// Bring `pool` in line with `frame`
pub fn reconcile<S: SceneGraph + ?Sized>(
    pool: &mut HandSlotPool,
    frame: &SensorFrame,
    normalizer: &Normalizer,
    scene: &mut S,
    tick: u64,
) -> ReconcileReport {
    let (hands, duplicates) = distinct_hands(frame);
    let mut report = ReconcileReport {
        duplicates,
        ..Default::default()
    };
    if duplicates > 0 {
        debug!(frame = frame.id, duplicates, "Ignoring hands with repeated identity");
    }

    for hand in &hands {
        if pool.slot_for(hand.id).is_some() {
            continue;
        }
        match pool.try_bind(hand, scene, tick) {
            Some(_) => report.added += 1,
            None => report.dropped += 1,
        }
    }

    let find = |id: HandId| hands.iter().copied().find(|h| h.id == id);

    for index in 0..pool.capacity() {
        let Some(id) = pool.get(index).and_then(|s| s.id()) else {
            continue;
        };
        if let Some(hand) = find(id) {
            if pool.refresh(index, hand, &frame.interaction_box, normalizer, scene, tick) {
                report.updated += 1;
            }
        }
    }

    for index in 0..pool.capacity() {
        let Some(id) = pool.get(index).and_then(|s| s.id()) else {
            continue;
        };
        if find(id).is_none() && pool.release(index, scene) {
            report.removed += 1;
        }
    }

    report
}

//! In-flight test tracking.
//!
//! The registry owns a [`TestResult`] from `start` until `finish`, then hands
//! it to the [`ReportAggregator`]. Every operation takes the live-map lock
//! for its whole read-modify-write, and a finish adds to the aggregator
//! before releasing it, so a concurrent drain never misses an in-flight
//! completion. Lock order is always registry, then aggregator.

use crate::aggregator::ReportAggregator;
use crate::extractor::apply_metadata;
use crate::model::{TestResult, UNORDERED};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tally_proto::TestDescriptor;
use tracing::{debug, warn};

#[derive(Debug)]
struct LiveTest {
    result: TestResult,
    started_at: Instant,
    seq: u64,
}

/// Thread-safe map from test id to its live result.
#[derive(Debug)]
pub struct ExecutionRegistry {
    live: Mutex<HashMap<String, LiveTest>>,
    aggregator: Arc<ReportAggregator>,
    next_seq: AtomicU64,
}

impl ExecutionRegistry {
    pub fn new(aggregator: Arc<ReportAggregator>) -> Self {
        Self {
            live: Mutex::new(HashMap::new()),
            aggregator,
            next_seq: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, LiveTest>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The aggregator finished results are handed to.
    pub fn aggregator(&self) -> &Arc<ReportAggregator> {
        &self.aggregator
    }

    /// Begins tracking `id`.
    ///
    /// The result is ordered after everything aggregated so far and then
    /// populated from the descriptor's metadata. Reusing the id of a test
    /// that is still running replaces the earlier entry.
    ///
    /// The order is read from the aggregator before the live map is locked,
    /// so tests started concurrently may share an order value.
    pub fn start(&self, id: impl Into<String>, descriptor: &TestDescriptor) {
        let id = id.into();
        let order = i32::try_from(self.aggregator.total_tests() + 1).unwrap_or(UNORDERED);

        let mut result = TestResult::new(
            descriptor.class_name.clone(),
            descriptor.method_name.clone(),
            order,
            descriptor.method_name.clone(),
        );
        apply_metadata(&descriptor.metadata, &mut result);

        debug!("Test started: {} (order {})", id, result.order);
        let mut live = self.lock();
        let entry = LiveTest {
            result,
            started_at: Instant::now(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        if live.insert(id.clone(), entry).is_some() {
            warn!("Test {} was started again while still running, replacing it", id);
        }
    }

    /// Completes `id` and hands its result to the aggregator.
    ///
    /// Returns false if `id` is not running (unknown or already finished).
    pub fn finish(&self, id: &str, success: bool, error: Option<&str>) -> bool {
        let mut live = self.lock();
        let Some(LiveTest {
            mut result,
            started_at,
            ..
        }) = live.remove(id)
        else {
            debug!("Ignoring finish for {}: not running", id);
            return false;
        };

        result.complete(success, error);
        debug!(
            "Test finished: {} (passed: {}, {:?})",
            id,
            success,
            started_at.elapsed()
        );
        self.aggregator.add(result);
        true
    }

    /// Completes the first step of `id` with the given order.
    ///
    /// Returns false if `id` is not running, no step matches, or the
    /// matching step already finished.
    pub fn step_finish(&self, id: &str, order: i32, success: bool, error: Option<&str>) -> bool {
        let mut live = self.lock();
        let Some(test) = live.get_mut(id) else {
            debug!("Ignoring step {} finish for {}: not running", order, id);
            return false;
        };

        let completed = test.result.complete_step(order, success, error);
        if !completed {
            debug!("Step {} of {} is unknown or already finished", order, id);
        }
        completed
    }

    /// Adds a pending step to a running test unless that order exists.
    pub fn register_step(&self, id: &str, order: i32, description: &str) -> bool {
        self.lock()
            .get_mut(id)
            .is_some_and(|test| test.result.register_step(order, description))
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Ids of every running test, sorted.
    pub fn running_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// How long `id` has been running.
    pub fn elapsed(&self, id: &str) -> Option<Duration> {
        self.lock().get(id).map(|test| test.started_at.elapsed())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every running test without reporting it.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Completes every running test with the same outcome.
    ///
    /// Tests are aggregated in the order they were inserted into the live
    /// map. Returns how many were completed.
    pub fn finish_all(&self, success: bool, error: Option<&str>) -> usize {
        let mut live = self.lock();
        let mut drained: Vec<(String, LiveTest)> = live.drain().collect();
        drained.sort_by_key(|(_, test)| test.seq);

        let count = drained.len();
        for (id, mut test) in drained {
            debug!("Force-finishing {}", id);
            test.result.complete(success, error);
            self.aggregator.add(test.result);
        }
        count
    }
}

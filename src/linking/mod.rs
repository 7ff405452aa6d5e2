//! Event-linking engine: reconstructs Launch -> Impact -> Destruction chains.
//!
//! The pipeline is a chain of pure functions:
//! classify -> deterministic pass -> filter linked impacts -> heuristic pass -> merge ->
//! splash attribution -> interception resolution -> leftover accounting.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::model::{Chain, Destruction, Impact, Launch};

pub mod classify;
pub mod combine;
pub mod config;
pub mod deterministic;
pub mod heuristic;
pub mod reconcile;

pub use classify::{classify, Classified};
pub use combine::{link, link_combined};
pub use config::{ConfigError, LinkConfig};
pub use deterministic::link_deterministic;
pub use heuristic::link_heuristic;

/// Chains plus every classified record no chain claimed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkOutcome {
    pub chains: Vec<Chain>,
    pub leftover_launches: Vec<Launch>,
    pub leftover_impacts: Vec<Impact>,
    pub leftover_destructions: Vec<Destruction>,
}

/// Group item indices by key. Items are visited in order, so buckets over a time-sorted list
/// stay time-sorted.
pub(crate) fn index_by<K, F>(len: usize, mut key_of: F) -> HashMap<K, Vec<usize>>
where
    K: Eq + Hash,
    F: FnMut(usize) -> Option<K>,
{
    let mut index: HashMap<K, Vec<usize>> = HashMap::new();
    for idx in 0..len {
        if let Some(key) = key_of(idx) {
            index.entry(key).or_default().push(idx);
        }
    }
    index
}

/// Latest entry of a time-sorted bucket whose time is at or before `limit`.
pub(crate) fn latest_at_or_before<F>(bucket: &[usize], time_of: F, limit: f64) -> Option<usize>
where
    F: Fn(usize) -> f64,
{
    let mut chosen = None;
    for &idx in bucket {
        if time_of(idx) <= limit {
            chosen = Some(idx);
        } else {
            break;
        }
    }
    chosen
}

/// Impact that caused `kill`: the latest impact on the same target at or before
/// `kill.time + tolerance`, accepted only when the kill trails it by at most `tolerance`.
pub(crate) fn impact_for_kill(
    impacts_by_target: &HashMap<i64, Vec<usize>>,
    impacts: &[Impact],
    kill: &Destruction,
    tolerance: f64,
) -> Option<usize> {
    let target = kill.target_id?;
    let bucket = impacts_by_target.get(&target)?;
    let idx = latest_at_or_before(bucket, |i| impacts[i].time, kill.time + tolerance)?;
    (kill.time - impacts[idx].time <= tolerance).then_some(idx)
}

//! Combined entry point: deterministic pass, heuristic pass on what is left, then reconciliation.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::linking::classify::classify;
use crate::linking::config::LinkConfig;
use crate::linking::deterministic::link_deterministic;
use crate::linking::heuristic::link_heuristic;
use crate::linking::reconcile::{attribute_splash_kills, finalize, resolve_interceptions};
use crate::linking::LinkOutcome;
use crate::model::{Action, Chain, EventSeq, RawEvent};

/// Link a whole log with default tunables.
pub fn link(events: &[RawEvent]) -> LinkOutcome {
    link_combined(events, &LinkConfig::default())
}

/// Run both passes and reconcile.
///
/// Leftovers are recomputed from the unfiltered log rather than taken from either pass, since
/// interception resolution can detach impacts and kills from their chains after the fact.
pub fn link_combined(events: &[RawEvent], config: &LinkConfig) -> LinkOutcome {
    let deterministic = link_deterministic(events, true, config);

    let linked_impacts: HashSet<EventSeq> = deterministic
        .chains
        .iter()
        .filter_map(Chain::impact_source)
        .collect();
    let remaining = events
        .iter()
        .filter(|event| !(event.action == Action::HitBy && linked_impacts.contains(&event.seq)));
    let heuristic = link_heuristic(remaining, config);

    let deterministic_chains = deterministic.chains.len();
    let heuristic_chains = heuristic.chains.len();
    let mut chains = deterministic.chains;
    chains.extend(heuristic.chains);
    debug!(
        deterministic = deterministic_chains,
        heuristic = heuristic_chains,
        "passes merged"
    );

    let classified = classify(events);
    attribute_splash_kills(&mut chains, events, config);
    let voided_impacts = resolve_interceptions(&mut chains, &classified.interceptions);

    let outcome = finalize(&classified, chains, &voided_impacts);
    info!(
        events = events.len(),
        chains = outcome.chains.len(),
        retracted_impacts = voided_impacts.len(),
        leftover_launches = outcome.leftover_launches.len(),
        leftover_impacts = outcome.leftover_impacts.len(),
        leftover_destructions = outcome.leftover_destructions.len(),
        "linking complete"
    );
    outcome
}

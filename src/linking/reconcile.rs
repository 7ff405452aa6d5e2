//! Post-merge amplification of chains and leftover accounting.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::geo::haversine_m;
use crate::linking::classify::{destruction_record, sort_by_time, Classified};
use crate::linking::config::LinkConfig;
use crate::linking::{index_by, LinkOutcome};
use crate::model::{Chain, Destruction, EventSeq, Impact, InterceptionCandidate, Launch, RawEvent};

/// Fold nearby destructions into area-effect chains that already have a primary kill.
///
/// Every `destroyed` event in the log is a candidate, attributed or not. A destruction that is
/// some chain's primary kill is never taken, and each destruction joins at most one chain:
/// chains are visited in list order and the first to claim it keeps it.
pub fn attribute_splash_kills(chains: &mut [Chain], events: &[RawEvent], config: &LinkConfig) {
    let mut candidates: Vec<Destruction> = events.iter().filter_map(destruction_record).collect();
    sort_by_time(&mut candidates, |kill| kill.time);

    let primary_kills: HashSet<EventSeq> = chains.iter().filter_map(Chain::kill_source).collect();
    let mut attributed: HashSet<EventSeq> = HashSet::new();

    for chain in chains.iter_mut() {
        if !chain.launch.is_area_effect() {
            continue;
        }
        let Some((primary_time, primary_location)) = chain
            .kill
            .as_ref()
            .and_then(|kill| kill.location.map(|location| (kill.time, location)))
        else {
            continue;
        };

        for candidate in &candidates {
            if primary_kills.contains(&candidate.source) || attributed.contains(&candidate.source) {
                continue;
            }
            if (candidate.time - primary_time).abs() > config.splash_time_window {
                continue;
            }
            let Some(location) = candidate.location else {
                continue;
            };
            if haversine_m(&primary_location, &location) > config.splash_radius_m {
                continue;
            }
            attributed.insert(candidate.source);
            chain.attach_extra_kill(candidate.clone());
        }
    }

    debug!(splash_kills = attributed.len(), "splash attribution complete");
}

/// Void chains whose munition was shot down before reaching its target.
///
/// Each candidate voids at most one chain: the first, in chain order, that launched the same
/// weapon identifier, belongs to the same pilot, and was launched no later than the
/// interception. Returns the impacts that were retracted.
pub fn resolve_interceptions(
    chains: &mut [Chain],
    candidates: &[InterceptionCandidate],
) -> HashSet<EventSeq> {
    let chains_by_weapon: HashMap<i64, Vec<usize>> =
        index_by(chains.len(), |i| chains[i].launch.weapon_id);
    let mut voided_impacts = HashSet::new();

    for candidate in candidates {
        let Some(bucket) = candidate.weapon_id.and_then(|id| chains_by_weapon.get(&id)) else {
            continue;
        };
        let target = bucket.iter().copied().find(|&i| {
            let chain = &chains[i];
            !chain.is_intercepted()
                && chain.launch.shooter_pilot == candidate.pilot
                && candidate.time >= chain.launch.time
        });
        let Some(chain_idx) = target else {
            continue;
        };
        debug!(
            weapon_id = ?candidate.weapon_id,
            interceptor = %candidate.interceptor,
            time = candidate.time,
            "chain voided by interception"
        );
        if let Some(impact) = chains[chain_idx].intercept(&candidate.interceptor, candidate.time) {
            voided_impacts.insert(impact.source);
        }
    }

    voided_impacts
}

/// Records of `classified` that no chain references.
///
/// A launch is used as a chain's launch, an impact as a chain's impact or as an impact retracted
/// by interception, a destruction as a primary or splash kill.
pub fn unclaimed(
    classified: &Classified,
    chains: &[Chain],
    voided_impacts: &HashSet<EventSeq>,
) -> (Vec<Launch>, Vec<Impact>, Vec<Destruction>) {
    let used_launches: HashSet<EventSeq> = chains.iter().map(Chain::launch_source).collect();
    let used_impacts: HashSet<EventSeq> = chains
        .iter()
        .filter_map(Chain::impact_source)
        .chain(voided_impacts.iter().copied())
        .collect();
    let used_kills: HashSet<EventSeq> = chains
        .iter()
        .flat_map(|chain| {
            chain
                .kill_source()
                .into_iter()
                .chain(chain.extra_kills.iter().map(|kill| kill.source))
        })
        .collect();

    let launches = classified
        .launches
        .iter()
        .filter(|launch| !used_launches.contains(&launch.source))
        .cloned()
        .collect();
    let impacts = classified
        .impacts
        .iter()
        .filter(|impact| !used_impacts.contains(&impact.source))
        .cloned()
        .collect();
    let destructions = classified
        .destructions
        .iter()
        .filter(|kill| !used_kills.contains(&kill.source))
        .cloned()
        .collect();
    (launches, impacts, destructions)
}

/// Assemble an outcome from merged chains, recomputing leftovers from the full classification.
pub fn finalize(
    classified: &Classified,
    chains: Vec<Chain>,
    voided_impacts: &HashSet<EventSeq>,
) -> LinkOutcome {
    let (leftover_launches, leftover_impacts, leftover_destructions) =
        unclaimed(classified, &chains, voided_impacts);
    LinkOutcome {
        chains,
        leftover_launches,
        leftover_impacts,
        leftover_destructions,
    }
}

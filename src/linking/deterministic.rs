//! Exact-key pass: impacts join launches on weapon identifier, destructions join impacts on
//! target identifier.

use std::collections::HashMap;

use tracing::debug;

use crate::linking::classify::{classify, Classified};
use crate::linking::config::LinkConfig;
use crate::linking::{impact_for_kill, index_by, latest_at_or_before, LinkOutcome};
use crate::model::{Chain, RawEvent};

/// Link on weapon and target identifiers.
///
/// With `consume` set, records joined into a chain are claimed and left out of the leftovers;
/// without it every record is reported as a leftover and the pass is free of side effects.
/// A destruction whose impact has no launch is never turned into a chain.
pub fn link_deterministic<'a, I>(events: I, consume: bool, config: &LinkConfig) -> LinkOutcome
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let Classified {
        launches,
        impacts,
        destructions,
        ..
    } = classify(events);

    let launches_by_weapon = index_by(launches.len(), |i| launches[i].weapon_id);
    let launch_before = |weapon_id: Option<i64>, time: f64| {
        let bucket = launches_by_weapon.get(&weapon_id?)?;
        latest_at_or_before(bucket, |i| launches[i].time, time)
    };

    let mut claimed_launches = vec![false; launches.len()];
    let mut claimed_impacts = vec![false; impacts.len()];
    let mut claimed_kills = vec![false; destructions.len()];
    let mut chains: Vec<Chain> = Vec::new();
    let mut chain_of_impact: HashMap<usize, usize> = HashMap::new();
    let mut kill_of_chain: HashMap<usize, usize> = HashMap::new();

    for (impact_idx, impact) in impacts.iter().enumerate() {
        let Some(launch_idx) = launch_before(impact.weapon_id, impact.time) else {
            continue;
        };
        chains.push(Chain::deterministic(
            launches[launch_idx].clone(),
            impact.clone(),
        ));
        chain_of_impact.insert(impact_idx, chains.len() - 1);
        if consume {
            claimed_launches[launch_idx] = true;
            claimed_impacts[impact_idx] = true;
        }
    }

    let impacts_by_target = index_by(impacts.len(), |i| impacts[i].target_id);
    for (kill_idx, kill) in destructions.iter().enumerate() {
        let Some(impact_idx) =
            impact_for_kill(&impacts_by_target, &impacts, kill, config.hit_kill_tolerance)
        else {
            continue;
        };

        // A later destruction of the same impact supersedes the earlier one.
        if let Some(&chain_idx) = chain_of_impact.get(&impact_idx) {
            chains[chain_idx].attach_kill(kill.clone());
            if let Some(previous) = kill_of_chain.insert(chain_idx, kill_idx) {
                claimed_kills[previous] = false;
            }
        } else {
            let impact = &impacts[impact_idx];
            let Some(launch_idx) = launch_before(impact.weapon_id, impact.time) else {
                continue;
            };
            let mut chain = Chain::deterministic(launches[launch_idx].clone(), impact.clone());
            chain.attach_kill(kill.clone());
            chains.push(chain);
            chain_of_impact.insert(impact_idx, chains.len() - 1);
            kill_of_chain.insert(chains.len() - 1, kill_idx);
            if consume {
                claimed_launches[launch_idx] = true;
                claimed_impacts[impact_idx] = true;
            }
        }
        if consume {
            claimed_kills[kill_idx] = true;
        }
    }

    debug!(
        chains = chains.len(),
        launches = launches.len(),
        impacts = impacts.len(),
        destructions = destructions.len(),
        "deterministic pass complete"
    );

    LinkOutcome {
        chains,
        leftover_launches: unclaimed(launches, &claimed_launches),
        leftover_impacts: unclaimed(impacts, &claimed_impacts),
        leftover_destructions: unclaimed(destructions, &claimed_kills),
    }
}

fn unclaimed<T>(items: Vec<T>, claimed: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(claimed)
        .filter(|(_, claimed)| !**claimed)
        .map(|(item, _)| item)
        .collect()
}

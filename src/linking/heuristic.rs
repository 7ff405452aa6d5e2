//! Time-window pass for impacts without a usable weapon identifier.
//!
//! Bombs are always re-matched here because their identifiers are reused by the recorder.
//! A launch with `occurrences > 1` (ripple release) can satisfy that many impacts.

use std::collections::HashMap;

use tracing::debug;

use crate::linking::classify::{classify, Classified};
use crate::linking::config::LinkConfig;
use crate::linking::{impact_for_kill, index_by, LinkOutcome};
use crate::model::{Chain, Impact, Launch, RawEvent};

pub fn link_heuristic<'a, I>(events: I, config: &LinkConfig) -> LinkOutcome
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    // The classified launches are private to this run; their occurrence counters are spent below.
    let Classified {
        mut launches,
        impacts,
        destructions,
        ..
    } = classify(events);

    let launches_by_pilot = index_by(launches.len(), |i| Some(launches[i].shooter_pilot.clone()));

    let mut claimed_impacts = vec![false; impacts.len()];
    let mut claimed_kills = vec![false; destructions.len()];
    let mut chains: Vec<Chain> = Vec::new();
    let mut chain_of_impact: HashMap<usize, usize> = HashMap::new();
    let mut kill_of_chain: HashMap<usize, usize> = HashMap::new();

    for (impact_idx, impact) in impacts.iter().enumerate() {
        if !is_eligible(impact) {
            continue;
        }
        let Some(bucket) = launches_by_pilot.get(&impact.shooter_pilot) else {
            continue;
        };
        let Some(launch_idx) = choose_launch(&launches, bucket, impact, config) else {
            continue;
        };

        let launch = &mut launches[launch_idx];
        launch.remaining_occurrences -= 1;
        chains.push(Chain::heuristic(launch.clone(), impact.clone()));
        chain_of_impact.insert(impact_idx, chains.len() - 1);
        claimed_impacts[impact_idx] = true;
    }

    let impacts_by_target = index_by(impacts.len(), |i| impacts[i].target_id);
    for (kill_idx, kill) in destructions.iter().enumerate() {
        let Some(impact_idx) =
            impact_for_kill(&impacts_by_target, &impacts, kill, config.hit_kill_tolerance)
        else {
            continue;
        };
        let Some(&chain_idx) = chain_of_impact.get(&impact_idx) else {
            continue;
        };
        chains[chain_idx].attach_kill(kill.clone());
        claimed_kills[kill_idx] = true;
        if let Some(previous) = kill_of_chain.insert(chain_idx, kill_idx) {
            claimed_kills[previous] = false;
        }
    }

    debug!(
        chains = chains.len(),
        impacts = impacts.len(),
        "heuristic pass complete"
    );

    LinkOutcome {
        chains,
        leftover_launches: launches
            .into_iter()
            .filter(|launch| launch.remaining_occurrences > 0)
            .collect(),
        leftover_impacts: impacts
            .into_iter()
            .zip(&claimed_impacts)
            .filter(|(_, claimed)| !**claimed)
            .map(|(impact, _)| impact)
            .collect(),
        leftover_destructions: destructions
            .into_iter()
            .zip(&claimed_kills)
            .filter(|(_, claimed)| !**claimed)
            .map(|(kill, _)| kill)
            .collect(),
    }
}

/// Impacts without a weapon identifier, and every bomb impact.
fn is_eligible(impact: &Impact) -> bool {
    impact.weapon_id.is_none() || impact.is_bomb()
}

/// Latest launch in the window with occurrences left, preferring one locked on the impacted target.
fn choose_launch(
    launches: &[Launch],
    bucket: &[usize],
    impact: &Impact,
    config: &LinkConfig,
) -> Option<usize> {
    let candidates: Vec<usize> = bucket
        .iter()
        .copied()
        .filter(|&i| {
            let launch = &launches[i];
            let lead = impact.time - launch.time;
            (0.0..=config.launch_impact_window).contains(&lead) && launch.remaining_occurrences > 0
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    if config.prefer_locked_target {
        if let Some(target) = impact.target_id {
            let locked = latest(
                launches,
                candidates
                    .iter()
                    .copied()
                    .filter(|&i| launches[i].locked_target_id == Some(target)),
            );
            if locked.is_some() {
                return locked;
            }
        }
    }
    latest(launches, candidates.iter().copied())
}

/// Candidate with the greatest launch time; the earliest-listed one wins a tie.
fn latest(launches: &[Launch], candidates: impl Iterator<Item = usize>) -> Option<usize> {
    let mut best: Option<usize> = None;
    for idx in candidates {
        match best {
            Some(current) if launches[idx].time <= launches[current].time => {}
            _ => best = Some(idx),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, ActorInfo};

    fn jet() -> ActorInfo {
        ActorInfo::new(Some(1), "Aircraft", "F/A-18C").with_pilot("Hornet")
    }

    fn release(seq: u32, time: f64, locked: Option<i64>, occurrences: u32) -> RawEvent {
        let mut event = RawEvent::new(seq, time, Action::Fired)
            .with_primary(jet())
            .with_secondary(ActorInfo::new(Some(600), "Bomb", "Mk-82"))
            .with_occurrences(occurrences);
        if let Some(target) = locked {
            event = event.with_locked(ActorInfo::new(Some(target), "Tank", "T-72"));
        }
        event
    }

    fn bomb_hit(seq: u32, time: f64, target: i64) -> RawEvent {
        RawEvent::new(seq, time, Action::HitBy)
            .with_primary(ActorInfo::new(Some(target), "Tank", "T-72"))
            .with_secondary(ActorInfo::new(Some(600), "Bomb", "Mk-82"))
            .with_parent(jet())
    }

    #[test]
    fn locked_target_beats_recency() {
        let events = vec![
            release(0, 10.0, Some(200), 1),
            release(1, 12.0, Some(201), 1),
            bomb_hit(2, 30.0, 200),
        ];
        let outcome = link_heuristic(&events, &LinkConfig::default());
        assert_eq!(outcome.chains.len(), 1);
        assert_eq!(outcome.chains[0].launch.time, 10.0);
        assert_eq!(outcome.leftover_launches.len(), 1);
    }

    #[test]
    fn recency_wins_when_locked_preference_disabled() {
        let events = vec![
            release(0, 10.0, Some(200), 1),
            release(1, 12.0, Some(201), 1),
            bomb_hit(2, 30.0, 200),
        ];
        let config = LinkConfig {
            prefer_locked_target: false,
            ..LinkConfig::default()
        };
        let outcome = link_heuristic(&events, &config);
        assert_eq!(outcome.chains[0].launch.time, 12.0);
    }

    #[test]
    fn impact_outside_window_is_left_unlinked() {
        let events = vec![release(0, 10.0, None, 1), bomb_hit(1, 75.0, 200)];
        let outcome = link_heuristic(&events, &LinkConfig::default());
        assert!(outcome.chains.is_empty());
        assert_eq!(outcome.leftover_impacts.len(), 1);
        assert_eq!(outcome.leftover_launches.len(), 1);
    }

    #[test]
    fn spent_launch_is_not_reused() {
        let events = vec![
            release(0, 10.0, None, 1),
            bomb_hit(1, 20.0, 200),
            bomb_hit(2, 21.0, 201),
        ];
        let outcome = link_heuristic(&events, &LinkConfig::default());
        assert_eq!(outcome.chains.len(), 1);
        assert_eq!(outcome.leftover_impacts.len(), 1);
        assert!(outcome.leftover_launches.is_empty());
    }

    #[test]
    fn missile_with_identifier_is_not_eligible() {
        let fired = RawEvent::new(0, 1.0, Action::Fired)
            .with_primary(jet())
            .with_secondary(ActorInfo::new(Some(5), "Missile", "AIM-9M"));
        let hit = RawEvent::new(1, 3.0, Action::HitBy)
            .with_primary(ActorInfo::new(Some(9), "Aircraft", "Su-25"))
            .with_secondary(ActorInfo::new(Some(5), "Missile", "AIM-9M"))
            .with_parent(jet());
        let outcome = link_heuristic([&fired, &hit], &LinkConfig::default());
        assert!(outcome.chains.is_empty());
    }

    #[test]
    fn later_destruction_replaces_heuristic_kill() {
        let kill = |seq: u32, time: f64| {
            RawEvent::new(seq, time, Action::Destroyed)
                .with_primary(ActorInfo::new(Some(200), "Tank", "T-72"))
                .with_secondary(jet())
        };
        let events = vec![
            release(0, 10.0, None, 1),
            bomb_hit(1, 20.0, 200),
            kill(2, 20.05),
            kill(3, 20.2),
        ];
        let outcome = link_heuristic(&events, &LinkConfig::default());
        assert_eq!(outcome.chains.len(), 1);
        assert_eq!(outcome.chains[0].kill_source(), Some(crate::model::EventSeq(3)));
        assert_eq!(outcome.leftover_destructions.len(), 1);
        assert_eq!(outcome.leftover_destructions[0].source, crate::model::EventSeq(2));
    }
}

//! Per-pilot statistics over a debriefing: shot/hit/kill counts, flight outcomes, and
//! air-to-air versus air-to-ground classification of launches.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::model::{Action, Chain, EventSeq, Launch, RawEvent};

/// Weapon types left out of domain classification and the web view.
pub const EXCLUDED_WEAPON_TYPES: [&str; 2] = ["shell", "parachutist"];

const AIR_TYPES: [&str; 2] = ["aircraft", "helicopter"];

pub fn is_excluded_weapon_type(weapon_type: &str) -> bool {
    EXCLUDED_WEAPON_TYPES
        .iter()
        .any(|excluded| weapon_type.trim().eq_ignore_ascii_case(excluded))
}

fn is_air_type(kind: &str) -> bool {
    AIR_TYPES
        .iter()
        .any(|air| kind.trim().eq_ignore_ascii_case(air))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PilotStats {
    /// Munitions released, counting each occurrence of a ripple release.
    pub shots: u32,
    pub hits: u32,
    pub kills: u32,
    pub weapon_shots: BTreeMap<String, u32>,
}

/// Raw event counts per pilot, independent of linking.
pub fn accumulate_pilot_stats(events: &[RawEvent]) -> BTreeMap<String, PilotStats> {
    let mut by_pilot: BTreeMap<String, PilotStats> = BTreeMap::new();

    for event in events {
        match event.action {
            Action::Fired => {
                let Some(pilot) = event.primary.as_ref().and_then(|p| p.pilot_name()) else {
                    continue;
                };
                let occurrences = event.occurrences.filter(|n| *n > 0).unwrap_or(1);
                let weapon = event
                    .secondary
                    .as_ref()
                    .and_then(|s| s.name.as_deref())
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or("Unknown");
                let stats = by_pilot.entry(pilot.to_string()).or_default();
                stats.shots += occurrences;
                *stats.weapon_shots.entry(weapon.to_string()).or_default() += occurrences;
            }
            Action::HitBy => {
                if let Some(pilot) = event.parent.as_ref().and_then(|p| p.pilot_name()) {
                    by_pilot.entry(pilot.to_string()).or_default().hits += 1;
                }
            }
            Action::Destroyed => {
                if let Some(pilot) = event.secondary.as_ref().and_then(|p| p.pilot_name()) {
                    by_pilot.entry(pilot.to_string()).or_default().kills += 1;
                }
            }
            _ => {}
        }
    }
    by_pilot
}

/// How a pilot's flight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightEnd {
    Landed,
    Ejected,
    #[serde(rename = "Shot down")]
    ShotDown,
}

impl FlightEnd {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Landed => "Landed",
            Self::Ejected => "Ejected",
            Self::ShotDown => "Shot down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightOutcome {
    pub duration: f64,
    pub end: FlightEnd,
}

/// Flight time from each pilot's first take-off to the first end event after it.
///
/// Pilots without both a take-off and an end are omitted.
pub fn compute_flight_outcomes(events: &[RawEvent]) -> BTreeMap<String, FlightOutcome> {
    let mut ordered: Vec<&RawEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut takeoff: HashMap<String, f64> = HashMap::new();
    let mut ended: BTreeMap<String, FlightOutcome> = BTreeMap::new();

    for event in ordered {
        let Some(pilot) = event.primary.as_ref().and_then(|p| p.pilot_name()) else {
            continue;
        };
        let end = match event.action {
            Action::TookOff => {
                takeoff.entry(pilot.to_string()).or_insert(event.time);
                continue;
            }
            Action::Landed => FlightEnd::Landed,
            Action::Fired
                if event
                    .secondary
                    .as_ref()
                    .is_some_and(|s| s.is_kind("parachutist")) =>
            {
                FlightEnd::Ejected
            }
            Action::Destroyed => FlightEnd::ShotDown,
            _ => continue,
        };
        let Some(&start) = takeoff.get(pilot) else {
            continue;
        };
        if event.time < start || ended.contains_key(pilot) {
            continue;
        }
        ended.insert(
            pilot.to_string(),
            FlightOutcome {
                duration: event.time - start,
                end,
            },
        );
    }
    ended
}

/// Flight time only, in seconds.
pub fn compute_flight_time_by_pilot(events: &[RawEvent]) -> BTreeMap<String, f64> {
    compute_flight_outcomes(events)
        .into_iter()
        .map(|(pilot, outcome)| (pilot, outcome.duration))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShotDomain {
    #[serde(rename = "AA")]
    AirToAir,
    #[serde(rename = "AG")]
    AirToGround,
}

/// Classify launches as air-to-air or air-to-ground.
///
/// A launch locked on an aircraft or helicopter is AA; so is a chained launch whose target is
/// one. Remaining launches inherit AA when their weapon identifier or name was seen on an AA
/// launch, otherwise they are AG. Shells and parachutists are not classified.
pub fn determine_shot_domain(chains: &[Chain], launches: &[Launch]) -> HashMap<EventSeq, ShotDomain> {
    let mut domains: HashMap<EventSeq, ShotDomain> = HashMap::new();
    let mut aa_weapon_ids: HashSet<i64> = HashSet::new();
    let mut aa_weapon_names: HashSet<&str> = HashSet::new();

    let mut mark_aa = |launch: &Launch, domains: &mut HashMap<EventSeq, ShotDomain>| {
        domains.insert(launch.source, ShotDomain::AirToAir);
        if let Some(id) = launch.weapon_id {
            aa_weapon_ids.insert(id);
        }
    };

    for launch in launches.iter().filter(|l| !is_excluded_weapon_type(&l.weapon_type)) {
        if is_air_type(&launch.locked_target_type) {
            mark_aa(launch, &mut domains);
        }
    }

    let chains: Vec<&Chain> = chains
        .iter()
        .filter(|chain| !is_excluded_weapon_type(&chain.launch.weapon_type))
        .collect();
    for chain in &chains {
        if domains.contains_key(&chain.launch.source) {
            continue;
        }
        if chain.target_type().is_some_and(is_air_type) {
            mark_aa(&chain.launch, &mut domains);
        }
    }

    for launch in launches {
        if domains.get(&launch.source) == Some(&ShotDomain::AirToAir) {
            aa_weapon_names.insert(launch.weapon_name.as_str());
        }
    }
    for chain in &chains {
        if domains.get(&chain.launch.source) == Some(&ShotDomain::AirToAir) {
            aa_weapon_names.insert(chain.launch.weapon_name.as_str());
        }
    }

    for launch in launches.iter().filter(|l| !is_excluded_weapon_type(&l.weapon_type)) {
        if domains.contains_key(&launch.source) {
            continue;
        }
        let inherits_aa = launch.weapon_id.is_some_and(|id| aa_weapon_ids.contains(&id))
            || aa_weapon_names.contains(launch.weapon_name.as_str());
        let domain = if inherits_aa {
            ShotDomain::AirToAir
        } else {
            ShotDomain::AirToGround
        };
        domains.insert(launch.source, domain);
    }
    for chain in &chains {
        domains
            .entry(chain.launch.source)
            .or_insert(ShotDomain::AirToGround);
    }
    domains
}

/// Air-to-air kills grouped by victim name.
pub fn compute_aa_kills_by_target(chains: &[Chain], launches: &[Launch]) -> BTreeMap<String, u32> {
    let domains = determine_shot_domain(chains, launches);
    let mut by_target: BTreeMap<String, u32> = BTreeMap::new();
    for chain in chains {
        let Some(kill) = &chain.kill else {
            continue;
        };
        if domains.get(&chain.launch.source) != Some(&ShotDomain::AirToAir) {
            continue;
        }
        let victim = kill
            .victim_name
            .clone()
            .unwrap_or_else(|| "Unknown Aircraft".to_string());
        *by_target.entry(victim).or_default() += 1;
    }
    by_target
}


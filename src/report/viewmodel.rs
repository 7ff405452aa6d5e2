//! Pilot-rooted view model for the web and JSON reports.
//!
//! Shells and parachutists are left out. Hits and kills are counted per launch event, not per
//! impact, so a ripple release that hits three targets still counts one successful shot.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::linking::{classify, LinkOutcome};
use crate::model::{Chain, EventSeq, LinkMethod, RawEvent};
use crate::report::text::format_hms;
use crate::stats::{compute_flight_outcomes, is_excluded_weapon_type, FlightEnd};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeaponTally {
    pub shots: u32,
    pub hits: u32,
    pub kills: u32,
    pub misses: u32,
}

impl WeaponTally {
    fn add(&mut self, other: &WeaponTally) {
        self.shots += other.shots;
        self.hits += other.hits;
        self.kills += other.kills;
        self.misses += other.misses;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponRow {
    pub weapon: String,
    #[serde(flatten)]
    pub tally: WeaponTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRow {
    pub shot_t: f64,
    pub weapon: String,
    pub weapon_id: Option<i64>,
    pub target_name: Option<String>,
    pub hit_t: Option<f64>,
    pub kill_t: Option<f64>,
    pub splash_kills: usize,
    pub method: LinkMethod,
    pub shooter_mismatch: bool,
    pub friendly: bool,
    pub intercepted_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissRow {
    pub shot_t: f64,
    pub weapon: String,
    pub weapon_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotEntry {
    pub pilot: String,
    pub totals: WeaponTally,
    pub by_weapon: Vec<WeaponRow>,
    pub chains: Vec<ChainRow>,
    pub misses: Vec<MissRow>,
    /// `hh:mm:ss`, or `-` when the flight has no recorded end.
    pub flight_time: String,
    pub flight_time_sec: Option<f64>,
    pub flight_end: Option<FlightEnd>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PilotViewModel {
    pub pilots: Vec<PilotEntry>,
}

fn chain_row(chain: &Chain) -> ChainRow {
    ChainRow {
        shot_t: chain.launch.time,
        weapon: chain.launch.weapon_name.clone(),
        weapon_id: chain.launch.weapon_id,
        target_name: chain.target_name().map(str::to_string),
        hit_t: chain.impact.as_ref().map(|impact| impact.time),
        kill_t: chain.kill.as_ref().map(|kill| kill.time),
        splash_kills: chain.extra_kills.len(),
        method: chain.method,
        shooter_mismatch: !chain.shooter_consistent,
        friendly: chain.friendly_fire,
        intercepted_by: chain.interceptor().map(str::to_string),
    }
}

/// Build the view model from a log and its linking outcome.
pub fn build_pilot_view_model(events: &[RawEvent], outcome: &LinkOutcome) -> PilotViewModel {
    let launches: Vec<_> = classify(events)
        .launches
        .into_iter()
        .filter(|launch| !is_excluded_weapon_type(&launch.weapon_type))
        .collect();
    let chains: Vec<&Chain> = outcome
        .chains
        .iter()
        .filter(|chain| !is_excluded_weapon_type(&chain.launch.weapon_type))
        .collect();
    let misses: Vec<_> = outcome
        .leftover_launches
        .iter()
        .filter(|launch| !is_excluded_weapon_type(&launch.weapon_type))
        .collect();
    let outcomes = compute_flight_outcomes(events);

    let pilots: BTreeSet<&str> = launches
        .iter()
        .map(|launch| launch.shooter_pilot.as_str())
        .chain(chains.iter().map(|chain| chain.launch.shooter_pilot.as_str()))
        .collect();

    let mut entries: Vec<PilotEntry> = pilots
        .into_iter()
        .map(|pilot| {
            let mut by_weapon: BTreeMap<String, WeaponTally> = BTreeMap::new();
            for launch in launches.iter().filter(|l| l.shooter_pilot == pilot) {
                by_weapon.entry(launch.weapon_name.clone()).or_default().shots += 1;
            }

            let pilot_chains: Vec<&Chain> = chains
                .iter()
                .copied()
                .filter(|chain| chain.launch.shooter_pilot == pilot)
                .collect();
            let mut hit_launches: BTreeMap<&str, HashSet<EventSeq>> = BTreeMap::new();
            let mut kill_launches: BTreeMap<&str, HashSet<EventSeq>> = BTreeMap::new();
            for chain in &pilot_chains {
                let weapon = chain.launch.weapon_name.as_str();
                if chain.impact.is_some() {
                    hit_launches.entry(weapon).or_default().insert(chain.launch.source);
                }
                if chain.kill.is_some() {
                    kill_launches.entry(weapon).or_default().insert(chain.launch.source);
                }
            }
            for (weapon, ids) in hit_launches {
                by_weapon.entry(weapon.to_string()).or_default().hits += ids.len() as u32;
            }
            for (weapon, ids) in kill_launches {
                by_weapon.entry(weapon.to_string()).or_default().kills += ids.len() as u32;
            }

            let mut miss_rows: Vec<MissRow> = misses
                .iter()
                .filter(|launch| launch.shooter_pilot == pilot)
                .map(|launch| {
                    by_weapon.entry(launch.weapon_name.clone()).or_default().misses += 1;
                    MissRow {
                        shot_t: launch.time,
                        weapon: launch.weapon_name.clone(),
                        weapon_id: launch.weapon_id,
                    }
                })
                .collect();
            miss_rows.sort_by(|a, b| a.shot_t.total_cmp(&b.shot_t));

            let mut chain_rows: Vec<ChainRow> = pilot_chains.iter().map(|c| chain_row(c)).collect();
            chain_rows.sort_by(|a, b| a.shot_t.total_cmp(&b.shot_t));

            let mut totals = WeaponTally::default();
            for tally in by_weapon.values() {
                totals.add(tally);
            }
            let mut weapon_rows: Vec<WeaponRow> = by_weapon
                .into_iter()
                .map(|(weapon, tally)| WeaponRow { weapon, tally })
                .collect();
            weapon_rows.sort_by(|a, b| {
                b.tally
                    .shots
                    .cmp(&a.tally.shots)
                    .then_with(|| a.weapon.cmp(&b.weapon))
            });

            let flight = outcomes.get(pilot);
            PilotEntry {
                pilot: pilot.to_string(),
                totals,
                by_weapon: weapon_rows,
                chains: chain_rows,
                misses: miss_rows,
                flight_time: flight.map_or_else(|| "-".to_string(), |f| format_hms(f.duration)),
                flight_time_sec: flight.map(|f| f.duration),
                flight_end: flight.map(|f| f.end),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.totals
            .shots
            .cmp(&a.totals.shots)
            .then_with(|| a.pilot.cmp(&b.pilot))
    });
    PilotViewModel { pilots: entries }
}

//! Flat CSV export of linked chains, one row per chain.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::model::{Chain, LinkMethod};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainCsvRow {
    pub pilot: String,
    pub weapon: String,
    pub weapon_id: Option<i64>,
    pub shot_t: f64,
    pub hit_t: Option<f64>,
    pub target_id: Option<i64>,
    pub target_name: Option<String>,
    pub kill_t: Option<f64>,
    pub splash_kills: usize,
    pub method: LinkMethod,
    pub shooter_mismatch: bool,
    pub friendly_fire: bool,
    pub intercepted_by: Option<String>,
}

impl From<&Chain> for ChainCsvRow {
    fn from(chain: &Chain) -> Self {
        Self {
            pilot: chain.launch.shooter_pilot.clone(),
            weapon: chain.launch.weapon_name.clone(),
            weapon_id: chain.launch.weapon_id,
            shot_t: chain.launch.time,
            hit_t: chain.impact.as_ref().map(|impact| impact.time),
            target_id: chain.impact.as_ref().and_then(|impact| impact.target_id),
            target_name: chain.target_name().map(str::to_string),
            kill_t: chain.kill.as_ref().map(|kill| kill.time),
            splash_kills: chain.extra_kills.len(),
            method: chain.method,
            shooter_mismatch: !chain.shooter_consistent,
            friendly_fire: chain.friendly_fire,
            intercepted_by: chain.interceptor().map(str::to_string),
        }
    }
}

pub fn write_chains_csv<W: Write>(writer: W, chains: &[Chain]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for chain in chains {
        csv_writer.serialize(ChainCsvRow::from(chain))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_chains_csv(path: impl AsRef<Path>, chains: &[Chain]) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_chains_csv(file, chains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linking::link;
    use crate::model::{Action, ActorInfo, RawEvent};

    #[test]
    fn header_and_one_row_per_chain() {
        let events = vec![
            RawEvent::new(0, 10.0, Action::Fired)
                .with_primary(ActorInfo::new(Some(1), "Aircraft", "F-14B").with_pilot("Goose"))
                .with_secondary(ActorInfo::new(Some(44), "Missile", "AIM-54C")),
            RawEvent::new(1, 40.0, Action::HitBy)
                .with_primary(ActorInfo::new(Some(8), "Aircraft", "Tu-22M3"))
                .with_secondary(ActorInfo::new(Some(44), "Missile", "AIM-54C"))
                .with_parent(ActorInfo::new(Some(1), "Aircraft", "F-14B").with_pilot("Goose")),
        ];
        let outcome = link(&events);
        let mut buffer = Vec::new();
        write_chains_csv(&mut buffer, &outcome.chains).expect("write csv");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("pilot,weapon,weapon_id,shot_t"));
        assert!(lines[1].starts_with("Goose,AIM-54C,44,10.0,40.0,8,Tu-22M3,,0,deterministic"));
    }
}

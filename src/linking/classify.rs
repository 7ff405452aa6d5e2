//! Pattern tests that turn raw events into typed records.
//!
//! Every raw event is tested against every pattern independently, so one event may yield
//! several records (an impact that is also an interception, for example).

use serde::Serialize;

use crate::model::{
    has_pilot, Action, ActorInfo, Destruction, Impact, InterceptionCandidate, Launch, RawEvent,
};

/// Weapon-name fragments identifying air-to-ground munitions that can be intercepted.
pub const AIR_TO_GROUND_TOKENS: [&str; 7] =
    ["AGM", "GBU", "JDAM", "JSOW", "SDB", "HARM", "HELLFIRE"];

const UNKNOWN_WEAPON: &str = "Unknown";

/// Typed records of one log, each list ascending by time (stable on input order).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Classified {
    pub launches: Vec<Launch>,
    pub impacts: Vec<Impact>,
    pub destructions: Vec<Destruction>,
    pub interceptions: Vec<InterceptionCandidate>,
}

pub fn classify<'a, I>(events: I) -> Classified
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut classified = Classified::default();
    for event in events {
        if let Some(launch) = launch_from(event) {
            classified.launches.push(launch);
        }
        if let Some(impact) = impact_from(event) {
            classified.impacts.push(impact);
        }
        if let Some(destruction) = destruction_from(event) {
            classified.destructions.push(destruction);
        }
        if let Some(candidate) = interception_from(event) {
            classified.interceptions.push(candidate);
        }
    }

    sort_by_time(&mut classified.launches, |launch| launch.time);
    sort_by_time(&mut classified.impacts, |impact| impact.time);
    sort_by_time(&mut classified.destructions, |kill| kill.time);
    sort_by_time(&mut classified.interceptions, |candidate| candidate.time);
    classified
}

/// Stable ascending sort on a float timestamp.
pub(crate) fn sort_by_time<T>(items: &mut [T], time: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| time(a).total_cmp(&time(b)));
}

fn trimmed(value: Option<&String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn coalition_of(actor: Option<&ActorInfo>) -> String {
    actor.map(|a| a.coalition_str().to_string()).unwrap_or_default()
}

fn pilot_of(actor: Option<&ActorInfo>) -> String {
    actor
        .and_then(ActorInfo::pilot_name)
        .map(str::to_string)
        .unwrap_or_default()
}

/// `fired` with a piloted primary actor.
pub fn launch_from(event: &RawEvent) -> Option<Launch> {
    if event.action != Action::Fired || !has_pilot(event.primary.as_ref()) {
        return None;
    }
    let shooter = event.primary.as_ref()?;
    let weapon = event.secondary.as_ref();
    let weapon_name = weapon
        .and_then(|w| w.name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_WEAPON)
        .to_string();
    let occurrences = event.occurrences.filter(|n| *n > 0).unwrap_or(1);

    Some(Launch {
        source: event.seq,
        time: event.time,
        weapon_id: weapon.and_then(|w| w.id),
        weapon_name,
        weapon_type: trimmed(weapon.and_then(|w| w.kind.as_ref())),
        shooter_id: shooter.id,
        shooter_pilot: pilot_of(Some(shooter)),
        shooter_coalition: shooter.coalition_str().to_string(),
        locked_target_id: event.locked.as_ref().and_then(|locked| locked.id),
        locked_target_type: trimmed(event.locked.as_ref().and_then(|l| l.kind.as_ref())),
        occurrences,
        remaining_occurrences: occurrences,
    })
}

/// `hit-by` with a piloted parent actor.
pub fn impact_from(event: &RawEvent) -> Option<Impact> {
    if event.action != Action::HitBy || !has_pilot(event.parent.as_ref()) {
        return None;
    }
    let shooter = event.parent.as_ref()?;
    let target = event.primary.as_ref();
    let weapon = event.secondary.as_ref();

    Some(Impact {
        source: event.seq,
        time: event.time,
        weapon_id: weapon.and_then(|w| w.id),
        weapon_type: trimmed(weapon.and_then(|w| w.kind.as_ref())),
        target_id: target.and_then(|t| t.id),
        target_name: target.and_then(|t| t.name.clone()),
        target_type: target.and_then(|t| t.kind.clone()),
        target_coalition: coalition_of(target),
        shooter_id: shooter.id,
        shooter_pilot: pilot_of(Some(shooter)),
        shooter_coalition: shooter.coalition_str().to_string(),
    })
}

/// `destroyed` with a piloted secondary actor.
pub fn destruction_from(event: &RawEvent) -> Option<Destruction> {
    if !has_pilot(event.secondary.as_ref()) {
        return None;
    }
    destruction_record(event)
}

/// Any `destroyed` event, attributed or not. Splash attribution scans these.
pub fn destruction_record(event: &RawEvent) -> Option<Destruction> {
    if event.action != Action::Destroyed {
        return None;
    }
    let victim = event.primary.as_ref();
    let killer = event.secondary.as_ref();

    Some(Destruction {
        source: event.seq,
        time: event.time,
        target_id: victim.and_then(|v| v.id),
        victim_name: victim.and_then(|v| v.name.clone()),
        victim_type: victim.and_then(|v| v.kind.clone()),
        victim_coalition: coalition_of(victim),
        killer_pilot: pilot_of(killer),
        killer_coalition: coalition_of(killer),
        location: event.location,
    })
}

fn is_air_to_ground_name(name: Option<&str>) -> bool {
    let Some(name) = name else {
        return false;
    };
    let upper = name.to_uppercase();
    AIR_TO_GROUND_TOKENS.iter().any(|token| upper.contains(token))
}

/// `hit-by` where an opposing missile strikes an air-to-ground missile.
pub fn interception_from(event: &RawEvent) -> Option<InterceptionCandidate> {
    if event.action != Action::HitBy || !has_pilot(event.parent.as_ref()) {
        return None;
    }
    let striking = event.primary.as_ref()?;
    let struck = event.secondary.as_ref()?;
    if !struck.is_kind("missile") || !is_air_to_ground_name(struck.name.as_deref()) {
        return None;
    }
    if !striking.is_kind("missile") {
        return None;
    }
    let striking_side = striking.coalition_str();
    let struck_side = struck.coalition_str();
    if striking_side.is_empty() || struck_side.is_empty() || striking_side == struck_side {
        return None;
    }

    Some(InterceptionCandidate {
        source: event.seq,
        time: event.time,
        weapon_id: struck.id,
        interceptor: striking
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(UNKNOWN_WEAPON)
            .to_string(),
        pilot: pilot_of(event.parent.as_ref()),
    })
}

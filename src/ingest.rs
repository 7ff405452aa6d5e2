//! Debriefing log ingestion from the JSON export.
//!
//! Decoding is lenient at the field level: a numeric field that does not parse becomes `None`,
//! a numeric text field becomes its string form, and an event with an unknown or non-string
//! action is skipped. Only an unreadable file or a document that is not JSON at all is an error.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::{Action, ActorInfo, EventSeq, Location, RawEvent};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid debriefing document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("debriefing has more events than can be indexed")]
    TooManyEvents,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightRecording {
    pub source: Option<String>,
    pub recorder: Option<String>,
    pub recording_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mission {
    pub title: Option<String>,
    pub mission_time: Option<String>,
    pub duration: Option<f64>,
    pub main_aircraft_id: Option<i64>,
}

/// A decoded log: metadata plus events in file order, each tagged with its [`EventSeq`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Debriefing {
    pub version: Option<String>,
    pub flight_recording: Option<FlightRecording>,
    pub mission: Option<Mission>,
    pub events: Vec<RawEvent>,
    /// Events dropped because their action is outside the known vocabulary.
    pub skipped_events: usize,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    flight_recording: Option<WireFlightRecording>,
    #[serde(default)]
    mission: Option<WireMission>,
    /// Decoded one at a time so a malformed event is skipped instead of failing the document.
    #[serde(default)]
    events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WireFlightRecording {
    #[serde(default)]
    source: Option<Value>,
    #[serde(default)]
    recorder: Option<Value>,
    #[serde(default)]
    recording_time: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireMission {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    mission_time: Option<Value>,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    main_aircraft_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    action: Option<Value>,
    #[serde(default)]
    location: Option<WireLocation>,
    #[serde(default, alias = "primary_object")]
    primary: Option<WireActor>,
    #[serde(default, alias = "secondary_object")]
    secondary: Option<WireActor>,
    #[serde(default, alias = "parent_object")]
    parent: Option<WireActor>,
    #[serde(default, alias = "locked_object")]
    locked: Option<WireActor>,
    #[serde(default)]
    occurrences: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    #[serde(default)]
    longitude: Option<Value>,
    #[serde(default)]
    latitude: Option<Value>,
    #[serde(default)]
    altitude: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireActor {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    coalition: Option<Value>,
    #[serde(default)]
    pilot: Option<Value>,
    #[serde(default)]
    parent: Option<Value>,
}

/// Integer from a number or numeric string; anything else is absent.
fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Finite float from a number or numeric string; anything else is absent.
fn lenient_float(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Text from a string or number; anything else is absent.
fn lenient_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<WireActor> for ActorInfo {
    fn from(wire: WireActor) -> Self {
        Self {
            id: lenient_int(wire.id.as_ref()),
            kind: lenient_string(wire.kind.as_ref()),
            name: lenient_string(wire.name.as_ref()),
            coalition: lenient_string(wire.coalition.as_ref()),
            pilot: lenient_string(wire.pilot.as_ref()),
            parent: lenient_int(wire.parent.as_ref()),
        }
    }
}

impl From<WireLocation> for Location {
    fn from(wire: WireLocation) -> Self {
        Self {
            longitude: lenient_float(wire.longitude.as_ref()).unwrap_or(0.0),
            latitude: lenient_float(wire.latitude.as_ref()).unwrap_or(0.0),
            altitude: lenient_float(wire.altitude.as_ref()).unwrap_or(0.0),
        }
    }
}

fn decode_event(seq: EventSeq, wire: WireEvent) -> Option<RawEvent> {
    let action = wire
        .action
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Action::from_wire)?;
    let occurrences = lenient_int(wire.occurrences.as_ref()).and_then(|n| u32::try_from(n).ok());

    Some(RawEvent {
        seq,
        time: lenient_float(wire.time.as_ref()).unwrap_or(0.0),
        action,
        location: wire.location.map(Location::from),
        primary: wire.primary.map(ActorInfo::from),
        secondary: wire.secondary.map(ActorInfo::from),
        parent: wire.parent.map(ActorInfo::from),
        locked: wire.locked.map(ActorInfo::from),
        occurrences,
    })
}

/// Decode a debriefing document from JSON text.
pub fn parse_debriefing_json(input: &str) -> Result<Debriefing, IngestError> {
    let wire: WireDocument = serde_json::from_str(input)?;

    let mut events = Vec::with_capacity(wire.events.len());
    let mut skipped_events = 0usize;
    for raw_event in wire.events {
        let seq = u32::try_from(events.len()).map_err(|_| IngestError::TooManyEvents)?;
        let wire_event = match serde_json::from_value::<WireEvent>(raw_event) {
            Ok(wire_event) => wire_event,
            Err(err) => {
                skipped_events += 1;
                debug!("skipping malformed event: {err}");
                continue;
            }
        };
        let raw_action = wire_event.action.clone();
        match decode_event(EventSeq(seq), wire_event) {
            Some(event) => events.push(event),
            None => {
                skipped_events += 1;
                debug!(action = ?raw_action, "skipping event with unrecognized action");
            }
        }
    }

    let mission = wire.mission.map(|m| Mission {
        title: lenient_string(m.title.as_ref()),
        mission_time: lenient_string(m.mission_time.as_ref()),
        duration: lenient_float(m.duration.as_ref()),
        main_aircraft_id: lenient_int(m.main_aircraft_id.as_ref()),
    });

    Ok(Debriefing {
        version: lenient_string(wire.version.as_ref()),
        flight_recording: wire.flight_recording.map(|r| FlightRecording {
            source: lenient_string(r.source.as_ref()),
            recorder: lenient_string(r.recorder.as_ref()),
            recording_time: lenient_string(r.recording_time.as_ref()),
        }),
        mission,
        events,
        skipped_events,
    })
}

/// Read and decode a debriefing file.
pub fn load_debriefing(path: impl AsRef<Path>) -> Result<Debriefing, IngestError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let debriefing = parse_debriefing_json(&raw)?;
    debug!(
        path = %path.display(),
        events = debriefing.events.len(),
        skipped = debriefing.skipped_events,
        "debriefing loaded"
    );
    Ok(debriefing)
}

/// Human pilots: everyone who entered the area, plus the pilot of the mission's main aircraft.
pub fn extract_human_pilots(events: &[RawEvent], mission: Option<&Mission>) -> BTreeSet<String> {
    let mut pilots: BTreeSet<String> = events
        .iter()
        .filter(|event| event.action == Action::EnteredArea)
        .filter_map(|event| event.primary.as_ref()?.pilot_name())
        .map(str::to_string)
        .collect();

    if let Some(main_id) = mission.and_then(|m| m.main_aircraft_id) {
        let main_pilot = events.iter().find_map(|event| {
            let primary = event.primary.as_ref()?;
            if primary.id == Some(main_id) {
                primary.pilot_name()
            } else {
                None
            }
        });
        if let Some(pilot) = main_pilot {
            pilots.insert(pilot.to_string());
        }
    }
    pilots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_numbers_degrade_to_none() {
        let json = r#"{"events":[{"time":"abc","action":"HasFired",
            "primary":{"id":"x1","type":"Aircraft","pilot":"Viper"},
            "secondary":{"id":"42","type":"Missile","name":"AIM-9X"},
            "occurrences":"-3"}]}"#;
        let debriefing = parse_debriefing_json(json).expect("parse");
        let event = &debriefing.events[0];
        assert_eq!(event.time, 0.0);
        assert_eq!(event.primary.as_ref().and_then(|a| a.id), None);
        assert_eq!(event.secondary.as_ref().and_then(|a| a.id), Some(42));
        assert_eq!(event.occurrences, None);
    }

    #[test]
    fn unknown_actions_are_skipped_and_sequence_stays_dense() {
        let json = r#"{"events":[
            {"time":1.0,"action":"HasFired"},
            {"time":2.0,"action":"HasExploded"},
            {"time":3.0,"action":"HasLanded"}]}"#;
        let debriefing = parse_debriefing_json(json).expect("parse");
        assert_eq!(debriefing.skipped_events, 1);
        let seqs: Vec<u32> = debriefing.events.iter().map(|e| e.seq.0).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn non_string_action_is_skipped() {
        let json = r#"{"events":[
            {"time":1.0,"action":7},
            {"time":2.0,"action":"HasFired","primary":{"id":1,"pilot":"Viper"}}]}"#;
        let debriefing = parse_debriefing_json(json).expect("parse");
        assert_eq!(debriefing.skipped_events, 1);
        assert_eq!(debriefing.events.len(), 1);
        assert_eq!(debriefing.events[0].seq, EventSeq(0));
        assert_eq!(debriefing.events[0].action, Action::Fired);
    }

    #[test]
    fn numeric_text_fields_become_strings() {
        let json = r#"{"events":[{"time":1.0,"action":"HasFired",
            "primary":{"id":1,"type":"Aircraft","name":16,"coalition":2,"pilot":"Viper"},
            "secondary":{"id":5,"type":["Missile"],"name":"AIM-9X"}}]}"#;
        let debriefing = parse_debriefing_json(json).expect("parse");
        let primary = debriefing.events[0].primary.as_ref().expect("primary");
        assert_eq!(primary.name.as_deref(), Some("16"));
        assert_eq!(primary.coalition.as_deref(), Some("2"));
        let secondary = debriefing.events[0].secondary.as_ref().expect("secondary");
        assert_eq!(secondary.kind, None);
    }

    #[test]
    fn event_that_is_not_an_object_is_skipped() {
        let json = r#"{"events":[42,{"time":3.0,"action":"HasLanded"}]}"#;
        let debriefing = parse_debriefing_json(json).expect("parse");
        assert_eq!(debriefing.skipped_events, 1);
        assert_eq!(debriefing.events.len(), 1);
    }

    #[test]
    fn non_json_is_an_error() {
        assert!(matches!(
            parse_debriefing_json("<Debriefing/>"),
            Err(IngestError::Json(_))
        ));
    }

    #[test]
    fn main_aircraft_pilot_counts_as_human() {
        let json = r#"{"mission":{"main_aircraft_id":"7"},"events":[
            {"time":0.0,"action":"HasEnteredTheArea","primary":{"id":3,"pilot":"Alpha"}},
            {"time":5.0,"action":"HasTakenOff","primary":{"id":7,"pilot":"Bravo"}}]}"#;
        let debriefing = parse_debriefing_json(json).expect("parse");
        let pilots = extract_human_pilots(&debriefing.events, debriefing.mission.as_ref());
        assert_eq!(
            pilots.into_iter().collect::<Vec<_>>(),
            vec!["Alpha".to_string(), "Bravo".to_string()]
        );
    }
}

//! Debriefing document decoding against the sample fixture.

use std::path::{Path, PathBuf};

use debrief::ingest::{
    extract_human_pilots, load_debriefing, parse_debriefing_json, IngestError,
};
use debrief::model::{Action, EventSeq};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn sample_fixture_decodes_with_metadata() {
    let debriefing = load_debriefing(fixture_path("sample_debriefing.json")).expect("load fixture");

    assert_eq!(debriefing.version.as_deref(), Some("2.2"));
    let recording = debriefing.flight_recording.as_ref().expect("recording metadata");
    assert_eq!(recording.source.as_deref(), Some("DCS World"));
    let mission = debriefing.mission.as_ref().expect("mission metadata");
    assert_eq!(mission.title.as_deref(), Some("Operation Sandbox"));
    assert_eq!(mission.duration, Some(1800.0));
    assert_eq!(mission.main_aircraft_id, Some(1));

    assert_eq!(debriefing.events.len(), 17);
    assert_eq!(debriefing.skipped_events, 1);
}

#[test]
fn sequence_numbers_follow_decoded_order() {
    let debriefing = load_debriefing(fixture_path("sample_debriefing.json")).expect("load fixture");
    for (idx, event) in debriefing.events.iter().enumerate() {
        assert_eq!(event.seq, EventSeq(idx as u32));
    }
    let last_shot = debriefing
        .events
        .iter()
        .rev()
        .find(|event| event.action == Action::Fired)
        .expect("a launch");
    assert_eq!(last_shot.seq, EventSeq(15));
    assert_eq!(last_shot.time, 95.0);
}

#[test]
fn string_numbers_are_accepted() {
    let debriefing = load_debriefing(fixture_path("sample_debriefing.json")).expect("load fixture");
    let kill = debriefing
        .events
        .iter()
        .find(|event| event.action == Action::Destroyed)
        .expect("a destruction");
    assert!((kill.time - 11.05).abs() < 1e-9);

    let ripple = debriefing
        .events
        .iter()
        .find(|event| event.occurrences.is_some())
        .expect("a ripple release");
    assert_eq!(ripple.occurrences, Some(2));
}

#[test]
fn human_pilots_come_from_area_entries_and_main_aircraft() {
    let debriefing = load_debriefing(fixture_path("sample_debriefing.json")).expect("load fixture");
    let pilots = extract_human_pilots(&debriefing.events, debriefing.mission.as_ref());
    assert_eq!(
        pilots.into_iter().collect::<Vec<_>>(),
        vec!["Hog".to_string(), "Viper".to_string()]
    );
}

#[test]
fn legacy_object_keys_are_aliases() {
    let json = r#"{"events":[{"time":3.5,"action":"HasFired",
        "primary_object":{"id":1,"type":"Aircraft","pilot":"Rooster"},
        "secondary_object":{"id":9,"type":"Missile","name":"AIM-7M"},
        "locked_object":{"id":4,"type":"Aircraft","name":"MiG-23"}}]}"#;
    let debriefing = parse_debriefing_json(json).expect("parse");
    let event = &debriefing.events[0];
    assert_eq!(event.primary.as_ref().and_then(|a| a.pilot_name()), Some("Rooster"));
    assert_eq!(event.secondary.as_ref().and_then(|a| a.id), Some(9));
    assert_eq!(event.locked.as_ref().and_then(|a| a.id), Some(4));
}

#[test]
fn missing_file_reports_path() {
    let err = load_debriefing("/nonexistent/debrief.json").expect_err("missing file");
    assert!(matches!(err, IngestError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/debrief.json"));
}

#[test]
fn document_without_events_is_empty() {
    let debriefing = parse_debriefing_json("{}").expect("parse");
    assert!(debriefing.events.is_empty());
    assert!(debriefing.mission.is_none());
}

#[test]
fn wrongly_typed_fields_do_not_reject_the_document() {
    let json = r#"{"mission":{"title":404},"events":[
        {"time":1.0,"action":7},
        {"time":2.0,"action":"HasFired",
         "primary":{"id":1,"type":"Aircraft","name":16,"pilot":"Viper"},
         "secondary":{"id":9,"type":"Missile","name":"AIM-9X"}}]}"#;
    let debriefing = parse_debriefing_json(json).expect("document should decode");

    assert_eq!(debriefing.skipped_events, 1);
    assert_eq!(debriefing.events.len(), 1);
    let shooter = debriefing.events[0].primary.as_ref().expect("shooter");
    assert_eq!(shooter.name.as_deref(), Some("16"));
    assert_eq!(
        debriefing.mission.as_ref().and_then(|m| m.title.as_deref()),
        Some("404")
    );
}

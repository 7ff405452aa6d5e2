use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of an event in the decoded log.
///
/// Raw events carry no key of their own, so two events with identical fields are still distinct
/// occurrences. Every "already used" set in the linker is keyed by this index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventSeq(pub u32);

impl fmt::Display for EventSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome kind recorded for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "HasFired")]
    Fired,
    #[serde(rename = "HasBeenHitBy")]
    HitBy,
    #[serde(rename = "HasBeenDestroyed")]
    Destroyed,
    #[serde(rename = "HasTakenOff")]
    TookOff,
    #[serde(rename = "HasLanded")]
    Landed,
    #[serde(rename = "HasEnteredTheArea")]
    EnteredArea,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Fired,
        Action::HitBy,
        Action::Destroyed,
        Action::TookOff,
        Action::Landed,
        Action::EnteredArea,
    ];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Fired => "HasFired",
            Self::HitBy => "HasBeenHitBy",
            Self::Destroyed => "HasBeenDestroyed",
            Self::TookOff => "HasTakenOff",
            Self::Landed => "HasLanded",
            Self::EnteredArea => "HasEnteredTheArea",
        }
    }

    /// Parse the recorder's action name. Unknown names yield `None`.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|action| action.wire_name() == raw)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
        }
    }
}

/// One actor referenced by an event (aircraft, weapon, ground unit, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub coalition: Option<String>,
    #[serde(default)]
    pub pilot: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
}

impl ActorInfo {
    pub fn new(id: Option<i64>, kind: &str, name: &str) -> Self {
        Self {
            id,
            kind: Some(kind.to_string()),
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_pilot(mut self, pilot: &str) -> Self {
        self.pilot = Some(pilot.to_string());
        self
    }

    pub fn with_coalition(mut self, coalition: &str) -> Self {
        self.coalition = Some(coalition.to_string());
        self
    }

    pub fn with_parent(mut self, parent: i64) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Trimmed pilot name, `None` when absent or blank.
    pub fn pilot_name(&self) -> Option<&str> {
        self.pilot
            .as_deref()
            .map(str::trim)
            .filter(|pilot| !pilot.is_empty())
    }

    /// Trimmed type string, empty when absent.
    pub fn kind_str(&self) -> &str {
        self.kind.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind_str().eq_ignore_ascii_case(kind)
    }

    /// Trimmed coalition, empty when absent.
    pub fn coalition_str(&self) -> &str {
        self.coalition.as_deref().map(str::trim).unwrap_or("")
    }
}

/// True when the actor is present and has a non-blank pilot.
pub fn has_pilot(actor: Option<&ActorInfo>) -> bool {
    actor.and_then(ActorInfo::pilot_name).is_some()
}

/// A single decoded log entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub seq: EventSeq,
    pub time: f64,
    pub action: Action,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub primary: Option<ActorInfo>,
    #[serde(default)]
    pub secondary: Option<ActorInfo>,
    #[serde(default)]
    pub parent: Option<ActorInfo>,
    #[serde(default)]
    pub locked: Option<ActorInfo>,
    #[serde(default)]
    pub occurrences: Option<u32>,
}

impl RawEvent {
    pub fn new(seq: u32, time: f64, action: Action) -> Self {
        Self {
            seq: EventSeq(seq),
            time,
            action,
            location: None,
            primary: None,
            secondary: None,
            parent: None,
            locked: None,
            occurrences: None,
        }
    }

    pub fn with_primary(mut self, actor: ActorInfo) -> Self {
        self.primary = Some(actor);
        self
    }

    pub fn with_secondary(mut self, actor: ActorInfo) -> Self {
        self.secondary = Some(actor);
        self
    }

    pub fn with_parent(mut self, actor: ActorInfo) -> Self {
        self.parent = Some(actor);
        self
    }

    pub fn with_locked(mut self, actor: ActorInfo) -> Self {
        self.locked = Some(actor);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_occurrences(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }
}

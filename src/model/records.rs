//! Records derived from raw events by the classifier.
//!
//! Each record keeps the [`EventSeq`] of the entry it came from; that index is the only identity
//! the linker trusts.

use serde::Serialize;

use crate::model::event::{EventSeq, Location};

/// Weapon-name fragments that mark a launch as area-effect for splash attribution.
pub const AREA_EFFECT_TOKENS: [&str; 4] = ["gbu", "jdam", "sdb", "agm"];

/// A weapon release by a piloted actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Launch {
    pub source: EventSeq,
    pub time: f64,
    pub weapon_id: Option<i64>,
    pub weapon_name: String,
    pub weapon_type: String,
    pub shooter_id: Option<i64>,
    pub shooter_pilot: String,
    pub shooter_coalition: String,
    pub locked_target_id: Option<i64>,
    pub locked_target_type: String,
    /// Munitions released by this single event (ripple release).
    pub occurrences: u32,
    /// Occurrences not yet claimed by a heuristic chain. Only the heuristic linker mutates this,
    /// and only on its own copy of the classified list.
    pub remaining_occurrences: u32,
}

impl Launch {
    pub fn is_weapon_type(&self, kind: &str) -> bool {
        self.weapon_type.eq_ignore_ascii_case(kind)
    }

    /// Bombs and precision ground munitions can destroy several targets with one release.
    pub fn is_area_effect(&self) -> bool {
        if self.is_weapon_type("bomb") {
            return true;
        }
        let name = self.weapon_name.to_lowercase();
        AREA_EFFECT_TOKENS.iter().any(|token| name.contains(token))
    }
}

/// A "struck by weapon" event on some target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Impact {
    pub source: EventSeq,
    pub time: f64,
    pub weapon_id: Option<i64>,
    /// Type of the striking weapon as reported on the impact.
    pub weapon_type: String,
    pub target_id: Option<i64>,
    pub target_name: Option<String>,
    pub target_type: Option<String>,
    pub target_coalition: String,
    /// Shooter identifier taken from the impact's parent reference.
    pub shooter_id: Option<i64>,
    pub shooter_pilot: String,
    pub shooter_coalition: String,
}

impl Impact {
    pub fn is_bomb(&self) -> bool {
        self.weapon_type.eq_ignore_ascii_case("bomb")
    }
}

/// A "target destroyed" event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destruction {
    pub source: EventSeq,
    pub time: f64,
    pub target_id: Option<i64>,
    pub victim_name: Option<String>,
    pub victim_type: Option<String>,
    pub victim_coalition: String,
    /// Empty when the log does not attribute the destruction to a pilot.
    pub killer_pilot: String,
    pub killer_coalition: String,
    pub location: Option<Location>,
}

/// An opposing missile striking an air-to-ground weapon in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterceptionCandidate {
    pub source: EventSeq,
    pub time: f64,
    /// Identifier of the weapon that was intercepted.
    pub weapon_id: Option<i64>,
    pub interceptor: String,
    /// Pilot who launched the intercepted weapon.
    pub pilot: String,
}

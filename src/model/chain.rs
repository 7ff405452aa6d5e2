use serde::Serialize;

use crate::model::event::EventSeq;
use crate::model::records::{Destruction, Impact, Launch};

/// Which linking pass produced a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMethod {
    Deterministic,
    Heuristic,
}

/// Whether the chain's outcome still stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChainState {
    Active,
    /// The munition was destroyed in flight; impact and kills were retracted.
    Intercepted { interceptor: String, time: f64 },
}

/// Reconstructed Launch -> Impact -> Destruction link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chain {
    pub launch: Launch,
    pub impact: Option<Impact>,
    pub kill: Option<Destruction>,
    pub extra_kills: Vec<Destruction>,
    pub method: LinkMethod,
    /// False when the impact names a different shooter than the launch.
    pub shooter_consistent: bool,
    /// Shooter and target share a coalition.
    pub friendly_fire: bool,
    pub state: ChainState,
}

impl Chain {
    /// Chain joined on weapon identifier; shooter consistency is checked against the impact's
    /// parent reference.
    pub fn deterministic(launch: Launch, impact: Impact) -> Self {
        let shooter_consistent = impact.shooter_id == launch.shooter_id;
        let mut chain = Self {
            launch,
            impact: Some(impact),
            kill: None,
            extra_kills: Vec::new(),
            method: LinkMethod::Deterministic,
            shooter_consistent,
            friendly_fire: false,
            state: ChainState::Active,
        };
        chain.refresh_friendly_fire();
        chain
    }

    /// Chain joined on pilot and time window.
    pub fn heuristic(launch: Launch, impact: Impact) -> Self {
        let mut chain = Self {
            launch,
            impact: Some(impact),
            kill: None,
            extra_kills: Vec::new(),
            method: LinkMethod::Heuristic,
            shooter_consistent: true,
            friendly_fire: false,
            state: ChainState::Active,
        };
        chain.refresh_friendly_fire();
        chain
    }

    pub fn attach_kill(&mut self, kill: Destruction) {
        self.kill = Some(kill);
        self.refresh_friendly_fire();
    }

    pub fn attach_extra_kill(&mut self, kill: Destruction) {
        self.extra_kills.push(kill);
    }

    /// Retract the outcome of an intercepted munition. Returns the impact that was cleared.
    pub fn intercept(&mut self, interceptor: &str, time: f64) -> Option<Impact> {
        self.state = ChainState::Intercepted {
            interceptor: interceptor.to_string(),
            time,
        };
        self.kill = None;
        self.extra_kills.clear();
        self.friendly_fire = false;
        self.impact.take()
    }

    pub fn is_intercepted(&self) -> bool {
        matches!(self.state, ChainState::Intercepted { .. })
    }

    pub fn interceptor(&self) -> Option<&str> {
        match &self.state {
            ChainState::Intercepted { interceptor, .. } => Some(interceptor),
            ChainState::Active => None,
        }
    }

    pub fn launch_source(&self) -> EventSeq {
        self.launch.source
    }

    pub fn impact_source(&self) -> Option<EventSeq> {
        self.impact.as_ref().map(|impact| impact.source)
    }

    pub fn kill_source(&self) -> Option<EventSeq> {
        self.kill.as_ref().map(|kill| kill.source)
    }

    /// Target name from the impact, falling back to the primary kill's victim.
    pub fn target_name(&self) -> Option<&str> {
        self.impact
            .as_ref()
            .and_then(|impact| impact.target_name.as_deref())
            .or_else(|| self.kill.as_ref().and_then(|kill| kill.victim_name.as_deref()))
    }

    /// Target type from the impact, falling back to the primary kill's victim.
    pub fn target_type(&self) -> Option<&str> {
        self.impact
            .as_ref()
            .and_then(|impact| impact.target_type.as_deref())
            .or_else(|| self.kill.as_ref().and_then(|kill| kill.victim_type.as_deref()))
    }

    fn target_coalition(&self) -> &str {
        match (&self.impact, &self.kill) {
            (Some(impact), _) if !impact.target_coalition.is_empty() => &impact.target_coalition,
            (_, Some(kill)) => &kill.victim_coalition,
            _ => "",
        }
    }

    fn refresh_friendly_fire(&mut self) {
        let shooter = self.launch.shooter_coalition.as_str();
        let target = self.target_coalition();
        let friendly =
            !shooter.is_empty() && !target.is_empty() && shooter.eq_ignore_ascii_case(target);
        self.friendly_fire = friendly;
    }
}

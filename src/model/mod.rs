//! Typed records for a debriefing log and the causal chains built from them.

pub mod chain;
pub mod event;
pub mod records;

pub use chain::{Chain, ChainState, LinkMethod};
pub use event::{has_pilot, Action, ActorInfo, EventSeq, Location, RawEvent};
pub use records::{Destruction, Impact, InterceptionCandidate, Launch};

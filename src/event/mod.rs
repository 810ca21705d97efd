//! Event stream — what the core emits, and the clock that drives it.
//!
//! [`BeatClock`] decides *when* a beat happens; [`Clock`] says what time it
//! is. Minigames turn beats into [`RoundEvent`]s and the session turns those
//! into [`SessionEvent`]s for the host.

pub mod clock;
pub mod transport;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use transport::{BeatClock, BeatFire, PlayState, TimerHandle};
pub use types::{BeatOutcome, Phase, RoundEvent, RoundStart, SessionEvent};

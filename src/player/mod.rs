// Player module
// Transport state machine, speed mapping and the async tick driver

pub mod driver;
pub mod session;
pub mod speed;

pub use driver::{PlaybackCommand, PlaybackDriver, PlaybackEvent};
pub use session::{
    FrameSource, PlaybackError, PlaybackStatus, Player, Scheduled, SessionState, TickOutcome,
    TickToken, TraceSource,
};
pub use speed::{delay, Speed, MAX_SPEED, MIN_SPEED};

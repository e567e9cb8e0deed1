// Algoscope - Algorithm trace recording and stepped playback
// Module declarations

pub mod commands;
pub mod config;
pub mod highlight;
pub mod input;
pub mod player;
pub mod recorders;
pub mod structures;
pub mod trace;

pub use config::EngineConfig;
pub use highlight::{project, Highlight, HighlightOf, Project};
pub use input::{InputError, InputResult};
pub use player::{PlaybackDriver, PlaybackError, PlaybackEvent, PlaybackStatus, Player, Speed};
pub use trace::{Family, Frame, FrameKind, Trace, TraceBuilder, TraceError};

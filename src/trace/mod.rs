// Trace model
// Frames, families, and the validated traces recorders hand to players

pub mod builder;
pub mod frame;

pub use builder::{validate, Trace, TraceBuilder, TraceError};
pub use frame::{Family, Frame, FrameKind, SubjectOf};

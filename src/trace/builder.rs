// Trace building and validation
// Recorders append frames to a private buffer, then seal it into an immutable Trace

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::frame::{Family, Frame};

/// Malformed-trace errors. Always a recorder bug, never a data error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("malformed trace: no frames were recorded")]
    Empty,

    #[error("malformed trace: last of {len} frames is not terminal")]
    MissingTerminal { len: usize },

    #[error("malformed trace: terminal frame at index {index} of {len} is not last")]
    MisplacedTerminal { index: usize, len: usize },
}

/// Check the terminal-frame invariant: non-empty, exactly one terminal frame, and it is last
pub fn validate<F: Family>(frames: &[Frame<F>]) -> Result<(), TraceError> {
    let len = frames.len();
    if len == 0 {
        return Err(TraceError::Empty);
    }

    if let Some(index) = frames[..len - 1].iter().position(|frame| frame.is_terminal()) {
        return Err(TraceError::MisplacedTerminal { index, len });
    }

    if !frames[len - 1].is_terminal() {
        return Err(TraceError::MissingTerminal { len });
    }

    Ok(())
}

/// A finite, ordered, validated sequence of frames from one algorithm run
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct Trace<F: Family> {
    /// Unique identifier for this recording
    pub id: Uuid,

    /// Algorithm that produced the trace (snake_case name)
    pub algorithm: String,

    /// When the recorder finished
    pub recorded_at: DateTime<Utc>,

    frames: Vec<Frame<F>>,
}

impl<F: Family> Trace<F> {
    pub fn frames(&self) -> &[Frame<F>] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&Frame<F>> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a finalized trace; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The closing frame (`found`, `not-found` or `complete`)
    pub fn terminal(&self) -> &Frame<F> {
        // validate() guarantees at least one frame
        &self.frames[self.frames.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame<F>> {
        self.frames.iter()
    }
}

/// Private build buffer owned by a recorder until it is sealed
#[derive(Debug)]
pub struct TraceBuilder<F: Family> {
    algorithm: String,
    frames: Vec<Frame<F>>,
}

impl<F: Family> TraceBuilder<F> {
    /// Start a trace for the named algorithm
    pub fn new(algorithm: impl Into<String>) -> Self {
        TraceBuilder {
            algorithm: algorithm.into(),
            frames: Vec::new(),
        }
    }

    /// Append a finished frame
    pub fn append(&mut self, frame: Frame<F>) {
        self.frames.push(frame);
    }

    /// Append a frame built from its parts
    pub fn push(&mut self, kind: F::Kind, snapshot: F::Snapshot, aux: F::Aux) {
        self.append(Frame::new(kind, snapshot, aux));
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Last frame recorded so far
    pub fn last(&self) -> Option<&Frame<F>> {
        self.frames.last()
    }

    /// Validate the buffer and turn it into an immutable trace
    pub fn finalize(self) -> Result<Trace<F>, TraceError> {
        validate(&self.frames)?;

        Ok(Trace {
            id: Uuid::new_v4(),
            algorithm: self.algorithm,
            recorded_at: Utc::now(),
            frames: self.frames,
        })
    }

    /// Finalize, aborting on a malformed buffer.
    ///
    /// A malformed buffer means the recorder itself is wrong, so this must never be
    /// recovered from and handed to a player.
    pub fn seal(self) -> Trace<F> {
        let algorithm = self.algorithm.clone();
        match self.finalize() {
            Ok(trace) => {
                log::info!(
                    "Recorded {} trace for {}: {} frames",
                    F::NAME,
                    trace.algorithm,
                    trace.len()
                );
                trace
            }
            Err(e) => {
                log::error!("Recorder {} produced a broken trace: {}", algorithm, e);
                panic!("recorder {} produced a broken trace: {}", algorithm, e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::trace::FrameKind;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum Tick {
        Step { at: usize },
        Done,
    }

    impl FrameKind for Tick {
        type Subject = usize;

        fn is_terminal(&self) -> bool {
            matches!(self, Tick::Done)
        }

        fn subjects(&self) -> Vec<usize> {
            match self {
                Tick::Step { at } => vec![*at],
                Tick::Done => Vec::new(),
            }
        }

        fn label(&self) -> &'static str {
            match self {
                Tick::Step { .. } => "step",
                Tick::Done => "done",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Counting;

    impl Family for Counting {
        type Kind = Tick;
        type Snapshot = Vec<usize>;
        type Aux = ();
        const NAME: &'static str = "counting";
    }

    /// Trace of `steps` step frames followed by `done`
    pub fn counting_trace(steps: usize) -> Trace<Counting> {
        let mut builder = TraceBuilder::new("count");
        for at in 0..steps {
            builder.push(Tick::Step { at }, (0..=at).collect(), ());
        }
        builder.push(Tick::Done, (0..steps).collect(), ());
        builder.seal()
    }

    #[test]
    fn test_empty_trace_is_rejected() {
        let builder: TraceBuilder<Counting> = TraceBuilder::new("count");
        assert_eq!(builder.finalize().unwrap_err(), TraceError::Empty);
    }

    #[test]
    fn test_missing_terminal_is_rejected() {
        let mut builder: TraceBuilder<Counting> = TraceBuilder::new("count");
        builder.push(Tick::Step { at: 0 }, vec![0], ());
        assert_eq!(
            builder.finalize().unwrap_err(),
            TraceError::MissingTerminal { len: 1 }
        );
    }

    #[test]
    fn test_misplaced_terminal_is_rejected() {
        let mut builder: TraceBuilder<Counting> = TraceBuilder::new("count");
        builder.push(Tick::Done, vec![], ());
        builder.push(Tick::Step { at: 0 }, vec![0], ());
        builder.push(Tick::Done, vec![0], ());
        assert_eq!(
            builder.finalize().unwrap_err(),
            TraceError::MisplacedTerminal { index: 0, len: 3 }
        );
    }

    #[test]
    #[should_panic(expected = "broken trace")]
    fn test_seal_aborts_on_malformed_buffer() {
        let builder: TraceBuilder<Counting> = TraceBuilder::new("count");
        let _ = builder.seal();
    }

    #[test]
    fn test_finalized_trace_accessors() {
        let trace = counting_trace(3);
        assert_eq!(trace.len(), 4);
        assert!(!trace.is_empty());
        assert_eq!(trace.algorithm, "count");
        assert_eq!(trace.terminal().kind, Tick::Done);
        assert_eq!(trace.get(1).unwrap().subjects(), vec![1]);
        assert!(trace.get(4).is_none());
    }

    #[test]
    fn test_frame_json_shape() {
        let trace = counting_trace(1);
        let json = serde_json::to_value(trace.get(0).unwrap()).unwrap();
        assert_eq!(json["kind"]["kind"], "step");
        assert_eq!(json["kind"]["at"], 0);
        assert_eq!(json["snapshot"], serde_json::json!([0]));
    }
}

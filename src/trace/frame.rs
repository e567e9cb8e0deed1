// Frame model - one immutable observable algorithm event
// Families pair a closed step vocabulary with their snapshot and auxiliary payloads

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Closed vocabulary of steps for one algorithm family
pub trait FrameKind:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Identifier of a structure element (index, vertex label, grid cell)
    type Subject: Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Whether this step closes a trace (`found`, `not-found`, `complete`)
    fn is_terminal(&self) -> bool;

    /// Ordered list of elements this step concerns
    fn subjects(&self) -> Vec<Self::Subject>;

    /// Stable snake_case tag, matches the serialized `kind` field
    fn label(&self) -> &'static str;
}

/// An algorithm family: step vocabulary plus the state captured with every step
pub trait Family: Debug + Clone + Copy + PartialEq + Send + Sync + 'static {
    type Kind: FrameKind;

    /// Full independent copy of the container's value state
    type Snapshot: Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Family-specific payload (queue/stack contents, search window, settled set)
    type Aux: Debug + Clone + PartialEq + Default + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Family name used in logs
    const NAME: &'static str;
}

/// Subject type of a family's step vocabulary
pub type SubjectOf<F> = <<F as Family>::Kind as FrameKind>::Subject;

/// One recorded event with the state it left behind.
///
/// Frames own their snapshot and auxiliary data outright, so replaying frame `i`
/// after frame `i + 5` yields the same render hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Frame<F: Family> {
    /// What happened
    pub kind: F::Kind,

    /// Container state after the event
    pub snapshot: F::Snapshot,

    /// Family-specific payload at the instant of the event
    pub aux: F::Aux,
}

impl<F: Family> Frame<F> {
    /// Create a frame with an explicit auxiliary payload
    pub fn new(kind: F::Kind, snapshot: F::Snapshot, aux: F::Aux) -> Self {
        Frame {
            kind,
            snapshot,
            aux,
        }
    }

    /// Create a frame whose auxiliary payload is empty
    pub fn bare(kind: F::Kind, snapshot: F::Snapshot) -> Self {
        Frame::new(kind, snapshot, F::Aux::default())
    }

    /// Elements this frame concerns, in order
    pub fn subjects(&self) -> Vec<SubjectOf<F>> {
        self.kind.subjects()
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}

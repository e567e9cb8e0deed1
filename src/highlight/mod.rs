// Highlight projection
// Pure frame -> render-hint mapping consumed by the view on every cursor change

mod projectors;

use serde::Serialize;

use crate::recorders::Window;
use crate::trace::{Family, Frame, SubjectOf};

/// Render hints for one frame. Every field defaults to "nothing highlighted".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight<S> {
    /// Elements the step acts on (processed vertex, probed node, written slot)
    pub active: Vec<S>,

    /// Elements being compared or inspected
    pub compared: Vec<S>,

    pub pivot: Option<S>,

    /// Elements that are final: sorted, visited, found
    pub settled: Vec<S>,

    /// Shortest path revealed so far
    pub path: Vec<S>,

    /// Current `[lo, mid, hi]` window
    pub window: Option<Window>,

    pub queue: Vec<S>,

    pub stack: Vec<S>,
}

impl<S> Default for Highlight<S> {
    fn default() -> Self {
        Highlight {
            active: Vec::new(),
            compared: Vec::new(),
            pivot: None,
            settled: Vec::new(),
            path: Vec::new(),
            window: None,
            queue: Vec::new(),
            stack: Vec::new(),
        }
    }
}

impl<S> Highlight<S> {
    /// True when no field carries anything
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
            && self.compared.is_empty()
            && self.pivot.is_none()
            && self.settled.is_empty()
            && self.path.is_empty()
            && self.window.is_none()
            && self.queue.is_empty()
            && self.stack.is_empty()
    }
}

/// Highlight type produced for a family
pub type HighlightOf<F> = Highlight<SubjectOf<F>>;

/// Families whose frames can be projected to render hints.
///
/// Implementations must be pure: the same frame (and predecessor) always yields
/// the same highlight, whatever was shown before.
pub trait Project: Family {
    /// Project `frame`; `previous` is the frame shown immediately before it, if any
    fn project(frame: &Frame<Self>, previous: Option<&Frame<Self>>) -> HighlightOf<Self>;
}

/// Project a frame of any family
pub fn project<F: Project>(frame: &Frame<F>, previous: Option<&Frame<F>>) -> HighlightOf<F> {
    F::project(frame, previous)
}

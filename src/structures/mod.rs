// Structure mutators
// Live data structures animated one synthesized frame at a time

pub mod array;
pub mod linked_list;
pub mod queue;
pub mod screen;
pub mod source;
pub mod stack;
pub mod tree;

use serde::{Deserialize, Serialize};

use crate::highlight::{Highlight, HighlightOf, Project};
use crate::trace::{Family, Frame, FrameKind};

pub use array::{Array, ArrayOp};
pub use linked_list::{LinkedList, ListOp};
pub use queue::{Queue, QueueOp};
pub use screen::Screen;
pub use source::{MutationSource, Operation};
pub use stack::{Stack, StackOp};
pub use tree::{LayoutRow, TraversalOrder, Tree, TreeAux, TreeFamily, TreeOp, TreeStep};

/// Steps shared by the sequential structures (array, linked list, stack, queue).
/// Subjects are positions in the structure's natural order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinearStep {
    /// Walking past position `i`
    Probe { i: usize },

    /// Looking at the element an operation will act on or report
    Peek { i: usize },

    /// A value now sits at `i`
    Insert { i: usize },

    /// The value that was at `i` is gone
    Remove { i: usize },

    /// Every element was removed
    Clear,

    Found { i: usize },

    NotFound,

    Complete,
}

impl FrameKind for LinearStep {
    type Subject = usize;

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            LinearStep::Found { .. } | LinearStep::NotFound | LinearStep::Complete
        )
    }

    fn subjects(&self) -> Vec<usize> {
        match self {
            LinearStep::Probe { i }
            | LinearStep::Peek { i }
            | LinearStep::Insert { i }
            | LinearStep::Remove { i }
            | LinearStep::Found { i } => vec![*i],
            LinearStep::Clear | LinearStep::NotFound | LinearStep::Complete => Vec::new(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            LinearStep::Probe { .. } => "probe",
            LinearStep::Peek { .. } => "peek",
            LinearStep::Insert { .. } => "insert",
            LinearStep::Remove { .. } => "remove",
            LinearStep::Clear => "clear",
            LinearStep::Found { .. } => "found",
            LinearStep::NotFound => "not_found",
            LinearStep::Complete => "complete",
        }
    }
}

/// Value the operation is about (inserted, removed, peeked or searched for)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearAux {
    pub value: Option<i64>,
}

/// Family of the sequential structures; snapshots list values in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linear;

impl Family for Linear {
    type Kind = LinearStep;
    type Snapshot = Vec<i64>;
    type Aux = LinearAux;
    const NAME: &'static str = "linear";
}

impl Project for Linear {
    fn project(frame: &Frame<Self>, _previous: Option<&Frame<Self>>) -> HighlightOf<Self> {
        let mut hl = Highlight::default();

        match &frame.kind {
            LinearStep::Probe { i } => hl.compared = vec![*i],
            LinearStep::Peek { i } | LinearStep::Insert { i } | LinearStep::Remove { i } => {
                hl.active = vec![*i]
            }
            LinearStep::Found { i } => hl.settled = vec![*i],
            LinearStep::Clear | LinearStep::NotFound | LinearStep::Complete => {}
        }

        hl
    }
}

/// Frame for a sequential structure
pub(crate) fn linear_frame(step: LinearStep, values: Vec<i64>, value: Option<i64>) -> Frame<Linear> {
    Frame::new(step, values, LinearAux { value })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::source::{MutationSource, Operation};
    use crate::player::FrameSource;
    use crate::trace::{Family, Frame, FrameKind};

    /// Pull every frame of `op` against `target`, returning frames and the final structure
    pub fn run_op<O: Operation>(target: O::Target, op: O) -> (Vec<Frame<O::Family>>, O::Target) {
        let mut source = MutationSource::new(target, op);
        let mut frames = Vec::new();
        while let Some(frame) = source.next_frame() {
            frames.push(frame);
        }
        (frames, source.into_target())
    }

    pub fn labels<F: Family>(frames: &[Frame<F>]) -> Vec<&'static str> {
        frames.iter().map(|f| f.kind.label()).collect()
    }
}

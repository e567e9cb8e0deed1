// Recorders module
// Instrumented algorithms that run to completion and return a full trace

pub mod catalog;
pub mod graph;
pub mod pathfinding;
pub mod searching;
pub mod sorting;

pub use catalog::{list_algorithms, AlgorithmFamily, AlgorithmInfo, Complexity};
pub use graph::{Frontier, Graph, GraphAlgorithm, GraphStep, Traversal};
pub use pathfinding::{
    find_path, Cell, Grid, GridSnapshot, PathAlgorithm, PathAux, PathOutcome, PathStep,
    Pathfinding,
};
pub use searching::{SearchAlgorithm, SearchAux, SearchStep, Searching, Window};
pub use sorting::{SortAlgorithm, SortAux, SortStep, Sorting};

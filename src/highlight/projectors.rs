// Recorder family projectors
// One exhaustive match per step vocabulary

use super::{Highlight, HighlightOf, Project};
use crate::recorders::{
    Frontier, GraphStep, PathStep, Pathfinding, SearchStep, Searching, SortStep, Sorting,
    Traversal, Window,
};
use crate::trace::Frame;

impl Project for Sorting {
    fn project(frame: &Frame<Self>, previous: Option<&Frame<Self>>) -> HighlightOf<Self> {
        let mut hl = Highlight {
            settled: frame.aux.settled.clone(),
            ..Default::default()
        };

        match &frame.kind {
            SortStep::Compare { i, j } => hl.compared = vec![*i, *j],
            SortStep::Swap { i, j } => {
                hl.active = vec![*i, *j];
                // A swap that resolves the comparison just shown keeps its compare tint
                if let Some(SortStep::Compare { i: pi, j: pj }) = previous.map(|p| &p.kind) {
                    if (pi, pj) == (i, j) || (pi, pj) == (j, i) {
                        hl.compared = vec![*i, *j];
                    }
                }
            }
            SortStep::Insert { i } | SortStep::Position { i } => hl.active = vec![*i],
            SortStep::Pivot { i } => hl.pivot = Some(*i),
            SortStep::Divide { lo, mid, hi } => {
                hl.window = Some(Window {
                    lo: *lo,
                    mid: *mid,
                    hi: *hi,
                })
            }
            SortStep::Sorted { .. } | SortStep::Complete => {}
        }

        hl
    }
}

impl Project for Searching {
    fn project(frame: &Frame<Self>, _previous: Option<&Frame<Self>>) -> HighlightOf<Self> {
        let mut hl = Highlight {
            window: frame.aux.window,
            ..Default::default()
        };

        match &frame.kind {
            SearchStep::Compare { i } => hl.compared = vec![*i],
            SearchStep::Range { mid, .. } => hl.active = vec![*mid],
            SearchStep::Found { i } => hl.settled = vec![*i],
            SearchStep::NotFound => {}
        }

        hl
    }
}

impl Project for Traversal {
    fn project(frame: &Frame<Self>, _previous: Option<&Frame<Self>>) -> HighlightOf<Self> {
        let mut hl = Highlight {
            settled: frame.snapshot.clone(),
            ..Default::default()
        };

        match &frame.aux {
            Frontier::Queue(queue) => hl.queue = queue.clone(),
            Frontier::Stack(stack) => hl.stack = stack.clone(),
            Frontier::None => {}
        }

        match &frame.kind {
            GraphStep::Start { vertex }
            | GraphStep::Process { vertex }
            | GraphStep::Backtrack { vertex } => hl.active = vec![vertex.clone()],
            GraphStep::Visit { from, to } | GraphStep::Revisit { from, to } => {
                hl.active = vec![from.clone()];
                hl.compared = vec![to.clone()];
            }
            GraphStep::Complete => {}
        }

        hl
    }
}

impl Project for Pathfinding {
    fn project(frame: &Frame<Self>, _previous: Option<&Frame<Self>>) -> HighlightOf<Self> {
        let mut hl = Highlight {
            settled: frame.aux.visited.clone(),
            path: frame.aux.path.clone(),
            ..Default::default()
        };

        match &frame.kind {
            PathStep::Visit { cell } | PathStep::Path { cell } => hl.active = vec![*cell],
            PathStep::Found { .. } | PathStep::NotFound => {}
        }

        hl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::project;
    use crate::recorders::{graph, searching, sorting, Cell, Graph, Grid, GraphAlgorithm};
    use crate::recorders::{PathAlgorithm, SearchAlgorithm, SortAlgorithm};

    #[test]
    fn test_sort_swap_after_compare_keeps_compare_tint() {
        let trace = sorting::record(SortAlgorithm::Bubble, &[2, 1]);
        let compare = trace.get(0).unwrap();
        let swap = trace.get(1).unwrap();

        let hl = project(swap, Some(compare));
        assert_eq!(hl.active, vec![0, 1]);
        assert_eq!(hl.compared, vec![0, 1]);

        let without_context = project(swap, None);
        assert!(without_context.compared.is_empty());
    }

    #[test]
    fn test_projection_is_replayable() {
        let trace = sorting::record(SortAlgorithm::Quick, &[5, 2, 9, 1, 7]);
        let frames = trace.frames();
        let first: Vec<_> = (0..frames.len())
            .map(|i| project(&frames[i], i.checked_sub(1).map(|p| &frames[p])))
            .collect();
        // Visiting frame i after later frames reproduces the same hints
        for i in (0..frames.len()).rev() {
            let again = project(&frames[i], i.checked_sub(1).map(|p| &frames[p]));
            assert_eq!(again, first[i]);
        }
    }

    #[test]
    fn test_sort_complete_shows_everything_settled() {
        let trace = sorting::record(SortAlgorithm::Selection, &[3, 1, 2]);
        let mut settled = project(trace.terminal(), None).settled;
        settled.sort();
        assert_eq!(settled, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_window_and_found() {
        let trace = searching::record(SearchAlgorithm::Binary, &[1, 3, 5, 7, 9, 11], 7);
        let range = project(trace.get(0).unwrap(), None);
        assert_eq!(range.active, vec![2]);
        assert_eq!(range.window, Some(Window { lo: 0, mid: 2, hi: 5 }));

        let found = project(trace.terminal(), None);
        assert_eq!(found.settled, vec![3]);
        assert!(found.window.is_none());
    }

    #[test]
    fn test_graph_queue_and_stack() {
        let graph = Graph::undirected_from_edges(&[("A", "B"), ("A", "C")]);

        let bfs = graph::record(GraphAlgorithm::Bfs, &graph, "A").unwrap();
        let visit_b = project(bfs.get(2).unwrap(), None);
        assert_eq!(visit_b.active, vec!["A".to_string()]);
        assert_eq!(visit_b.compared, vec!["B".to_string()]);
        assert_eq!(visit_b.queue, vec!["B".to_string()]);
        assert!(visit_b.stack.is_empty());

        let dfs = graph::record(GraphAlgorithm::Dfs, &graph, "A").unwrap();
        let start = project(dfs.get(0).unwrap(), None);
        assert_eq!(start.stack, vec!["A".to_string()]);
        assert!(project(dfs.terminal(), None).stack.is_empty());
    }

    #[test]
    fn test_pathfinding_path_grows() {
        let grid = Grid::new(1, 3, Cell::new(0, 0), Cell::new(0, 2)).unwrap();
        let trace = crate::recorders::pathfinding::record(PathAlgorithm::Dijkstra, &grid);
        let last = project(trace.terminal(), None);
        assert_eq!(last.path.len(), 3);
        assert!(last.active.is_empty());
        assert_eq!(last.settled, vec![Cell::new(0, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Highlight::<usize>::default().is_empty());
    }
}

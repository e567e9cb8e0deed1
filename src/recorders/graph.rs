// Graph traversal recorders
// Adjacency-list graph plus breadth-first and depth-first traversal traces

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::str::FromStr;

use super::catalog::AlgorithmInfo;
use crate::input::{InputError, InputResult};
use crate::trace::{Family, FrameKind, Trace, TraceBuilder};

/// Graph with labelled vertices. Adjacency lists keep insertion order, which is
/// the order traversals explore neighbours in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub directed: bool,
    vertices: Vec<String>,
    adjacency: HashMap<String, Vec<String>>,
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Graph {
            directed,
            ..Default::default()
        }
    }

    /// Build an undirected graph from an edge list, creating vertices as needed
    pub fn undirected_from_edges(edges: &[(&str, &str)]) -> Self {
        let mut graph = Graph::new(false);
        for (a, b) in edges {
            graph.add_vertex(a);
            graph.add_vertex(b);
            graph.add_edge(a, b);
        }
        graph
    }

    /// Returns false if the vertex already exists
    pub fn add_vertex(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.vertices.push(label.to_string());
        self.adjacency.insert(label.to_string(), Vec::new());
        true
    }

    /// Returns false if either endpoint is missing or the edge already exists
    pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
        if !self.contains(a) || !self.contains(b) || self.has_edge(a, b) {
            return false;
        }

        if let Some(list) = self.adjacency.get_mut(a) {
            list.push(b.to_string());
        }
        if !self.directed {
            if let Some(list) = self.adjacency.get_mut(b) {
                if !list.iter().any(|v| v == a) {
                    list.push(a.to_string());
                }
            }
        }
        true
    }

    /// Remove a vertex along with every edge touching it
    pub fn remove_vertex(&mut self, label: &str) -> bool {
        if self.adjacency.remove(label).is_none() {
            return false;
        }
        self.vertices.retain(|v| v != label);
        for list in self.adjacency.values_mut() {
            list.retain(|v| v != label);
        }
        true
    }

    pub fn remove_edge(&mut self, a: &str, b: &str) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        if let Some(list) = self.adjacency.get_mut(a) {
            list.retain(|v| v != b);
        }
        if !self.directed {
            if let Some(list) = self.adjacency.get_mut(b) {
                list.retain(|v| v != a);
            }
        }
        true
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.neighbors(a).iter().any(|v| v == b)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.adjacency.contains_key(label)
    }

    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    /// Neighbours of `label` in insertion order (empty for unknown vertices)
    pub fn neighbors(&self, label: &str) -> &[String] {
        self.adjacency.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edge list; undirected edges appear once with the smaller label first
    pub fn edges(&self) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        for vertex in &self.vertices {
            for adjacent in self.neighbors(vertex) {
                if self.directed || vertex < adjacent {
                    edges.push((vertex.clone(), adjacent.clone()));
                }
            }
        }
        edges
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.adjacency.clear();
    }
}

/// Observable traversal steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphStep {
    Start { vertex: String },

    /// `vertex` was taken off the frontier and its neighbours are about to be scanned
    Process { vertex: String },

    /// Edge to an unvisited vertex
    Visit { from: String, to: String },

    /// Edge to an already visited vertex
    Revisit { from: String, to: String },

    /// All neighbours of `vertex` are exhausted (depth-first only)
    Backtrack { vertex: String },

    Complete,
}

impl FrameKind for GraphStep {
    type Subject = String;

    fn is_terminal(&self) -> bool {
        matches!(self, GraphStep::Complete)
    }

    fn subjects(&self) -> Vec<String> {
        match self {
            GraphStep::Start { vertex }
            | GraphStep::Process { vertex }
            | GraphStep::Backtrack { vertex } => vec![vertex.clone()],
            GraphStep::Visit { from, to } | GraphStep::Revisit { from, to } => {
                vec![from.clone(), to.clone()]
            }
            GraphStep::Complete => Vec::new(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GraphStep::Start { .. } => "start",
            GraphStep::Process { .. } => "process",
            GraphStep::Visit { .. } => "visit",
            GraphStep::Revisit { .. } => "revisit",
            GraphStep::Backtrack { .. } => "backtrack",
            GraphStep::Complete => "complete",
        }
    }
}

/// Pending vertices at the instant of a frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "vertices", rename_all = "snake_case")]
pub enum Frontier {
    #[default]
    None,
    Queue(Vec<String>),
    Stack(Vec<String>),
}

/// Traversal family: snapshots are the visited vertices in visit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal;

impl Family for Traversal {
    type Kind = GraphStep;
    type Snapshot = Vec<String>;
    type Aux = Frontier;
    const NAME: &'static str = "graph";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphAlgorithm {
    Bfs,
    Dfs,
}

impl GraphAlgorithm {
    pub const ALL: [GraphAlgorithm; 2] = [GraphAlgorithm::Bfs, GraphAlgorithm::Dfs];

    pub fn info(&self) -> AlgorithmInfo {
        match self {
            GraphAlgorithm::Bfs => AlgorithmInfo::new(
                "bfs",
                "Breadth-First Search",
                "Explores every vertex at the current depth before moving on to the next depth level.",
                ["O(V + E)", "O(V + E)", "O(V + E)", "O(V)"],
            ),
            GraphAlgorithm::Dfs => AlgorithmInfo::new(
                "dfs",
                "Depth-First Search",
                "Explores as far as possible along each branch before backtracking.",
                ["O(V + E)", "O(V + E)", "O(V + E)", "O(V)"],
            ),
        }
    }
}

impl FromStr for GraphAlgorithm {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bfs" | "breadth_first" => Ok(GraphAlgorithm::Bfs),
            "dfs" | "depth_first" => Ok(GraphAlgorithm::Dfs),
            _ => Err(InputError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Traverse `graph` from `start`, refusing unknown start vertices
pub fn record(
    algorithm: GraphAlgorithm,
    graph: &Graph,
    start: &str,
) -> InputResult<Trace<Traversal>> {
    if !graph.contains(start) {
        log::warn!("Refusing {} from unknown vertex {}", algorithm.info().key, start);
        return Err(InputError::UnknownVertex(start.to_string()));
    }

    let mut rec = TraversalRecorder {
        builder: TraceBuilder::new(algorithm.info().key),
        graph,
        visited: Vec::new(),
        seen: HashSet::new(),
    };

    match algorithm {
        GraphAlgorithm::Bfs => rec.bfs(start),
        GraphAlgorithm::Dfs => {
            rec.emit(
                GraphStep::Start {
                    vertex: start.to_string(),
                },
                Frontier::Stack(vec![start.to_string()]),
            );
            rec.dfs(start, vec![start.to_string()]);
        }
    }

    rec.emit(GraphStep::Complete, Frontier::None);
    Ok(rec.builder.seal())
}

/// Visit order of a finished traversal
pub fn visit_order(trace: &Trace<Traversal>) -> &[String] {
    &trace.terminal().snapshot
}

struct TraversalRecorder<'a> {
    builder: TraceBuilder<Traversal>,
    graph: &'a Graph,
    visited: Vec<String>,
    seen: HashSet<String>,
}

impl TraversalRecorder<'_> {
    fn emit(&mut self, step: GraphStep, frontier: Frontier) {
        self.builder.push(step, self.visited.clone(), frontier);
    }

    fn mark(&mut self, vertex: &str) {
        if self.seen.insert(vertex.to_string()) {
            self.visited.push(vertex.to_string());
        }
    }

    fn bfs(&mut self, start: &str) {
        let graph = self.graph;
        let mut queue = VecDeque::from([start.to_string()]);
        let queued = |queue: &VecDeque<String>| Frontier::Queue(queue.iter().cloned().collect());

        self.mark(start);
        self.emit(
            GraphStep::Start {
                vertex: start.to_string(),
            },
            queued(&queue),
        );

        while let Some(current) = queue.pop_front() {
            self.emit(
                GraphStep::Process {
                    vertex: current.clone(),
                },
                queued(&queue),
            );

            for adjacent in graph.neighbors(&current) {
                let step = if self.seen.contains(adjacent) {
                    GraphStep::Revisit {
                        from: current.clone(),
                        to: adjacent.clone(),
                    }
                } else {
                    self.mark(adjacent);
                    queue.push_back(adjacent.clone());
                    GraphStep::Visit {
                        from: current.clone(),
                        to: adjacent.clone(),
                    }
                };
                self.emit(step, queued(&queue));
            }
        }
    }

    /// Recursive walk; `stack` is the path from the start vertex down to `vertex`
    fn dfs(&mut self, vertex: &str, stack: Vec<String>) {
        let graph = self.graph;

        self.mark(vertex);
        self.emit(
            GraphStep::Process {
                vertex: vertex.to_string(),
            },
            Frontier::Stack(stack.clone()),
        );

        for adjacent in graph.neighbors(vertex) {
            if self.seen.contains(adjacent) {
                self.emit(
                    GraphStep::Revisit {
                        from: vertex.to_string(),
                        to: adjacent.clone(),
                    },
                    Frontier::Stack(stack.clone()),
                );
                continue;
            }

            let mut deeper = stack.clone();
            deeper.push(adjacent.clone());
            self.emit(
                GraphStep::Visit {
                    from: vertex.to_string(),
                    to: adjacent.clone(),
                },
                Frontier::Stack(deeper.clone()),
            );
            self.dfs(adjacent, deeper);
        }

        let mut popped = stack;
        popped.pop();
        self.emit(
            GraphStep::Backtrack {
                vertex: vertex.to_string(),
            },
            Frontier::Stack(popped),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Graph {
        Graph::undirected_from_edges(&[("A", "B"), ("B", "C")])
    }

    fn labels(trace: &Trace<Traversal>) -> Vec<&'static str> {
        trace.iter().map(|f| f.kind.label()).collect()
    }

    #[test]
    fn test_bfs_visit_order() {
        let trace = record(GraphAlgorithm::Bfs, &chain(), "A").unwrap();
        assert_eq!(visit_order(&trace), ["A", "B", "C"]);
        assert_eq!(
            labels(&trace),
            vec!["start", "process", "visit", "process", "revisit", "visit", "process", "revisit", "complete"]
        );
        assert_eq!(
            trace.get(0).unwrap().aux,
            Frontier::Queue(vec!["A".to_string()])
        );
    }

    #[test]
    fn test_dfs_backtracks_once_per_vertex() {
        let trace = record(GraphAlgorithm::Dfs, &chain(), "A").unwrap();
        assert_eq!(visit_order(&trace), ["A", "B", "C"]);

        let backtracks: Vec<String> = trace
            .iter()
            .filter_map(|f| match &f.kind {
                GraphStep::Backtrack { vertex } => Some(vertex.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(backtracks, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_dfs_frame_order() {
        let trace = record(GraphAlgorithm::Dfs, &chain(), "A").unwrap();
        let kinds: Vec<GraphStep> = trace.iter().map(|f| f.kind.clone()).collect();
        let v = |s: &str| s.to_string();
        assert_eq!(
            kinds,
            vec![
                GraphStep::Start { vertex: v("A") },
                GraphStep::Process { vertex: v("A") },
                GraphStep::Visit { from: v("A"), to: v("B") },
                GraphStep::Process { vertex: v("B") },
                GraphStep::Revisit { from: v("B"), to: v("A") },
                GraphStep::Visit { from: v("B"), to: v("C") },
                GraphStep::Process { vertex: v("C") },
                GraphStep::Revisit { from: v("C"), to: v("B") },
                GraphStep::Backtrack { vertex: v("C") },
                GraphStep::Backtrack { vertex: v("B") },
                GraphStep::Backtrack { vertex: v("A") },
                GraphStep::Complete,
            ]
        );
        assert_eq!(
            trace.get(6).unwrap().aux,
            Frontier::Stack(vec![v("A"), v("B"), v("C")])
        );
    }

    #[test]
    fn test_visited_grows_monotonically() {
        let graph = Graph::undirected_from_edges(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        for algorithm in GraphAlgorithm::ALL {
            let trace = record(algorithm, &graph, "A").unwrap();
            let mut previous = 0;
            for frame in trace.iter() {
                assert!(frame.snapshot.len() >= previous);
                previous = frame.snapshot.len();
            }
            let mut order = visit_order(&trace).to_vec();
            order.sort();
            order.dedup();
            assert_eq!(order.len(), 4);
        }
    }

    #[test]
    fn test_unknown_start_is_refused() {
        let err = record(GraphAlgorithm::Bfs, &chain(), "Z").unwrap_err();
        assert_eq!(err, InputError::UnknownVertex("Z".to_string()));
    }

    #[test]
    fn test_isolated_start() {
        let mut graph = Graph::new(false);
        graph.add_vertex("A");
        let trace = record(GraphAlgorithm::Dfs, &graph, "A").unwrap();
        assert_eq!(labels(&trace), vec!["start", "process", "backtrack", "complete"]);
    }

    #[test]
    fn test_graph_editing() {
        let mut graph = chain();
        assert!(!graph.add_vertex("A"));
        assert!(!graph.add_edge("A", "B"));
        assert!(graph.has_edge("B", "A"));
        assert_eq!(
            graph.edges(),
            vec![("A".to_string(), "B".to_string()), ("B".to_string(), "C".to_string())]
        );

        assert!(graph.remove_vertex("B"));
        assert!(graph.edges().is_empty());
        assert_eq!(graph.vertices(), ["A", "C"]);
        assert!(!graph.remove_vertex("B"));

        graph.clear();
        assert!(graph.vertices().is_empty());
    }

    #[test]
    fn test_directed_edges() {
        let mut graph = Graph::new(true);
        graph.add_vertex("A");
        graph.add_vertex("B");
        assert!(graph.add_edge("A", "B"));
        assert!(!graph.has_edge("B", "A"));
        assert!(graph.add_edge("B", "A"));
        assert_eq!(graph.edges().len(), 2);
        assert!(graph.remove_edge("A", "B"));
        assert!(graph.has_edge("B", "A"));
    }
}

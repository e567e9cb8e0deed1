// Grid pathfinding recorders
// Dijkstra, A* and breadth-first search over a walled grid with arena-stored nodes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::catalog::AlgorithmInfo;
use crate::input::{InputError, InputResult};
use crate::trace::{Family, FrameKind, Trace, TraceBuilder};

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Manhattan distance, the A* heuristic
    pub fn manhattan(&self, other: Cell) -> u32 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u32
    }
}

/// Per-cell search state. `previous` is a back-reference by coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub wall: bool,

    /// Cost of entering this cell, always 1 unless set explicitly
    pub weight: u32,

    /// Best known distance from the start, `None` = unreached
    pub distance: Option<u32>,

    pub visited: bool,

    pub previous: Option<Cell>,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            wall: false,
            weight: 1,
            distance: None,
            visited: false,
            previous: None,
        }
    }
}

/// Rectangular grid with a start and an end cell.
///
/// Deserialized grids go through the same checks as [`Grid::new`], plus the
/// node count, wall and weight checks a hand-edited document can break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    rows: usize,
    cols: usize,
    start: Cell,
    end: Cell,
    nodes: Vec<Node>,
}

/// Unchecked wire form of [`Grid`]
#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    start: Cell,
    end: Cell,
    nodes: Vec<Node>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = InputError;

    fn try_from(raw: RawGrid) -> InputResult<Self> {
        let expected = cell_count(raw.rows, raw.cols)?;
        if raw.nodes.len() != expected {
            return Err(InputError::GridShape {
                rows: raw.rows,
                cols: raw.cols,
                expected,
                nodes: raw.nodes.len(),
            });
        }

        let grid = Grid {
            rows: raw.rows,
            cols: raw.cols,
            start: raw.start,
            end: raw.end,
            nodes: raw.nodes,
        };
        for cell in [grid.start, grid.end] {
            grid.check(cell)?;
            if grid.node(cell).wall {
                return Err(InputError::CellUnavailable {
                    row: cell.row,
                    col: cell.col,
                    reason: "it is a wall",
                });
            }
        }
        if grid.nodes.iter().any(|n| n.weight == 0) {
            return Err(InputError::ZeroWeight);
        }
        Ok(grid)
    }
}

fn cell_count(rows: usize, cols: usize) -> InputResult<usize> {
    rows.checked_mul(cols).ok_or(InputError::GridShape {
        rows,
        cols,
        expected: usize::MAX,
        nodes: 0,
    })
}

impl Grid {
    pub fn new(rows: usize, cols: usize, start: Cell, end: Cell) -> InputResult<Self> {
        let grid = Grid {
            rows,
            cols,
            start,
            end,
            nodes: Vec::new(),
        };
        grid.check(start)?;
        grid.check(end)?;
        Ok(Grid {
            nodes: vec![Node::default(); cell_count(rows, cols)?],
            ..grid
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn end(&self) -> Cell {
        self.end
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    fn check(&self, cell: Cell) -> InputResult<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(InputError::CellOutOfGrid {
                row: cell.row,
                col: cell.col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn index(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    /// Node at `cell`; callers pass coordinates already checked against the grid
    pub fn node(&self, cell: Cell) -> &Node {
        &self.nodes[self.index(cell)]
    }

    fn node_mut(&mut self, cell: Cell) -> &mut Node {
        let index = self.index(cell);
        &mut self.nodes[index]
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.contains(cell) && self.node(cell).wall
    }

    /// Flip a wall on or off. Start and end cells are left alone (returns false).
    pub fn toggle_wall(&mut self, cell: Cell) -> InputResult<bool> {
        self.check(cell)?;
        if cell == self.start || cell == self.end {
            return Ok(false);
        }
        let node = self.node_mut(cell);
        node.wall = !node.wall;
        Ok(true)
    }

    pub fn move_start(&mut self, cell: Cell) -> InputResult<()> {
        self.check_endpoint(cell, self.end)?;
        self.start = cell;
        Ok(())
    }

    pub fn move_end(&mut self, cell: Cell) -> InputResult<()> {
        self.check_endpoint(cell, self.start)?;
        self.end = cell;
        Ok(())
    }

    fn check_endpoint(&self, cell: Cell, other: Cell) -> InputResult<()> {
        self.check(cell)?;
        let reason = if self.node(cell).wall {
            "it is a wall"
        } else if cell == other {
            "it is the other endpoint"
        } else {
            return Ok(());
        };
        Err(InputError::CellUnavailable {
            row: cell.row,
            col: cell.col,
            reason,
        })
    }

    pub fn set_weight(&mut self, cell: Cell, weight: u32) -> InputResult<()> {
        self.check(cell)?;
        if weight == 0 {
            return Err(InputError::ZeroWeight);
        }
        self.node_mut(cell).weight = weight;
        Ok(())
    }

    /// Forget search state, keeping walls and weights
    pub fn clear_path(&mut self) {
        for node in &mut self.nodes {
            node.distance = None;
            node.visited = false;
            node.previous = None;
        }
    }

    pub fn clear_walls(&mut self) {
        for node in &mut self.nodes {
            node.wall = false;
        }
    }

    /// Open, unvisited neighbours in North, East, South, West order
    fn open_neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut neighbors = Vec::with_capacity(4);
        if cell.row > 0 {
            neighbors.push(Cell::new(cell.row - 1, cell.col));
        }
        if cell.col + 1 < self.cols {
            neighbors.push(Cell::new(cell.row, cell.col + 1));
        }
        if cell.row + 1 < self.rows {
            neighbors.push(Cell::new(cell.row + 1, cell.col));
        }
        if cell.col > 0 {
            neighbors.push(Cell::new(cell.row, cell.col - 1));
        }
        neighbors.retain(|&n| {
            let node = self.node(n);
            !node.visited && !node.wall
        });
        neighbors
    }

    /// Walk back-references from the end; empty when the end was never reached
    fn reconstruct_path(&self) -> Vec<Cell> {
        if self.node(self.end).previous.is_none() {
            return Vec::new();
        }

        let mut path = vec![self.end];
        let mut current = self.end;
        while let Some(previous) = self.node(current).previous {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }

    fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            rows: self.rows,
            cols: self.cols,
            distances: self.nodes.iter().map(|n| n.distance).collect(),
        }
    }
}

/// Observable pathfinding steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathStep {
    /// The cell was settled
    Visit { cell: Cell },

    /// The cell lies on the reconstructed shortest path
    Path { cell: Cell },

    /// A path of `length` cells (start and end included) exists
    Found { length: usize },

    NotFound,
}

impl FrameKind for PathStep {
    type Subject = Cell;

    fn is_terminal(&self) -> bool {
        matches!(self, PathStep::Found { .. } | PathStep::NotFound)
    }

    fn subjects(&self) -> Vec<Cell> {
        match self {
            PathStep::Visit { cell } | PathStep::Path { cell } => vec![*cell],
            PathStep::Found { .. } | PathStep::NotFound => Vec::new(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PathStep::Visit { .. } => "visit",
            PathStep::Path { .. } => "path",
            PathStep::Found { .. } => "found",
            PathStep::NotFound => "not_found",
        }
    }
}

/// Row-major distance map at the instant of a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub distances: Vec<Option<u32>>,
}

impl GridSnapshot {
    pub fn distance(&self, cell: Cell) -> Option<u32> {
        if cell.row >= self.rows || cell.col >= self.cols {
            return None;
        }
        self.distances[cell.row * self.cols + cell.col]
    }
}

/// Cells visited and path cells revealed so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAux {
    pub visited: Vec<Cell>,
    pub path: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pathfinding;

impl Family for Pathfinding {
    type Kind = PathStep;
    type Snapshot = GridSnapshot;
    type Aux = PathAux;
    const NAME: &'static str = "pathfinding";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathAlgorithm {
    Dijkstra,
    AStar,
    Bfs,
}

impl PathAlgorithm {
    pub const ALL: [PathAlgorithm; 3] = [
        PathAlgorithm::Dijkstra,
        PathAlgorithm::AStar,
        PathAlgorithm::Bfs,
    ];

    pub fn info(&self) -> AlgorithmInfo {
        match self {
            PathAlgorithm::Dijkstra => AlgorithmInfo::new(
                "dijkstra",
                "Dijkstra's Algorithm",
                "Finds the shortest path from the start to every other node in a graph with non-negative edge weights.",
                ["O((V + E) log V)", "O((V + E) log V)", "O((V + E) log V)", "O(V)"],
            ),
            PathAlgorithm::AStar => AlgorithmInfo::new(
                "a_star",
                "A* Algorithm",
                "Guides the search towards the goal with a heuristic, usually settling fewer nodes than Dijkstra.",
                ["O(E)", "O(E log V)", "O(E log V)", "O(V)"],
            ),
            PathAlgorithm::Bfs => AlgorithmInfo::new(
                "bfs",
                "Breadth-First Search",
                "Explores the grid level by level. Finds the shortest path only when every step costs the same.",
                ["O(V + E)", "O(V + E)", "O(V + E)", "O(V)"],
            ),
        }
    }
}

impl FromStr for PathAlgorithm {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dijkstra" => Ok(PathAlgorithm::Dijkstra),
            "a_star" | "astar" | "aStar" => Ok(PathAlgorithm::AStar),
            "bfs" | "breadth_first" => Ok(PathAlgorithm::Bfs),
            _ => Err(InputError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Result of a pathfinding run without the animation frames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOutcome {
    pub visited_in_order: Vec<Cell>,
    pub shortest_path: Vec<Cell>,
}

/// Run `algorithm` on `grid`, leaving distances and back-references in place
pub fn find_path(algorithm: PathAlgorithm, grid: &mut Grid) -> PathOutcome {
    let visited_in_order = search(algorithm, grid, |_, _| {});
    PathOutcome {
        visited_in_order,
        shortest_path: grid.reconstruct_path(),
    }
}

/// Record a pathfinding run on a scratch copy of `grid`
pub fn record(algorithm: PathAlgorithm, grid: &Grid) -> Trace<Pathfinding> {
    let mut scratch = grid.clone();
    let mut builder = TraceBuilder::new(algorithm.info().key);
    let mut aux = PathAux::default();

    search(algorithm, &mut scratch, |grid, cell| {
        aux.visited.push(cell);
        builder.push(PathStep::Visit { cell }, grid.snapshot(), aux.clone());
    });

    let path = scratch.reconstruct_path();
    for &cell in &path {
        aux.path.push(cell);
        builder.push(PathStep::Path { cell }, scratch.snapshot(), aux.clone());
    }

    let terminal = if path.is_empty() {
        PathStep::NotFound
    } else {
        PathStep::Found { length: path.len() }
    };
    builder.push(terminal, scratch.snapshot(), aux);
    builder.seal()
}

/// Shared driver: resets search state, runs the algorithm and reports each
/// settled cell to `on_visit` after its neighbours were relaxed
fn search(
    algorithm: PathAlgorithm,
    grid: &mut Grid,
    mut on_visit: impl FnMut(&Grid, Cell),
) -> Vec<Cell> {
    grid.clear_path();

    let (start, end) = (grid.start, grid.end);
    if start == end {
        log::debug!("Start and end coincide at {:?}, nothing to search", start);
        return Vec::new();
    }

    grid.node_mut(start).distance = Some(0);

    match algorithm {
        PathAlgorithm::Dijkstra => {
            best_first(grid, |_, node| node.distance.map(u64::from), &mut on_visit)
        }
        PathAlgorithm::AStar => best_first(
            grid,
            |cell, node| node.distance.map(|d| u64::from(d) + u64::from(cell.manhattan(end))),
            &mut on_visit,
        ),
        PathAlgorithm::Bfs => breadth_first(grid, &mut on_visit),
    }
}

/// Dijkstra and A*: every cell starts in an unvisited list that is stably
/// re-sorted by `priority` (None = infinity) on each iteration
fn best_first(
    grid: &mut Grid,
    priority: impl Fn(Cell, &Node) -> Option<u64>,
    on_visit: &mut impl FnMut(&Grid, Cell),
) -> Vec<Cell> {
    let end = grid.end;
    let mut unvisited: Vec<Cell> = (0..grid.nodes.len()).map(|i| grid.cell_at(i)).collect();
    let mut visited_in_order = Vec::new();

    while !unvisited.is_empty() {
        unvisited.sort_by_key(|&cell| priority(cell, grid.node(cell)).unwrap_or(u64::MAX));
        let closest = unvisited.remove(0);

        let Some(distance) = grid.node(closest).distance else {
            break;
        };
        if closest == end {
            break;
        }

        grid.node_mut(closest).visited = true;
        visited_in_order.push(closest);

        for neighbor in grid.open_neighbors(closest) {
            let node = grid.node_mut(neighbor);
            let candidate = distance.saturating_add(node.weight);
            if node.distance.map_or(true, |known| candidate < known) {
                node.distance = Some(candidate);
                node.previous = Some(closest);
            }
        }

        on_visit(grid, closest);
    }

    visited_in_order
}

/// FIFO flood fill; only shortest on uniform-weight grids
fn breadth_first(grid: &mut Grid, on_visit: &mut impl FnMut(&Grid, Cell)) -> Vec<Cell> {
    let (start, end) = (grid.start, grid.end);
    let mut queue = std::collections::VecDeque::from([start]);
    let mut visited_in_order = vec![start];

    grid.node_mut(start).visited = true;
    on_visit(grid, start);

    'search: while let Some(current) = queue.pop_front() {
        if current == end {
            break;
        }

        let distance = grid.node(current).distance.unwrap_or(0);
        for neighbor in grid.open_neighbors(current) {
            let node = grid.node_mut(neighbor);
            node.previous = Some(current);
            node.visited = true;
            node.distance = Some(distance + 1);

            visited_in_order.push(neighbor);
            queue.push_back(neighbor);
            on_visit(grid, neighbor);

            if neighbor == end {
                break 'search;
            }
        }
    }

    visited_in_order
}

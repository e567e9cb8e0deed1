// Engine commands
// The boundary the view layer calls: record, create sessions, drive transport, edit structures
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::EngineConfig;
use crate::highlight::{self, HighlightOf, Project};
use crate::input::{check_index, parse_value, parse_values, parse_vertex, InputError, InputResult};
use crate::player::{
    FrameSource, PlaybackDriver, PlaybackError, PlaybackEvent, PlaybackStatus, Player, Scheduled,
    SessionState, Speed, TraceSource,
};
use crate::recorders::{
    self, graph, pathfinding, searching, sorting, AlgorithmFamily, AlgorithmInfo, Cell, Graph,
    GraphAlgorithm, Grid, PathAlgorithm, Pathfinding, SearchAlgorithm, Searching, SortAlgorithm,
    Sorting, Traversal,
};
use crate::structures::{
    Array, ArrayOp, LinkedList, ListOp, Queue, QueueOp, Screen, Stack, StackOp, TraversalOrder,
    Tree, TreeOp,
};
use crate::trace::{Family, Frame, Trace};

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl<E: std::fmt::Display> From<E> for CommandError {
    fn from(error: E) -> Self {
        CommandError {
            message: error.to_string(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

// ==================== RECORD COMMANDS ====================

#[derive(Debug, Deserialize)]
pub struct RecordSortInput {
    pub algorithm: String,
    /// Comma-separated integers as typed
    pub values: String,
}

pub fn record_sort(input: RecordSortInput, config: &EngineConfig) -> CommandResult<Trace<Sorting>> {
    let algorithm: SortAlgorithm = input.algorithm.parse()?;
    let values = bounded_values(&input.values, config)?;

    let trace = sorting::record(algorithm, &values);
    log::info!("Recorded {} over {} values: {} frames", trace.algorithm, values.len(), trace.len());
    Ok(trace)
}

#[derive(Debug, Deserialize)]
pub struct RecordSearchInput {
    pub algorithm: String,
    pub values: String,
    pub target: String,
}

/// Record a search. Algorithms that assume ordered input search a sorted copy.
pub fn record_search(
    input: RecordSearchInput,
    config: &EngineConfig,
) -> CommandResult<Trace<Searching>> {
    let algorithm: SearchAlgorithm = input.algorithm.parse()?;
    let mut values = bounded_values(&input.values, config)?;
    let target = parse_value(&input.target)?;

    if algorithm.requires_sorted() {
        values.sort_unstable();
    }

    let trace = searching::record(algorithm, &values, target);
    log::info!(
        "Recorded {} for {}: {} frames, found at {:?}",
        trace.algorithm,
        target,
        trace.len(),
        searching::found_index(&trace)
    );
    Ok(trace)
}

#[derive(Debug, Deserialize)]
pub struct RecordGraphInput {
    pub algorithm: String,
    #[serde(default)]
    pub directed: bool,
    pub edges: Vec<(String, String)>,
    pub start: String,
}

pub fn record_graph(input: RecordGraphInput) -> CommandResult<Trace<Traversal>> {
    let algorithm: GraphAlgorithm = input.algorithm.parse()?;

    let mut graph = Graph::new(input.directed);
    for (from, to) in &input.edges {
        edit_graph(
            &mut graph,
            GraphEdit::AddEdge {
                from: from.clone(),
                to: to.clone(),
            },
        )?;
    }

    let start = parse_vertex(&input.start)?;
    let trace = graph::record(algorithm, &graph, &start)?;
    log::info!("Recorded {} from {}: {} frames", trace.algorithm, start, trace.len());
    Ok(trace)
}

#[derive(Debug, Deserialize)]
pub struct RecordPathInput {
    pub algorithm: String,
    pub grid: Grid,
}

pub fn record_path(input: RecordPathInput) -> CommandResult<Trace<Pathfinding>> {
    let algorithm: PathAlgorithm = input.algorithm.parse()?;
    let trace = pathfinding::record(algorithm, &input.grid);
    log::info!("Recorded {}: {} frames", trace.algorithm, trace.len());
    Ok(trace)
}

pub fn list_algorithms_command(family: AlgorithmFamily) -> CommandResult<Vec<AlgorithmInfo>> {
    Ok(recorders::list_algorithms(family))
}

fn bounded_values(raw: &str, config: &EngineConfig) -> InputResult<Vec<i64>> {
    let values = parse_values(raw)?;
    if values.len() > config.max_len() {
        return Err(InputError::Full {
            what: "Value list",
            max: config.max_len(),
        });
    }
    Ok(values)
}

// ==================== SESSION COMMANDS ====================

/// Fresh Idle session over `trace`; `speed` is clamped to 1..=100
pub fn create_session<F: Family>(trace: Trace<F>, speed: i64) -> Player<TraceSource<F>> {
    log::info!("Session created for {} ({} frames)", trace.algorithm, trace.len());
    Player::for_trace(trace, Speed::new(speed))
}

/// Same session, run on its own tokio task. Must be called inside a runtime.
pub fn spawn_session<F: Project>(
    trace: Trace<F>,
    speed: i64,
) -> (PlaybackDriver<TraceSource<F>>, UnboundedReceiver<PlaybackEvent<F>>) {
    PlaybackDriver::spawn(create_session(trace, speed))
}

/// Start playback; returns the first tick to arm, if any
pub fn play<S: FrameSource>(session: &mut Player<S>) -> CommandResult<Option<Scheduled>> {
    Ok(session.play())
}

/// Continue a paused session. Refused from any other state.
pub fn resume<S: FrameSource>(session: &mut Player<S>) -> CommandResult<Scheduled> {
    let status = session.status();
    if status != PlaybackStatus::Paused {
        return Err(PlaybackError::InvalidTransition {
            action: "resume",
            status,
        }
        .into());
    }
    session.resume().ok_or_else(|| {
        CommandError::from(PlaybackError::InvalidTransition {
            action: "resume",
            status,
        })
    })
}

pub fn pause<S: FrameSource>(session: &mut Player<S>) -> CommandResult<SessionState> {
    session.pause();
    Ok(session.state())
}

pub fn reset<S: FrameSource>(session: &mut Player<S>) -> CommandResult<SessionState> {
    session.reset();
    Ok(session.state())
}

/// Change speed while stopped. A playing session refuses the change.
pub fn set_speed<S: FrameSource>(session: &mut Player<S>, speed: i64) -> CommandResult<Speed> {
    Ok(session.try_set_speed(speed)?)
}

/// Render hints for `frame`, given the frame shown before it
pub fn project<F: Project>(frame: &Frame<F>, previous: Option<&Frame<F>>) -> HighlightOf<F> {
    highlight::project(frame, previous)
}

// ==================== GRAPH & GRID EDITING ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GraphEdit {
    AddVertex { label: String },
    /// Creates missing endpoints first
    AddEdge { from: String, to: String },
    RemoveVertex { label: String },
    RemoveEdge { from: String, to: String },
    Clear,
}

/// Apply one edit; labels are upper-cased. Returns whether anything changed.
pub fn edit_graph(graph: &mut Graph, edit: GraphEdit) -> CommandResult<bool> {
    let changed = match edit {
        GraphEdit::AddVertex { label } => graph.add_vertex(&parse_vertex(&label)?),
        GraphEdit::AddEdge { from, to } => {
            let (from, to) = (parse_vertex(&from)?, parse_vertex(&to)?);
            graph.add_vertex(&from);
            graph.add_vertex(&to);
            graph.add_edge(&from, &to)
        }
        GraphEdit::RemoveVertex { label } => graph.remove_vertex(&parse_vertex(&label)?),
        GraphEdit::RemoveEdge { from, to } => {
            graph.remove_edge(&parse_vertex(&from)?, &parse_vertex(&to)?)
        }
        GraphEdit::Clear => {
            graph.clear();
            true
        }
    };
    Ok(changed)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GridEdit {
    ToggleWall { cell: Cell },
    MoveStart { cell: Cell },
    MoveEnd { cell: Cell },
    SetWeight { cell: Cell, weight: u32 },
    ClearPath,
    ClearWalls,
}

pub fn edit_grid(grid: &mut Grid, edit: GridEdit) -> CommandResult<bool> {
    match edit {
        GridEdit::ToggleWall { cell } => return Ok(grid.toggle_wall(cell)?),
        GridEdit::MoveStart { cell } => grid.move_start(cell)?,
        GridEdit::MoveEnd { cell } => grid.move_end(cell)?,
        GridEdit::SetWeight { cell, weight } => grid.set_weight(cell, weight)?,
        GridEdit::ClearPath => grid.clear_path(),
        GridEdit::ClearWalls => grid.clear_walls(),
    }
    Ok(true)
}

// ==================== STRUCTURE COMMANDS ====================

/// Values for a new structure; blank input means empty
fn initial_values(raw: &str, config: &EngineConfig) -> InputResult<Vec<i64>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    bounded_values(raw, config)
}

pub fn create_array(values: &str, config: &EngineConfig) -> CommandResult<Screen<ArrayOp>> {
    let array = Array::from_values(initial_values(values, config)?, config.max_len())?;
    Ok(Screen::new(array, config.default_speed()))
}

pub fn create_linked_list(values: &str, config: &EngineConfig) -> CommandResult<Screen<ListOp>> {
    let list = LinkedList::from_values(&initial_values(values, config)?, config.max_len())?;
    Ok(Screen::new(list, config.default_speed()))
}

pub fn create_stack(values: &str, config: &EngineConfig) -> CommandResult<Screen<StackOp>> {
    let stack = Stack::from_values(&initial_values(values, config)?, config.max_len())?;
    Ok(Screen::new(stack, config.default_speed()))
}

pub fn create_queue(values: &str, config: &EngineConfig) -> CommandResult<Screen<QueueOp>> {
    let queue = Queue::from_values(&initial_values(values, config)?, config.max_len())?;
    Ok(Screen::new(queue, config.default_speed()))
}

pub fn create_tree(values: &str, config: &EngineConfig) -> CommandResult<Screen<TreeOp>> {
    let tree = Tree::from_values(&initial_values(values, config)?, config.max_len())?;
    Ok(Screen::new(tree, config.default_speed()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ArrayCommand {
    InsertAt { index: String, value: String },
    RemoveAt { index: String },
    Search { value: String },
}

pub fn run_array(screen: &mut Screen<ArrayOp>, command: ArrayCommand) -> CommandResult<SessionState> {
    let player = match command {
        ArrayCommand::InsertAt { index, value } => {
            let (index, value) = (parse_value(&index)?, parse_value(&value)?);
            screen.begin(|a| ArrayOp::insert_at(a, check_index(index, a.len())?, value))?
        }
        ArrayCommand::RemoveAt { index } => {
            let index = parse_value(&index)?;
            screen.begin(|a| ArrayOp::remove_at(a, check_index(index, a.len().saturating_sub(1))?))?
        }
        ArrayCommand::Search { value } => {
            let value = parse_value(&value)?;
            screen.begin(|_| Ok(ArrayOp::search(value)))?
        }
    };
    Ok(player.state())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ListCommand {
    Append { value: String },
    Prepend { value: String },
    InsertAt { position: String, value: String },
    RemoveAt { position: String },
    Search { value: String },
}

pub fn run_linked_list(
    screen: &mut Screen<ListOp>,
    command: ListCommand,
) -> CommandResult<SessionState> {
    let player = match command {
        ListCommand::Append { value } => {
            let value = parse_value(&value)?;
            screen.begin(|l| ListOp::append(l, value))?
        }
        ListCommand::Prepend { value } => {
            let value = parse_value(&value)?;
            screen.begin(|l| ListOp::prepend(l, value))?
        }
        ListCommand::InsertAt { position: at, value } => {
            let (at, value) = (parse_value(&at)?, parse_value(&value)?);
            screen.begin(|l| ListOp::insert_at(l, check_index(at, l.len())?, value))?
        }
        ListCommand::RemoveAt { position: at } => {
            let at = parse_value(&at)?;
            screen.begin(|l| ListOp::remove_at(l, check_index(at, l.len().saturating_sub(1))?))?
        }
        ListCommand::Search { value } => {
            let value = parse_value(&value)?;
            screen.begin(|_| Ok(ListOp::search(value)))?
        }
    };
    Ok(player.state())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StackCommand {
    Push { value: String },
    Pop,
    Peek,
    Clear,
}

pub fn run_stack(screen: &mut Screen<StackOp>, command: StackCommand) -> CommandResult<SessionState> {
    let player = match command {
        StackCommand::Push { value } => {
            let value = parse_value(&value)?;
            screen.begin(|s| StackOp::push(s, value))?
        }
        StackCommand::Pop => screen.begin(StackOp::pop)?,
        StackCommand::Peek => screen.begin(StackOp::peek)?,
        StackCommand::Clear => screen.begin(|_| Ok(StackOp::clear()))?,
    };
    Ok(player.state())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum QueueCommand {
    Enqueue { value: String },
    Dequeue,
    Front,
    Rear,
    Clear,
}

pub fn run_queue(screen: &mut Screen<QueueOp>, command: QueueCommand) -> CommandResult<SessionState> {
    let player = match command {
        QueueCommand::Enqueue { value } => {
            let value = parse_value(&value)?;
            screen.begin(|q| QueueOp::enqueue(q, value))?
        }
        QueueCommand::Dequeue => screen.begin(QueueOp::dequeue)?,
        QueueCommand::Front => screen.begin(QueueOp::front)?,
        QueueCommand::Rear => screen.begin(QueueOp::rear)?,
        QueueCommand::Clear => screen.begin(|_| Ok(QueueOp::clear()))?,
    };
    Ok(player.state())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TreeCommand {
    Insert { value: String },
    Remove { value: String },
    Search { value: String },
    FindMin,
    FindMax,
    Traverse { order: TraversalOrder },
}

pub fn run_tree(screen: &mut Screen<TreeOp>, command: TreeCommand) -> CommandResult<SessionState> {
    let player = match command {
        TreeCommand::Insert { value } => {
            let value = parse_value(&value)?;
            screen.begin(|t| TreeOp::insert(t, value))?
        }
        TreeCommand::Remove { value } => {
            let value = parse_value(&value)?;
            screen.begin(|t| TreeOp::remove(t, value))?
        }
        TreeCommand::Search { value } => {
            let value = parse_value(&value)?;
            screen.begin(|t| Ok(TreeOp::search(t, value)))?
        }
        TreeCommand::FindMin => screen.begin(TreeOp::find_min)?,
        TreeCommand::FindMax => screen.begin(TreeOp::find_max)?,
        TreeCommand::Traverse { order } => screen.begin(|t| Ok(TreeOp::traverse(t, order)))?,
    };
    Ok(player.state())
}

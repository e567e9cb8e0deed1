// Binary search tree mutator
// Arena-stored BST with animated insert/remove/search, extremes and traversals

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::source::Operation;
use crate::highlight::{Highlight, HighlightOf, Project};
use crate::input::{InputError, InputResult};
use crate::trace::{Family, Frame, FrameKind};

type NodeId = usize;

/// Deepest level a node may sit on, so layout positions stay within `i64`
pub const MAX_LEVELS: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TreeNode {
    value: i64,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Node placement for rendering. Children of a node at `position` sit at
/// `2 * position - 1` (left) and `2 * position + 1` (right) one level down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub value: i64,
    pub level: u32,
    pub position: i64,
    pub parent_position: Option<i64>,
    pub parent_level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    slots: Vec<Option<TreeNode>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
    capacity: usize,
}

impl Tree {
    pub fn new(capacity: usize) -> Self {
        Tree {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            capacity,
        }
    }

    /// Insert `values` in order, refusing duplicates
    pub fn from_values(values: &[i64], capacity: usize) -> InputResult<Self> {
        let mut tree = Tree::new(capacity);
        for &value in values {
            tree.check_insert(value)?;
            tree.insert(value);
        }
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    fn check_insert(&self, value: i64) -> InputResult<()> {
        if self.contains(value) {
            return Err(InputError::DuplicateValue(value));
        }
        if self.len >= self.capacity {
            return Err(InputError::Full {
                what: "Tree",
                max: self.capacity,
            });
        }
        // New leaf lands one level below the end of its search path
        if self.search_path(value).len() >= MAX_LEVELS {
            return Err(InputError::TooDeep {
                value,
                max: MAX_LEVELS,
            });
        }
        Ok(())
    }

    fn alloc(&mut self, value: i64) -> NodeId {
        let node = TreeNode {
            value,
            left: None,
            right: None,
        };
        self.len += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Values compared while walking from the root towards `value`.
    /// Ends on `value` itself when it is present.
    pub fn search_path(&self, value: i64) -> Vec<i64> {
        let mut path = Vec::new();
        let mut current = self.root;
        while let Some(node) = current.and_then(|id| self.node(id)) {
            path.push(node.value);
            current = match value.cmp(&node.value) {
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
                std::cmp::Ordering::Equal => break,
            };
        }
        path
    }

    pub fn contains(&self, value: i64) -> bool {
        self.search_path(value).last() == Some(&value)
    }

    /// Link `value` under the last node of its search path. Duplicates are ignored.
    pub fn insert(&mut self, value: i64) -> bool {
        let Some(mut current) = self.root else {
            self.root = Some(self.alloc(value));
            return true;
        };

        loop {
            let Some(node) = self.node(current) else {
                return false;
            };
            let next = match value.cmp(&node.value) {
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
                std::cmp::Ordering::Equal => return false,
            };
            match next {
                Some(child) => current = child,
                None => {
                    let goes_left = value < node.value;
                    let id = self.alloc(value);
                    if let Some(parent) = self.node_mut(current) {
                        if goes_left {
                            parent.left = Some(id);
                        } else {
                            parent.right = Some(id);
                        }
                    }
                    return true;
                }
            }
        }
    }

    /// Remove `value`; a node with two children takes its in-order successor's value
    pub fn remove(&mut self, value: i64) -> bool {
        let before = self.len;
        self.root = self.remove_from(self.root, value);
        self.len < before
    }

    fn remove_from(&mut self, subtree: Option<NodeId>, value: i64) -> Option<NodeId> {
        let id = subtree?;
        let node = self.node(id)?.clone();

        match value.cmp(&node.value) {
            std::cmp::Ordering::Less => {
                let left = self.remove_from(node.left, value);
                if let Some(n) = self.node_mut(id) {
                    n.left = left;
                }
                Some(id)
            }
            std::cmp::Ordering::Greater => {
                let right = self.remove_from(node.right, value);
                if let Some(n) = self.node_mut(id) {
                    n.right = right;
                }
                Some(id)
            }
            std::cmp::Ordering::Equal => match (node.left, node.right) {
                (None, child) | (child, None) => {
                    self.slots[id] = None;
                    self.free.push(id);
                    self.len -= 1;
                    child
                }
                (Some(_), Some(right)) => {
                    let successor = self.extreme(right, |n| n.left)?;
                    let right = self.remove_from(Some(right), successor);
                    if let Some(n) = self.node_mut(id) {
                        n.value = successor;
                        n.right = right;
                    }
                    Some(id)
                }
            },
        }
    }

    /// Value reached by following `next` from `start` until it runs out
    fn extreme(&self, start: NodeId, next: fn(&TreeNode) -> Option<NodeId>) -> Option<i64> {
        self.extreme_path(Some(start), next).last().copied()
    }

    fn extreme_path(&self, start: Option<NodeId>, next: fn(&TreeNode) -> Option<NodeId>) -> Vec<i64> {
        let mut path = Vec::new();
        let mut current = start;
        while let Some(node) = current.and_then(|id| self.node(id)) {
            path.push(node.value);
            current = next(node);
        }
        path
    }

    pub fn min(&self) -> Option<i64> {
        self.extreme_path(self.root, |n| n.left).last().copied()
    }

    pub fn max(&self) -> Option<i64> {
        self.extreme_path(self.root, |n| n.right).last().copied()
    }

    /// Values in the requested depth-first order
    pub fn traverse(&self, order: TraversalOrder) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.len);
        self.walk(self.root, order, &mut out);
        out
    }

    fn walk(&self, subtree: Option<NodeId>, order: TraversalOrder, out: &mut Vec<i64>) {
        let Some(node) = subtree.and_then(|id| self.node(id)) else {
            return;
        };
        if order == TraversalOrder::PreOrder {
            out.push(node.value);
        }
        self.walk(node.left, order, out);
        if order == TraversalOrder::InOrder {
            out.push(node.value);
        }
        self.walk(node.right, order, out);
        if order == TraversalOrder::PostOrder {
            out.push(node.value);
        }
    }

    /// Breadth-first placement of every node, root at level 0 position 0
    pub fn layout(&self) -> Vec<LayoutRow> {
        let mut rows = Vec::with_capacity(self.len);
        let mut queue = VecDeque::new();
        if let Some(root) = self.root {
            queue.push_back((root, 0u32, 0i64, None));
        }

        while let Some((id, level, position, parent)) = queue.pop_front() {
            let Some(node) = self.node(id) else {
                continue;
            };
            rows.push(LayoutRow {
                value: node.value,
                level,
                position,
                parent_position: parent.map(|(p, _)| p),
                parent_level: parent.map(|(_, l)| l),
            });
            if let Some(left) = node.left {
                let child = position.saturating_mul(2).saturating_sub(1);
                queue.push_back((left, level + 1, child, Some((position, level))));
            }
            if let Some(right) = node.right {
                let child = position.saturating_mul(2).saturating_add(1);
                queue.push_back((right, level + 1, child, Some((position, level))));
            }
        }

        rows
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    InOrder,
    PreOrder,
    PostOrder,
}

impl FromStr for TraversalOrder {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_order" => Ok(TraversalOrder::InOrder),
            "pre_order" => Ok(TraversalOrder::PreOrder),
            "post_order" => Ok(TraversalOrder::PostOrder),
            other => Err(InputError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Tree steps; subjects are node values, which are unique in a BST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeStep {
    /// Comparing against the node holding `value`
    Probe { value: i64 },
    Insert { value: i64 },
    Remove { value: i64 },
    Found { value: i64 },
    NotFound,
    /// Traversal reached `value`
    Visit { value: i64 },
    Complete,
}

impl FrameKind for TreeStep {
    type Subject = i64;

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            TreeStep::Found { .. } | TreeStep::NotFound | TreeStep::Complete
        )
    }

    fn subjects(&self) -> Vec<i64> {
        match self {
            TreeStep::Probe { value }
            | TreeStep::Insert { value }
            | TreeStep::Remove { value }
            | TreeStep::Found { value }
            | TreeStep::Visit { value } => vec![*value],
            TreeStep::NotFound | TreeStep::Complete => Vec::new(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TreeStep::Probe { .. } => "probe",
            TreeStep::Insert { .. } => "insert",
            TreeStep::Remove { .. } => "remove",
            TreeStep::Found { .. } => "found",
            TreeStep::NotFound => "not_found",
            TreeStep::Visit { .. } => "visit",
            TreeStep::Complete => "complete",
        }
    }
}

/// Values a traversal has reached so far, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeAux {
    pub visited: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeFamily;

impl Family for TreeFamily {
    type Kind = TreeStep;
    type Snapshot = Vec<LayoutRow>;
    type Aux = TreeAux;
    const NAME: &'static str = "tree";
}

impl Project for TreeFamily {
    fn project(frame: &Frame<Self>, _previous: Option<&Frame<Self>>) -> HighlightOf<Self> {
        let mut hl = Highlight {
            settled: frame.aux.visited.clone(),
            ..Default::default()
        };

        match &frame.kind {
            TreeStep::Probe { value } => hl.compared = vec![*value],
            TreeStep::Insert { value } | TreeStep::Remove { value } | TreeStep::Visit { value } => {
                hl.active = vec![*value]
            }
            TreeStep::Found { value } => hl.settled.push(*value),
            TreeStep::NotFound | TreeStep::Complete => {}
        }

        hl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeAction {
    Insert(i64),
    Remove(i64),
    Search(i64),
    Extreme,
    Traverse,
}

/// Animated tree operation. The probe path is fixed when the operation is
/// built, against the tree it will run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOp {
    action: TreeAction,
    path: Vec<i64>,
    step: usize,
}

impl TreeOp {
    fn new(action: TreeAction, path: Vec<i64>) -> Self {
        TreeOp {
            action,
            path,
            step: 0,
        }
    }

    /// Probe the comparison path, then link the new leaf
    pub fn insert(tree: &Tree, value: i64) -> InputResult<Self> {
        tree.check_insert(value)?;
        Ok(TreeOp::new(TreeAction::Insert(value), tree.search_path(value)))
    }

    /// Probe down to the node, then remove it
    pub fn remove(tree: &Tree, value: i64) -> InputResult<Self> {
        if !tree.contains(value) {
            return Err(InputError::MissingValue(value));
        }
        Ok(TreeOp::new(TreeAction::Remove(value), tree.search_path(value)))
    }

    pub fn search(tree: &Tree, value: i64) -> Self {
        TreeOp::new(TreeAction::Search(value), tree.search_path(value))
    }

    pub fn find_min(tree: &Tree) -> InputResult<Self> {
        if tree.is_empty() {
            return Err(InputError::Empty("Tree"));
        }
        Ok(TreeOp::new(
            TreeAction::Extreme,
            tree.extreme_path(tree.root, |n| n.left),
        ))
    }

    pub fn find_max(tree: &Tree) -> InputResult<Self> {
        if tree.is_empty() {
            return Err(InputError::Empty("Tree"));
        }
        Ok(TreeOp::new(
            TreeAction::Extreme,
            tree.extreme_path(tree.root, |n| n.right),
        ))
    }

    /// One visit frame per node in `order`
    pub fn traverse(tree: &Tree, order: TraversalOrder) -> Self {
        TreeOp::new(TreeAction::Traverse, tree.traverse(order))
    }

    fn terminal(&self) -> TreeStep {
        match self.action {
            TreeAction::Search(value) if self.path.last() == Some(&value) => TreeStep::Found { value },
            TreeAction::Search(_) => TreeStep::NotFound,
            TreeAction::Extreme => match self.path.last() {
                Some(&value) => TreeStep::Found { value },
                None => TreeStep::NotFound,
            },
            TreeAction::Insert(_) | TreeAction::Remove(_) | TreeAction::Traverse => {
                TreeStep::Complete
            }
        }
    }
}

impl Operation for TreeOp {
    type Target = Tree;
    type Family = TreeFamily;

    fn advance(&mut self, tree: &mut Tree) -> Frame<TreeFamily> {
        let step = self.step;
        self.step += 1;
        let walked = self.path.len();

        let kind = match self.action {
            TreeAction::Traverse if step < walked => TreeStep::Visit {
                value: self.path[step],
            },
            _ if step < walked => TreeStep::Probe {
                value: self.path[step],
            },
            TreeAction::Insert(value) if step == walked => {
                tree.insert(value);
                TreeStep::Insert { value }
            }
            TreeAction::Remove(value) if step == walked => {
                tree.remove(value);
                TreeStep::Remove { value }
            }
            _ => self.terminal(),
        };

        let visited = match self.action {
            TreeAction::Traverse => self.path[..step.min(walked)].to_vec(),
            _ => Vec::new(),
        };
        let visited = match &kind {
            TreeStep::Visit { value } => visited.into_iter().chain([*value]).collect(),
            _ => visited,
        };

        Frame::new(kind, tree.layout(), TreeAux { visited })
    }

    fn name(&self) -> &'static str {
        match self.action {
            TreeAction::Insert(_) => "tree insert",
            TreeAction::Remove(_) => "tree remove",
            TreeAction::Search(_) => "tree search",
            TreeAction::Extreme => "tree extreme",
            TreeAction::Traverse => "tree traversal",
        }
    }
}

// Linked list mutator
// Singly linked list stored in an arena, links are node ids rather than pointers

use serde::{Deserialize, Serialize};

use super::source::Operation;
use super::{linear_frame, Linear, LinearStep};
use crate::input::{InputError, InputResult};
use crate::trace::Frame;

/// Index of a node slot in the arena
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ListNode {
    value: i64,
    next: Option<NodeId>,
}

/// Singly linked list with free-slot reuse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedList {
    slots: Vec<Option<ListNode>>,
    free: Vec<NodeId>,
    head: Option<NodeId>,
    len: usize,
    capacity: usize,
}

impl LinkedList {
    pub fn new(capacity: usize) -> Self {
        LinkedList {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            len: 0,
            capacity,
        }
    }

    pub fn from_values(values: &[i64], capacity: usize) -> InputResult<Self> {
        let mut list = LinkedList::new(capacity);
        for &value in values {
            list.check_room()?;
            list.append(value);
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_room(&self) -> InputResult<()> {
        if self.len >= self.capacity {
            return Err(InputError::Full {
                what: "Linked list",
                max: self.capacity,
            });
        }
        Ok(())
    }

    fn node(&self, id: NodeId) -> Option<&ListNode> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut ListNode> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    fn alloc(&mut self, value: i64, next: Option<NodeId>) -> NodeId {
        let node = ListNode { value, next };
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

    /// Id of the node at `position`
    fn id_at(&self, position: usize) -> Option<NodeId> {
        let mut current = self.head;
        for _ in 0..position {
            current = current.and_then(|id| self.node(id)).and_then(|n| n.next);
        }
        current
    }

    /// Values from head to tail
    pub fn values(&self) -> Vec<i64> {
        let mut values = Vec::with_capacity(self.len);
        let mut current = self.head;
        while let Some(node) = current.and_then(|id| self.node(id)) {
            values.push(node.value);
            current = node.next;
        }
        values
    }

    pub fn prepend(&mut self, value: i64) {
        let head = self.head;
        self.head = Some(self.alloc(value, head));
    }

    pub fn append(&mut self, value: i64) {
        let len = self.len;
        self.insert_at(len, value);
    }

    /// Link a new node so it ends up at `position`; positions past the end append
    pub fn insert_at(&mut self, position: usize, value: i64) {
        if position == 0 || self.head.is_none() {
            self.prepend(value);
            return;
        }

        let position = position.min(self.len);
        let Some(before) = self.id_at(position - 1) else {
            return;
        };
        let after = self.node(before).and_then(|n| n.next);
        let id = self.alloc(value, after);
        if let Some(node) = self.node_mut(before) {
            node.next = Some(id);
        }
    }

    /// Unlink the node at `position`, returning its value
    pub fn remove_at(&mut self, position: usize) -> Option<i64> {
        let id = self.id_at(position)?;
        let removed = self.slots[id].take()?;

        if position == 0 {
            self.head = removed.next;
        } else if let Some(before) = self.id_at(position - 1) {
            if let Some(node) = self.node_mut(before) {
                node.next = removed.next;
            }
        }

        self.free.push(id);
        self.len -= 1;
        Some(removed.value)
    }

    /// Position of the first node holding `value`
    pub fn find(&self, value: i64) -> Option<usize> {
        self.values().iter().position(|&v| v == value)
    }

    fn value_at(&self, position: usize) -> Option<i64> {
        self.id_at(position).and_then(|id| self.node(id)).map(|n| n.value)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.len = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListAction {
    Insert { position: usize, value: i64 },
    Remove { position: usize },
    Search { value: i64 },
}

/// Animated linked list operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOp {
    action: ListAction,
    step: usize,
    matched: bool,
}

impl ListOp {
    fn new(action: ListAction) -> Self {
        ListOp {
            action,
            step: 0,
            matched: false,
        }
    }

    /// Walk to the tail, then link at the end
    pub fn append(list: &LinkedList, value: i64) -> InputResult<Self> {
        ListOp::insert_at(list, list.len(), value)
    }

    /// Link at the head straight away
    pub fn prepend(list: &LinkedList, value: i64) -> InputResult<Self> {
        ListOp::insert_at(list, 0, value)
    }

    /// Walk positions `0..position`, then link. Valid for `0..=len`.
    pub fn insert_at(list: &LinkedList, position: usize, value: i64) -> InputResult<Self> {
        list.check_room()?;
        if position > list.len() {
            return Err(InputError::IndexOutOfBounds {
                index: position as i64,
                max: list.len(),
            });
        }
        Ok(ListOp::new(ListAction::Insert { position, value }))
    }

    /// Walk positions `0..position`, highlight the node, then unlink it
    pub fn remove_at(list: &LinkedList, position: usize) -> InputResult<Self> {
        if list.is_empty() {
            return Err(InputError::Empty("Linked list"));
        }
        if position >= list.len() {
            return Err(InputError::IndexOutOfBounds {
                index: position as i64,
                max: list.len() - 1,
            });
        }
        Ok(ListOp::new(ListAction::Remove { position }))
    }

    pub fn search(value: i64) -> Self {
        ListOp::new(ListAction::Search { value })
    }
}

impl Operation for ListOp {
    type Target = LinkedList;
    type Family = Linear;

    fn advance(&mut self, list: &mut LinkedList) -> Frame<Linear> {
        let step = self.step;
        self.step += 1;

        let (kind, value) = match self.action {
            ListAction::Insert { position, value } => {
                if step < position {
                    (LinearStep::Probe { i: step }, Some(value))
                } else if step == position {
                    list.insert_at(position, value);
                    (LinearStep::Insert { i: position }, Some(value))
                } else {
                    (LinearStep::Complete, Some(value))
                }
            }
            ListAction::Remove { position } => {
                if step < position {
                    (LinearStep::Probe { i: step }, None)
                } else if step == position {
                    (LinearStep::Peek { i: position }, list.value_at(position))
                } else if step == position + 1 {
                    (LinearStep::Remove { i: position }, list.remove_at(position))
                } else {
                    (LinearStep::Complete, None)
                }
            }
            ListAction::Search { value } => {
                if self.matched {
                    (LinearStep::Found { i: step - 1 }, Some(value))
                } else if let Some(current) = list.value_at(step) {
                    self.matched = current == value;
                    (LinearStep::Probe { i: step }, Some(value))
                } else {
                    (LinearStep::NotFound, Some(value))
                }
            }
        };

        linear_frame(kind, list.values(), value)
    }

    fn name(&self) -> &'static str {
        match self.action {
            ListAction::Insert { .. } => "list insert",
            ListAction::Remove { .. } => "list remove",
            ListAction::Search { .. } => "list search",
        }
    }
}

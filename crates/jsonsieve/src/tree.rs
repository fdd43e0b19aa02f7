//! The binding tree: which paths are bound, and to what.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A wildcard
//! child carried over by promotion stays reachable from the promoted node and
//! keeps its parent link, so sharing needs no ownership bookkeeping. The
//! root is always an object node.
//!
//! Only registration promotes. A node reached purely through wildcards stays
//! incomplete and dispatches every element or member of whichever container
//! the input holds, so siblings of different kinds share it.

use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};
use core::fmt;

use crate::{BindError, Error, Key, Nested, PathElement, StructureKind};

/// A bound leaf. A variable binding is stored as a callback that decodes a
/// scalar into the variable.
pub(crate) type Callback<'cb, S> =
    Box<dyn FnMut(&mut Nested<'_, S>) -> Result<(), Error> + 'cb>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub(crate) struct ArrayNode {
    pub children: BTreeMap<usize, NodeId>,
    pub each: Option<NodeId>,
    /// Index the next element will be dispatched with.
    pub next: usize,
}

/// A node every registered path reaches through a wildcard. It opens as
/// either container kind.
#[derive(Debug, Default)]
pub(crate) struct WildcardNode {
    pub each: Option<NodeId>,
    pub next: usize,
    pub last: Option<PathElement>,
}

#[derive(Debug, Default)]
pub(crate) struct ObjectNode {
    pub children: BTreeMap<Key, NodeId>,
    pub each: Option<NodeId>,
    pub last: Option<Key>,
}

pub(crate) enum NodeKind<'cb, S> {
    Incomplete(WildcardNode),
    Array(ArrayNode),
    Object(ObjectNode),
    Callback(Callback<'cb, S>),
}

impl<S> NodeKind<'_, S> {
    fn structure(&self) -> StructureKind {
        match self {
            Self::Incomplete(_) => StructureKind::Incomplete,
            Self::Array(_) => StructureKind::Array,
            Self::Object(_) => StructureKind::Object,
            Self::Callback(_) => StructureKind::Callback,
        }
    }

    /// An empty container of `kind`.
    fn empty(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Array => Self::Array(ArrayNode::default()),
            StructureKind::Object => Self::Object(ObjectNode::default()),
            StructureKind::Incomplete | StructureKind::Callback => {
                Self::Incomplete(WildcardNode::default())
            }
        }
    }
}

pub(crate) struct Node<'cb, S> {
    pub parent: Option<NodeId>,
    pub kind: NodeKind<'cb, S>,
}

pub(crate) struct BindingTree<'cb, S> {
    nodes: Vec<Node<'cb, S>>,
}

impl<'cb, S> BindingTree<'cb, S> {
    pub fn new() -> Self {
        Self {
            nodes: alloc::vec![Node {
                parent: None,
                kind: NodeKind::Object(ObjectNode::default()),
            }],
        }
    }

    fn node(&self, id: NodeId) -> &Node<'cb, S> {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<'cb, S> {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> StructureKind {
        self.node(id).kind.structure()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, parent: NodeId, kind: NodeKind<'cb, S>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            parent: Some(parent),
            kind,
        });
        id
    }

    /// Creates an empty container of `kind` below `parent`.
    pub fn alloc_container(&mut self, parent: NodeId, kind: StructureKind) -> NodeId {
        self.alloc(parent, NodeKind::empty(kind))
    }

    /// Creates a callback leaf below `parent`.
    pub fn alloc_leaf(&mut self, parent: NodeId, callback: Callback<'cb, S>) -> NodeId {
        self.alloc(parent, NodeKind::Callback(callback))
    }

    /// Turns an incomplete node into an array or object, keeping its wildcard
    /// child.
    pub fn promote(&mut self, id: NodeId, kind: StructureKind) -> Result<(), BindError> {
        debug_assert!(kind.is_container(), "can only promote to a container kind");
        let node = self.node_mut(id);
        let NodeKind::Incomplete(WildcardNode { each, .. }) = node.kind else {
            return Err(BindError::PromoteComplete(node.kind.structure()));
        };
        node.kind = match kind {
            StructureKind::Array => NodeKind::Array(ArrayNode {
                each,
                ..ArrayNode::default()
            }),
            _ => NodeKind::Object(ObjectNode {
                each,
                ..ObjectNode::default()
            }),
        };
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Registration: explicit slots only, no wildcard fallback.
    // --------------------------------------------------------------------------------------------

    /// The child registered at `element` exactly (the wildcard slot for
    /// [`PathElement::Each`]). The caller has already reconciled the node's
    /// kind with the element.
    pub fn slot(&self, id: NodeId, element: &PathElement) -> Option<NodeId> {
        match (&self.node(id).kind, element) {
            (NodeKind::Array(a), PathElement::Index(i)) => a.children.get(i).copied(),
            (NodeKind::Object(o), PathElement::Key(k)) => o.children.get(k).copied(),
            (NodeKind::Array(ArrayNode { each, .. }), PathElement::Each)
            | (NodeKind::Object(ObjectNode { each, .. }), PathElement::Each)
            | (NodeKind::Incomplete(WildcardNode { each, .. }), PathElement::Each) => *each,
            _ => None,
        }
    }

    pub fn set_slot(&mut self, id: NodeId, element: &PathElement, child: NodeId) {
        match (&mut self.node_mut(id).kind, element) {
            (NodeKind::Array(a), PathElement::Index(i)) => {
                a.children.insert(*i, child);
            }
            (NodeKind::Object(o), PathElement::Key(k)) => {
                o.children.insert(k.clone(), child);
            }
            (NodeKind::Array(ArrayNode { each, .. }), PathElement::Each)
            | (NodeKind::Object(ObjectNode { each, .. }), PathElement::Each)
            | (NodeKind::Incomplete(WildcardNode { each, .. }), PathElement::Each) => {
                *each = Some(child);
            }
            (kind, element) => {
                debug_assert!(false, "element {element} does not fit a {} node", kind.structure());
            }
        }
    }

    // --------------------------------------------------------------------------------------------
    // Scanning: explicit child first, then the wildcard.
    // --------------------------------------------------------------------------------------------

    /// Resets the dispatch cursor when the scanner opens this container.
    pub fn begin(&mut self, id: NodeId) {
        match &mut self.node_mut(id).kind {
            NodeKind::Array(a) => a.next = 0,
            NodeKind::Object(o) => o.last = None,
            NodeKind::Incomplete(w) => {
                w.next = 0;
                w.last = None;
            }
            NodeKind::Callback(_) => {}
        }
    }

    /// Dispatches the next array element: returns its index and the node
    /// bound to it, if any. The cursor advances either way.
    pub fn next_index(&mut self, id: NodeId) -> (usize, Option<NodeId>) {
        match &mut self.node_mut(id).kind {
            NodeKind::Array(a) => {
                let index = a.next;
                a.next += 1;
                (index, a.children.get(&index).copied().or(a.each))
            }
            NodeKind::Incomplete(w) => {
                let index = w.next;
                w.next += 1;
                w.last = Some(PathElement::Index(index));
                (index, w.each)
            }
            _ => (0, None),
        }
    }

    /// Dispatches an object member. On a hit the key is recorded as the last
    /// dispatched key.
    pub fn key_child(&mut self, id: NodeId, key: &str) -> Option<NodeId> {
        let o = match &mut self.node_mut(id).kind {
            NodeKind::Object(o) => o,
            NodeKind::Incomplete(w) => {
                let child = w.each?;
                w.last = Some(PathElement::Key(key.into()));
                return Some(child);
            }
            _ => return None,
        };
        if let Some((k, child)) = o.children.get_key_value(key) {
            o.last = Some(k.clone());
            return Some(*child);
        }
        let child = o.each?;
        o.last = Some(key.into());
        Some(child)
    }

    /// The element that last dispatched into a child of `id`.
    pub fn last_dispatched(&self, id: NodeId) -> Option<PathElement> {
        match &self.node(id).kind {
            NodeKind::Array(a) => a.next.checked_sub(1).map(PathElement::Index),
            NodeKind::Object(o) => o.last.clone().map(PathElement::Key),
            NodeKind::Incomplete(w) => w.last.clone(),
            NodeKind::Callback(_) => None,
        }
    }

    pub fn callback_mut(&mut self, id: NodeId) -> Option<&mut Callback<'cb, S>> {
        match &mut self.node_mut(id).kind {
            NodeKind::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let pad = depth * 2;
        let (children, each): (Vec<(alloc::string::String, NodeId)>, Option<NodeId>) =
            match &self.node(id).kind {
                NodeKind::Array(a) => (
                    a.children
                        .iter()
                        .map(|(i, c)| (alloc::format!("[{i}]"), *c))
                        .collect(),
                    a.each,
                ),
                NodeKind::Object(o) => (
                    o.children
                        .iter()
                        .map(|(k, c)| (alloc::format!("{k:?}"), *c))
                        .collect(),
                    o.each,
                ),
                NodeKind::Incomplete(w) => (Vec::new(), w.each),
                NodeKind::Callback(_) => (Vec::new(), None),
            };
        writeln!(f, "{}", self.kind(id))?;
        for (label, child) in children {
            write!(f, "{:pad$}  {label}: ", "")?;
            self.fmt_node(f, child, depth + 1)?;
        }
        if let Some(child) = each {
            write!(f, "{:pad$}  *: ", "")?;
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented dump of the tree shape, one node per line.
impl<S> fmt::Debug for BindingTree<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, NodeId::ROOT, 0)
    }
}

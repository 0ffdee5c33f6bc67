// Tree walker core
//
// Depth-first preorder traversal over `NodeRef` with kind-based dispatch.
// Handlers get the node, the traversal state and the `Walk` continuation;
// nothing is visited below a handled node unless the handler calls
// `walk.visit_children` (or `walk.visit` on selected children). Unhandled
// kinds fall through to visiting their children.

use crate::ast::{NodeKind, NodeRef};
use std::collections::HashMap;
use std::convert::Infallible;

/// Visitor for one node kind
pub type Handler<'a, S, E> = fn(NodeRef<'a>, &mut S, &Walk<'_, 'a, S, E>) -> Result<(), E>;

/// Dispatch table from node kind to handler
pub struct Visitors<'a, S, E> {
    handlers: HashMap<NodeKind, Handler<'a, S, E>>,
}

impl<'a, S, E> Default for Visitors<'a, S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S, E> Visitors<'a, S, E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `kind`, replacing any previous one
    pub fn on(mut self, kind: NodeKind, handler: Handler<'a, S, E>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }
}

/// Continuation handed to handlers
pub struct Walk<'v, 'a, S, E> {
    visitors: &'v Visitors<'a, S, E>,
}

impl<'v, 'a, S, E> Walk<'v, 'a, S, E> {
    pub fn visit(&self, node: NodeRef<'a>, state: &mut S) -> Result<(), E> {
        match self.visitors.handlers.get(&node.kind()) {
            Some(handler) => handler(node, state, self),
            None => self.visit_children(node, state),
        }
    }

    pub fn visit_children(&self, node: NodeRef<'a>, state: &mut S) -> Result<(), E> {
        for child in node.children() {
            self.visit(child, state)?;
        }
        Ok(())
    }
}

/// Run one traversal from `root`
///
/// The first handler error aborts the walk and is returned as-is; `state` is
/// left as it was at that point.
pub fn walk<'a, S, E>(root: NodeRef<'a>, state: &mut S, visitors: &Visitors<'a, S, E>) -> Result<(), E> {
    Walk { visitors }.visit(root, state)
}

/// Collect every node of `kind` below (and including) `root`, in preorder
pub fn find_nodes_by_kind<'a>(root: NodeRef<'a>, kind: NodeKind) -> Vec<NodeRef<'a>> {
    struct Collect<'a> {
        kind: NodeKind,
        found: Vec<NodeRef<'a>>,
    }

    fn collect<'a>(
        node: NodeRef<'a>,
        state: &mut Collect<'a>,
        walk: &Walk<'_, 'a, Collect<'a>, Infallible>,
    ) -> Result<(), Infallible> {
        if node.kind() == state.kind {
            state.found.push(node);
        }
        walk.visit_children(node, state)
    }

    let mut state = Collect {
        kind,
        found: Vec::new(),
    };
    let visitors: Visitors<'a, Collect<'a>, Infallible> = Visitors::new().on(kind, collect);
    match walk(root, &mut state, &visitors) {
        Ok(()) => state.found,
        Err(never) => match never {},
    }
}

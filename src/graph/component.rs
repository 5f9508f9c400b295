// Copyright (c) 2024 Mike Tsao

use crate::engine::{ConnectTarget, RenderContext};
use crate::types::prelude::*;
use serde::{Deserialize, Serialize};

/// A uniform wrapper around one rendering node. It remembers every linkage it
/// creates, so that tearing the component down removes all of its fan-out, not
/// just the most recent edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    node: NodeUid,
    linkages: Vec<ConnectTarget>,
}
impl Component {
    #[allow(missing_docs)]
    pub fn new(node: NodeUid) -> Self {
        Self {
            node,
            linkages: Vec::default(),
        }
    }

    /// The wrapped rendering node.
    pub fn node(&self) -> NodeUid {
        self.node
    }

    /// Records the linkage and forwards it to the engine. Repeat calls with a
    /// target that is already linked are no-ops.
    pub fn connect(&mut self, ctx: &mut RenderContext, to: ConnectTarget) {
        if self.linkages.contains(&to) {
            return;
        }
        self.linkages.push(to);
        ctx.connect(self.node, to);
    }

    /// Tears down every linkage this component created.
    pub fn disconnect(&mut self, ctx: &mut RenderContext) {
        for to in self.linkages.drain(..) {
            ctx.disconnect(self.node, to);
        }
    }

    /// Whether this component currently links to the given target.
    pub fn is_connected_to(&self, to: ConnectTarget) -> bool {
        self.linkages.contains(&to)
    }

    #[allow(missing_docs)]
    pub fn to_json(&self, ctx: &RenderContext) -> serde_json::Value {
        ctx.node_to_json(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_is_idempotent_per_target() {
        let mut ctx = RenderContext::new();
        let from = ctx.create_node("oscillator");
        let to = ctx.create_gain();

        let mut c = Component::new(from);
        c.connect(&mut ctx, to.node.into());
        c.connect(&mut ctx, to.node.into());
        assert_eq!(
            ctx.inputs_of(to.node.into()),
            vec![from],
            "repeat connect() with the same target should not add edges"
        );
    }

    #[test]
    fn disconnect_tears_down_all_linkages() {
        let mut ctx = RenderContext::new();
        let from = ctx.create_node("oscillator");
        let a = ctx.create_gain();
        let b = ctx.create_gain();

        let mut c = Component::new(from);
        c.connect(&mut ctx, a.node.into());
        c.connect(&mut ctx, b.node.into());
        c.connect(&mut ctx, ConnectTarget::Param(a.gain));
        c.disconnect(&mut ctx);

        assert!(ctx.inputs_of(a.node.into()).is_empty());
        assert!(ctx.inputs_of(b.node.into()).is_empty());
        assert!(ctx.inputs_of(ConnectTarget::Param(a.gain)).is_empty());
        assert!(!c.is_connected_to(a.node.into()));
    }
}

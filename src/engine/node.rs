// Copyright (c) 2024 Mike Tsao

use crate::types::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a rendering connection lands. The engine never probes a target for
/// capabilities at connect time; a target is either a node input, a control
/// param, or the context's destination, and the distinction is made when the
/// target is wrapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectTarget {
    /// The signal input of another rendering node.
    Node(NodeUid),
    /// A control param of a rendering node. Connecting a signal here makes
    /// the param signal-driven on top of its scheduled value.
    Param(ParamUid),
    /// The context's terminal output.
    Destination,
}
impl From<NodeUid> for ConnectTarget {
    fn from(value: NodeUid) -> Self {
        Self::Node(value)
    }
}
impl From<ParamUid> for ConnectTarget {
    fn from(value: ParamUid) -> Self {
        Self::Param(value)
    }
}

/// One directed edge in the rendering graph. Edges are append-only; shared
/// fan-in points are written via summation, never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Connection {
    /// The source node.
    pub from: NodeUid,
    /// The target.
    pub to: ConnectTarget,
}

/// A gain-like scaling node plus its control param, returned together because
/// nearly every caller that makes one immediately needs both halves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainNode {
    /// The node itself.
    pub node: NodeUid,
    /// The node's `gain` control param.
    pub gain: ParamUid,
}

/// The engine's record of one rendering node: a label naming what kind of
/// node it is, its named control params in declaration order, and any extra
/// attributes a factory wants serialized with it.
#[derive(Debug)]
pub(crate) struct NodeEntry {
    pub(crate) label: String,
    pub(crate) params: Vec<(String, ParamUid)>,
    pub(crate) fields: Vec<(String, serde_json::Value)>,
}
impl NodeEntry {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            params: Vec::default(),
            fields: Vec::default(),
        }
    }
}

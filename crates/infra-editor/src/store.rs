//! Graph store: the single owner of diagram state.
//!
//! The editor surface never edits nodes or edges directly. It sends a
//! `Mutation`; the store applies it, regenerates the HCL text from the new
//! `(nodes, edges)`, and records a snapshot in the history log. Undo and redo
//! restore a snapshot and regenerate, without recording.
//!
//! Sync is one-way. A hand edit of the generated text (`OverrideCode`) is
//! kept and recorded but never parsed back into nodes or edges; the next
//! structural mutation replaces it with generated text again. Undo and redo
//! bring the text back when they land on the entry it recorded.

use crate::error::StoreError;
use crate::history::{HistoryEntry, HistoryLog};
use infra_core::lint::{LintDiagnostic, lint_diagram_with};
use infra_core::palette;
use infra_core::{
    Connection, GeneratorConfig, GraphSnapshot, NodeData, NodeId, Position, ResourceKind,
    ResourceNode, generate_with,
};
use serde::{Deserialize, Serialize};

/// Configuration for `GraphStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Passed to the generator on every regeneration.
    pub generator: GeneratorConfig,
    /// Maximum history entries kept. Default: **unlimited**.
    pub history_limit: Option<usize>,
}

/// A change requested by the editor surface.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Append a node. Rejected if the id is taken.
    AddNode(Box<ResourceNode>),
    /// Remove a node and every connection touching it.
    RemoveNode { id: NodeId },
    /// Replace the node list wholesale (bulk drag / selection updates).
    ReplaceNodes(Vec<ResourceNode>),
    /// Replace the connection list wholesale.
    ReplaceEdges(Vec<Connection>),
    /// Replace one node's kind and attributes.
    SetAttributes { id: NodeId, data: NodeData },
    /// Move one node.
    MoveNode { id: NodeId, position: Position },
    /// Append a connection unless one with the same endpoints exists.
    AddEdge(Connection),
    /// Replace the displayed code with user text.
    OverrideCode(String),
}

impl Mutation {
    /// Short label for logs.
    pub fn describe(&self) -> &'static str {
        match self {
            Mutation::AddNode(_) => "add node",
            Mutation::RemoveNode { .. } => "remove node",
            Mutation::ReplaceNodes(_) => "update nodes",
            Mutation::ReplaceEdges(_) => "update edges",
            Mutation::SetAttributes { .. } => "edit attributes",
            Mutation::MoveNode { .. } => "move node",
            Mutation::AddEdge(_) => "connect",
            Mutation::OverrideCode(_) => "edit code",
        }
    }
}

/// Owns nodes, edges, generated code and history.
pub struct GraphStore {
    nodes: Vec<ResourceNode>,
    edges: Vec<Connection>,
    code: String,
    /// Set while `code` holds user text instead of generated text.
    code_overridden: bool,
    history: HistoryLog,
    config: StoreConfig,
}

impl GraphStore {
    /// An empty store: no nodes, no edges, empty code, one history entry.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            code: String::new(),
            code_overridden: false,
            history: HistoryLog::new(config.history_limit),
            config,
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a mutation, regenerate, and record.
    ///
    /// Returns `Ok(true)` when a history entry was recorded and `Ok(false)`
    /// for a no-op (removing an absent node, a repeated connection).
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, StoreError> {
        let label = mutation.describe();
        match mutation {
            Mutation::AddNode(node) => {
                if self.contains(node.id) {
                    return Err(StoreError::DuplicateId(node.id));
                }
                self.nodes.push(*node);
            }
            Mutation::RemoveNode { id } => {
                if !self.contains(id) {
                    return Ok(false);
                }
                self.nodes.retain(|n| n.id != id);
                self.edges.retain(|e| !e.touches(id));
            }
            Mutation::ReplaceNodes(nodes) => self.nodes = nodes,
            Mutation::ReplaceEdges(edges) => self.edges = edges,
            Mutation::SetAttributes { id, data } => {
                self.node_mut(id)?.data = data;
            }
            Mutation::MoveNode { id, position } => {
                self.node_mut(id)?.position = position;
            }
            Mutation::AddEdge(edge) => {
                if self
                    .edges
                    .iter()
                    .any(|e| e.source == edge.source && e.target == edge.target)
                {
                    return Ok(false);
                }
                self.edges.push(edge);
            }
            Mutation::OverrideCode(text) => {
                self.code = text;
                self.code_overridden = true;
                self.record(label);
                return Ok(true);
            }
        }

        self.regenerate();
        self.record(label);
        Ok(true)
    }

    /// Append a node. Fails with `DuplicateId` if the id is already present.
    pub fn add_node(&mut self, node: ResourceNode) -> Result<(), StoreError> {
        self.apply(Mutation::AddNode(Box::new(node))).map(|_| ())
    }

    /// Remove a node and its incident connections. Absent id is a no-op.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.apply(Mutation::RemoveNode { id }).unwrap_or(false)
    }

    /// Replace all nodes. Ids are not checked for uniqueness.
    pub fn update_nodes(&mut self, nodes: Vec<ResourceNode>) {
        let _ = self.apply(Mutation::ReplaceNodes(nodes));
    }

    /// Replace all connections.
    pub fn update_edges(&mut self, edges: Vec<Connection>) {
        let _ = self.apply(Mutation::ReplaceEdges(edges));
    }

    /// Replace one node's attributes.
    pub fn update_attributes(&mut self, id: NodeId, data: NodeData) -> Result<(), StoreError> {
        self.apply(Mutation::SetAttributes { id, data }).map(|_| ())
    }

    /// Move one node.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), StoreError> {
        self.apply(Mutation::MoveNode { id, position }).map(|_| ())
    }

    /// Place a new palette node of `kind`. Returns its generated id.
    pub fn add_resource(
        &mut self,
        kind: ResourceKind,
        position: Position,
    ) -> Result<NodeId, StoreError> {
        let node = palette::new_node(kind, position);
        let id = node.id;
        self.add_node(node)?;
        Ok(id)
    }

    /// Like `add_resource`, with the kind given as a wire tag (`vpc`, `ec2`, `s3`).
    pub fn add_resource_tagged(
        &mut self,
        tag: &str,
        position: Position,
    ) -> Result<NodeId, StoreError> {
        let kind =
            ResourceKind::from_tag(tag).ok_or_else(|| StoreError::UnknownKind(tag.to_string()))?;
        self.add_resource(kind, position)
    }

    /// Connect `source` to `target` ("source sits inside target").
    /// Returns the new connection id, or `None` if the pair is already connected.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Option<NodeId> {
        let id = NodeId::with_prefix("edge");
        match self.apply(Mutation::AddEdge(Connection { id, source, target })) {
            Ok(true) => Some(id),
            _ => None,
        }
    }

    /// Show user text in place of the generated code. Nodes and edges stay as
    /// they are; the override is recorded as its own history entry, so undo
    /// returns to the generated text and redo shows the override again.
    pub fn override_generated_code(&mut self, text: impl Into<String>) {
        let _ = self.apply(Mutation::OverrideCode(text.into()));
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Restore the previous entry. `false` (and no change) at the start.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(entry);
        log::debug!("undo → history entry {}", self.history.cursor());
        true
    }

    /// Restore the next entry. `false` (and no change) at the end.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(entry);
        log::debug!("redo → history entry {}", self.history.cursor());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Connection] {
        &self.edges
    }

    /// The first node carrying `id`.
    pub fn node(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Current code: generated, or the user's override.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_code_overridden(&self) -> bool {
        self.code_overridden
    }

    /// Deep copy of the live nodes and edges.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    /// Lint findings for the live diagram.
    pub fn diagnostics(&self) -> Vec<LintDiagnostic> {
        lint_diagram_with(&self.nodes, &self.edges, &self.config.generator)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ResourceNode, StoreError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::UnknownNode(id))
    }

    fn regenerate(&mut self) {
        self.code = generate_with(&self.nodes, &self.edges, &self.config.generator);
        self.code_overridden = false;
    }

    fn record(&mut self, label: &str) {
        let code_override = self.code_overridden.then(|| self.code.clone());
        self.history
            .record(HistoryEntry::new(self.snapshot(), code_override));
        log::debug!(
            "{label}: recorded history entry {} of {}",
            self.history.cursor(),
            self.history.len()
        );
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.nodes = entry.snapshot.nodes;
        self.edges = entry.snapshot.edges;
        match entry.code_override {
            Some(text) => {
                self.code = text;
                self.code_overridden = true;
            }
            None => self.regenerate(),
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

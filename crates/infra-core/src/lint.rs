//! Lint diagnostics for diagrams.
//!
//! Reports structural issues without modifying the diagram. The generator
//! tolerates all of them silently; this pass is how the editor surface finds
//! out why a node is missing from the output or landed in `default-vpc`.

use crate::config::GeneratorConfig;
use crate::emitter::resource_address;
use crate::id::NodeId;
use crate::model::*;
use crate::topology::Topology;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Likely a mistake in the diagram.
    Warning,
    /// The generator made a fallback choice.
    Info,
}

/// A single lint diagnostic for a node or a connection.
#[derive(Debug, Clone, Serialize)]
pub struct LintDiagnostic {
    /// The node or connection this diagnostic refers to.
    pub id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-edge", "unplaced-compute").
    pub rule: &'static str,
}

impl LintDiagnostic {
    fn warning(id: NodeId, rule: &'static str, message: String) -> Self {
        Self {
            id,
            message,
            severity: LintSeverity::Warning,
            rule,
        }
    }

    fn info(id: NodeId, rule: &'static str, message: String) -> Self {
        Self {
            id,
            message,
            severity: LintSeverity::Info,
            rule,
        }
    }
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules with the default generator configuration.
#[must_use]
pub fn lint_diagram(nodes: &[ResourceNode], edges: &[Connection]) -> Vec<LintDiagnostic> {
    lint_diagram_with(nodes, edges, &GeneratorConfig::default())
}

/// Run all lint rules over the diagram and return diagnostics.
#[must_use]
pub fn lint_diagram_with(
    nodes: &[ResourceNode],
    edges: &[Connection],
    config: &GeneratorConfig,
) -> Vec<LintDiagnostic> {
    let topology = Topology::build(nodes, edges);
    let mut diags = Vec::new();
    lint_duplicate_ids(nodes, &mut diags);
    lint_unreadable_nodes(nodes, &mut diags);
    lint_dangling_edges(&topology, edges, &mut diags);
    lint_reversed_containment(nodes, edges, &mut diags);
    lint_placement(nodes, &topology, config, &mut diags);
    lint_duplicate_addresses(nodes, &topology, config, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

/// Warn when two nodes carry the same id (wholesale replacement does not check).
fn lint_duplicate_ids(nodes: &[ResourceNode], diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.id) {
            diags.push(LintDiagnostic::warning(
                node.id,
                "duplicate-id",
                format!("More than one node has id `{}`.", node.id),
            ));
        }
    }
}

/// Report nodes the generator drops.
fn lint_unreadable_nodes(nodes: &[ResourceNode], diags: &mut Vec<LintDiagnostic>) {
    for node in nodes {
        match &node.data {
            NodeData::Malformed { .. } => diags.push(LintDiagnostic::warning(
                node.id,
                "malformed-node",
                format!(
                    "Node `{}` is missing its kind or attributes and is left out of the code.",
                    node.id
                ),
            )),
            NodeData::Unrecognized { kind, .. } => diags.push(LintDiagnostic::info(
                node.id,
                "unknown-kind",
                format!(
                    "Node `{}` has unsupported kind `{kind}` and is left out of the code.",
                    node.id
                ),
            )),
            _ => {}
        }
    }
}

/// Warn on connections whose endpoints match no node.
fn lint_dangling_edges(topology: &Topology, edges: &[Connection], diags: &mut Vec<LintDiagnostic>) {
    for edge in edges.iter().filter(|e| topology.is_dangling(e)) {
        diags.push(LintDiagnostic::warning(
            edge.id,
            "dangling-edge",
            format!(
                "Connection `{}` ({} → {}) points at a node that does not exist.",
                edge.id, edge.source, edge.target
            ),
        ));
    }
}

/// Info on network → compute connections: only compute → network places an instance.
fn lint_reversed_containment(
    nodes: &[ResourceNode],
    edges: &[Connection],
    diags: &mut Vec<LintDiagnostic>,
) {
    let mut by_id: HashMap<NodeId, &ResourceNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.id).or_insert(node);
    }
    for edge in edges {
        let source = by_id.get(&edge.source).and_then(|n| n.kind());
        let target = by_id.get(&edge.target).and_then(|n| n.kind());
        if source == Some(ResourceKind::Network) && target == Some(ResourceKind::Compute) {
            diags.push(LintDiagnostic::info(
                edge.id,
                "reversed-containment",
                format!(
                    "Connection `{}` runs from network `{}` to instance `{}`; draw it from the instance to place it in the network.",
                    edge.id, edge.source, edge.target
                ),
            ));
        }
    }
}

/// Info on unplaced compute nodes, warning on compute nodes tied to several networks.
fn lint_placement(
    nodes: &[ResourceNode],
    topology: &Topology,
    config: &GeneratorConfig,
    diags: &mut Vec<LintDiagnostic>,
) {
    for node in nodes.iter().filter(|n| n.kind() == Some(ResourceKind::Compute)) {
        let networks: Vec<&NetworkConfig> = topology
            .networks_of(nodes, node.id)
            .map(|(_, net)| net)
            .collect();
        match networks.as_slice() {
            [] => diags.push(LintDiagnostic::info(
                node.id,
                "unplaced-compute",
                format!(
                    "Instance `{}` is not connected to a network; it is placed in `{}`.",
                    node.id, config.placeholder_network
                ),
            )),
            [_] => {}
            [first, ..] => diags.push(LintDiagnostic::warning(
                node.id,
                "ambiguous-network",
                format!(
                    "Instance `{}` is connected to {} networks; only `{}` is used.",
                    node.id,
                    networks.len(),
                    first.name
                ),
            )),
        }
    }
}

/// Warn when two nodes generate blocks with the same Terraform address.
fn lint_duplicate_addresses(
    nodes: &[ResourceNode],
    topology: &Topology,
    config: &GeneratorConfig,
    diags: &mut Vec<LintDiagnostic>,
) {
    let mut owners: HashMap<(&'static str, String), NodeId> = HashMap::new();
    for node in nodes {
        let Some(address) = resource_address(node, topology, nodes, config) else {
            continue;
        };
        if let Some(owner) = owners.get(&address) {
            diags.push(LintDiagnostic::warning(
                node.id,
                "duplicate-address",
                format!(
                    "`{}.{}` is generated by both `{owner}` and `{}`.",
                    address.0, address.1, node.id
                ),
            ));
        } else {
            owners.insert(address, node.id);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(diags: &[LintDiagnostic]) -> Vec<&'static str> {
        diags.iter().map(|d| d.rule).collect()
    }

    fn vpc(id: &str, name: &str) -> ResourceNode {
        ResourceNode::network(id, NetworkConfig::new(name, "10.0.0.0/16"))
    }

    fn ec2(id: &str) -> ResourceNode {
        ResourceNode::compute(id, ComputeConfig::new("t2.micro", "ami-x"))
    }

    #[test]
    fn clean_diagram_has_no_findings() {
        let nodes = [vpc("n1", "main"), ec2("c1")];
        let edges = [Connection::new("e1", "c1", "n1")];
        assert!(lint_diagram(&nodes, &edges).is_empty());
    }

    #[test]
    fn duplicate_ids_are_reported_once_per_extra() {
        let nodes = [vpc("n1", "a"), vpc("n1", "b"), vpc("n1", "c")];
        let diags = lint_diagram(&nodes, &[]);
        assert_eq!(
            rules(&diags).iter().filter(|r| **r == "duplicate-id").count(),
            2
        );
    }

    #[test]
    fn unreadable_nodes_are_reported() {
        let nodes = [
            ResourceNode::new(
                NodeId::intern("m1"),
                NodeData::Malformed {
                    raw: serde_json::Value::Null,
                },
            ),
            ResourceNode::new(
                NodeId::intern("u1"),
                NodeData::Unrecognized {
                    kind: "lambda".into(),
                    attributes: serde_json::json!({}),
                },
            ),
        ];
        let diags = lint_diagram(&nodes, &[]);
        assert_eq!(rules(&diags), vec!["malformed-node", "unknown-kind"]);
        assert_eq!(diags[0].severity, LintSeverity::Warning);
        assert_eq!(diags[1].severity, LintSeverity::Info);
    }

    #[test]
    fn dangling_edge() {
        let nodes = [vpc("n1", "main"), ec2("c1")];
        let edges = [
            Connection::new("e1", "c1", "n1"),
            Connection::new("e2", "ghost", "n1"),
        ];
        let diags = lint_diagram(&nodes, &edges);
        assert_eq!(rules(&diags), vec!["dangling-edge"]);
        assert_eq!(diags[0].id, NodeId::intern("e2"));
    }

    #[test]
    fn reversed_edge_is_explained() {
        let nodes = [vpc("n1", "main"), ec2("c1")];
        let edges = [Connection::new("e1", "n1", "c1")];
        let diags = lint_diagram(&nodes, &edges);
        assert_eq!(rules(&diags), vec!["reversed-containment", "unplaced-compute"]);
        assert!(diags[1].message.contains("default-vpc"));
    }

    #[test]
    fn several_networks_are_ambiguous() {
        let nodes = [vpc("n1", "first"), vpc("n2", "second"), ec2("c1")];
        let edges = [
            Connection::new("e1", "c1", "n2"),
            Connection::new("e2", "c1", "n1"),
        ];
        let diags = lint_diagram(&nodes, &edges);
        assert_eq!(rules(&diags), vec!["ambiguous-network"]);
        assert!(diags[0].message.contains("`first`"));
    }

    #[test]
    fn clashing_addresses() {
        let nodes = [
            vpc("n1", "main"),
            vpc("n2", "main"),
            ResourceNode::storage("s1", StorageConfig::new("main")),
        ];
        let diags = lint_diagram(&nodes, &[]);
        // Different resource types may share a name.
        assert_eq!(rules(&diags), vec!["duplicate-address"]);
        assert_eq!(diags[0].id, NodeId::intern("n2"));
    }

    #[test]
    fn diagnostics_serialize_for_the_editor() {
        let diags = lint_diagram(&[ec2("c1")], &[]);
        let json = serde_json::to_value(&diags).unwrap();
        assert_eq!(json[0]["id"], "c1");
        assert_eq!(json[0]["severity"], "info");
        assert_eq!(json[0]["rule"], "unplaced-compute");
    }
}

//! Directed connection view over a diagram.
//!
//! Wraps a `petgraph` graph map keyed by `NodeId` so placement questions
//! ("which network does this instance sit in?") are hash lookups instead of
//! scans over the edge list. Edges may point at ids that no node carries;
//! those endpoints still appear in the graph but are reported as dangling.

use crate::id::NodeId;
use crate::model::{Connection, NetworkConfig, ResourceNode};
use petgraph::graphmap::DiGraphMap;
use std::collections::HashSet;

/// Connection graph built from one `(nodes, edges)` pair.
#[derive(Debug, Clone)]
pub struct Topology {
    graph: DiGraphMap<NodeId, ()>,
    known: HashSet<NodeId>,
}

impl Topology {
    /// Build the view. Parallel edges collapse into one.
    pub fn build(nodes: &[ResourceNode], edges: &[Connection]) -> Self {
        let mut graph = DiGraphMap::with_capacity(nodes.len(), edges.len());
        let mut known = HashSet::with_capacity(nodes.len());
        for node in nodes {
            graph.add_node(node.id);
            known.insert(node.id);
        }
        for edge in edges {
            graph.add_edge(edge.source, edge.target, ());
        }
        Self { graph, known }
    }

    /// Whether an edge runs from `source` to `target`.
    pub fn connects(&self, source: NodeId, target: NodeId) -> bool {
        self.graph.contains_edge(source, target)
    }

    /// All network nodes that `source` is connected *to*, in store order.
    /// Edges pointing the other way (network → source) do not count.
    pub fn networks_of<'a>(
        &'a self,
        nodes: &'a [ResourceNode],
        source: NodeId,
    ) -> impl Iterator<Item = (&'a ResourceNode, &'a NetworkConfig)> + 'a {
        nodes.iter().filter_map(move |node| {
            let network = node.data.as_network()?;
            self.connects(source, node.id).then_some((node, network))
        })
    }

    /// The network a compute node is placed in: the first network in store
    /// order that the compute node has an edge to.
    pub fn containing_network<'a>(
        &'a self,
        nodes: &'a [ResourceNode],
        compute: NodeId,
    ) -> Option<&'a NetworkConfig> {
        self.networks_of(nodes, compute).next().map(|(_, net)| net)
    }

    /// Whether either endpoint of `edge` matches no node.
    pub fn is_dangling(&self, edge: &Connection) -> bool {
        !self.known.contains(&edge.source) || !self.known.contains(&edge.target)
    }
}

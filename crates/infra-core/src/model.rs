//! Core diagram data model.
//!
//! A diagram is an ordered list of resource nodes plus a list of directed
//! connections between them. Node order is the order the editor surface
//! placed them in and is preserved everywhere (generation, snapshots, JSON).
//! Connections carry no payload; the generator reads them as
//! "source sits inside / attaches to target".

use crate::id::NodeId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// Free-form resource tags. Ordered so emitted output is deterministic.
pub type Tags = BTreeMap<String, String>;

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── Resource kinds ──────────────────────────────────────────────────────

/// The resource kinds the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Network,
    Compute,
    Storage,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Network,
        ResourceKind::Compute,
        ResourceKind::Storage,
    ];

    /// Wire tag used by the editor surface (`vpc`, `ec2`, `s3`).
    pub const fn tag(self) -> &'static str {
        match self {
            ResourceKind::Network => "vpc",
            ResourceKind::Compute => "ec2",
            ResourceKind::Storage => "s3",
        }
    }

    /// Parse a wire tag. Accepts the generic kind names as aliases.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "vpc" | "network" => Some(ResourceKind::Network),
            "ec2" | "compute" => Some(ResourceKind::Compute),
            "s3" | "storage" => Some(ResourceKind::Storage),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ─── Kind-specific attributes ────────────────────────────────────────────

/// A virtual network (`aws_vpc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub cidr_block: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Tags,
}

impl NetworkConfig {
    pub fn new(name: impl Into<String>, cidr_block: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cidr_block: cidr_block.into(),
            tags: Tags::new(),
        }
    }
}

/// An EBS volume attached to a compute instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub device_name: String,
    pub volume_size: u32,
    pub volume_type: String,
}

/// A compute instance (`aws_instance`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeConfig {
    pub instance_type: String,
    /// Machine image id (AMI).
    #[serde(rename = "ami")]
    pub machine_image_id: String,
    /// Subnet name, emitted as an `aws_subnet.<name>.id` reference. Empty
    /// omits `subnet_id`; a value that is not an HCL identifier is quoted.
    #[serde(rename = "subnet_id", default, deserialize_with = "null_as_default")]
    pub subnet_ref: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub security_group_ids: SmallVec<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ebs_block_devices: Vec<BlockDevice>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Tags,
}

impl ComputeConfig {
    pub fn new(instance_type: impl Into<String>, machine_image_id: impl Into<String>) -> Self {
        Self {
            instance_type: instance_type.into(),
            machine_image_id: machine_image_id.into(),
            subnet_ref: String::new(),
            security_group_ids: SmallVec::new(),
            iam_instance_profile: None,
            key_name: None,
            ebs_block_devices: Vec::new(),
            tags: Tags::new(),
        }
    }
}

/// An object storage bucket (`aws_s3_bucket`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub versioning_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_destroy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    /// Bucket policy document (JSON text), emitted verbatim as a heredoc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Tags,
}

impl StorageConfig {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            versioning_enabled: false,
            force_destroy: None,
            acl: None,
            policy: None,
            tags: Tags::new(),
        }
    }
}

// ─── Node payload ────────────────────────────────────────────────────────

/// Kind plus attributes of a resource node.
///
/// The editor surface is allowed to hand over half-built nodes while the user
/// is still editing. Those are kept (so undo and the UI see them unchanged)
/// but never reach the generated code.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Network(NetworkConfig),
    Compute(ComputeConfig),
    Storage(StorageConfig),
    /// A kind tag this crate does not know. Dropped from generated output.
    Unrecognized { kind: String, attributes: Value },
    /// No kind tag, no attributes, or attributes that do not fit the kind.
    Malformed { raw: Value },
}

impl NodeData {
    /// The resource kind, for well-formed payloads.
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            NodeData::Network(_) => Some(ResourceKind::Network),
            NodeData::Compute(_) => Some(ResourceKind::Compute),
            NodeData::Storage(_) => Some(ResourceKind::Storage),
            NodeData::Unrecognized { .. } | NodeData::Malformed { .. } => None,
        }
    }

    /// Tags of a well-formed payload.
    pub fn tags(&self) -> Option<&Tags> {
        match self {
            NodeData::Network(cfg) => Some(&cfg.tags),
            NodeData::Compute(cfg) => Some(&cfg.tags),
            NodeData::Storage(cfg) => Some(&cfg.tags),
            NodeData::Unrecognized { .. } | NodeData::Malformed { .. } => None,
        }
    }

    pub fn as_network(&self) -> Option<&NetworkConfig> {
        match self {
            NodeData::Network(cfg) => Some(cfg),
            _ => None,
        }
    }

    /// Decode the `{"type": ..., "data": {...}}` wire shape. Never fails.
    pub fn from_value(value: Value) -> Self {
        let parts = value.as_object().and_then(|map| {
            let tag = map.get("type")?.as_str()?.to_owned();
            let attributes = map.get("data").filter(|a| !a.is_null())?.clone();
            Some((tag, attributes))
        });
        let Some((tag, attributes)) = parts else {
            return NodeData::Malformed { raw: value };
        };
        let Some(kind) = ResourceKind::from_tag(&tag) else {
            return NodeData::Unrecognized {
                kind: tag,
                attributes,
            };
        };

        let parsed = match kind {
            ResourceKind::Network => serde_json::from_value(attributes).map(NodeData::Network),
            ResourceKind::Compute => serde_json::from_value(attributes).map(NodeData::Compute),
            ResourceKind::Storage => serde_json::from_value(attributes).map(NodeData::Storage),
        };
        match parsed {
            Ok(data) => data,
            Err(err) => {
                log::trace!("malformed `{tag}` attributes: {err}");
                NodeData::Malformed { raw: value }
            }
        }
    }

    /// Encode back to the wire shape. Unknown payloads come back verbatim.
    pub fn to_value(&self) -> Value {
        match self {
            NodeData::Network(cfg) => tagged(ResourceKind::Network, cfg),
            NodeData::Compute(cfg) => tagged(ResourceKind::Compute, cfg),
            NodeData::Storage(cfg) => tagged(ResourceKind::Storage, cfg),
            NodeData::Unrecognized { kind, attributes } => {
                json!({ "type": kind, "data": attributes })
            }
            NodeData::Malformed { raw } => raw.clone(),
        }
    }
}

fn tagged<T: Serialize>(kind: ResourceKind, attributes: &T) -> Value {
    let data = serde_json::to_value(attributes).unwrap_or(Value::Null);
    json!({ "type": kind.tag(), "data": data })
}

// ─── Nodes & connections ─────────────────────────────────────────────────

/// Canvas position of a node. Not used by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single infrastructure resource placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub struct ResourceNode {
    pub id: NodeId,
    pub data: NodeData,
    pub position: Position,
}

impl ResourceNode {
    pub fn new(id: NodeId, data: NodeData) -> Self {
        Self {
            id,
            data,
            position: Position::default(),
        }
    }

    pub fn network(id: &str, config: NetworkConfig) -> Self {
        Self::new(NodeId::intern(id), NodeData::Network(config))
    }

    pub fn compute(id: &str, config: ComputeConfig) -> Self {
        Self::new(NodeId::intern(id), NodeData::Compute(config))
    }

    pub fn storage(id: &str, config: StorageConfig) -> Self {
        Self::new(NodeId::intern(id), NodeData::Storage(config))
    }

    /// Builder-style position setter.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn kind(&self) -> Option<ResourceKind> {
        self.data.kind()
    }
}

/// Serde shape of a node on the wire.
#[derive(Serialize, Deserialize)]
struct RawNode {
    id: NodeId,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: Value,
}

impl From<RawNode> for ResourceNode {
    fn from(raw: RawNode) -> Self {
        Self {
            id: raw.id,
            data: NodeData::from_value(raw.data),
            position: raw.position,
        }
    }
}

impl From<ResourceNode> for RawNode {
    fn from(node: ResourceNode) -> Self {
        Self {
            id: node.id,
            position: node.position,
            data: node.data.to_value(),
        }
    }
}

/// A user-drawn connection. The source sits inside / attaches to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl Connection {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: NodeId::intern(id),
            source: NodeId::intern(source),
            target: NodeId::intern(target),
        }
    }

    /// Whether either endpoint is `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

/// The full node + edge state at one point in time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<ResourceNode>,
    pub edges: Vec<Connection>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<ResourceNode>, edges: Vec<Connection>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

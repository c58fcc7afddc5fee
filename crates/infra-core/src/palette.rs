//! Resource palette: attribute defaults for freshly placed nodes.

use crate::config::DEFAULT_ENVIRONMENT;
use crate::id::NodeId;
use crate::model::*;
use smallvec::smallvec;

pub const DEFAULT_CIDR_BLOCK: &str = "10.0.0.0/16";
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";
pub const DEFAULT_MACHINE_IMAGE: &str = "ami-0c55b159cbfafe1f0";
pub const DEFAULT_SUBNET: &str = "test-subnet";
pub const DEFAULT_SECURITY_GROUP: &str = "sg-12345678";

fn default_tags(name: &str) -> Tags {
    Tags::from([
        ("Name".to_string(), name.to_string()),
        ("Environment".to_string(), DEFAULT_ENVIRONMENT.to_string()),
    ])
}

/// Default attributes for a node of `kind` placed with id `id`.
pub fn default_data(kind: ResourceKind, id: NodeId) -> NodeData {
    match kind {
        ResourceKind::Network => {
            let name = id.as_str();
            NodeData::Network(NetworkConfig {
                name: name.to_string(),
                cidr_block: DEFAULT_CIDR_BLOCK.to_string(),
                tags: default_tags(name),
            })
        }
        ResourceKind::Compute => NodeData::Compute(ComputeConfig {
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            machine_image_id: DEFAULT_MACHINE_IMAGE.to_string(),
            subnet_ref: DEFAULT_SUBNET.to_string(),
            security_group_ids: smallvec![DEFAULT_SECURITY_GROUP.to_string()],
            iam_instance_profile: None,
            key_name: None,
            ebs_block_devices: Vec::new(),
            tags: default_tags(id.as_str()),
        }),
        ResourceKind::Storage => {
            let bucket = match id.suffix() {
                Some(n) => format!("my-bucket-{n}"),
                None => format!("my-bucket-{id}"),
            };
            let tags = default_tags(&bucket);
            NodeData::Storage(StorageConfig {
                bucket_name: bucket,
                versioning_enabled: true,
                force_destroy: None,
                acl: None,
                policy: None,
                tags,
            })
        }
    }
}

/// A new node of `kind` with a generated `<tag>-<n>` id and default attributes.
pub fn new_node(kind: ResourceKind, position: Position) -> ResourceNode {
    let id = NodeId::with_prefix(kind.tag());
    ResourceNode::new(id, default_data(kind, id)).at(position)
}

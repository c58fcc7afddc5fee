//! Emitter: diagram → Terraform HCL text.
//!
//! Pure and deterministic: the same `(nodes, edges)` always yields the same
//! text. Blocks follow node order, each one followed by a blank line.
//! Nodes the generator cannot read (unknown kind, missing attributes) are
//! skipped, so a diagram that is mid-edit still produces output.

use crate::config::GeneratorConfig;
use crate::id::NodeId;
use crate::model::*;
use crate::topology::Topology;
use std::fmt::{self, Write};

/// Generate HCL for a diagram with the default configuration.
#[must_use]
pub fn generate(nodes: &[ResourceNode], edges: &[Connection]) -> String {
    generate_with(nodes, edges, &GeneratorConfig::default())
}

/// Generate HCL for a diagram.
#[must_use]
pub fn generate_with(
    nodes: &[ResourceNode],
    edges: &[Connection],
    config: &GeneratorConfig,
) -> String {
    let topology = Topology::build(nodes, edges);
    let mut out = String::with_capacity(nodes.len() * 256);
    let mut skipped = 0usize;

    for node in nodes {
        // Writing into a String cannot fail.
        let _ = match &node.data {
            NodeData::Network(net) => emit_network(&mut out, net, config),
            NodeData::Compute(ec2) => {
                let network = topology
                    .containing_network(nodes, node.id)
                    .map_or(config.placeholder_network.as_str(), |net| net.name.as_str());
                emit_compute(&mut out, node.id, network, ec2, config)
            }
            NodeData::Storage(s3) => emit_storage(&mut out, s3, config),
            NodeData::Unrecognized { kind, .. } => {
                log::trace!("skip {}: unrecognized kind `{kind}`", node.id);
                skipped += 1;
                continue;
            }
            NodeData::Malformed { .. } => {
                log::trace!("skip {}: malformed payload", node.id);
                skipped += 1;
                continue;
            }
        };
        out.push('\n');
    }

    log::debug!(
        "generated {} bytes from {} nodes / {} edges ({skipped} skipped)",
        out.len(),
        nodes.len(),
        edges.len()
    );
    out
}

/// Terraform address of the block a well-formed node generates:
/// `(resource type, resource name)`.
pub fn resource_address(
    node: &ResourceNode,
    topology: &Topology,
    nodes: &[ResourceNode],
    config: &GeneratorConfig,
) -> Option<(&'static str, String)> {
    match &node.data {
        NodeData::Network(net) => Some(("aws_vpc", net.name.clone())),
        NodeData::Compute(_) => {
            let network = topology
                .containing_network(nodes, node.id)
                .map_or(config.placeholder_network.as_str(), |net| net.name.as_str());
            Some(("aws_instance", compute_label(network, node.id)))
        }
        NodeData::Storage(s3) => Some(("aws_s3_bucket", s3.bucket_name.clone())),
        NodeData::Unrecognized { .. } | NodeData::Malformed { .. } => None,
    }
}

fn compute_label(network: &str, id: NodeId) -> String {
    format!("{network}_ec2_{id}")
}

// ─── Resource blocks ─────────────────────────────────────────────────────

fn emit_network(out: &mut String, net: &NetworkConfig, config: &GeneratorConfig) -> fmt::Result {
    writeln!(out, "resource \"aws_vpc\" {} {{", Quoted(&net.name))?;
    writeln!(out, "  cidr_block = {}", Quoted(&net.cidr_block))?;
    writeln!(out, "  enable_dns_support = true")?;
    writeln!(out, "  enable_dns_hostnames = true")?;
    emit_tags(out, &net.name, &net.tags, config)?;
    writeln!(out, "}}")
}

fn emit_compute(
    out: &mut String,
    id: NodeId,
    network: &str,
    ec2: &ComputeConfig,
    config: &GeneratorConfig,
) -> fmt::Result {
    writeln!(
        out,
        "resource \"aws_instance\" {} {{",
        Quoted(&compute_label(network, id))
    )?;
    writeln!(out, "  ami = {}", Quoted(&ec2.machine_image_id))?;
    writeln!(out, "  instance_type = {}", Quoted(&ec2.instance_type))?;
    match ec2.subnet_ref.as_str() {
        "" => {}
        subnet if is_identifier(subnet) => writeln!(out, "  subnet_id = aws_subnet.{subnet}.id")?,
        // Not a resource name; pass it through as a literal subnet id.
        subnet => writeln!(out, "  subnet_id = {}", Quoted(subnet))?,
    }

    let groups =
        serde_json::to_string(&ec2.security_group_ids).unwrap_or_else(|_| "[]".to_string());
    writeln!(out, "  vpc_security_group_ids = {groups}")?;

    if let Some(ref profile) = ec2.iam_instance_profile {
        writeln!(out, "  iam_instance_profile = {}", Quoted(profile))?;
    }
    if let Some(ref key) = ec2.key_name {
        writeln!(out, "  key_name = {}", Quoted(key))?;
    }
    for device in &ec2.ebs_block_devices {
        writeln!(out, "  ebs_block_device {{")?;
        writeln!(out, "    device_name = {}", Quoted(&device.device_name))?;
        writeln!(out, "    volume_size = {}", device.volume_size)?;
        writeln!(out, "    volume_type = {}", Quoted(&device.volume_type))?;
        writeln!(out, "  }}")?;
    }

    emit_tags(out, &format!("{network}-ec2-{id}"), &ec2.tags, config)?;
    writeln!(out, "}}")
}

fn emit_storage(out: &mut String, s3: &StorageConfig, config: &GeneratorConfig) -> fmt::Result {
    writeln!(
        out,
        "resource \"aws_s3_bucket\" {} {{",
        Quoted(&s3.bucket_name)
    )?;
    writeln!(out, "  bucket = {}", Quoted(&s3.bucket_name))?;
    if let Some(force) = s3.force_destroy {
        writeln!(out, "  force_destroy = {force}")?;
    }
    if let Some(ref acl) = s3.acl {
        writeln!(out, "  acl = {}", Quoted(acl))?;
    }
    writeln!(out, "  versioning {{")?;
    writeln!(out, "    enabled = {}", s3.versioning_enabled)?;
    writeln!(out, "  }}")?;
    if let Some(ref policy) = s3.policy {
        writeln!(out, "  policy = <<POLICY")?;
        writeln!(out, "{}", policy.trim_end_matches('\n'))?;
        writeln!(out, "POLICY")?;
    }
    emit_tags(out, &s3.bucket_name, &s3.tags, config)?;
    writeln!(out, "}}")
}

/// `tags = { ... }` with `Name` first, then `Environment` (defaulted when
/// absent or empty), then any other tags in key order.
fn emit_tags(out: &mut String, name: &str, tags: &Tags, config: &GeneratorConfig) -> fmt::Result {
    let environment = tags
        .get("Environment")
        .filter(|env| !env.is_empty())
        .map_or(config.default_environment.as_str(), String::as_str);

    writeln!(out, "  tags = {{")?;
    writeln!(out, "    Name = {}", Quoted(name))?;
    writeln!(out, "    Environment = {}", Quoted(environment))?;
    if config.extra_tags {
        for (key, value) in tags {
            if key == "Name" || key == "Environment" {
                continue;
            }
            if is_identifier(key) {
                writeln!(out, "    {key} = {}", Quoted(value))?;
            } else {
                writeln!(out, "    {} = {}", Quoted(key), Quoted(value))?;
            }
        }
    }
    writeln!(out, "  }}")
}

// ─── Literals ────────────────────────────────────────────────────────────

/// An HCL quoted string literal.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        let mut chars = self.0.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                // `${` and `%{` open template sequences; double the sigil.
                '$' | '%' if chars.peek() == Some(&'{') => {
                    f.write_char(c)?;
                    f.write_char(c)?;
                }
                _ => f.write_char(c)?,
            }
        }
        f.write_char('"')
    }
}

/// HCL identifier: letter or `_`, then letters, digits, `_` or `-`.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vpc(id: &str, name: &str) -> ResourceNode {
        ResourceNode::network(id, NetworkConfig::new(name, "10.0.0.0/16"))
    }

    fn ec2(id: &str) -> ResourceNode {
        let mut cfg = ComputeConfig::new("t2.micro", "ami-0c55b159cbfafe1f0");
        cfg.subnet_ref = "test-subnet".into();
        cfg.security_group_ids.push("sg-12345678".into());
        ResourceNode::compute(id, cfg)
    }

    #[test]
    fn empty_diagram_emits_nothing() {
        assert_eq!(generate(&[], &[]), "");
    }

    #[test]
    fn network_block() {
        let out = generate(&[vpc("n1", "vpc-main")], &[]);
        assert_eq!(
            out,
            r#"resource "aws_vpc" "vpc-main" {
  cidr_block = "10.0.0.0/16"
  enable_dns_support = true
  enable_dns_hostnames = true
  tags = {
    Name = "vpc-main"
    Environment = "production"
  }
}

"#
        );
    }

    #[test]
    fn placed_compute_block() {
        let nodes = [vpc("n1", "vpc-main"), ec2("c1")];
        let edges = [Connection::new("e1", "c1", "n1")];
        let out = generate(&nodes, &edges);
        let expected = r#"resource "aws_instance" "vpc-main_ec2_c1" {
  ami = "ami-0c55b159cbfafe1f0"
  instance_type = "t2.micro"
  subnet_id = aws_subnet.test-subnet.id
  vpc_security_group_ids = ["sg-12345678"]
  tags = {
    Name = "vpc-main-ec2-c1"
    Environment = "production"
  }
}

"#;
        assert!(out.ends_with(expected), "got:\n{out}");
    }

    #[test]
    fn unplaced_compute_uses_placeholder() {
        let mut node = ec2("c9");
        if let NodeData::Compute(cfg) = &mut node.data {
            cfg.security_group_ids.clear();
        }
        let out = generate(&[node], &[]);
        assert!(out.starts_with("resource \"aws_instance\" \"default-vpc_ec2_c9\" {\n"));
        assert!(out.contains("  vpc_security_group_ids = []\n"));
        assert!(out.contains("    Name = \"default-vpc-ec2-c9\"\n"));
    }

    #[test]
    fn empty_subnet_omits_the_line() {
        let nodes = [
            vpc("vpc-1", "vpc-1"),
            ResourceNode::compute("c1", ComputeConfig::new("t2.micro", "ami-x")),
        ];
        let edges = [Connection::new("e1", "c1", "vpc-1")];
        let out = generate(&nodes, &edges);
        assert!(!out.contains("subnet_id"), "got:\n{out}");
        assert!(out.contains("  instance_type = \"t2.micro\"\n  vpc_security_group_ids = []\n"));
    }

    #[test]
    fn subnet_outside_identifier_syntax_is_quoted() {
        let mut cfg = ComputeConfig::new("t2.micro", "ami-x");
        cfg.subnet_ref = "a\n}\nresource \"aws_iam_user\" \"evil\" {".into();
        let out = generate(&[ResourceNode::compute("c1", cfg)], &[]);

        let headers = out.lines().filter(|l| l.starts_with("resource ")).count();
        assert_eq!(headers, 1, "got:\n{out}");
        assert!(out.contains(
            "  subnet_id = \"a\\n}\\nresource \\\"aws_iam_user\\\" \\\"evil\\\" {\"\n"
        ));

        let mut cfg = ComputeConfig::new("t2.micro", "ami-x");
        cfg.subnet_ref = "subnet 0abc".into();
        let out = generate(&[ResourceNode::compute("c2", cfg)], &[]);
        assert!(out.contains("  subnet_id = \"subnet 0abc\"\n"));
    }

    #[test]
    fn storage_block() {
        let mut cfg = StorageConfig::new("my-bucket-1");
        cfg.tags.insert("Environment".into(), "staging".into());
        let out = generate(&[ResourceNode::storage("s1", cfg)], &[]);
        assert_eq!(
            out,
            r#"resource "aws_s3_bucket" "my-bucket-1" {
  bucket = "my-bucket-1"
  versioning {
    enabled = false
  }
  tags = {
    Name = "my-bucket-1"
    Environment = "staging"
  }
}

"#
        );
    }

    #[test]
    fn storage_optional_fields() {
        let mut cfg = StorageConfig::new("assets");
        cfg.versioning_enabled = true;
        cfg.force_destroy = Some(true);
        cfg.acl = Some("private".into());
        cfg.policy = Some("{\"Version\": \"2012-10-17\"}\n".into());
        let out = generate(&[ResourceNode::storage("s1", cfg)], &[]);
        assert_eq!(
            out,
            r#"resource "aws_s3_bucket" "assets" {
  bucket = "assets"
  force_destroy = true
  acl = "private"
  versioning {
    enabled = true
  }
  policy = <<POLICY
{"Version": "2012-10-17"}
POLICY
  tags = {
    Name = "assets"
    Environment = "production"
  }
}

"#
        );
    }

    #[test]
    fn compute_optional_fields() {
        let mut node = ec2("c1");
        if let NodeData::Compute(cfg) = &mut node.data {
            cfg.key_name = Some("deploy".into());
            cfg.iam_instance_profile = Some("web-profile".into());
            cfg.ebs_block_devices.push(BlockDevice {
                device_name: "/dev/sdh".into(),
                volume_size: 20,
                volume_type: "gp3".into(),
            });
        }
        let out = generate(&[node], &[]);
        assert!(out.contains(
            "  vpc_security_group_ids = [\"sg-12345678\"]\n  iam_instance_profile = \"web-profile\"\n  key_name = \"deploy\"\n  ebs_block_device {\n    device_name = \"/dev/sdh\"\n    volume_size = 20\n    volume_type = \"gp3\"\n  }\n  tags = {\n"
        ));
    }

    #[test]
    fn extra_tags_follow_in_key_order() {
        let mut cfg = NetworkConfig::new("core", "10.0.0.0/8");
        cfg.tags.insert("team".into(), "platform".into());
        cfg.tags.insert("cost center".into(), "42".into());
        cfg.tags.insert("Name".into(), "ignored".into());
        let out = generate(&[ResourceNode::network("n1", cfg.clone())], &[]);
        assert!(out.contains(
            "    Name = \"core\"\n    Environment = \"production\"\n    \"cost center\" = \"42\"\n    team = \"platform\"\n  }\n"
        ));

        let quiet = GeneratorConfig {
            extra_tags: false,
            ..GeneratorConfig::default()
        };
        let out = generate_with(&[ResourceNode::network("n1", cfg)], &[], &quiet);
        assert!(!out.contains("team"));
    }

    #[test]
    fn empty_environment_tag_is_defaulted() {
        let mut cfg = NetworkConfig::new("core", "10.0.0.0/8");
        cfg.tags.insert("Environment".into(), String::new());
        let out = generate(&[ResourceNode::network("n1", cfg)], &[]);
        assert!(out.contains("    Environment = \"production\"\n"));
    }

    #[test]
    fn configured_defaults_are_used() {
        let config = GeneratorConfig {
            default_environment: "dev".into(),
            placeholder_network: "shared".into(),
            extra_tags: true,
        };
        let out = generate_with(&[ec2("c1")], &[], &config);
        assert!(out.contains("\"shared_ec2_c1\""));
        assert!(out.contains("    Environment = \"dev\"\n"));
    }

    #[test]
    fn unreadable_nodes_are_skipped() {
        let nodes = [
            ResourceNode::new(
                NodeId::intern("x1"),
                NodeData::Unrecognized {
                    kind: "rds".into(),
                    attributes: serde_json::json!({}),
                },
            ),
            ResourceNode::new(
                NodeId::intern("x2"),
                NodeData::Malformed {
                    raw: serde_json::Value::Null,
                },
            ),
            vpc("n1", "only"),
        ];
        let out = generate(&nodes, &[]);
        assert!(out.starts_with("resource \"aws_vpc\" \"only\""));
        assert_eq!(out.matches("resource ").count(), 1);
    }

    #[test]
    fn quoted_escapes_hcl_specials() {
        assert_eq!(Quoted(r#"a"b\c"#).to_string(), r#""a\"b\\c""#);
        assert_eq!(Quoted("${var.x} %{if}").to_string(), r#""$${var.x} %%{if}""#);
        assert_eq!(Quoted("50%").to_string(), r#""50%""#);
        assert_eq!(Quoted("line\nbreak").to_string(), r#""line\nbreak""#);
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("team"));
        assert!(is_identifier("cost-center_2"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("cost center"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn address_matches_emitted_label() {
        let nodes = [vpc("n1", "vpc-main"), ec2("c1")];
        let edges = [Connection::new("e1", "c1", "n1")];
        let topo = Topology::build(&nodes, &edges);
        let config = GeneratorConfig::default();
        assert_eq!(
            resource_address(&nodes[1], &topo, &nodes, &config),
            Some(("aws_instance", "vpc-main_ec2_c1".to_string()))
        );
        assert_eq!(
            resource_address(&nodes[0], &topo, &nodes, &config),
            Some(("aws_vpc", "vpc-main".to_string()))
        );
    }
}

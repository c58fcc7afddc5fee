pub mod config;
pub mod emitter;
pub mod id;
pub mod lint;
pub mod model;
pub mod palette;
pub mod topology;

pub use config::GeneratorConfig;
pub use emitter::{generate, generate_with};
pub use id::NodeId;
pub use lint::{LintDiagnostic, LintSeverity, lint_diagram, lint_diagram_with};
pub use model::*;
pub use topology::Topology;

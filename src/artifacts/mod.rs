//! Declarative artifacts consumed by the external tool.
//!
//! Schema and configuration descriptors are synthesized separately from the
//! mirroring step so the pipeline can check that a schema exists before
//! deploying, however it was produced.
/// Configuration name shared by `config.yaml` and every `@rest` directive.
pub const CONFIG_NAME: &str = "api";

mod descriptor;
mod schema;

pub use descriptor::{synthesize_config, ConfigDescriptor, CONFIG_KIND};
pub use schema::{mirror_schema, render_schema, synthesize_schema, QueryBinding, SchemaDescriptor};

//! Workflow orchestration for workspace provisioning.
//!
//! The pipeline runs a fixed sequence of steps; `status` is the read-only
//! view of the same workspace state the steps inspect.
mod pipeline;
mod status;

pub use pipeline::{ConfigureMode, PipelineOptions, PipelineReport, ProvisioningPipeline};
pub use status::{render_status_text, workspace_status};

use serde::Serialize;
use std::fmt;

/// Pipeline steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Clean,
    Init,
    Login,
    Configure,
    Verify,
    Deploy,
    Start,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Clean,
        Step::Init,
        Step::Login,
        Step::Configure,
        Step::Verify,
        Step::Deploy,
        Step::Start,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Clean => "clean",
            Step::Init => "init",
            Step::Login => "login",
            Step::Configure => "configure",
            Step::Verify => "verify",
            Step::Deploy => "deploy",
            Step::Start => "start",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

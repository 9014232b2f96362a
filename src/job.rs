//! Job descriptors submitted to `/transform`.
//!
//! The descriptor travels as a JSON *string* in the `jconfig` field of the
//! outer request body, so it is encoded once here and again by the request.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VanceAiError};

/// Job name used for multi-step jobs.
pub const WORKFLOW: &str = "workflow";

/// A processing job: either one module or an ordered workflow of modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Job {
    Single(JobConfig),
    Workflow(Workflow),
}

impl Job {
    /// Run a single module. `job` is usually the module name, e.g. `"enlarge"`.
    pub fn single(job: impl Into<String>, config: Config) -> Self {
        Job::Single(JobConfig {
            job: job.into(),
            config,
        })
    }

    /// Run the given steps in order.
    pub fn workflow(steps: impl IntoIterator<Item = WorkflowStep>) -> Self {
        Job::Workflow(Workflow {
            job: WORKFLOW.to_string(),
            config: steps.into_iter().collect(),
        })
    }

    /// The job kind string sent to the service.
    pub fn kind(&self) -> &str {
        match self {
            Job::Single(jc) => &jc.job,
            Job::Workflow(wf) => &wf.job,
        }
    }

    /// Encode into the string carried by the `jconfig` request field.
    pub fn to_jconfig(&self) -> Result<String> {
        serde_json::to_string(self).map_err(VanceAiError::Encode)
    }

    /// Parse a `jconfig` string back into a descriptor.
    pub fn from_jconfig(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(VanceAiError::InvalidJob)
    }
}

impl From<JobConfig> for Job {
    fn from(jc: JobConfig) -> Self {
        Job::Single(jc)
    }
}

impl From<Workflow> for Job {
    fn from(wf: Workflow) -> Self {
        Job::Workflow(wf)
    }
}

/// Single-module job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub job: String,
    pub config: Config,
}

/// Multi-step job. `job` is always [`WORKFLOW`] when built through [`Job::workflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub job: String,
    /// Steps run in this order.
    pub config: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub config: Config,
}

impl WorkflowStep {
    pub fn new(name: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// One module invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// e.g. "enlarge", "sketch", "matting".
    pub module: String,
    pub module_params: ModuleParams,
    pub out_params: OutParams,
}

impl Config {
    pub fn new(module: impl Into<String>, module_params: ModuleParams) -> Self {
        Self {
            module: module.into(),
            module_params,
            out_params: OutParams::default(),
        }
    }

    /// Set the output compression quality.
    pub fn quality(mut self, quality: i64) -> Self {
        self.out_params.compress.quality = quality;
        self
    }
}

/// Knobs for a module. Which ones apply depends on the module; the rest are
/// sent with their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleParams {
    /// e.g. "EnlargeStable".
    pub model_name: String,
    pub suppress_noise: i64,
    pub remove_blur: i64,
    /// Upscale factor such as "2x".
    pub scale: String,
    pub rescale: i64,
    pub single_face: bool,
    pub composite: bool,
    pub sigma: i64,
    pub alpha: i64,
    pub auto_mode: bool,
    pub web_auto_mode: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutParams {
    pub compress: Compress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Compress {
    /// 0-100.
    pub quality: i64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn enlarge() -> Job {
        Job::single(
            "enlarge",
            Config::new(
                "enlarge",
                ModuleParams {
                    model_name: "EnlargeStable".into(),
                    suppress_noise: 26,
                    remove_blur: 26,
                    scale: "2x".into(),
                    ..Default::default()
                },
            ),
        )
    }

    fn sketch_then_matting() -> Job {
        Job::workflow([
            WorkflowStep::new(
                "sketch",
                Config::new(
                    "sketch",
                    ModuleParams {
                        model_name: "SketchStable".into(),
                        single_face: true,
                        composite: true,
                        ..Default::default()
                    },
                ),
            ),
            WorkflowStep::new(
                "matting",
                Config::new(
                    "matting",
                    ModuleParams {
                        model_name: "MattingStable".into(),
                        rescale: 532,
                        ..Default::default()
                    },
                )
                .quality(100),
            ),
        ])
    }

    #[test]
    fn single_job_round_trips() {
        let job = enlarge();
        let encoded = job.to_jconfig().unwrap();
        assert_eq!(Job::from_jconfig(&encoded).unwrap(), job);
        assert_eq!(job.kind(), "enlarge");
    }

    #[test]
    fn single_job_wire_shape() {
        let encoded = enlarge().to_jconfig().unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            value,
            json!({
                "job": "enlarge",
                "config": {
                    "module": "enlarge",
                    "module_params": {
                        "model_name": "EnlargeStable",
                        "suppress_noise": 26,
                        "remove_blur": 26,
                        "scale": "2x",
                        "rescale": 0,
                        "single_face": false,
                        "composite": false,
                        "sigma": 0,
                        "alpha": 0,
                        "auto_mode": false,
                        "web_auto_mode": false
                    },
                    "out_params": { "compress": { "quality": 0 } }
                }
            })
        );
    }

    #[test]
    fn workflow_keeps_step_order() {
        let job = sketch_then_matting();
        assert_eq!(job.kind(), WORKFLOW);

        let encoded = job.to_jconfig().unwrap();
        let decoded = Job::from_jconfig(&encoded).unwrap();
        assert_eq!(decoded, job);

        let Job::Workflow(wf) = decoded else {
            panic!("expected a workflow, got {decoded:?}");
        };
        let names: Vec<_> = wf.config.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["sketch", "matting"]);
        assert_eq!(wf.config[1].config.out_params.compress.quality, 100);

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["config"][0]["name"], "sketch");
        assert_eq!(value["config"][1]["name"], "matting");
    }

    #[test]
    fn reversed_workflow_differs() {
        let Job::Workflow(mut wf) = sketch_then_matting() else {
            unreachable!()
        };
        wf.config.reverse();
        assert_ne!(Job::from(wf), sketch_then_matting());
    }

    #[test]
    fn malformed_jconfig_is_not_a_transport_error() {
        let err = Job::from_jconfig("{\"job\":").unwrap_err();
        assert!(matches!(err, VanceAiError::InvalidJob(_)), "got {err:?}");
        assert!(!err.is_transport());
    }
}

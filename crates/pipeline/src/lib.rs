//! Armgen pipeline: an ordered list of pure stages, each turning one
//! definition set into the next, plus the default stage catalogue.

#![forbid(unsafe_code)]

pub mod stages;

use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use armgen_astmodel::prelude::{IdentifierFactory, TypeDefinitionSet};
use armgen_config::ObjectModelConfiguration;
use metrics::{counter, histogram};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

pub use stages::default_pipeline;

/// Read-only services shared by every stage of a run.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub configuration: &'a ObjectModelConfiguration,
    pub id_factory: &'a IdentifierFactory,
}

impl<'a> StageContext<'a> {
    pub fn new(configuration: &'a ObjectModelConfiguration, id_factory: &'a IdentifierFactory) -> Self {
        Self { configuration, id_factory }
    }
}

pub type StageAction = Box<dyn Fn(&TypeDefinitionSet, &StageContext<'_>) -> Result<TypeDefinitionSet> + Send + Sync>;

pub struct Stage {
    id: String,
    description: String,
    prerequisites: Vec<String>,
    action: StageAction,
}

impl Stage {
    pub fn new<F>(id: impl Into<String>, description: impl Into<String>, action: F) -> Self
    where
        F: Fn(&TypeDefinitionSet, &StageContext<'_>) -> Result<TypeDefinitionSet> + Send + Sync + 'static,
    {
        Self { id: id.into(), description: description.into(), prerequisites: Vec::new(), action: Box::new(action) }
    }

    /// Declares that `id` must be registered before this stage.
    pub fn requires(mut self, id: impl Into<String>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn description(&self) -> &str { &self.description }
    pub fn prerequisites(&self) -> &[String] { &self.prerequisites }

    pub fn run(&self, definitions: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
        (self.action)(definitions, ctx)
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("id", &self.id).field("prerequisites", &self.prerequisites).finish_non_exhaustive()
    }
}

/// Stages in registration order.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self { Self::default() }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn add_stage(&mut self, stage: Stage) { self.stages.push(stage); }

    pub fn stages(&self) -> impl Iterator<Item = &Stage> { self.stages.iter() }
    pub fn len(&self) -> usize { self.stages.len() }
    pub fn is_empty(&self) -> bool { self.stages.is_empty() }

    /// Checks that stage ids are unique and every prerequisite is registered earlier.
    pub fn verify(&self) -> Result<()> {
        let mut earlier: FxHashSet<&str> = FxHashSet::default();
        for stage in &self.stages {
            for prereq in &stage.prerequisites {
                if !earlier.contains(prereq.as_str()) {
                    if self.stages.iter().any(|s| &s.id == prereq) {
                        bail!("stage {} requires {prereq}, which is registered after it", stage.id);
                    }
                    bail!("stage {} requires {prereq}, which is not registered", stage.id);
                }
            }
            if !earlier.insert(stage.id.as_str()) {
                bail!("stage {} is registered twice", stage.id);
            }
        }
        Ok(())
    }

    /// Runs every stage in order.
    pub fn run(&self, input: TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
        self.execute(input, ctx, None)
    }

    /// Runs stages up to and including `stage_id`.
    pub fn run_until(&self, input: TypeDefinitionSet, ctx: &StageContext<'_>, stage_id: &str) -> Result<TypeDefinitionSet> {
        if !self.stages.iter().any(|s| s.id == stage_id) {
            let known: Vec<&str> = self.stages.iter().map(Stage::id).collect();
            return Err(anyhow!("unknown stage {stage_id} (stages: {})", known.join(", ")));
        }
        self.execute(input, ctx, Some(stage_id))
    }

    fn execute(&self, input: TypeDefinitionSet, ctx: &StageContext<'_>, stop_after: Option<&str>) -> Result<TypeDefinitionSet> {
        self.verify()?;
        let run_started = Instant::now();
        let mut current = input;
        for (index, stage) in self.stages.iter().enumerate() {
            debug!(stage = %stage.id, step = index + 1, of = self.stages.len(), "running stage");
            let started = Instant::now();
            let next = match stage.run(&current, ctx) {
                Ok(next) => next,
                Err(err) => {
                    counter!("pipeline_stage_failures_total", 1u64, "stage" => stage.id.clone());
                    return Err(err).with_context(|| format!("stage {}: {}", stage.id, stage.description));
                }
            };
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            histogram!("pipeline_stage_ms", elapsed_ms, "stage" => stage.id.clone());
            info!(stage = %stage.id, definitions = next.len(), before = current.len(), elapsed_ms, "stage complete");
            current = next;
            if stop_after == Some(stage.id.as_str()) {
                info!(stage = %stage.id, "stopping early");
                break;
            }
        }
        histogram!("pipeline_run_ms", run_started.elapsed().as_secs_f64() * 1000.0);
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armgen_astmodel::prelude::*;

    fn def(n: &str) -> TypeDefinition {
        TypeDefinition::new(TypeName::new(PackageReference::local("g", "v1"), n), Type::string())
    }

    fn adding(n: &'static str) -> impl Fn(&TypeDefinitionSet, &StageContext<'_>) -> Result<TypeDefinitionSet> {
        move |defs, _| {
            let mut out = defs.clone();
            out.add(def(n))?;
            Ok(out)
        }
    }

    #[test]
    fn stages_run_in_registration_order() {
        let pipeline = Pipeline::new()
            .with_stage(Stage::new("a", "adds A", adding("A")))
            .with_stage(Stage::new("b", "adds B", adding("B")).requires("a"));
        let config = ObjectModelConfiguration::default();
        let ids = IdentifierFactory::new();
        let out = pipeline.run(TypeDefinitionSet::new(), &StageContext::new(&config, &ids)).unwrap();
        assert_eq!(out.len(), 2);

        let partial = pipeline.run_until(TypeDefinitionSet::new(), &StageContext::new(&config, &ids), "a").unwrap();
        assert_eq!(partial.len(), 1);
    }

    #[test]
    fn prerequisites_must_come_first() {
        let late = Pipeline::new()
            .with_stage(Stage::new("b", "adds B", adding("B")).requires("a"))
            .with_stage(Stage::new("a", "adds A", adding("A")));
        assert!(late.verify().unwrap_err().to_string().contains("registered after"));

        let missing = Pipeline::new().with_stage(Stage::new("b", "adds B", adding("B")).requires("zzz"));
        assert!(missing.verify().unwrap_err().to_string().contains("not registered"));

        let twice = Pipeline::new().with_stage(Stage::new("a", "x", adding("A"))).with_stage(Stage::new("a", "y", adding("B")));
        assert!(twice.verify().unwrap_err().to_string().contains("twice"));
    }

    #[test]
    fn failure_is_wrapped_with_stage_identity() {
        let pipeline = Pipeline::new()
            .with_stage(Stage::new("a", "adds A", adding("A")))
            .with_stage(Stage::new("boom", "always fails", |_: &TypeDefinitionSet, _: &StageContext<'_>| -> Result<TypeDefinitionSet> {
                bail!("root cause")
            }));
        let config = ObjectModelConfiguration::default();
        let ids = IdentifierFactory::new();
        let err = pipeline.run(TypeDefinitionSet::new(), &StageContext::new(&config, &ids)).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.starts_with("stage boom: always fails"), "{chain}");
        assert!(chain.ends_with("root cause"), "{chain}");
    }

    #[test]
    fn unknown_stop_point_is_rejected() {
        let pipeline = Pipeline::new().with_stage(Stage::new("a", "adds A", adding("A")));
        let config = ObjectModelConfiguration::default();
        let ids = IdentifierFactory::new();
        let err = pipeline.run_until(TypeDefinitionSet::new(), &StageContext::new(&config, &ids), "nope").unwrap_err();
        assert!(err.to_string().contains("unknown stage nope"));
    }
}

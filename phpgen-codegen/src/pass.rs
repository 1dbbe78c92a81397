//! Mutation passes and the pipeline that runs them.

use std::fmt;

use phpgen_ast::Ast;
use serde::Serialize;
use tracing::debug;

use crate::Result;

/// What a pass did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The element was already present; the tree is untouched.
    Unchanged,
    /// The element was added.
    Inserted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Inserted => write!(f, "inserted"),
        }
    }
}

/// An idempotent tree transformation that adds one declaration element
/// when it is missing.
///
/// A pass first scans the tree for the element it owns. Finding it is not
/// an error: the pass reports [`Outcome::Unchanged`] and leaves hand edits
/// alone. Errors are reserved for conflicts the pass cannot resolve without
/// rewriting existing code.
pub trait MutationPass {
    /// The pass kind, e.g. `"method"`.
    fn name(&self) -> &'static str;

    /// The element this pass targets, for logs and reports.
    fn target(&self) -> String;

    /// Apply the pass to `ast`.
    fn apply(&self, ast: &mut Ast) -> Result<Outcome>;
}

/// Ordered list of passes applied to one tree.
///
/// ```ignore
/// let report = Pipeline::new()
///     .pass(StrictTypesPass)
///     .pass(NamespacePass::new("App"))
///     .run(&mut ast)?;
/// ```
#[derive(Default)]
pub struct Pipeline<'a> {
    passes: Vec<Box<dyn MutationPass + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass.
    pub fn pass(mut self, pass: impl MutationPass + 'a) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn push(&mut self, pass: Box<dyn MutationPass + 'a>) {
        self.passes.push(pass);
    }

    pub fn extend(&mut self, passes: impl IntoIterator<Item = Box<dyn MutationPass + 'a>>) {
        self.passes.extend(passes);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Names of the passes in execution order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Run every pass in order, stopping at the first error.
    pub fn run(&self, ast: &mut Ast) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();
        for pass in &self.passes {
            report.records.push(run_pass(pass.as_ref(), ast)?);
        }
        Ok(report)
    }
}

fn run_pass(pass: &dyn MutationPass, ast: &mut Ast) -> Result<PassRecord> {
    let target = pass.target();
    let outcome = pass.apply(ast)?;
    debug!(pass = pass.name(), %target, %outcome, "applied pass");
    Ok(PassRecord {
        pass: pass.name(),
        target,
        outcome,
    })
}

/// One applied pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassRecord {
    pub pass: &'static str,
    pub target: String,
    pub outcome: Outcome,
}

/// Outcomes of a pipeline run, in pass order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    records: Vec<PassRecord>,
}

impl PipelineReport {
    pub fn records(&self) -> &[PassRecord] {
        &self.records
    }

    /// Number of passes that inserted something.
    pub fn inserted(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == Outcome::Inserted)
            .count()
    }

    /// Whether any pass changed the tree.
    pub fn changed(&self) -> bool {
        self.inserted() > 0
    }
}

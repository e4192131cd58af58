//! Public output types for migration command responses.
//!
//! Every mutating command records the steps it took (or would take) in a
//! [`MigrationReport`]. Without `--execute` the steps are recorded as
//! `planned` together with the payload that would have been sent.

use serde::Serialize;
use serde_json::Value;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The mutating call was made.
    Applied,
    /// Dry run: the call would have been made.
    Planned,
    /// Nothing to do (already in the desired state).
    Unchanged,
    /// Deliberately not done; see the step detail.
    Skipped,
    /// The call completed but the resource reported failure.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step: String,
    pub target: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub applied: u32,
    pub planned: u32,
    pub unchanged: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub execute: bool,
    pub steps: Vec<StepRecord>,
    pub warnings: Vec<String>,
    pub summary: ReportSummary,
}

impl MigrationReport {
    pub fn new(execute: bool) -> Self {
        Self {
            execute,
            steps: Vec::new(),
            warnings: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    pub fn record(
        &mut self,
        step: &str,
        target: impl Into<String>,
        status: StepStatus,
        detail: Option<Value>,
    ) {
        match status {
            StepStatus::Applied => self.summary.applied += 1,
            StepStatus::Planned => self.summary.planned += 1,
            StepStatus::Unchanged => self.summary.unchanged += 1,
            StepStatus::Skipped => self.summary.skipped += 1,
            StepStatus::Failed => self.summary.failed += 1,
        }
        self.steps.push(StepRecord {
            step: step.to_string(),
            target: target.into(),
            status,
            detail,
        });
    }

    /// Run `action` when executing, otherwise record the step as planned.
    pub fn apply<F>(
        &mut self,
        step: &str,
        target: impl Into<String>,
        detail: Option<Value>,
        action: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        if self.execute {
            action()?;
            self.record(step, target, StepStatus::Applied, detail);
        } else {
            self.record(step, target, StepStatus::Planned, detail);
        }
        Ok(())
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log_status!("warn", "{}", message);
        self.warnings.push(message);
    }

    pub fn steps_named<'a>(&'a self, step: &'a str) -> impl Iterator<Item = &'a StepRecord> + 'a {
        self.steps.iter().filter(move |s| s.step == step)
    }
}

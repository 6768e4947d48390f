//! Job stepper
//!
//! `JobStepper` tracks the stage a job is in (`current`, derived from its
//! status) and the stage whose form is open (`selected`). Any stage may be
//! selected so earlier stages can be corrected; after a successful action
//! the selection follows the job to its new stage unless the action keeps
//! the user where they are.

use md_models::{Job, JobStatus};
use serde_json::{Map, Value};

use crate::stage::{Stage, StageState};

#[derive(Debug, Clone, PartialEq)]
pub struct JobStepper {
    status: JobStatus,
    current: Stage,
    selected: Stage,
}

impl JobStepper {
    pub fn new(status: JobStatus) -> Self {
        let current = Stage::for_status(&status);
        Self {
            status,
            current,
            selected: current,
        }
    }

    pub fn for_job(job: &Job) -> Self {
        Self::new(job.status.clone())
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    pub fn selected(&self) -> Stage {
        self.selected
    }

    pub fn select(&mut self, stage: Stage) {
        self.selected = stage;
    }

    pub fn is_selected(&self, stage: Stage) -> bool {
        self.selected == stage
    }

    pub fn state_of(&self, stage: Stage) -> StageState {
        stage.state_relative_to(self.current)
    }

    /// Closed jobs take no further actions
    pub fn is_locked(&self) -> bool {
        self.status.is_closed()
    }

    /// Record a successful action that left the job in `updated`.
    ///
    /// Returns the stage the selection moved to, if it moved.
    pub fn on_success(&mut self, updated: JobStatus, meta: &ActionMeta) -> Option<Stage> {
        let previous = self.current;
        self.current = Stage::for_status(&updated);
        self.status = updated;

        if meta.skip_advance || self.current == previous {
            return None;
        }
        self.selected = self.current;
        Some(self.current)
    }
}

/// Actions the stepper can run, one per stage form button
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    SaveMeasure,
    AdvanceToPricing,
    SaveOffer,
    StartApproval,
    SaveReservation,
    UpdateProduction {
        status: JobStatus,
        agreement_date: Option<String>,
    },
    ScheduleAssembly,
    CompleteAssembly,
    CloseFinance,
}

impl StepAction {
    /// Stage whose form offers the action
    pub fn stage(&self) -> Stage {
        match self {
            StepAction::SaveMeasure | StepAction::AdvanceToPricing => Stage::Measure,
            StepAction::SaveOffer => Stage::Pricing,
            StepAction::StartApproval => Stage::Offer,
            StepAction::SaveReservation => Stage::Approval,
            StepAction::UpdateProduction { .. } => Stage::Production,
            StepAction::ScheduleAssembly | StepAction::CompleteAssembly => Stage::Assembly,
            StepAction::CloseFinance => Stage::Finance,
        }
    }

    /// Saving measurements and intermediate production updates keep the
    /// current form open.
    pub fn skips_advance(&self) -> bool {
        match self {
            StepAction::SaveMeasure => true,
            StepAction::UpdateProduction { status, .. } => {
                matches!(status, JobStatus::Uretimde | JobStatus::Anlasmada)
            }
            _ => false,
        }
    }

    /// Log metadata describing the action
    pub fn meta(&self) -> ActionMeta {
        let mut meta = ActionMeta::new().skip_advance(self.skips_advance());
        match self {
            StepAction::SaveMeasure => meta = meta.with("measure", true),
            StepAction::AdvanceToPricing => {
                meta = meta.with("transition", JobStatus::Fiyatlandirma.as_str())
            }
            StepAction::SaveOffer => meta = meta.with("pricing", true),
            StepAction::UpdateProduction {
                status,
                agreement_date,
            } => {
                meta = meta
                    .with("production", status.as_str())
                    .with("agreement", agreement_date.clone());
            }
            _ => {}
        }
        meta
    }
}

/// Metadata attached to the job log after an action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionMeta {
    pub skip_advance: bool,
    pub fields: Map<String, Value>,
}

impl ActionMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_advance(mut self, skip: bool) -> Self {
        self.skip_advance = skip;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Log payload: `{stage, ...fields, skipAdvance?}`
    pub fn to_log_meta(&self, stage: Stage) -> Value {
        let mut map = Map::new();
        map.insert("stage".into(), Value::from(stage.id()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        if self.skip_advance {
            map.insert("skipAdvance".into(), Value::Bool(true));
        }
        Value::Object(map)
    }
}

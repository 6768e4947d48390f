//! Stepper session
//!
//! Runs one job through the pipeline the way the job screen does: each
//! action calls the API, replaces the local job with the answer, writes an
//! activity log entry and lets [`JobStepper`] move the open form along.

use md_models::{
    ApprovalStart, AssemblyCompleteRequest, AssemblyScheduleRequest, FinanceClose, Job, JobLog,
    JobLogInput, JobStatus, MeasureUpdate, OfferUpdate, ProductionUpdate, StatusUpdate,
    StockLine,
};
use md_workflow::{
    offer_total_in_use, ActionMeta, JobStepper, PaymentDraft, ReservationDraft, Stage,
    StepAction, WorkflowError,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::data_service::DataService;
use crate::error::{ClientError, ClientResult};
use crate::local::ReservationOptions;

pub struct JobStepperSession {
    service: DataService,
    job: Job,
    stepper: JobStepper,
    last_error: Option<String>,
}

impl JobStepperSession {
    pub fn new(service: DataService, job: Job) -> Self {
        Self {
            stepper: JobStepper::for_job(&job),
            service,
            job,
            last_error: None,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn stepper(&self) -> &JobStepper {
        &self.stepper
    }

    pub fn select(&mut self, stage: Stage) {
        self.stepper.select(stage);
    }

    /// Message of the last failed action, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub async fn logs(&self) -> ClientResult<Vec<JobLog>> {
        self.service.get_job_logs(&self.job.id).await
    }

    pub async fn save_measure(&mut self, payload: MeasureUpdate) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let result = self
            .service
            .update_job_measure(&self.job.id, &payload)
            .await;
        self.settle(StepAction::SaveMeasure.meta(), result).await
    }

    /// Move a measured job on to pricing
    pub async fn advance_to_pricing(&mut self) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let payload = StatusUpdate {
            status: JobStatus::Fiyatlandirma,
        };
        let result = self.service.update_job_status(&self.job.id, &payload).await;
        self.settle(StepAction::AdvanceToPricing.meta(), result).await
    }

    pub async fn save_offer(&mut self, payload: OfferUpdate) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let result = self.service.update_job_offer(&self.job.id, &payload).await;
        self.settle(StepAction::SaveOffer.meta(), result).await
    }

    /// Send the payment plan for approval. The draft must add up to the
    /// offer total in use (`local_total`, or the job's saved total when 0).
    pub async fn start_approval(
        &mut self,
        draft: PaymentDraft,
        local_total: f64,
    ) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let offer_total = offer_total_in_use(local_total, &self.job);
        let plan = match draft.into_plan(offer_total) {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(e.into())),
        };

        let payload = ApprovalStart {
            payment_plan: plan.clone(),
            contract_url: None,
            stock_needs: Vec::new(),
        };
        let result = self
            .service
            .start_job_approval(&self.job.id, &payload)
            .await;

        if result.is_ok() {
            let mut offer = serde_json::to_value(&self.job.offer)
                .ok()
                .and_then(|v| v.as_object().cloned())
                .unwrap_or_default();
            offer.insert("total".into(), json!(offer_total));

            let mut patch = Map::new();
            patch.insert("payments".into(), json!(plan));
            patch.insert("offer".into(), Value::Object(offer));
            self.service.apply_local_job_patch(&self.job.id, &patch);
        }
        self.settle(StepAction::StartApproval.meta(), result).await
    }

    /// Submit the picked stock. With `ready` the stock is taken out,
    /// otherwise it is held; lines short of stock get a purchase order.
    pub async fn save_reservation(
        &mut self,
        draft: &ReservationDraft,
        ready: bool,
        note: &str,
    ) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let payload = match draft.to_update(ready, note) {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e.into())),
        };
        let result = self
            .service
            .update_stock_status(&self.job.id, &payload)
            .await;

        if result.is_ok() {
            self.service.apply_local_stock_reservation(
                draft.lines(),
                &ReservationOptions {
                    ready,
                    note: payload.purchase_notes.clone().unwrap_or_default(),
                    job_id: Some(self.job.id.clone()),
                    due_date: None,
                },
            );

            let mut patch = Map::new();
            if payload.pending.is_empty() {
                patch.insert("pendingPO".into(), json!([]));
                self.service.apply_local_job_patch(&self.job.id, &patch);
            } else {
                let lines: Vec<StockLine> =
                    payload.pending.iter().map(|p| p.line.clone()).collect();
                let order = self
                    .service
                    .create_local_purchase_orders(&self.job.id, &lines);
                patch.insert("pendingPO".into(), json!(payload.pending));
                self.service.apply_local_job_patch(&self.job.id, &patch);
                self.push_log(
                    "stock_pending",
                    "Eksik stok için sipariş bekleniyor",
                    json!({
                        "pending": payload.pending,
                        "poId": order.map(|o| o.id),
                    }),
                )
                .await;
            }
        }
        self.settle(StepAction::SaveReservation.meta(), result).await
    }

    pub async fn update_production(
        &mut self,
        status: JobStatus,
        note: Option<String>,
        agreement_date: Option<String>,
    ) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let action = StepAction::UpdateProduction {
            status: status.clone(),
            agreement_date: agreement_date.clone(),
        };
        let payload = ProductionUpdate {
            status,
            note,
            agreement_date,
        };
        let result = self
            .service
            .update_production_status(&self.job.id, &payload)
            .await;
        self.settle(action.meta(), result).await
    }

    pub async fn schedule_assembly(
        &mut self,
        payload: AssemblyScheduleRequest,
    ) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let result = self
            .service
            .schedule_assembly(&self.job.id, &payload)
            .await;
        self.settle(StepAction::ScheduleAssembly.meta(), result).await
    }

    pub async fn complete_assembly(
        &mut self,
        payload: AssemblyCompleteRequest,
    ) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let result = self
            .service
            .complete_assembly(&self.job.id, &payload)
            .await;
        if result.is_ok() {
            self.push_log(
                "assembly.completed",
                "Montaj tamamlandı",
                json!({ "team": payload.team }),
            )
            .await;
        }
        self.settle(StepAction::CompleteAssembly.meta(), result).await
    }

    pub async fn close_finance(&mut self, payload: FinanceClose) -> ClientResult<Option<Stage>> {
        self.ensure_open()?;
        let result = self.service.close_finance(&self.job.id, &payload).await;
        self.settle(StepAction::CloseFinance.meta(), result).await
    }

    fn ensure_open(&mut self) -> ClientResult<()> {
        if self.stepper.is_locked() {
            return Err(self.fail(WorkflowError::JobClosed.into()));
        }
        Ok(())
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        self.last_error = Some(err.to_string());
        err
    }

    /// Take the API answer: replace the job, log the stage the action ran
    /// in and advance the stepper.
    async fn settle(
        &mut self,
        meta: ActionMeta,
        result: ClientResult<Job>,
    ) -> ClientResult<Option<Stage>> {
        let updated = match result {
            Ok(job) => job,
            Err(e) => return Err(self.fail(e)),
        };
        self.last_error = None;

        let stage = self.stepper.current();
        self.job = updated;
        self.push_log(
            "update",
            &format!("Aşama: {}", stage.label()),
            meta.to_log_meta(stage),
        )
        .await;

        let advanced = self.stepper.on_success(self.job.status.clone(), &meta);
        if let Some(next) = advanced {
            info!(job_id = %self.job.id, stage = next.id(), "Stepper advanced");
        }
        Ok(advanced)
    }

    /// Log failures never fail the action
    async fn push_log(&self, action: &str, detail: &str, meta: Value) {
        let input = JobLogInput {
            job_id: self.job.id.clone(),
            action: Some(action.to_string()),
            detail: Some(detail.to_string()),
            meta: Some(meta),
            ..Default::default()
        };
        if let Err(e) = self.service.add_job_log(input).await {
            debug!(error = %e, action, "Job log not written");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{keys, MockData};
    use httpmock::prelude::*;
    use md_models::{ChequeLine, StockItem};

    fn job(status: &str) -> Value {
        json!({"id": "JOB-1", "title": "Mutfak dolabı", "status": status, "offer": {"total": 8000}})
    }

    fn session(server: &MockServer, status: &str) -> JobStepperSession {
        let data = MockData::from_value(json!({
            "jobs": [job(status)],
            "stockItems": [{"id": "STK-1", "name": "Menteşe", "sku": "MNT", "onHand": 2}],
            "jobLogs": []
        }))
        .unwrap();
        let service = DataService::with_urls(&server.base_url(), &server.url("/data/mockData.json"))
            .unwrap()
            .with_mock(data);
        let job: Job = serde_json::from_value(job(status)).unwrap();
        JobStepperSession::new(service, job)
    }

    #[tokio::test]
    async fn test_save_offer_advances() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/jobs/JOB-1/offer");
            then.status(200).json_body(job("TEKLIF_HAZIR"));
        });

        let mut session = session(&server, "FIYATLANDIRMA");
        let payload = OfferUpdate {
            lines: vec![],
            total: 8000.0,
            status: Some(JobStatus::TeklifHazir),
            files: None,
            meta: None,
        };
        let moved = session.save_offer(payload).await.unwrap();
        assert_eq!(moved, Some(Stage::Offer));
        assert_eq!(session.stepper().selected(), Stage::Offer);
        assert!(session.last_error().is_none());

        let logs = session.logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "update");
        assert_eq!(logs[0].detail, "Aşama: Fiyatlandırma");
        assert_eq!(logs[0].meta["stage"], "pricing");
        assert_eq!(logs[0].meta["pricing"], true);
    }

    #[tokio::test]
    async fn test_save_measure_stays() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/jobs/JOB-1/measure");
            then.status(200).json_body(job("OLCU_ASAMASI"));
        });

        let mut session = session(&server, "OLCU_ASAMASI");
        let payload = MeasureUpdate {
            measurements: json!({"width": 320}),
            appointment: None,
        };
        assert_eq!(session.save_measure(payload).await.unwrap(), None);
        assert_eq!(session.stepper().selected(), Stage::Measure);
    }

    #[tokio::test]
    async fn test_error_is_kept() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/jobs/JOB-1/finance/close");
            then.status(400)
                .json_body(json!({"detail": "balance must be 0 (difference: 1000)"}));
        });

        let mut session = session(&server, "MUHASEBE_BEKLIYOR");
        let payload = FinanceClose {
            total: 8000.0,
            payments: Default::default(),
            discount: None,
        };
        let err = session.close_finance(payload).await.unwrap_err();
        assert_eq!(err.to_string(), "balance must be 0 (difference: 1000)");
        assert_eq!(
            session.last_error(),
            Some("balance must be 0 (difference: 1000)")
        );
        assert_eq!(session.job().status, JobStatus::MuhasebeBekliyor);
    }

    #[tokio::test]
    async fn test_start_approval_checks_the_plan() {
        let server = MockServer::start();
        let approval = server.mock(|when, then| {
            when.method(POST).path("/jobs/JOB-1/approval/start");
            then.status(200).json_body(job("ONAY_BEKLIYOR"));
        });

        let mut session = session(&server, "TEKLIF_HAZIR");
        let mut draft = PaymentDraft::new();
        draft.cash = 3000.0;
        assert!(session.start_approval(draft.clone(), 0.0).await.is_err());
        assert!(session.last_error().unwrap().contains("does not match"));
        approval.assert_hits(0);

        draft.add_cheque(ChequeLine {
            amount: 5000.0,
            due: "2099-01-01".into(),
            ..Default::default()
        })
        .unwrap();
        let moved = session.start_approval(draft, 0.0).await.unwrap();
        assert_eq!(moved, Some(Stage::Approval));
        approval.assert();

        let data = session.service.mock().load().await.unwrap();
        let jobs = data.list(keys::JOBS);
        assert_eq!(jobs[0]["payments"]["cheque"], 5000.0);
        assert_eq!(jobs[0]["offer"]["total"], 8000.0);
    }

    #[tokio::test]
    async fn test_save_reservation_with_shortfall() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/jobs/JOB-1/stock");
            then.status(200).json_body(job("STOK_BEKLIYOR"));
        });

        let mut session = session(&server, "ONAY_BEKLIYOR");
        let item = StockItem {
            id: "STK-1".into(),
            name: "Menteşe".into(),
            sku: "MNT".into(),
            on_hand: 2.0,
            ..Default::default()
        };
        let mut draft = ReservationDraft::new();
        draft.add(&item, 5.0).unwrap();

        let moved = session.save_reservation(&draft, false, "").await.unwrap();
        assert_eq!(moved, Some(Stage::Stock));

        let data = session.service.mock().load().await.unwrap();
        let items: Vec<StockItem> = data.collection(keys::STOCK_ITEMS);
        assert_eq!(items[0].reserved, 5.0);
        assert_eq!(data.list(keys::PURCHASE_ORDERS).len(), 1);
        assert_eq!(data.list(keys::JOBS)[0]["pendingPO"][0]["missing"], 3.0);

        let logs = session.logs().await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "update");
        assert_eq!(logs[1].action, "stock_pending");
        assert!(logs[1].meta["poId"].as_str().unwrap().starts_with("PO-"));
    }

    #[tokio::test]
    async fn test_closed_job_is_locked() {
        let server = MockServer::start();
        let mut session = session(&server, "KAPALI");
        let err = session.advance_to_pricing().await.unwrap_err();
        assert_eq!(err.to_string(), "job is closed");
        assert_eq!(session.last_error(), Some("job is closed"));
    }
}

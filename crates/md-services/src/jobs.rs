//! Job pipeline service
//!
//! Every transition loads the job, checks it is still open, applies the
//! stage change, appends a log entry and saves. A failing check leaves the
//! stored job untouched.

use md_contracts::{
    CreateJobContract, FinanceCloseContract, ProductionContract, StartApprovalContract,
    StatusContract,
};
use md_core::error::{MdError, ValidationErrors};
use md_core::result::MdResult;
use md_core::types::{now_iso, prefixed_id};
use md_models::{
    ApprovalStart, Approval, AssemblyCompleteRequest, AssemblyCompletion, AssemblySchedule,
    AssemblyScheduleRequest, Finance, FinanceClose, Job, JobCreate, JobStatus, Measure,
    MeasureUpdate, Offer, OfferUpdate, Production, ProductionUpdate, StatusUpdate, StockUpdate,
};
use md_store::{DataDir, JobRepository};
use md_workflow::{check_close, WorkflowError};
use tracing::{info, instrument};

use crate::validate_with;

#[derive(Clone)]
pub struct JobService {
    jobs: JobRepository,
}

impl JobService {
    pub fn new(dir: DataDir) -> Self {
        Self {
            jobs: JobRepository::new(dir),
        }
    }

    pub async fn list(&self) -> MdResult<Vec<Job>> {
        Ok(self.jobs.find_all().await?)
    }

    pub async fn get(&self, id: &str) -> MdResult<Job> {
        Ok(self.jobs.get(id).await?)
    }

    /// Open a job at the stage its start type names
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub async fn create(&self, input: JobCreate) -> MdResult<Job> {
        validate_with(&CreateJobContract, &input)?;

        let mut job = Job::new(prefixed_id("JOB"), input.title, input.start_type);
        job.customer_id = input.customer_id;
        job.customer_name = input.customer_name;
        job.roles = input.roles;
        job.log(
            "created",
            Some(format!("startType={}", input.start_type.as_str())),
        );

        let job = self.jobs.insert(job).await?;
        info!(job_id = %job.id, status = %job.status, "Job created");
        Ok(job)
    }

    #[instrument(skip(self, input))]
    pub async fn update_measure(&self, id: &str, input: MeasureUpdate) -> MdResult<Job> {
        self.transition(id, |job| {
            job.measure = Measure {
                measurements: Some(input.measurements),
                appointment: input.appointment,
                ..Default::default()
            };
            job.status = JobStatus::Fiyatlandirma;
            job.log("measure.updated", None);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, input))]
    pub async fn update_offer(&self, id: &str, input: OfferUpdate) -> MdResult<Job> {
        let status = input.status.unwrap_or(JobStatus::TeklifTaslak);
        if !status.is_known() {
            let mut errors = ValidationErrors::new();
            errors.add("status", "is not a known job status");
            return Err(errors.into());
        }

        self.transition(id, |job| {
            job.offer = Offer {
                lines: input.lines,
                total: Some(input.total),
                status: Some(status.clone()),
                files: input.files,
                meta: input.meta,
                ..Default::default()
            };
            job.status = status;
            job.log("offer.updated", None);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, input))]
    pub async fn start_approval(&self, id: &str, input: ApprovalStart) -> MdResult<Job> {
        validate_with(&StartApprovalContract, &input)?;

        self.transition(id, |job| {
            job.approval = Approval {
                payment_plan: Some(input.payment_plan),
                contract_url: input.contract_url,
                stock_needs: input.stock_needs,
                ..Default::default()
            };
            job.status = JobStatus::OnayBekliyor;
            job.log("approval.started", None);
            Ok(())
        })
        .await
    }

    /// Record the reservation outcome. Lines still short are kept in
    /// `pendingPO` until a purchase order covers them.
    #[instrument(skip(self, input), fields(ready = input.ready))]
    pub async fn update_stock(&self, id: &str, input: StockUpdate) -> MdResult<Job> {
        self.transition(id, |job| {
            job.stock.ready = Some(input.ready);
            job.stock.purchase_notes = input.purchase_notes;
            if !input.items.is_empty() {
                job.stock.items = input.items;
            }
            job.pending_po = input.pending;
            job.status = if input.ready {
                JobStatus::UretimeHazir
            } else {
                JobStatus::StokBekliyor
            };
            job.log("stock.updated", Some(format!("ready={}", input.ready)));
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, input), fields(status = %input.status))]
    pub async fn update_production(&self, id: &str, input: ProductionUpdate) -> MdResult<Job> {
        validate_with(&ProductionContract, &input)?;

        self.transition(id, |job| {
            job.log("production.updated", Some(input.status.to_string()));
            job.production = Production {
                status: Some(input.status.clone()),
                note: input.note,
                agreement_date: input.agreement_date.filter(|d| !d.is_empty()),
            };
            job.status = input.status;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, input))]
    pub async fn schedule_assembly(
        &self,
        id: &str,
        input: AssemblyScheduleRequest,
    ) -> MdResult<Job> {
        if input.date.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("date", "is required");
            return Err(errors.into());
        }

        self.transition(id, |job| {
            job.assembly.schedule = Some(AssemblySchedule {
                date: Some(input.date),
                note: input.note,
                team: input.team,
            });
            job.status = JobStatus::MontajTermin;
            job.log("assembly.scheduled", None);
            Ok(())
        })
        .await
    }

    /// Stamp completion; given fields overwrite the schedule
    #[instrument(skip(self, input))]
    pub async fn complete_assembly(
        &self,
        id: &str,
        input: AssemblyCompleteRequest,
    ) -> MdResult<Job> {
        self.transition(id, |job| {
            let mut schedule = job.assembly.schedule.take().unwrap_or_default();
            if let Some(date) = input.date.filter(|v| !v.is_empty()) {
                schedule.date = Some(date);
            }
            if let Some(note) = input.note.filter(|v| !v.is_empty()) {
                schedule.note = Some(note);
            }
            if let Some(team) = input.team.clone().filter(|v| !v.is_empty()) {
                schedule.team = Some(team);
            }
            job.assembly.schedule = Some(schedule);
            job.assembly.complete = Some(AssemblyCompletion {
                at: now_iso(),
                proof: input.proof,
            });
            job.status = JobStatus::MuhasebeBekliyor;
            job.log(
                "assembly.complete",
                Some(format!("team={}", input.team.as_deref().unwrap_or(""))),
            );
            Ok(())
        })
        .await
    }

    /// Close the job once collected money, discount and the agreed plan add
    /// up to the offer total
    #[instrument(skip(self, input))]
    pub async fn close_finance(&self, id: &str, input: FinanceClose) -> MdResult<Job> {
        validate_with(&FinanceCloseContract, &input)?;

        self.transition(id, |job| {
            let offer_total = job.offer_total();
            let settlement = check_close(
                offer_total,
                job.payment_plan(),
                input.payments,
                input.discount.as_ref(),
            )?;

            job.finance = Finance {
                total: Some(offer_total),
                pre_payments: Some(settlement.pre_received),
                final_payments: Some(settlement.final_received),
                discount: input.discount,
                closed_at: Some(now_iso()),
                ..Default::default()
            };
            job.status = JobStatus::Kapali;
            job.log("finance.closed", Some(format!("balance={}", settlement.balance)));
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, input), fields(status = %input.status))]
    pub async fn set_status(&self, id: &str, input: StatusUpdate) -> MdResult<Job> {
        validate_with(&StatusContract, &input)?;

        self.transition(id, |job| {
            job.log("status.updated", Some(input.status.to_string()));
            job.status = input.status;
            Ok(())
        })
        .await
    }

    async fn transition<F>(&self, id: &str, apply: F) -> MdResult<Job>
    where
        F: FnOnce(&mut Job) -> MdResult<()>,
    {
        let job = self
            .jobs
            .modify(id, |job| {
                if job.status.is_closed() {
                    return Err(MdError::from(WorkflowError::JobClosed));
                }
                apply(job)
            })
            .await?;
        info!(job_id = %job.id, status = %job.status, "Job updated");
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use md_models::{PaymentPlan, PendingLine, Received, StartType, StockLine};
    use serde_json::json;

    async fn service() -> (tempfile::TempDir, JobService) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::open(tmp.path()).await.unwrap();
        (tmp, JobService::new(dir))
    }

    fn create_input(start_type: StartType) -> JobCreate {
        JobCreate {
            customer_id: "CST-1".into(),
            customer_name: "Ayşe Yılmaz".into(),
            title: "Mutfak dolabı".into(),
            start_type,
            roles: vec![],
        }
    }

    async fn job_at_pricing(service: &JobService) -> Job {
        service.create(create_input(StartType::Fiyatlandirma)).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_sets_initial_status() {
        let (_tmp, service) = service().await;

        let measured = service.create(create_input(StartType::Olcu)).await.unwrap();
        assert_eq!(measured.status, JobStatus::OlcuAsamasi);
        assert!(measured.id.starts_with("JOB-"));
        assert_eq!(measured.logs.len(), 1);
        assert_eq!(measured.logs[0].action, "created");
        assert_eq!(measured.logs[0].note.as_deref(), Some("startType=OLCU"));

        let priced = job_at_pricing(&service).await;
        assert_eq!(priced.status, JobStatus::Fiyatlandirma);

        let all = service.list().await.unwrap();
        assert_eq!(all[0].id, priced.id);
    }

    #[tokio::test]
    async fn test_unrecognised_statuses_survive_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::open(tmp.path()).await.unwrap();
        dir.write(
            "jobs.json",
            &json!([{
                "id": "JOB-OLD",
                "status": "ARSIVDE",
                "offer": {"status": "TEKLIF_ESKI", "total": 500.0},
                "production": {"status": "BEKLEMEDE"}
            }]),
        )
        .await
        .unwrap();
        let service = JobService::new(dir.clone());

        service.create(create_input(StartType::Olcu)).await.unwrap();

        let raw = dir.read_value("jobs.json").await.unwrap();
        assert_eq!(raw[1]["id"], "JOB-OLD");
        assert_eq!(raw[1]["status"], "ARSIVDE");
        assert_eq!(raw[1]["offer"]["status"], "TEKLIF_ESKI");
        assert_eq!(raw[1]["production"]["status"], "BEKLEMEDE");
    }

    #[tokio::test]
    async fn test_create_validates() {
        let (_tmp, service) = service().await;
        let mut input = create_input(StartType::Olcu);
        input.title = "  ".into();
        let err = service.create(input).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_measure_moves_to_pricing() {
        let (_tmp, service) = service().await;
        let job = service.create(create_input(StartType::Olcu)).await.unwrap();

        let updated = service
            .update_measure(
                &job.id,
                MeasureUpdate {
                    measurements: json!({"note": "3 modül", "confirmed": true}),
                    appointment: Some(json!({"date": "2025-02-01"})),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::Fiyatlandirma);
        assert_eq!(updated.measure.measurements.unwrap()["note"], "3 modül");
        assert_eq!(updated.logs.last().unwrap().action, "measure.updated");
    }

    #[tokio::test]
    async fn test_offer_status_defaults_to_draft() {
        let (_tmp, service) = service().await;
        let job = job_at_pricing(&service).await;

        let offer = OfferUpdate {
            lines: vec![],
            total: 12500.0,
            status: None,
            files: None,
            meta: Some(json!({"orderNo": "S-12"})),
        };
        let updated = service.update_offer(&job.id, offer.clone()).await.unwrap();
        assert_eq!(updated.status, JobStatus::TeklifTaslak);
        assert_eq!(updated.offer_total(), 12500.0);

        let ready = OfferUpdate {
            status: Some(JobStatus::TeklifHazir),
            ..offer
        };
        let updated = service.update_offer(&job.id, ready).await.unwrap();
        assert_eq!(updated.status, JobStatus::TeklifHazir);
    }

    #[tokio::test]
    async fn test_approval_rejects_negative_plan() {
        let (_tmp, service) = service().await;
        let job = job_at_pricing(&service).await;

        let input = ApprovalStart {
            payment_plan: PaymentPlan {
                cash: -1.0,
                ..Default::default()
            },
            contract_url: None,
            stock_needs: vec![],
        };
        let err = service.start_approval(&job.id, input).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(service.get(&job.id).await.unwrap().status, JobStatus::Fiyatlandirma);
    }

    #[tokio::test]
    async fn test_stock_update_keeps_pending() {
        let (_tmp, service) = service().await;
        let job = job_at_pricing(&service).await;

        let line = StockLine {
            id: "STK-1".into(),
            name: "Menteşe".into(),
            qty: 10.0,
            available: 4.0,
            ..Default::default()
        };
        let updated = service
            .update_stock(
                &job.id,
                StockUpdate {
                    ready: false,
                    purchase_notes: Some("Acil".into()),
                    items: vec![line.clone()],
                    pending: vec![PendingLine { line, missing: 6.0 }],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::StokBekliyor);
        assert_eq!(updated.pending_po.len(), 1);
        assert_eq!(updated.stock.items.len(), 1);
        assert_eq!(updated.logs.last().unwrap().note.as_deref(), Some("ready=false"));

        let ready = service
            .update_stock(
                &job.id,
                StockUpdate {
                    ready: true,
                    purchase_notes: None,
                    items: vec![],
                    pending: vec![],
                },
            )
            .await
            .unwrap();
        assert_eq!(ready.status, JobStatus::UretimeHazir);
        assert!(ready.pending_po.is_empty());
        assert_eq!(ready.stock.items.len(), 1);
    }

    #[tokio::test]
    async fn test_production_only_accepts_its_statuses() {
        let (_tmp, service) = service().await;
        let job = job_at_pricing(&service).await;

        let bad = ProductionUpdate {
            status: JobStatus::Kapali,
            note: None,
            agreement_date: None,
        };
        assert_eq!(
            service.update_production(&job.id, bad).await.unwrap_err().status_code(),
            422
        );

        let good = ProductionUpdate {
            status: JobStatus::Anlasmada,
            note: Some("Tedarikçi ile anlaşıldı".into()),
            agreement_date: Some("2025-03-10".into()),
        };
        let updated = service.update_production(&job.id, good).await.unwrap();
        assert_eq!(updated.status, JobStatus::Anlasmada);
        assert_eq!(updated.production.agreement_date.as_deref(), Some("2025-03-10"));
        assert_eq!(updated.logs.last().unwrap().note.as_deref(), Some("ANLASMADA"));
    }

    #[tokio::test]
    async fn test_assembly_complete_merges_schedule() {
        let (_tmp, service) = service().await;
        let job = job_at_pricing(&service).await;

        service
            .schedule_assembly(
                &job.id,
                AssemblyScheduleRequest {
                    date: "2025-04-01".into(),
                    note: Some("Sabah".into()),
                    team: Some("Ekip A".into()),
                },
            )
            .await
            .unwrap();

        let done = service
            .complete_assembly(
                &job.id,
                AssemblyCompleteRequest {
                    date: None,
                    note: Some("Teslim edildi".into()),
                    team: Some("Ekip B".into()),
                    completed: true,
                    proof: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(done.status, JobStatus::MuhasebeBekliyor);
        let schedule = done.assembly.schedule.unwrap();
        assert_eq!(schedule.date.as_deref(), Some("2025-04-01"));
        assert_eq!(schedule.note.as_deref(), Some("Teslim edildi"));
        assert_eq!(schedule.team.as_deref(), Some("Ekip B"));
        assert!(done.assembly.complete.is_some());
        assert_eq!(done.logs.last().unwrap().note.as_deref(), Some("team=Ekip B"));
    }

    async fn job_with_plan(service: &JobService) -> Job {
        let job = job_at_pricing(service).await;
        service
            .update_offer(
                &job.id,
                OfferUpdate {
                    lines: vec![],
                    total: 10000.0,
                    status: None,
                    files: None,
                    meta: None,
                },
            )
            .await
            .unwrap();
        service
            .start_approval(
                &job.id,
                ApprovalStart {
                    payment_plan: PaymentPlan {
                        cash: 3000.0,
                        cheque: 2000.0,
                        after_delivery: 5000.0,
                        ..Default::default()
                    },
                    contract_url: None,
                    stock_needs: vec![],
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_finance_close_balanced() {
        let (_tmp, service) = service().await;
        let job = job_with_plan(&service).await;

        let closed = service
            .close_finance(
                &job.id,
                FinanceClose {
                    total: 10000.0,
                    payments: Received {
                        cash: 5000.0,
                        ..Default::default()
                    },
                    discount: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(closed.status, JobStatus::Kapali);
        assert_eq!(closed.finance.total, Some(10000.0));
        assert_eq!(closed.finance.pre_payments.unwrap().total(), 5000.0);
        assert_eq!(closed.logs.last().unwrap().note.as_deref(), Some("balance=0"));

        // Closed jobs accept no further updates
        let err = service
            .set_status(
                &job.id,
                StatusUpdate {
                    status: JobStatus::Uretimde,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_finance_close_rejects_balance() {
        let (_tmp, service) = service().await;
        let job = job_with_plan(&service).await;

        let err = service
            .close_finance(
                &job.id,
                FinanceClose {
                    total: 10000.0,
                    payments: Received {
                        cash: 4000.0,
                        ..Default::default()
                    },
                    discount: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "balance must be 0 (difference: 1000)");
        assert_eq!(service.get(&job.id).await.unwrap().status, JobStatus::OnayBekliyor);
    }

    #[tokio::test]
    async fn test_missing_job() {
        let (_tmp, service) = service().await;
        let err = service
            .set_status(
                "JOB-404",
                StatusUpdate {
                    status: JobStatus::Uretimde,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Job not found");
    }
}

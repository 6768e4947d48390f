//! Job pipeline contracts

use md_core::error::ValidationErrors;
use md_models::{
    ApprovalStart, FinanceClose, JobCreate, JobStatus, ProductionUpdate, StatusUpdate,
};

use crate::base::{derive_errors, non_negative, Contract, ValidationResult};

/// Contract for opening a new job
#[derive(Debug, Default)]
pub struct CreateJobContract;

impl Contract<JobCreate> for CreateJobContract {
    fn validate(&self, entity: &JobCreate) -> ValidationResult {
        let mut errors = derive_errors(entity);
        if entity.title.trim().is_empty() && !errors.has_error("title") {
            errors.add("title", "is required");
        }
        errors.into_result()
    }
}

/// Contract for starting approval with a payment plan
#[derive(Debug, Default)]
pub struct StartApprovalContract;

impl Contract<ApprovalStart> for StartApprovalContract {
    fn validate(&self, entity: &ApprovalStart) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        let plan = &entity.payment_plan;

        non_negative(&mut errors, "paymentPlan.cash", plan.cash);
        non_negative(&mut errors, "paymentPlan.card", plan.card);
        non_negative(&mut errors, "paymentPlan.cheque", plan.cheque);
        non_negative(&mut errors, "paymentPlan.afterDelivery", plan.after_delivery);

        for (idx, cheque) in plan.cheques.iter().enumerate() {
            if cheque.amount <= 0.0 {
                errors.add(format!("paymentPlan.cheques[{}].amount", idx), "must be positive");
            }
        }

        errors.into_result()
    }
}

/// Contract for production status updates
#[derive(Debug, Default)]
pub struct ProductionContract;

impl ProductionContract {
    pub const ALLOWED: [JobStatus; 3] = [
        JobStatus::Uretimde,
        JobStatus::MontajaHazir,
        JobStatus::Anlasmada,
    ];
}

impl Contract<ProductionUpdate> for ProductionContract {
    fn validate(&self, entity: &ProductionUpdate) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if !Self::ALLOWED.contains(&entity.status) {
            errors.add("status", "must be one of URETIMDE, MONTAJA_HAZIR, ANLASMADA");
        }
        errors.into_result()
    }
}

/// Contract for direct status changes
#[derive(Debug, Default)]
pub struct StatusContract;

impl Contract<StatusUpdate> for StatusContract {
    fn validate(&self, entity: &StatusUpdate) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if !entity.status.is_known() {
            errors.add("status", "is not a known job status");
        }
        errors.into_result()
    }
}

/// Shape checks for finance close
///
/// The balance rule itself needs the stored job and is enforced by the
/// service.
#[derive(Debug, Default)]
pub struct FinanceCloseContract;

impl Contract<FinanceClose> for FinanceCloseContract {
    fn validate(&self, entity: &FinanceClose) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        non_negative(&mut errors, "total", entity.total);
        non_negative(&mut errors, "payments.cash", entity.payments.cash);
        non_negative(&mut errors, "payments.card", entity.payments.card);
        non_negative(&mut errors, "payments.cheque", entity.payments.cheque);
        if let Some(discount) = &entity.discount {
            non_negative(&mut errors, "discount.amount", discount.amount);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use md_models::{ChequeLine, PaymentPlan, Received, StartType};

    #[test]
    fn test_create_job_requires_title() {
        let input = JobCreate {
            customer_id: "CST-1".into(),
            customer_name: "Ayşe Yılmaz".into(),
            title: "   ".into(),
            start_type: StartType::Olcu,
            roles: vec![],
        };
        let errors = CreateJobContract.validate(&input).unwrap_err();
        assert!(errors.has_error("title"));
    }

    #[test]
    fn test_approval_rejects_negative_amounts() {
        let input = ApprovalStart {
            payment_plan: PaymentPlan {
                cash: -5.0,
                cheques: vec![ChequeLine::default()],
                ..Default::default()
            },
            contract_url: None,
            stock_needs: vec![],
        };
        let errors = StartApprovalContract.validate(&input).unwrap_err();
        assert!(errors.has_error("paymentPlan.cash"));
        assert!(errors.has_error("paymentPlan.cheques[0].amount"));
    }

    #[test]
    fn test_production_status_whitelist() {
        let ok = ProductionUpdate {
            status: JobStatus::Anlasmada,
            note: None,
            agreement_date: Some("2025-06-01".into()),
        };
        assert!(ProductionContract.validate(&ok).is_ok());

        let bad = ProductionUpdate {
            status: JobStatus::Kapali,
            note: None,
            agreement_date: None,
        };
        assert!(ProductionContract.validate(&bad).is_err());
    }

    #[test]
    fn test_status_contract_rejects_unknown() {
        let update = StatusUpdate {
            status: JobStatus::Unknown("ARSIVDE".into()),
        };
        assert!(StatusContract.validate(&update).is_err());
    }

    #[test]
    fn test_finance_close_shape() {
        let close = FinanceClose {
            total: 1000.0,
            payments: Received {
                cash: -1.0,
                card: 0.0,
                cheque: 0.0,
            },
            discount: None,
        };
        let errors = FinanceCloseContract.validate(&close).unwrap_err();
        assert!(errors.has_error("payments.cash"));
    }
}

//! Payment plan drafting and finance close reconciliation
//!
//! Money is `f64`. Totals are compared within [`MONEY_EPSILON`].

use chrono::NaiveDate;
use md_core::{money_eq, round2, MONEY_EPSILON};
use md_models::{ChequeLine, Discount, Job, PaymentPlan, Received};
use serde::Serialize;

use crate::error::WorkflowError;

/// Average cheque term above which the plan needs extra approval
pub const TERM_APPROVAL_DAYS: i64 = 90;

/// Offer total in use: the locally entered figure when non-zero, otherwise
/// the total saved on the job.
pub fn offer_total_in_use(local: f64, job: &Job) -> f64 {
    if local != 0.0 {
        local
    } else {
        job.offer_total()
    }
}

/// Payment plan being filled in on the offer form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentDraft {
    pub cash: f64,
    pub card: f64,
    pub after_delivery: f64,
    cheques: Vec<ChequeLine>,
}

impl PaymentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a plan already stored on a job
    pub fn from_plan(plan: &PaymentPlan) -> Self {
        Self {
            cash: plan.cash,
            card: plan.card,
            after_delivery: plan.after_delivery,
            cheques: plan.cheques.clone(),
        }
    }

    pub fn cheques(&self) -> &[ChequeLine] {
        &self.cheques
    }

    /// Add a cheque. Lines with a zero amount are rejected and not kept.
    pub fn add_cheque(&mut self, line: ChequeLine) -> Result<(), WorkflowError> {
        if line.amount == 0.0 {
            return Err(WorkflowError::EmptyCheque);
        }
        self.cheques.push(line);
        Ok(())
    }

    pub fn remove_cheque(&mut self, index: usize) -> Option<ChequeLine> {
        if index < self.cheques.len() {
            Some(self.cheques.remove(index))
        } else {
            None
        }
    }

    pub fn cheque_total(&self) -> f64 {
        self.cheques.iter().map(|c| c.amount).sum()
    }

    pub fn total(&self) -> f64 {
        self.cash + self.card + self.cheque_total() + self.after_delivery
    }

    /// Offer total minus the planned total; positive when under-planned
    pub fn difference(&self, offer_total: f64) -> f64 {
        offer_total - self.total()
    }

    pub fn matches(&self, offer_total: f64) -> bool {
        self.difference(offer_total).abs() <= MONEY_EPSILON
    }

    /// Amount-weighted mean days until the cheques fall due, rounded.
    ///
    /// Past and missing due dates count as zero days.
    pub fn average_cheque_days(&self, today: NaiveDate) -> i64 {
        let total = self.cheque_total();
        if total <= 0.0 {
            return 0;
        }
        let weighted: f64 = self
            .cheques
            .iter()
            .map(|c| {
                let due = parse_due(&c.due).unwrap_or(today);
                let days = (due - today).num_days().max(0);
                c.amount * days as f64
            })
            .sum();
        (weighted / total).round() as i64
    }

    pub fn needs_term_approval(&self, today: NaiveDate) -> bool {
        self.average_cheque_days(today) > TERM_APPROVAL_DAYS
    }

    /// Turn the draft into the plan sent with approval start
    pub fn into_plan(self, offer_total: f64) -> Result<PaymentPlan, WorkflowError> {
        let difference = self.difference(offer_total);
        if difference.abs() > MONEY_EPSILON {
            return Err(WorkflowError::PaymentMismatch {
                difference: round2(difference),
            });
        }
        Ok(PaymentPlan {
            cash: self.cash,
            card: self.card,
            cheque: self.cheque_total(),
            after_delivery: self.after_delivery,
            cheques: self.cheques,
        })
    }
}

fn parse_due(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Outcome of comparing collected money with the offer total
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reconciliation {
    Balanced,
    /// Money still owed
    Short,
    /// Collected more than the offer
    Over,
}

/// Finance close figures
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub offer_total: f64,
    pub pre_received: Received,
    pub final_received: Received,
    pub discount: f64,
    /// `offer_total - (pre + final + discount)`, rounded to 2 decimals
    pub balance: f64,
    pub outcome: Reconciliation,
}

impl Settlement {
    pub fn is_balanced(&self) -> bool {
        self.outcome == Reconciliation::Balanced
    }
}

/// Reconcile a finance close against the plan agreed at approval
pub fn reconcile(
    offer_total: f64,
    plan: Option<&PaymentPlan>,
    received: Received,
    discount: f64,
) -> Settlement {
    let pre_received = plan
        .map(|p| Received {
            cash: p.cash,
            card: p.card,
            cheque: p.cheque,
        })
        .unwrap_or_default();
    let balance = round2(offer_total - (pre_received.total() + received.total() + discount));
    let outcome = if money_eq(balance, 0.0) {
        Reconciliation::Balanced
    } else if balance > 0.0 {
        Reconciliation::Short
    } else {
        Reconciliation::Over
    };

    Settlement {
        offer_total,
        pre_received,
        final_received: received,
        discount,
        balance,
        outcome,
    }
}

/// Reconcile and enforce the close rules: the balance must be zero and a
/// positive discount needs a note.
pub fn check_close(
    offer_total: f64,
    plan: Option<&PaymentPlan>,
    received: Received,
    discount: Option<&Discount>,
) -> Result<Settlement, WorkflowError> {
    let amount = discount.map(|d| d.amount).unwrap_or(0.0);
    let settlement = reconcile(offer_total, plan, received, amount);
    if !settlement.is_balanced() {
        return Err(WorkflowError::Unbalanced {
            balance: settlement.balance,
        });
    }
    if amount > 0.0 && discount.map_or(true, |d| d.note.trim().is_empty()) {
        return Err(WorkflowError::DiscountNoteRequired);
    }
    Ok(settlement)
}

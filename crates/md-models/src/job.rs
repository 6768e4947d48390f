//! Job model
//!
//! A job is a customer order moving through the pipeline. Each stage keeps
//! its own sub-record (`measure`, `offer`, ...) and every transition appends
//! to `logs`.

use md_core::traits::Identifiable;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Job status code as stored on the wire
///
/// Codes this build does not know are kept verbatim in
/// [`JobStatus::Unknown`] and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    OlcuAsamasi,
    Fiyatlandirma,
    TeklifTaslak,
    TeklifHazir,
    OnayBekliyor,
    StokBekliyor,
    UretimeHazir,
    Uretimde,
    Anlasmada,
    MontajaHazir,
    MontajTermin,
    MuhasebeBekliyor,
    Kapali,
    Unknown(String),
}

impl JobStatus {
    pub const ALL: [JobStatus; 13] = [
        JobStatus::OlcuAsamasi,
        JobStatus::Fiyatlandirma,
        JobStatus::TeklifTaslak,
        JobStatus::TeklifHazir,
        JobStatus::OnayBekliyor,
        JobStatus::StokBekliyor,
        JobStatus::UretimeHazir,
        JobStatus::Uretimde,
        JobStatus::Anlasmada,
        JobStatus::MontajaHazir,
        JobStatus::MontajTermin,
        JobStatus::MuhasebeBekliyor,
        JobStatus::Kapali,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::OlcuAsamasi => "OLCU_ASAMASI",
            JobStatus::Fiyatlandirma => "FIYATLANDIRMA",
            JobStatus::TeklifTaslak => "TEKLIF_TASLAK",
            JobStatus::TeklifHazir => "TEKLIF_HAZIR",
            JobStatus::OnayBekliyor => "ONAY_BEKLIYOR",
            JobStatus::StokBekliyor => "STOK_BEKLIYOR",
            JobStatus::UretimeHazir => "URETIME_HAZIR",
            JobStatus::Uretimde => "URETIMDE",
            JobStatus::Anlasmada => "ANLASMADA",
            JobStatus::MontajaHazir => "MONTAJA_HAZIR",
            JobStatus::MontajTermin => "MONTAJ_TERMIN",
            JobStatus::MuhasebeBekliyor => "MUHASEBE_BEKLIYOR",
            JobStatus::Kapali => "KAPALI",
            JobStatus::Unknown(raw) => raw,
        }
    }

    /// Parse a wire string; unrecognised codes map to [`JobStatus::Unknown`]
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .iter()
            .find(|s| s.as_str() == value)
            .cloned()
            .unwrap_or_else(|| JobStatus::Unknown(value.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, JobStatus::Unknown(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, JobStatus::Kapali)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::parse(&raw))
    }
}

/// Where a new job enters the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StartType {
    Olcu,
    Fiyatlandirma,
}

impl StartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartType::Olcu => "OLCU",
            StartType::Fiyatlandirma => "FIYATLANDIRMA",
        }
    }

    /// Status a freshly created job starts in
    pub fn initial_status(&self) -> JobStatus {
        match self {
            StartType::Olcu => JobStatus::OlcuAsamasi,
            StartType::Fiyatlandirma => JobStatus::Fiyatlandirma,
        }
    }
}

/// Job entity
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_type: Option<StartType>,
    #[serde(default)]
    pub roles: Vec<Value>,

    #[serde(default)]
    pub measure: Measure,
    #[serde(default)]
    pub offer: Offer,
    #[serde(default)]
    pub approval: Approval,
    #[serde(default)]
    pub stock: StockRecord,
    #[serde(default)]
    pub production: Production,
    #[serde(default)]
    pub assembly: Assembly,
    #[serde(default)]
    pub finance: Finance,

    /// Payment plan mirrored onto the job by the client after approval starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<PaymentPlan>,
    /// Reservation lines still waiting for a purchase order
    #[serde(default, rename = "pendingPO")]
    pub pending_po: Vec<PendingLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_account_code: Option<String>,

    #[serde(default)]
    pub logs: Vec<JobLogEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn new(id: impl Into<String>, title: impl Into<String>, start_type: StartType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: start_type.initial_status(),
            start_type: Some(start_type),
            ..Default::default()
        }
    }

    /// Append a transition log entry
    pub fn log(&mut self, action: impl Into<String>, note: Option<String>) {
        self.logs.push(JobLogEntry {
            at: md_core::now_iso(),
            action: action.into(),
            note,
        });
    }

    /// Offer total recorded on the job, 0 when none was saved
    pub fn offer_total(&self) -> f64 {
        self.offer.total.unwrap_or(0.0)
    }

    /// Payment plan agreed when approval started
    pub fn payment_plan(&self) -> Option<&PaymentPlan> {
        self.approval.payment_plan.as_ref()
    }
}

impl Identifiable for Job {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Server-side transition log entry
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct JobLogEntry {
    pub at: String,
    pub action: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<PaymentPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stock_needs: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Agreed split of the offer total
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    #[serde(default)]
    pub cash: f64,
    #[serde(default)]
    pub card: f64,
    /// Sum of `cheques`
    #[serde(default)]
    pub cheque: f64,
    #[serde(default)]
    pub after_delivery: f64,
    #[serde(default)]
    pub cheques: Vec<ChequeLine>,
}

impl PaymentPlan {
    /// Amount collected before delivery
    pub fn pre_received(&self) -> f64 {
        self.cash + self.card + self.cheque
    }

    pub fn total(&self) -> f64 {
        self.pre_received() + self.after_delivery
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChequeLine {
    #[serde(default)]
    pub amount: f64,
    /// Due date `YYYY-MM-DD`, empty when not given
    #[serde(default)]
    pub due: String,
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub number: String,
}

/// One stock item picked for a job
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockLine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub available: f64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub color: String,
}

/// Stock line whose quantity exceeds what is available
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingLine {
    #[serde(flatten)]
    pub line: StockLine,
    #[serde(default)]
    pub missing: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<StockLine>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<AssemblySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<AssemblyCompletion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AssemblySchedule {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AssemblyCompletion {
    pub at: String,
    #[serde(default)]
    pub proof: Option<Value>,
}

/// Amounts received per payment channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Received {
    #[serde(default)]
    pub cash: f64,
    #[serde(default)]
    pub card: f64,
    #[serde(default)]
    pub cheque: f64,
}

impl Received {
    pub fn total(&self) -> f64 {
        self.cash + self.card + self.cheque
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Discount {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Finance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_payments: Option<Received>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_payments: Option<Received>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_status_deserializes() {
        let job: Job = serde_json::from_value(json!({
            "id": "JOB-1",
            "status": "ARSIVDE"
        }))
        .unwrap();
        assert_eq!(job.status, JobStatus::Unknown("ARSIVDE".into()));
        assert!(!job.status.is_known());

        let back = serde_json::to_value(&job).unwrap();
        assert_eq!(back["status"], json!("ARSIVDE"));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(JobStatus::parse("MONTAJ_TERMIN"), JobStatus::MontajTermin);
        assert_eq!(
            JobStatus::parse("montaj_termin"),
            JobStatus::Unknown("montaj_termin".into())
        );
        assert!(JobStatus::Kapali.is_closed());
    }

    #[test]
    fn test_new_job_is_empty() {
        let job = Job::new("JOB-ABCDEF12", "Mutfak dolabı", StartType::Fiyatlandirma);
        assert_eq!(job.status, JobStatus::Fiyatlandirma);

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["measure"], json!({}));
        assert_eq!(value["offer"], json!({}));
        assert_eq!(value["finance"], json!({}));
        assert_eq!(value["pendingPO"], json!([]));
        assert_eq!(value["startType"], json!("FIYATLANDIRMA"));
    }

    #[test]
    fn test_unmodelled_fields_survive() {
        let raw = json!({
            "id": "JOB-2",
            "status": "URETIMDE",
            "priority": "high",
            "offer": {"total": 1500.0, "currency": "TRY"}
        });
        let job: Job = serde_json::from_value(raw).unwrap();
        assert_eq!(job.offer_total(), 1500.0);

        let back = serde_json::to_value(&job).unwrap();
        assert_eq!(back["priority"], json!("high"));
        assert_eq!(back["offer"]["currency"], json!("TRY"));
    }

    #[test]
    fn test_pending_line_flattens() {
        let pending: PendingLine = serde_json::from_value(json!({
            "id": "STK-1", "name": "MDF", "sku": "MDF-18", "qty": 12.0,
            "unit": "levha", "available": 4.0, "missing": 8.0
        }))
        .unwrap();
        assert_eq!(pending.line.sku, "MDF-18");
        assert_eq!(pending.missing, 8.0);
    }

    #[test]
    fn test_payment_plan_totals() {
        let plan = PaymentPlan {
            cash: 1000.0,
            card: 500.0,
            cheque: 2000.0,
            after_delivery: 500.0,
            cheques: vec![],
        };
        assert_eq!(plan.pre_received(), 3500.0);
        assert_eq!(plan.total(), 4000.0);
    }
}

//! Pipeline stages
//!
//! Eight stages in a fixed order. Each owns one or more job status codes;
//! a job's current stage is the one owning its status.

use md_models::JobStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Measure,
    Pricing,
    Offer,
    Approval,
    Stock,
    Production,
    Assembly,
    Finance,
}

impl Stage {
    pub const FLOW: [Stage; 8] = [
        Stage::Measure,
        Stage::Pricing,
        Stage::Offer,
        Stage::Approval,
        Stage::Stock,
        Stage::Production,
        Stage::Assembly,
        Stage::Finance,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Stage::Measure => "measure",
            Stage::Pricing => "pricing",
            Stage::Offer => "offer",
            Stage::Approval => "approval",
            Stage::Stock => "stock",
            Stage::Production => "production",
            Stage::Assembly => "assembly",
            Stage::Finance => "finance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Measure => "Ölçü",
            Stage::Pricing => "Fiyatlandırma",
            Stage::Offer => "Teklif",
            Stage::Approval => "Onay",
            Stage::Stock => "Stok/Rezervasyon",
            Stage::Production => "Üretim",
            Stage::Assembly => "Montaj",
            Stage::Finance => "Finans Kapanış",
        }
    }

    /// Known status codes owned by this stage
    pub fn statuses(&self) -> Vec<JobStatus> {
        JobStatus::ALL
            .into_iter()
            .filter(|status| Stage::for_status(status) == *self)
            .collect()
    }

    /// Position in [`Stage::FLOW`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Stage owning `status`; statuses outside the flow fall back to the
    /// first stage.
    pub fn for_status(status: &JobStatus) -> Stage {
        match status {
            JobStatus::OlcuAsamasi | JobStatus::Unknown(_) => Stage::Measure,
            JobStatus::Fiyatlandirma => Stage::Pricing,
            JobStatus::TeklifTaslak | JobStatus::TeklifHazir => Stage::Offer,
            JobStatus::OnayBekliyor => Stage::Approval,
            JobStatus::StokBekliyor => Stage::Stock,
            JobStatus::UretimeHazir | JobStatus::Uretimde | JobStatus::Anlasmada => {
                Stage::Production
            }
            JobStatus::MontajaHazir | JobStatus::MontajTermin => Stage::Assembly,
            JobStatus::MuhasebeBekliyor | JobStatus::Kapali => Stage::Finance,
        }
    }

    /// Following stage, `None` after finance
    pub fn next(&self) -> Option<Stage> {
        Self::FLOW.get(self.index() + 1).copied()
    }

    pub fn from_id(id: &str) -> Option<Stage> {
        Self::FLOW.iter().copied().find(|stage| stage.id() == id)
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// State of this stage when the job is in `current`
    pub fn state_relative_to(&self, current: Stage) -> StageState {
        match self.index().cmp(&current.index()) {
            std::cmp::Ordering::Less => StageState::Done,
            std::cmp::Ordering::Equal => StageState::Current,
            std::cmp::Ordering::Greater => StageState::Pending,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    Done,
    Current,
    Pending,
}

/// Badge colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Primary,
    Secondary,
    Warning,
    Success,
    Info,
    Danger,
}

// Later rules override earlier ones.
const TONE_RULES: &[(&[&str], Tone)] = &[
    (&["ölçü", "olcu"], Tone::Primary),
    (&["fiyat"], Tone::Secondary),
    (&["teklif"], Tone::Secondary),
    (&["onay"], Tone::Warning),
    (&["stok"], Tone::Warning),
    (&["hazır", "hazir"], Tone::Success),
    (&["anlaşma", "anlasma"], Tone::Info),
    (&["üretim"], Tone::Warning),
    (&["montaj"], Tone::Primary),
    (&["muhasebe"], Tone::Secondary),
    (&["kapalı", "kapali"], Tone::Success),
];

/// Badge tone for a status label or code
pub fn status_tone(label: &str) -> Tone {
    let normalized = label.to_lowercase();
    TONE_RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| normalized.contains(k)))
        .map(|(_, tone)| *tone)
        .last()
        .unwrap_or(Tone::Secondary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_stage_owns_a_status() {
        let owned: usize = Stage::FLOW.iter().map(|s| s.statuses().len()).sum();
        assert_eq!(owned, JobStatus::ALL.len());
        for stage in Stage::FLOW {
            assert!(!stage.statuses().is_empty(), "{} owns no status", stage);
        }
        assert_eq!(
            Stage::Production.statuses(),
            vec![JobStatus::UretimeHazir, JobStatus::Uretimde, JobStatus::Anlasmada]
        );
    }

    #[test]
    fn test_for_status() {
        assert_eq!(Stage::for_status(&JobStatus::TeklifHazir), Stage::Offer);
        assert_eq!(Stage::for_status(&JobStatus::Anlasmada), Stage::Production);
        assert_eq!(Stage::for_status(&JobStatus::Kapali), Stage::Finance);
        assert_eq!(
            Stage::for_status(&JobStatus::Unknown("ARSIVDE".into())),
            Stage::Measure
        );
    }

    #[test]
    fn test_next_and_from_id() {
        assert_eq!(Stage::Stock.next(), Some(Stage::Production));
        assert_eq!(Stage::Finance.next(), None);
        assert!(Stage::Finance.is_last());
        assert_eq!(Stage::from_id("assembly"), Some(Stage::Assembly));
        assert_eq!(Stage::from_id("shipping"), None);
    }

    #[test]
    fn test_state_relative_to() {
        assert_eq!(Stage::Measure.state_relative_to(Stage::Offer), StageState::Done);
        assert_eq!(Stage::Offer.state_relative_to(Stage::Offer), StageState::Current);
        assert_eq!(Stage::Finance.state_relative_to(Stage::Offer), StageState::Pending);
    }

    #[test]
    fn test_status_tone() {
        assert_eq!(status_tone("OLCU_ASAMASI"), Tone::Primary);
        assert_eq!(status_tone("ONAY_BEKLIYOR"), Tone::Warning);
        assert_eq!(status_tone("URETIME_HAZIR"), Tone::Success);
        assert_eq!(status_tone("MONTAJA_HAZIR"), Tone::Primary);
        assert_eq!(status_tone("ANLASMADA"), Tone::Info);
        assert_eq!(status_tone("KAPALI"), Tone::Success);
        assert_eq!(status_tone("Bilinmiyor"), Tone::Secondary);
    }
}

//! Stock reservation drafting and stock health

use md_models::{PendingLine, StockItem, StockLine, StockUpdate};
use serde::Serialize;

use crate::error::WorkflowError;
use crate::stage::Tone;

/// Health of an item based on what is still available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockHealth {
    /// Nothing available
    Tukendi,
    /// At or below the threshold
    Kritik,
    /// Within a margin above the threshold
    Dusuk,
    Saglikli,
}

impl StockHealth {
    pub fn of(item: &StockItem) -> Self {
        let available = item.available();
        let threshold = item.threshold();
        if available <= 0.0 {
            StockHealth::Tukendi
        } else if available <= threshold {
            StockHealth::Kritik
        } else if available <= threshold + (threshold * 0.25).max(5.0) {
            StockHealth::Dusuk
        } else {
            StockHealth::Saglikli
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockHealth::Tukendi => "Tükendi",
            StockHealth::Kritik => "Kritik",
            StockHealth::Dusuk => "Düşük",
            StockHealth::Saglikli => "Sağlıklı",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            StockHealth::Tukendi | StockHealth::Kritik => Tone::Danger,
            StockHealth::Dusuk => Tone::Warning,
            StockHealth::Saglikli => Tone::Success,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, StockHealth::Saglikli)
    }
}

/// Stock picker filters; empty filters match everything
#[derive(Debug, Clone, Default)]
pub struct StockQuery {
    /// Matched against name, supplier and category
    pub text: String,
    pub sku: String,
    pub color: String,
}

impl StockQuery {
    pub fn matches(&self, item: &StockItem) -> bool {
        let text = self.text.trim().to_lowercase();
        let sku = self.sku.trim().to_lowercase();
        let color = self.color.trim().to_lowercase();

        if !text.is_empty()
            && ![&item.name, &item.supplier, &item.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&text))
        {
            return false;
        }
        if !sku.is_empty() && !item.sku.to_lowercase().contains(&sku) {
            return false;
        }
        if !color.is_empty() && !item.color.to_lowercase().contains(&color) {
            return false;
        }
        true
    }

    pub fn filter<'a>(&self, items: &'a [StockItem]) -> Vec<&'a StockItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Header figures of the stock picker
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub total_available: f64,
    /// Items that are not healthy
    pub needs_attention: usize,
}

pub fn stock_summary(items: &[StockItem]) -> StockSummary {
    StockSummary {
        total_available: items.iter().map(StockItem::available).sum(),
        needs_attention: items
            .iter()
            .filter(|item| !StockHealth::of(item).is_healthy())
            .count(),
    }
}

/// Lines picked for a job before the reservation is submitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationDraft {
    lines: Vec<StockLine>,
}

impl ReservationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[StockLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Pick `qty` of an item; picking an item twice sums the quantities
    pub fn add(&mut self, item: &StockItem, qty: f64) -> Result<(), WorkflowError> {
        if qty <= 0.0 {
            return Err(WorkflowError::InvalidQuantity);
        }
        if item.available() <= 0.0 {
            return Err(WorkflowError::NothingAvailable {
                name: item.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == item.id) {
            line.qty += qty;
            return Ok(());
        }
        self.lines.push(StockLine {
            id: item.id.clone(),
            name: item.name.clone(),
            sku: item.sku.clone(),
            qty,
            unit: item.unit.clone(),
            available: item.available(),
            supplier: item.supplier.clone(),
            color: item.color.clone(),
        });
        Ok(())
    }

    pub fn set_qty(&mut self, id: &str, qty: f64) -> Result<(), WorkflowError> {
        if qty <= 0.0 {
            return Err(WorkflowError::InvalidQuantity);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or_else(|| WorkflowError::LineNotFound(id.to_string()))?;
        line.qty = qty;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<StockLine> {
        let idx = self.lines.iter().position(|line| line.id == id)?;
        Some(self.lines.remove(idx))
    }

    /// Lines asking for more than is available
    pub fn pending(&self) -> Vec<PendingLine> {
        self.lines
            .iter()
            .filter(|line| line.qty > line.available)
            .map(|line| PendingLine {
                line: line.clone(),
                missing: line.qty - line.available,
            })
            .collect()
    }

    /// The note when given, otherwise one summary per line joined by ` | `
    pub fn purchase_notes(&self, note: &str) -> String {
        if !note.is_empty() {
            return note.to_string();
        }
        self.lines
            .iter()
            .map(|l| {
                format!(
                    "{} ({}) - {} {} (mevcut {})",
                    l.name, l.sku, l.qty, l.unit, l.available
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Build the stock stage payload
    pub fn to_update(&self, ready: bool, note: &str) -> Result<StockUpdate, WorkflowError> {
        if self.is_empty() {
            return Err(WorkflowError::EmptyReservation);
        }
        Ok(StockUpdate {
            ready,
            purchase_notes: Some(self.purchase_notes(note)),
            items: self.lines.clone(),
            pending: self.pending(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, on_hand: f64, reserved: f64) -> StockItem {
        StockItem {
            id: id.into(),
            name: format!("Kalem {}", id),
            sku: format!("SKU-{}", id),
            unit: "adet".into(),
            supplier: "Hafele".into(),
            color: "Beyaz".into(),
            on_hand,
            reserved,
            ..Default::default()
        }
    }

    #[test]
    fn test_health_thresholds() {
        let mut it = item("1", 10.0, 10.0);
        assert_eq!(StockHealth::of(&it), StockHealth::Tukendi);

        it = StockItem {
            critical: 10.0,
            reorder_point: 20.0,
            ..item("2", 20.0, 0.0)
        };
        assert_eq!(StockHealth::of(&it), StockHealth::Kritik);

        // threshold 20, margin max(5, 5) = 5
        it.on_hand = 25.0;
        assert_eq!(StockHealth::of(&it), StockHealth::Dusuk);
        it.on_hand = 25.5;
        assert_eq!(StockHealth::of(&it), StockHealth::Saglikli);

        // threshold 40, margin 10
        it.reorder_point = 40.0;
        it.on_hand = 50.0;
        assert_eq!(StockHealth::of(&it).tone(), Tone::Warning);
    }

    #[test]
    fn test_query_and_summary() {
        let mut a = item("1", 100.0, 0.0);
        a.category = "Aksesuar".into();
        let mut b = item("2", 3.0, 0.0);
        b.color = "Antrasit".into();
        b.supplier = "Blum".into();
        let items = vec![a, b];

        let by_text = StockQuery {
            text: "aksesuar".into(),
            ..Default::default()
        };
        assert_eq!(by_text.filter(&items).len(), 1);

        let combined = StockQuery {
            text: "blum".into(),
            color: "ANTRA".into(),
            sku: "sku-2".into(),
        };
        assert_eq!(combined.filter(&items)[0].id, "2");

        let summary = stock_summary(&items);
        assert_eq!(summary.total_available, 103.0);
        assert_eq!(summary.needs_attention, 1);
    }

    #[test]
    fn test_add_merges_and_rejects() {
        let mut draft = ReservationDraft::new();
        let stock = item("1", 10.0, 2.0);
        draft.add(&stock, 3.0).unwrap();
        draft.add(&stock, 2.0).unwrap();
        assert_eq!(draft.lines().len(), 1);
        assert_eq!(draft.lines()[0].qty, 5.0);
        assert_eq!(draft.lines()[0].available, 8.0);

        assert_eq!(draft.add(&stock, 0.0), Err(WorkflowError::InvalidQuantity));
        assert!(matches!(
            draft.add(&item("2", 1.0, 1.0), 1.0),
            Err(WorkflowError::NothingAvailable { .. })
        ));
    }

    #[test]
    fn test_pending_and_notes() {
        let mut draft = ReservationDraft::new();
        draft.add(&item("1", 4.0, 0.0), 12.0).unwrap();
        draft.add(&item("2", 50.0, 0.0), 2.5).unwrap();

        let pending = draft.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].missing, 8.0);

        assert_eq!(
            draft.purchase_notes(""),
            "Kalem 1 (SKU-1) - 12 adet (mevcut 4) | Kalem 2 (SKU-2) - 2.5 adet (mevcut 50)"
        );
        assert_eq!(draft.purchase_notes("Acil"), "Acil");
    }

    #[test]
    fn test_set_qty_and_remove() {
        let mut draft = ReservationDraft::new();
        draft.add(&item("1", 10.0, 0.0), 1.0).unwrap();
        draft.set_qty("1", 7.0).unwrap();
        assert_eq!(draft.lines()[0].qty, 7.0);
        assert!(draft.set_qty("9", 1.0).is_err());
        assert!(draft.remove("1").is_some());
        assert!(draft.is_empty());
    }

    #[test]
    fn test_to_update_requires_lines() {
        let draft = ReservationDraft::new();
        assert_eq!(
            draft.to_update(true, "").unwrap_err(),
            WorkflowError::EmptyReservation
        );

        let mut draft = ReservationDraft::new();
        draft.add(&item("1", 1.0, 0.0), 3.0).unwrap();
        let update = draft.to_update(false, "").unwrap();
        assert!(!update.ready);
        assert_eq!(update.pending.len(), 1);
        assert_eq!(update.items.len(), 1);
    }
}

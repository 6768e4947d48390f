//! Stock service
//!
//! Manual movements touch two collections (`stockItems.json` and
//! `stockMovements.json`), so they hold the data directory's write gate
//! across both writes.

use md_contracts::{MovementContract, StockItemContract};
use md_core::error::MdError;
use md_core::result::MdResult;
use md_core::types::{prefixed_id, today};
use md_models::{MovementInput, MovementType, Reservation, StockItem, StockItemInput, StockMovement};
use md_store::{
    DataDir, Record, ReservationRepository, StockItemRepository,
    StockMovementRepository,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::validate_with;

/// Operator recorded when a movement does not name one
const DEFAULT_OPERATOR: &str = "Sistem";

/// Result of a manual movement: the item after the change and the ledger
/// entry
#[derive(Debug, Clone, Serialize)]
pub struct MovementOutcome {
    pub item: StockItem,
    pub movement: StockMovement,
}

#[derive(Clone)]
pub struct StockService {
    dir: DataDir,
    items: StockItemRepository,
    movements: StockMovementRepository,
    reservations: ReservationRepository,
}

impl StockService {
    pub fn new(dir: DataDir) -> Self {
        Self {
            items: StockItemRepository::new(dir.clone()),
            movements: StockMovementRepository::new(dir.clone()),
            reservations: ReservationRepository::new(dir.clone()),
            dir,
        }
    }

    pub async fn list_items(&self) -> MdResult<Vec<StockItem>> {
        Ok(self.items.find_all().await?)
    }

    pub async fn get_item(&self, id: &str) -> MdResult<StockItem> {
        Ok(self.items.get(id).await?)
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_item(&self, input: StockItemInput) -> MdResult<StockItem> {
        validate_with(&StockItemContract, &input)?;

        let mut item = StockItem {
            id: prefixed_id("STK"),
            ..Default::default()
        };
        apply_input(&mut item, input);

        let item = self.items.insert(item).await?;
        info!(id = %item.id, "Stock item created");
        Ok(item)
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(&self, id: &str, input: StockItemInput) -> MdResult<StockItem> {
        validate_with(&StockItemContract, &input)?;

        self.items
            .modify(id, |item| {
                apply_input(item, input);
                Ok::<_, MdError>(())
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: &str) -> MdResult<StockItem> {
        let removed = self.items.delete(id).await?;
        info!(id = %removed.id, "Stock item deleted");
        Ok(removed)
    }

    pub async fn list_movements(&self) -> MdResult<Vec<StockMovement>> {
        Ok(self.movements.find_all().await?)
    }

    /// Apply a stock in/out to an item and record it in the ledger.
    ///
    /// Taking out more than is on hand is rejected.
    #[instrument(skip(self, input), fields(item_id = %input.item_id, qty = input.qty))]
    pub async fn record_movement(&self, input: MovementInput) -> MdResult<MovementOutcome> {
        validate_with(&MovementContract, &input)?;

        let _gate = self.dir.lock().await;
        let mut items: Vec<StockItem> = self.dir.read_collection(StockItem::FILE).await?;
        let item = items
            .iter_mut()
            .find(|item| item.id == input.item_id)
            .ok_or_else(|| MdError::not_found(StockItem::ENTITY, input.item_id.clone()))?;

        if input.movement_type == MovementType::StockOut && input.qty > item.on_hand {
            return Err(MdError::business(format!(
                "insufficient stock for {}: {} {} on hand",
                item.name, item.on_hand, item.unit
            )));
        }

        let change = input.movement_type.signed(input.qty);
        item.on_hand = (item.on_hand + change).max(0.0);
        let item = item.clone();

        let movement = StockMovement {
            id: prefixed_id("MOV"),
            date: today().format("%Y-%m-%d").to_string(),
            item: item.name.clone(),
            item_id: Some(item.id.clone()),
            change,
            reason: non_empty(input.reason)
                .unwrap_or_else(|| input.movement_type.default_reason().to_string()),
            operator: non_empty(input.operator).unwrap_or_else(|| DEFAULT_OPERATOR.to_string()),
            reference: non_empty(input.reference),
            location: non_empty(input.location),
            extra: Default::default(),
        };

        let mut movements: Vec<StockMovement> =
            self.dir.read_collection(StockMovement::FILE).await?;
        movements.insert(0, movement.clone());

        self.dir.write(StockItem::FILE, &items).await?;
        self.dir.write(StockMovement::FILE, &movements).await?;

        info!(item_id = %item.id, on_hand = item.on_hand, change, "Stock movement recorded");
        Ok(MovementOutcome { item, movement })
    }

    pub async fn list_reservations(&self) -> MdResult<Vec<Reservation>> {
        Ok(self.reservations.find_all().await?)
    }
}

fn apply_input(item: &mut StockItem, input: StockItemInput) {
    item.name = input.name.trim().to_string();
    item.sku = input.sku.trim().to_string();
    item.unit = input.unit.trim().to_string();
    item.supplier = input.supplier.trim().to_string();
    item.color = input.color.trim().to_string();
    if let Some(category) = non_empty(input.category) {
        item.category = category;
    }
    if let Some(warehouse) = non_empty(input.warehouse) {
        item.warehouse = warehouse;
    }
    item.barcode = input.barcode.unwrap_or_default();
    item.notes = input.notes.unwrap_or_default();
    item.on_hand = input.on_hand;
    item.reserved = input.reserved;
    item.critical = input.critical;
    item.reorder_point = input.reorder_point;
    item.min_order_qty = input.min_order_qty;
    item.lead_time_days = input.lead_time_days;
    item.unit_cost = input.unit_cost;
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

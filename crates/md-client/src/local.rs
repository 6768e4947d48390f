//! Local reconciliation
//!
//! Keeps the cached mock dataset consistent with actions already sent to the
//! API, so stock, reservation and purchase screens reflect them before the
//! backend serves those collections.

use chrono::Duration;
use md_core::types::{now_millis, today};
use md_models::{PurchaseOrder, PurchaseOrderLine, Reservation, StockLine, StockMovement};
use serde_json::{Map, Value};

use crate::mock::{entry_id, keys, MockData};

/// Movements kept in the cached ledger
pub const MOVEMENT_LIMIT: usize = 200;

const LOCAL_JOB: &str = "JOB-LOCAL";
const OPERATOR: &str = "Sistem";
const PO_SUPPLIER: &str = "Sipariş Bekleniyor";
const PO_STATUS: &str = "Beklemede";
const PO_LEAD_DAYS: i64 = 3;

#[derive(Debug, Clone, Default)]
pub struct ReservationOptions {
    /// Stock is taken out now rather than held
    pub ready: bool,
    pub note: String,
    pub job_id: Option<String>,
    pub due_date: Option<String>,
}

impl MockData {
    /// Hold (or, when `ready`, take out) each line's quantity and record a
    /// movement and a reservation for it. Unknown items and non-positive
    /// quantities are skipped.
    ///
    /// Only the matched stock items change; every other stored entry is
    /// kept verbatim.
    pub fn apply_stock_reservation(&mut self, lines: &[StockLine], options: &ReservationOptions) {
        let mut items = self.list(keys::STOCK_ITEMS);
        let mut movements = self.list(keys::STOCK_MOVEMENTS);
        let mut reservations = self.list(keys::RESERVATIONS);

        let date = today().format("%Y-%m-%d").to_string();
        let stamp = now_millis();

        for line in lines {
            let qty = line.qty;
            if qty <= 0.0 {
                continue;
            }
            let Some(Value::Object(item)) = items
                .iter_mut()
                .find(|item| entry_id(item) == Some(line.id.as_str()))
            else {
                continue;
            };

            if options.ready {
                let on_hand = number(item, "onHand");
                item.insert("onHand".into(), Value::from((on_hand - qty).max(0.0)));
            } else {
                let reserved = number(item, "reserved");
                item.insert("reserved".into(), Value::from(reserved + qty));
            }
            let name = item
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let reason = if !options.note.is_empty() {
                options.note.clone()
            } else if options.ready {
                "Rezerv alındı".to_string()
            } else {
                "Rezervasyon".to_string()
            };
            let movement = StockMovement {
                id: format!("MOV-{}-{}", stamp, line.id),
                date: date.clone(),
                item: name.clone(),
                change: if options.ready { -qty } else { qty },
                reason,
                operator: OPERATOR.to_string(),
                ..Default::default()
            };
            let reservation = Reservation {
                id: format!("RSV-{}-{}", stamp, line.id),
                job: options.job_id.clone().unwrap_or_else(|| LOCAL_JOB.to_string()),
                item: name,
                qty,
                due_date: options.due_date.clone().unwrap_or_else(|| date.clone()),
                status: if options.ready { "Ayrıldı" } else { "Beklemede" }.to_string(),
                extra: Map::new(),
            };

            match (serde_json::to_value(&movement), serde_json::to_value(&reservation)) {
                (Ok(movement), Ok(reservation)) => {
                    movements.insert(0, movement);
                    reservations.insert(0, reservation);
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(item = %line.id, error = %e, "Could not encode reservation");
                }
            }
        }

        movements.truncate(MOVEMENT_LIMIT);
        self.set_value(keys::STOCK_ITEMS, Value::Array(items));
        self.set_value(keys::STOCK_MOVEMENTS, Value::Array(movements));
        self.set_value(keys::RESERVATIONS, Value::Array(reservations));
    }

    /// Shallow-merge `patch` into the cached job with `job_id`
    pub fn patch_job(&mut self, job_id: &str, patch: &Map<String, Value>) {
        let jobs = self
            .list(keys::JOBS)
            .into_iter()
            .map(|mut job| {
                if job.get("id").and_then(Value::as_str) == Some(job_id) {
                    if let Value::Object(fields) = &mut job {
                        for (key, value) in patch {
                            fields.insert(key.clone(), value.clone());
                        }
                    }
                }
                job
            })
            .collect();
        self.set_value(keys::JOBS, Value::Array(jobs));
    }

    /// Record a placeholder purchase order for lines still to be bought
    pub fn add_purchase_order(&mut self, job_id: &str, lines: &[StockLine]) -> PurchaseOrder {
        let order = PurchaseOrder {
            id: format!("PO-{}", now_millis()),
            supplier: PO_SUPPLIER.to_string(),
            total: Value::from("₺0"),
            status: PO_STATUS.to_string(),
            expected_date: (today() + Duration::days(PO_LEAD_DAYS))
                .format("%Y-%m-%d")
                .to_string(),
            job_id: Some(job_id.to_string()),
            lines: lines
                .iter()
                .map(|line| PurchaseOrderLine {
                    name: line.name.clone(),
                    qty: line.qty,
                    sku: line.sku.clone(),
                    color: line.color.clone(),
                })
                .collect(),
            extra: Map::new(),
        };

        let mut orders = self.list(keys::PURCHASE_ORDERS);
        match serde_json::to_value(&order) {
            Ok(value) => orders.insert(0, value),
            Err(e) => tracing::warn!(error = %e, "Could not encode purchase order"),
        }
        self.set_value(keys::PURCHASE_ORDERS, Value::Array(orders));
        order
    }
}

fn number(entry: &Map<String, Value>, field: &str) -> f64 {
    entry.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use md_models::StockItem;
    use serde_json::json;

    fn data() -> MockData {
        MockData::from_value(json!({
            "stockItems": [
                {"id": "STK-1", "name": "Menteşe", "onHand": 10, "reserved": 2},
                {"id": "STK-2", "name": "Kulp", "onHand": 3, "reserved": 0}
            ],
            "stockMovements": [],
            "jobs": [
                {"id": "JOB-1", "title": "Mutfak", "status": "ONAY_BEKLIYOR"},
                {"id": "JOB-2", "title": "Gardırop", "status": "OLCU_ASAMASI"}
            ]
        }))
        .unwrap()
    }

    fn line(id: &str, qty: f64) -> StockLine {
        StockLine {
            id: id.into(),
            name: format!("Kalem {}", id),
            sku: format!("SKU-{}", id),
            qty,
            color: "Beyaz".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_reserve_without_ready() {
        let mut data = data();
        let options = ReservationOptions {
            job_id: Some("JOB-1".into()),
            ..Default::default()
        };
        data.apply_stock_reservation(&[line("STK-1", 4.0), line("STK-404", 1.0)], &options);

        let items: Vec<StockItem> = data.collection(keys::STOCK_ITEMS);
        assert_eq!(items[0].reserved, 6.0);
        assert_eq!(items[0].on_hand, 10.0);

        let movements: Vec<StockMovement> = data.collection(keys::STOCK_MOVEMENTS);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].change, 4.0);
        assert_eq!(movements[0].reason, "Rezervasyon");
        assert_eq!(movements[0].operator, "Sistem");

        let reservations: Vec<Reservation> = data.collection(keys::RESERVATIONS);
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].job, "JOB-1");
        assert_eq!(reservations[0].status, "Beklemede");
        assert_eq!(reservations[0].due_date, today().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_ready_takes_stock_out() {
        let mut data = data();
        let options = ReservationOptions {
            ready: true,
            note: "Montaj için".into(),
            due_date: Some("2025-06-01".into()),
            ..Default::default()
        };
        data.apply_stock_reservation(&[line("STK-2", 5.0), line("STK-1", 0.0)], &options);

        let items: Vec<StockItem> = data.collection(keys::STOCK_ITEMS);
        assert_eq!(items[1].on_hand, 0.0);
        assert_eq!(items[0].on_hand, 10.0);

        let movements: Vec<StockMovement> = data.collection(keys::STOCK_MOVEMENTS);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].change, -5.0);
        assert_eq!(movements[0].reason, "Montaj için");

        let reservations: Vec<Reservation> = data.collection(keys::RESERVATIONS);
        assert_eq!(reservations[0].job, "JOB-LOCAL");
        assert_eq!(reservations[0].status, "Ayrıldı");
        assert_eq!(reservations[0].due_date, "2025-06-01");
    }

    #[test]
    fn test_other_entries_are_kept_verbatim() {
        let mut data = MockData::from_value(json!({
            "stockItems": [
                {"id": "STK-1", "name": "Menteşe", "onHand": 10, "reserved": 2},
                {"id": "STK-2", "name": "Kulp", "onHand": "7"},
                {"id": "STK-3", "name": "Ray", "onHand": 4, "reserved": 0}
            ],
            "stockMovements": [{"item": "Kulp", "change": 2}],
            "reservations": [{"job": "JOB-9", "item": "Ray", "qty": 1}]
        }))
        .unwrap();

        data.apply_stock_reservation(&[line("STK-1", 1.0)], &ReservationOptions::default());

        let items = data.list(keys::STOCK_ITEMS);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["reserved"], json!(3.0));
        assert_eq!(items[1], json!({"id": "STK-2", "name": "Kulp", "onHand": "7"}));
        assert_eq!(
            items[2],
            json!({"id": "STK-3", "name": "Ray", "onHand": 4, "reserved": 0})
        );

        let movements = data.list(keys::STOCK_MOVEMENTS);
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[1], json!({"item": "Kulp", "change": 2}));

        let reservations = data.list(keys::RESERVATIONS);
        assert_eq!(reservations.len(), 2);
        assert_eq!(reservations[1], json!({"job": "JOB-9", "item": "Ray", "qty": 1}));
    }

    #[test]
    fn test_movement_ledger_is_capped() {
        let mut data = data();
        let old: Vec<Value> = (0..MOVEMENT_LIMIT)
            .map(|i| json!({"id": format!("MOV-{}", i), "change": 1}))
            .collect();
        data.set_value(keys::STOCK_MOVEMENTS, Value::Array(old));

        data.apply_stock_reservation(&[line("STK-1", 1.0)], &ReservationOptions::default());
        let movements: Vec<StockMovement> = data.collection(keys::STOCK_MOVEMENTS);
        assert_eq!(movements.len(), MOVEMENT_LIMIT);
        assert!(movements[0].id.ends_with("-STK-1"));
        assert_eq!(movements[MOVEMENT_LIMIT - 1].id, "MOV-198");
    }

    #[test]
    fn test_patch_job() {
        let mut data = data();
        let patch = json!({"pendingPO": [], "status": "URETIME_HAZIR"});
        data.patch_job("JOB-1", patch.as_object().unwrap());

        let jobs = data.list(keys::JOBS);
        assert_eq!(jobs[0]["status"], "URETIME_HAZIR");
        assert_eq!(jobs[0]["title"], "Mutfak");
        assert_eq!(jobs[0]["pendingPO"], json!([]));
        assert_eq!(jobs[1]["status"], "OLCU_ASAMASI");
    }

    #[test]
    fn test_add_purchase_order() {
        let mut data = data();
        let order = data.add_purchase_order("JOB-1", &[line("STK-2", 7.0)]);

        assert!(order.id.starts_with("PO-"));
        assert_eq!(order.supplier, "Sipariş Bekleniyor");
        assert_eq!(order.total, json!("₺0"));
        assert_eq!(
            order.expected_date,
            (today() + Duration::days(3)).format("%Y-%m-%d").to_string()
        );
        assert_eq!(order.lines[0].qty, 7.0);

        let orders = data.list(keys::PURCHASE_ORDERS);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["jobId"], "JOB-1");
        assert_eq!(orders[0]["lines"][0]["sku"], "SKU-STK-2");
    }
}

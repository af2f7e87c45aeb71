//! End-to-end walk through the ledger, filter engine and batch pipeline.
//!
//! Tests: Income → Outcome → Batch → Aggregate, all against one in-memory store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sockstock_core::StockError;
    use sockstock_inventory::{FilterCriteria, StockInput};

    use crate::ledger::StockLedger;
    use crate::store::{InMemoryStockStore, StockStore};

    fn setup() -> StockLedger<Arc<dyn StockStore>> {
        let store: Arc<dyn StockStore> = Arc::new(InMemoryStockStore::new());
        StockLedger::new(store)
    }

    fn total_for(color: &str) -> FilterCriteria {
        FilterCriteria {
            color: Some(color.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn stock_lifecycle_from_empty_store() {
        let ledger = setup();

        // Scenario 1: first income creates a normalized record.
        let r = ledger.income(StockInput::new("Red", 30, 10)).await.unwrap();
        assert_eq!((r.color(), r.cotton_part(), r.quantity()), ("red", 30, 10));

        // Scenario 2: second income accumulates.
        let r = ledger.income(StockInput::new("red", 30, 5)).await.unwrap();
        assert_eq!(r.quantity(), 15);

        // Scenario 3: outcome beyond stock is refused and changes nothing.
        let err = ledger
            .outcome(StockInput::new("red", 30, 20))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::InsufficientStock { .. }));
        assert_eq!(ledger.aggregate(&total_for("red")).await.unwrap(), 15);

        // Scenario 4: outcome within stock subtracts.
        let r = ledger.outcome(StockInput::new("red", 30, 5)).await.unwrap();
        assert_eq!(r.quantity(), 10);

        // Scenario 5: batch with a malformed row in the middle.
        let body = b"color,cottonPart,quantity\nred,30,10\nbadrow\nblue,50,20";
        let report = ledger.batch_income(Some("stock.csv"), &body[..]).await.unwrap();
        let rows: Vec<(&str, i32, i64)> = report
            .records
            .iter()
            .map(|r| (r.color(), r.cotton_part(), r.quantity()))
            .collect();
        assert_eq!(rows, vec![("red", 30, 20), ("blue", 50, 20)]);
        assert_eq!(report.rejected.len(), 1);

        // Scenario 6: unfiltered aggregate sums everything.
        assert_eq!(ledger.aggregate(&FilterCriteria::default()).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn aggregation_combines_filters() {
        let ledger = setup();
        for (color, cotton, qty) in [("red", 30, 10), ("red", 70, 5), ("blue", 70, 8), ("red", 90, 1)] {
            ledger.income(StockInput::new(color, cotton, qty)).await.unwrap();
        }

        let red_over_50 = FilterCriteria {
            color: Some("RED".to_string()),
            operator: Some("greaterThan".to_string()),
            cotton_part: Some(50),
            ..Default::default()
        };
        assert_eq!(ledger.aggregate(&red_over_50).await.unwrap(), 6);

        let band = FilterCriteria {
            min_cotton_part: Some(30),
            max_cotton_part: Some(70),
            ..Default::default()
        };
        assert_eq!(ledger.aggregate(&band).await.unwrap(), 23);

        let exact = FilterCriteria {
            operator: Some("equal".to_string()),
            cotton_part: Some(70),
            sort_by: Some("quantity".to_string()),
            sort_direction: Some("desc".to_string()),
            ..Default::default()
        };
        assert_eq!(ledger.aggregate(&exact).await.unwrap(), 13);

        let nothing = total_for("purple");
        assert_eq!(ledger.aggregate(&nothing).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn updated_record_moves_between_filters() {
        let ledger = setup();
        let r = ledger.income(StockInput::new("red", 30, 10)).await.unwrap();

        ledger
            .update(r.id_typed(), StockInput::new("Green", 40, 3))
            .await
            .unwrap();

        assert_eq!(ledger.aggregate(&total_for("red")).await.unwrap(), 0);
        assert_eq!(ledger.aggregate(&total_for("green")).await.unwrap(), 3);

        // Outcome now addresses the new key.
        let err = ledger
            .outcome(StockInput::new("red", 30, 1))
            .await
            .unwrap_err();
        assert_eq!(err, StockError::NotFound);
        let r = ledger.outcome(StockInput::new("green", 40, 3)).await.unwrap();
        assert_eq!(r.quantity(), 0);
    }
}

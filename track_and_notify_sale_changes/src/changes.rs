use std::collections::HashSet;

use pizza_discounts::contracts::import_sale_status::SaleRecord;

/// Symmetric difference by full structural equality. A region whose coupon
/// code changes while staying on sale therefore yields two entries, the
/// retired record and its replacement. That is the contract: difference is
/// set-based, not keyed by region.
pub fn changed_records(
    previous: &HashSet<SaleRecord>,
    current: &HashSet<SaleRecord>,
) -> Vec<SaleRecord> {
    previous.symmetric_difference(current).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::changed_records;
    use pizza_discounts::contracts::import_sale_status::{
        RegionName, SaleRecord, SaleStatus,
    };
    use std::collections::HashSet;
    use url::Url;

    fn record(region: &str, status: SaleStatus) -> SaleRecord {
        SaleRecord {
            region: RegionName::try_from(region.to_string()).unwrap(),
            status,
            source_url: Url::parse(&format!("http://ispizzahalfprice.com/{}", region.to_lowercase()))
                .unwrap(),
        }
    }

    fn on_sale(coupon_code: &str) -> SaleStatus {
        SaleStatus::OnSale {
            coupon_code: coupon_code.to_string(),
        }
    }

    #[test]
    fn test_identical_sets_yield_no_changes() {
        let snapshot: HashSet<_> = [
            record("Chicago", on_sale("SAVE10")),
            record("NYC", SaleStatus::NotOnSale),
        ]
        .into_iter()
        .collect();

        assert!(changed_records(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn test_difference_is_symmetric() {
        let previous: HashSet<_> = [record("Chicago", SaleStatus::NotOnSale)]
            .into_iter()
            .collect();
        let current: HashSet<_> = [record("Chicago", on_sale("SAVE10"))].into_iter().collect();

        let forward: HashSet<_> = changed_records(&previous, &current).into_iter().collect();
        let backward: HashSet<_> = changed_records(&current, &previous).into_iter().collect();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_previous_snapshot_marks_everything_changed() {
        let previous = HashSet::new();
        let current: HashSet<_> = [
            record("Chicago", on_sale("SAVE10")),
            record("NYC", SaleStatus::NotOnSale),
        ]
        .into_iter()
        .collect();

        let changed: HashSet<_> = changed_records(&previous, &current).into_iter().collect();

        assert_eq!(changed, current);
    }

    #[test]
    fn test_sale_start_yields_the_old_and_the_new_record() {
        let previous: HashSet<_> = [record("Chicago", SaleStatus::NotOnSale)]
            .into_iter()
            .collect();
        let current: HashSet<_> = [record("Chicago", on_sale("SAVE10"))].into_iter().collect();

        let changed = changed_records(&previous, &current);

        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn test_coupon_churn_while_on_sale_yields_two_entries() {
        let previous: HashSet<_> = [record("Chicago", on_sale("SAVE10"))].into_iter().collect();
        let current: HashSet<_> = [record("Chicago", on_sale("SAVE20"))].into_iter().collect();

        let changed = changed_records(&previous, &current);

        assert_eq!(changed.len(), 2);
    }
}

use crate::core::errors::LedgerError;
use crate::core::ledger::{CustomAmount, PercentageShare, SplitRequest, WeightedShare, validate_allocations};
use crate::tests::equal_split;

fn amounts(split: &SplitRequest, amount: i64) -> Vec<(String, i64)> {
    validate_allocations(amount, split)
        .unwrap()
        .into_iter()
        .map(|a| (a.member_id, a.amount))
        .collect()
}

fn percentages(entries: &[(&str, f64)]) -> SplitRequest {
    SplitRequest::Percentage {
        shares: entries
            .iter()
            .map(|(id, percentage)| PercentageShare {
                member_id: id.to_string(),
                percentage: *percentage,
            })
            .collect(),
    }
}

fn custom(entries: &[(&str, i64)]) -> SplitRequest {
    SplitRequest::Custom {
        amounts: entries
            .iter()
            .map(|(id, amount)| CustomAmount {
                member_id: id.to_string(),
                amount: *amount,
            })
            .collect(),
    }
}

fn weights(entries: &[(&str, u32)]) -> SplitRequest {
    SplitRequest::Shares {
        shares: entries
            .iter()
            .map(|(id, shares)| WeightedShare {
                member_id: id.to_string(),
                shares: *shares,
            })
            .collect(),
    }
}

fn pairs(entries: &[(&str, i64)]) -> Vec<(String, i64)> {
    entries.iter().map(|(id, amount)| (id.to_string(), *amount)).collect()
}

#[test]
fn test_equal_split_hands_remainder_to_first_members() {
    let split = equal_split(&["a", "b", "c"]);
    assert_eq!(amounts(&split, 10000), pairs(&[("a", 3334), ("b", 3333), ("c", 3333)]));
    assert_eq!(amounts(&split, 100), pairs(&[("a", 34), ("b", 33), ("c", 33)]));
    assert_eq!(amounts(&split, 300), pairs(&[("a", 100), ("b", 100), ("c", 100)]));
}

#[test]
fn test_equal_split_follows_input_order() {
    let split = equal_split(&["c", "a", "b"]);
    assert_eq!(amounts(&split, 101), pairs(&[("c", 34), ("a", 34), ("b", 33)]));
}

#[test]
fn test_equal_split_smaller_than_member_count() {
    let split = equal_split(&["a", "b", "c", "d"]);
    assert_eq!(amounts(&split, 2), pairs(&[("a", 1), ("b", 1), ("c", 0), ("d", 0)]));
}

#[test]
fn test_new_allocations_start_unpaid() {
    let allocations = validate_allocations(90, &equal_split(&["a", "b"])).unwrap();
    assert!(allocations.iter().all(|a| !a.paid && a.paid_at.is_none()));
}

#[test]
fn test_percentage_split_rounds_to_nearest_unit() {
    let split = percentages(&[("a", 50.0), ("b", 30.0), ("c", 20.0)]);
    assert_eq!(amounts(&split, 1001), pairs(&[("a", 501), ("b", 300), ("c", 200)]));
}

#[test]
fn test_percentage_split_adds_missing_units_in_order() {
    let split = percentages(&[("a", 33.33), ("b", 33.33), ("c", 33.34)]);
    assert_eq!(amounts(&split, 100), pairs(&[("a", 34), ("b", 33), ("c", 33)]));
}

#[test]
fn test_percentage_split_takes_back_excess_units_in_order() {
    // Every quarter of 10 rounds up to 3.
    let split = percentages(&[("a", 25.0), ("b", 25.0), ("c", 25.0), ("d", 25.0)]);
    assert_eq!(amounts(&split, 10), pairs(&[("a", 2), ("b", 2), ("c", 3), ("d", 3)]));
}

#[test]
fn test_percentage_split_leaves_zero_share_at_zero() {
    let split = percentages(&[("a", 0.0), ("b", 50.0), ("c", 50.0)]);
    assert_eq!(amounts(&split, 101), pairs(&[("a", 0), ("b", 50), ("c", 51)]));
}

#[test]
fn test_percentage_split_accepts_tolerance() {
    let split = percentages(&[("a", 50.0), ("b", 49.995)]);
    let allocations = validate_allocations(200, &split).unwrap();
    assert_eq!(allocations.iter().map(|a| a.amount).sum::<i64>(), 200);
}

#[test]
fn test_percentage_split_rejects_bad_totals() {
    let short = percentages(&[("a", 50.0), ("b", 49.0)]);
    assert!(matches!(
        validate_allocations(100, &short),
        Err(LedgerError::InvalidPercentage(_))
    ));

    let negative = percentages(&[("a", 150.0), ("b", -50.0)]);
    assert!(matches!(
        validate_allocations(100, &negative),
        Err(LedgerError::InvalidPercentage(_))
    ));

    let nan = percentages(&[("a", f64::NAN), ("b", 100.0)]);
    assert!(matches!(
        validate_allocations(100, &nan),
        Err(LedgerError::InvalidPercentage(_))
    ));
}

#[test]
fn test_custom_split_taken_verbatim() {
    let split = custom(&[("a", 70), ("b", 0), ("c", 30)]);
    assert_eq!(amounts(&split, 100), pairs(&[("a", 70), ("b", 0), ("c", 30)]));
}

#[test]
fn test_custom_split_mismatch() {
    let split = custom(&[("a", 50), ("b", 40)]);
    assert_eq!(
        validate_allocations(100, &split),
        Err(LedgerError::AllocationMismatch {
            expected: 100,
            actual: 90
        })
    );
}

#[test]
fn test_custom_split_rejects_negative_amount() {
    let split = custom(&[("a", 105), ("b", -5)]);
    assert_eq!(validate_allocations(100, &split), Err(LedgerError::InvalidAmount(-5)));
}

#[test]
fn test_custom_split_overflow_is_a_mismatch() {
    let split = custom(&[("a", i64::MAX), ("b", 1)]);
    assert!(matches!(
        validate_allocations(100, &split),
        Err(LedgerError::AllocationMismatch { expected: 100, .. })
    ));
}

#[test]
fn test_shares_split_by_weight() {
    assert_eq!(
        amounts(&weights(&[("a", 1), ("b", 2), ("c", 1)]), 100),
        pairs(&[("a", 25), ("b", 50), ("c", 25)])
    );
    assert_eq!(
        amounts(&weights(&[("a", 1), ("b", 1), ("c", 1)]), 100),
        pairs(&[("a", 34), ("b", 33), ("c", 33)])
    );
}

#[test]
fn test_shares_split_skips_zero_weight_for_remainder() {
    assert_eq!(
        amounts(&weights(&[("a", 0), ("b", 1), ("c", 2)]), 100),
        pairs(&[("a", 0), ("b", 34), ("c", 66)])
    );
}

#[test]
fn test_shares_split_rejects_zero_total() {
    assert_eq!(
        validate_allocations(100, &weights(&[("a", 0), ("b", 0)])),
        Err(LedgerError::InvalidShares)
    );
}

#[test]
fn test_rejects_non_positive_amount() {
    let split = equal_split(&["a", "b"]);
    assert_eq!(validate_allocations(0, &split), Err(LedgerError::InvalidAmount(0)));
    assert_eq!(validate_allocations(-100, &split), Err(LedgerError::InvalidAmount(-100)));
}

#[test]
fn test_rejects_empty_split() {
    assert_eq!(validate_allocations(100, &equal_split(&[])), Err(LedgerError::EmptySplit));
    assert_eq!(validate_allocations(100, &custom(&[])), Err(LedgerError::EmptySplit));
}

#[test]
fn test_rejects_duplicate_member() {
    assert_eq!(
        validate_allocations(100, &equal_split(&["a", "b", "a"])),
        Err(LedgerError::DuplicateMember("a".to_string()))
    );
    assert_eq!(
        validate_allocations(100, &custom(&[("a", 50), ("a", 50)])),
        Err(LedgerError::DuplicateMember("a".to_string()))
    );
}

#[test]
fn test_same_input_same_output() {
    let split = percentages(&[("x", 12.5), ("y", 62.5), ("z", 25.0)]);
    assert_eq!(
        validate_allocations(9999, &split).unwrap(),
        validate_allocations(9999, &split).unwrap()
    );
}

#[test]
fn test_split_request_from_json() {
    let split: SplitRequest = serde_json::from_value(serde_json::json!({
        "kind": "shares",
        "shares": [
            { "member_id": "a", "shares": 2 },
            { "member_id": "b", "shares": 1 }
        ]
    }))
    .unwrap();
    assert_eq!(split, weights(&[("a", 2), ("b", 1)]));
    assert_eq!(split.members(), vec!["a", "b"]);
}

#[test]
fn test_percentage_split_of_largest_amount() {
    let split = percentages(&[("a", 50.0), ("b", 50.0)]);
    let allocations = validate_allocations(i64::MAX, &split).unwrap();
    assert_eq!(
        allocations.iter().map(|a| a.amount).collect::<Vec<_>>(),
        vec![4_611_686_018_427_387_903, 4_611_686_018_427_387_904]
    );

    let whole = percentages(&[("a", 100.0)]);
    assert_eq!(amounts(&whole, i64::MAX), pairs(&[("a", i64::MAX)]));
}

#[test]
fn test_percentage_split_near_largest_amount_is_exact() {
    let split = percentages(&[("a", 33.33), ("b", 33.33), ("c", 33.34)]);
    for amount in [i64::MAX, i64::MAX - 1, i64::MAX / 3 * 2] {
        let allocations = validate_allocations(amount, &split).unwrap();
        let total = allocations.iter().map(|a| a.amount as i128).sum::<i128>();
        assert_eq!(total, amount as i128);
        assert!(allocations.iter().all(|a| a.amount >= 0));
    }
}

#[test]
fn test_shares_split_of_largest_amount() {
    let allocations = validate_allocations(i64::MAX, &weights(&[("a", 1), ("b", 1), ("c", 1)])).unwrap();
    assert_eq!(allocations.iter().map(|a| a.amount as i128).sum::<i128>(), i64::MAX as i128);
}

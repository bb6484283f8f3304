use chrono::NaiveDate;
use lease_engine_core::rates::{
    bucket_for_term, convert_rate_percent, payment_rate, resolve_rate, table_effective_on,
    LeaseTermBucket, RateBucketEntry, RateTable, LEASE_TERM_BUCKETS,
};
use lease_engine_core::{LeaseEngineError, PaymentFrequency, RateConvention};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn short_term_only_table() -> RateTable {
    RateTable::new(
        "2024-01",
        date(2024, 1, 1),
        true,
        vec![
            RateBucketEntry {
                lease_term_bucket: LeaseTermBucket::UpToThree,
                yearly_rate_percent: dec!(4.75),
            },
            RateBucketEntry {
                lease_term_bucket: LeaseTermBucket::ThreeToFive,
                yearly_rate_percent: dec!(5.10),
            },
        ],
    )
    .unwrap()
}

// ===========================================================================
// Bucket assignment
// ===========================================================================

#[test]
fn test_bucket_boundaries_from_table_labels() {
    let cases = [
        (dec!(1), "1-3 year"),
        (dec!(3.0), "1-3 year"),
        (dec!(3.0001), "3-5 year"),
        (dec!(7.5), "5-10 year"),
        (dec!(12), "10-15 year"),
        (dec!(25), "15-30 year"),
        (dec!(45), ">30 year"),
    ];
    for (term, label) in cases {
        assert_eq!(bucket_for_term(term).unwrap().label(), label, "term {term}");
    }
}

#[test]
fn test_buckets_are_ordered_by_upper_bound() {
    let bounds: Vec<_> = LEASE_TERM_BUCKETS
        .iter()
        .filter_map(|b| b.upper_bound())
        .collect();
    assert_eq!(bounds, vec![dec!(3), dec!(5), dec!(10), dec!(15), dec!(30)]);
}

// ===========================================================================
// Rate conversion
// ===========================================================================

#[test]
fn test_conversion_identity_for_annual() {
    let r = convert_rate_percent(dec!(5.123456), PaymentFrequency::Annual, RateConvention::Compound)
        .unwrap();
    assert_eq!(r, dec!(5.123456));
}

#[test]
fn test_rounded_payment_rates_for_five_percent() {
    // Reference: (1.05)^(1/2) - 1 = 2.4695%, (1.05)^(1/4) - 1 = 1.2272%,
    // (1.05)^(1/12) - 1 = 0.4074%
    let convention = RateConvention::Compound;
    assert_eq!(payment_rate(dec!(5), PaymentFrequency::SemiAnnual, convention).unwrap(), dec!(2.4695));
    assert_eq!(payment_rate(dec!(5), PaymentFrequency::Quarterly, convention).unwrap(), dec!(1.2272));
    assert_eq!(payment_rate(dec!(5), PaymentFrequency::Monthly, convention).unwrap(), dec!(0.4074));
}

#[test]
fn test_zero_rate_converts_to_zero() {
    for freq in PaymentFrequency::ALL {
        assert_eq!(
            convert_rate_percent(Decimal::ZERO, freq, RateConvention::Compound).unwrap(),
            Decimal::ZERO
        );
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

#[test]
fn test_missing_bucket_for_twenty_year_lease() {
    let err = resolve_rate(dec!(20), PaymentFrequency::Monthly, &short_term_only_table(), RateConvention::Compound)
        .unwrap_err();
    match err {
        LeaseEngineError::RateNotResolved { bucket, .. } => assert_eq!(bucket, "15-30 year"),
        other => panic!("expected RateNotResolved, got {other:?}"),
    }
}

#[test]
fn test_resolution_uses_table_in_force() {
    let mut tables = vec![short_term_only_table()];
    let mut next = RateTable::roll_forward("2025-01", date(2025, 1, 1), tables.first());
    next.set_rate(LeaseTermBucket::UpToThree, dec!(4.25)).unwrap();
    tables[0].is_current = false;
    tables.push(next);

    let in_2024 = table_effective_on(&tables, date(2024, 6, 30)).unwrap();
    let in_2025 = table_effective_on(&tables, date(2025, 6, 30)).unwrap();

    let old = resolve_rate(dec!(2), PaymentFrequency::Annual, in_2024, RateConvention::Compound).unwrap();
    let new = resolve_rate(dec!(2), PaymentFrequency::Annual, in_2025, RateConvention::Compound).unwrap();
    assert_eq!(old.annual_rate_percent, dec!(4.75));
    assert_eq!(new.annual_rate_percent, dec!(4.25));

    // Carried-over bucket resolves, untouched buckets stay unresolved (zero)
    let carried = resolve_rate(dec!(4), PaymentFrequency::Annual, in_2025, RateConvention::Compound).unwrap();
    assert_eq!(carried.annual_rate_percent, dec!(5.10));
    assert!(resolve_rate(dec!(8), PaymentFrequency::Annual, in_2025, RateConvention::Compound).is_err());
}

#[test]
fn test_rate_table_json_shape() {
    let json = r#"{
        "id": "t1",
        "effective_date": "2024-01-01",
        "is_current": true,
        "rates": [
            { "lease_term_bucket": "1-3 year", "yearly_rate_percent": "4.5" },
            { "lease_term_bucket": ">30 year", "yearly_rate_percent": 6.25 }
        ]
    }"#;
    let table: RateTable = serde_json::from_str(json).unwrap();
    assert_eq!(table.rate_for(LeaseTermBucket::UpToThree), Some(dec!(4.5)));
    assert_eq!(table.rate_for(LeaseTermBucket::OverThirty), Some(dec!(6.25)));
    assert_eq!(table.rate_for(LeaseTermBucket::FiveToTen), None);
}

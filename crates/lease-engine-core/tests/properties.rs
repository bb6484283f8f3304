use chrono::NaiveDate;
use lease_engine_core::rates::{
    bucket_for_term, convert_rate_percent, RateBucketEntry, RateTable, LEASE_TERM_BUCKETS,
};
use lease_engine_core::schedule::{compute_amortization, compute_pv_schedule};
use lease_engine_core::time_value::{effective_annual_rate, periodic_rate};
use lease_engine_core::{
    LeaseRecord, PaymentFrequency, PaymentInterval, PaymentTiming, RateConvention,
    ScheduleConfig,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn years_from_months(months: u32) -> Decimal {
    Decimal::from(months) / Decimal::from(12)
}

fn interval_strategy() -> impl Strategy<Value = PaymentInterval> {
    prop_oneof![
        Just(PaymentInterval::Monthly),
        Just(PaymentInterval::Quarterly),
        Just(PaymentInterval::Annual),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn every_positive_term_lands_in_exactly_one_bucket(months in 1u32..=720) {
        let term = years_from_months(months);
        let bucket = bucket_for_term(term).unwrap();
        let hits = LEASE_TERM_BUCKETS.iter().filter(|b| b.contains(term)).count();
        prop_assert_eq!(hits, 1);
        prop_assert!(bucket.contains(term));
    }

    #[test]
    fn longer_terms_never_map_to_shorter_buckets(a in 1u32..=720, b in 1u32..=720) {
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        let short_bucket = bucket_for_term(years_from_months(short)).unwrap();
        let long_bucket = bucket_for_term(years_from_months(long)).unwrap();
        prop_assert!(short_bucket <= long_bucket);
    }

    #[test]
    fn annual_conversion_is_identity(basis_points in 0i64..=5000) {
        let yearly = Decimal::new(basis_points, 2);
        for convention in [RateConvention::Compound, RateConvention::Simple] {
            let converted = convert_rate_percent(yearly, PaymentFrequency::Annual, convention).unwrap();
            prop_assert_eq!(converted.normalize(), yearly.normalize());
        }
    }

    #[test]
    fn more_periods_give_smaller_rates(basis_points in 1i64..=5000) {
        let yearly = Decimal::new(basis_points, 2);
        for convention in [RateConvention::Compound, RateConvention::Simple] {
            let rates: Vec<Decimal> = PaymentFrequency::ALL
                .iter()
                .map(|&f| convert_rate_percent(yearly, f, convention).unwrap())
                .collect();
            for pair in rates.windows(2) {
                prop_assert!(pair[1] < pair[0], "{:?} not decreasing: {:?}", convention, rates);
            }
        }
    }

    #[test]
    fn compounding_preserves_the_annual_yield(basis_points in 1i64..=5000) {
        let annual = Decimal::new(basis_points, 4);
        for frequency in PaymentFrequency::ALL {
            let p = frequency.periods_per_year();
            let periodic = periodic_rate(annual, p, RateConvention::Compound).unwrap();
            let effective = effective_annual_rate(periodic, p);
            prop_assert!((effective - annual).abs() < dec!(0.000000001), "{} -> {}", annual, effective);
        }
    }

    #[test]
    fn roll_forward_carries_every_rate(rates in proptest::collection::vec(0i64..=2000, 6)) {
        let entries: Vec<RateBucketEntry> = LEASE_TERM_BUCKETS
            .iter()
            .zip(&rates)
            .map(|(&bucket, &bp)| RateBucketEntry {
                lease_term_bucket: bucket,
                yearly_rate_percent: Decimal::new(bp, 2),
            })
            .collect();
        let effective = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let previous = RateTable::new("prev", effective, true, entries).unwrap();
        let next = RateTable::roll_forward(
            "next",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            Some(&previous),
        );
        prop_assert!(next.is_current);
        prop_assert_eq!(next.rates.len(), LEASE_TERM_BUCKETS.len());
        for bucket in LEASE_TERM_BUCKETS {
            prop_assert_eq!(next.rate_for(bucket), previous.rate_for(bucket));
        }
    }

    #[test]
    fn liability_amortizes_to_zero(
        periods in 1u32..=20,
        basis_points in 0i64..=1500,
        payment_cents in 100i64..=10_000_000,
        interval in interval_strategy(),
        in_advance in any::<bool>(),
    ) {
        // Whole payment periods only; a short final period leaves a stub
        let months = periods * interval.interval_months();
        let commencement = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let expiration = commencement
            .checked_add_months(chrono::Months::new(months))
            .unwrap();
        let mut lease = LeaseRecord::new(
            commencement,
            expiration,
            interval,
            Decimal::new(payment_cents, 2),
            Some(Decimal::new(basis_points, 2)),
        );
        if in_advance {
            lease.payment_timing = PaymentTiming::Beginning;
        }
        let config = ScheduleConfig::default();
        let pv = compute_pv_schedule(&lease, &config).unwrap();
        let rows = compute_amortization(&lease, &pv, &config).unwrap();

        prop_assert_eq!(rows.len() as u32, months);
        prop_assert_eq!(pv.len() as u32, periods);
        let total_pv: Decimal = pv.iter().map(|r| r.present_value).sum();
        let total_payments: Decimal = pv.iter().map(|r| r.payment).sum();
        prop_assert!(total_pv <= total_payments);
        let last = rows.last().unwrap();
        let principal: Decimal = rows.iter().map(|r| r.principal_reduction).sum();
        prop_assert!((principal - (total_pv - last.closing_liability)).abs() < dec!(0.000001));
        prop_assert!(
            last.closing_liability.abs() < dec!(0.01),
            "{} left after {} months",
            last.closing_liability,
            months
        );
    }
}

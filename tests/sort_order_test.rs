use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use refund_recon::domain::query::{self, RecordFilter, SortKey};
use refund_recon::domain::record::ExceptionRecord;
use refund_recon::interfaces::csv::record_reader::RecordReader;
use rust_decimal::Decimal;
use std::fs::File;

fn fixture_records() -> Vec<ExceptionRecord> {
    let file = File::open("tests/fixtures/exceptions.csv").unwrap();
    RecordReader::new(file)
        .records()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_status_order_holds_for_any_permutation() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut records = fixture_records();

    for _ in 0..200 {
        records.shuffle(&mut rng);
        let sorted = query::query_records(&records, &RecordFilter::default(), SortKey::Status);
        assert_eq!(sorted.len(), records.len());
        assert!(
            sorted
                .windows(2)
                .all(|pair| pair[0].status().priority() <= pair[1].status().priority()),
            "status ordering violated: {:?}",
            sorted.iter().map(|r| r.status()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_recent_and_amount_orders_are_descending() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut records = fixture_records();

    for _ in 0..100 {
        records.shuffle(&mut rng);
        let recent = query::query_records(&records, &RecordFilter::default(), SortKey::Recent);
        assert!(recent.windows(2).all(|p| p[0].timestamp >= p[1].timestamp));

        let amount = query::query_records(&records, &RecordFilter::default(), SortKey::Amount);
        assert!(amount.windows(2).all(|p| p[0].amount >= p[1].amount));
    }
}

#[test]
fn test_empty_filter_preserves_input_order() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut records = fixture_records();
    records.shuffle(&mut rng);

    let filter = RecordFilter::default();
    let filtered: Vec<&ExceptionRecord> = query::filter(&records, &filter).collect();
    assert_eq!(filtered, records.iter().collect::<Vec<_>>());
}

#[test]
fn test_aggregate_partitions_sum_to_total() {
    let mut rng = StdRng::seed_from_u64(42);
    let records = fixture_records();

    for _ in 0..50 {
        let take = rng.gen_range(0..=records.len());
        let subset: Vec<ExceptionRecord> = records.choose_multiple(&mut rng, take).cloned().collect();
        let counts = query::aggregate(&subset);
        assert_eq!(counts.total, subset.len());
        assert_eq!(
            counts.pending + counts.processing + counts.refund_success + counts.refund_failed,
            counts.total
        );
    }
}

#[test]
fn test_net_refund_never_negative_for_random_amounts() {
    let mut rng = StdRng::seed_from_u64(99);
    let fees = refund_recon::domain::fees::FeeSchedule::default();
    let currencies = ["USDC", "USDT", "ETH", "MATIC", "BNB", "XYZ", ""];
    let mut records = fixture_records();

    for record in records.iter_mut() {
        for _ in 0..50 {
            record.amount = Decimal::new(rng.gen_range(0..10_000_000), rng.gen_range(0..8));
            record.currency = currencies[rng.gen_range(0..currencies.len())].to_string();
            let summary = fees.calculate_net_refund(Some(record));
            assert!(summary.net_amount >= Decimal::ZERO);
            assert!(summary.net_amount <= record.amount);
        }
    }
}

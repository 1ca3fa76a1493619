use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 22] = [
    "id",
    "payment_order_id",
    "payment_order_amount",
    "payment_order_currency",
    "transaction_hash",
    "timestamp",
    "amount",
    "currency",
    "from_address",
    "to_address",
    "blockchain_network",
    "category",
    "status",
    "action",
    "error_message",
    "gas_fee",
    "gas_fee_token",
    "service_fee_paid_by",
    "refund_attempts",
    "last_attempt",
    "refund_block_reason",
    "refund_failure_reason",
];

/// A pending, unblocked automatic-refund record paid in `currency` on `network`.
pub fn pending_row(id: &str, amount: &str, currency: &str, network: &str) -> Vec<String> {
    let order_id = format!("ORDER-{id}");
    let hash = format!("0xhash{id}");
    let fields: [&str; 22] = [
        id,
        &order_id,
        "100",
        currency,
        &hash,
        "2026-03-01T12:00:00Z",
        amount,
        currency,
        "0xsender",
        "0xrecipient",
        network,
        "overpayment",
        "pending",
        "automatic_refund",
        "generated",
        "",
        "",
        "user",
        "0",
        "",
        "",
        "",
    ];
    fields.iter().map(|field| field.to_string()).collect()
}

pub fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let networks = ["Ethereum", "Polygon", "Arbitrum One", "Optimism", "BSC"];
    let rows: Vec<Vec<String>> = (1..=rows)
        .map(|i| {
            pending_row(
                &format!("gen-{i}"),
                &format!("{}.25", 10 + i),
                "USDC",
                networks[i % networks.len()],
            )
        })
        .collect();
    write_rows(path, &rows)
}

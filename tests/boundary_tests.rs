use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_refund_never_negative() {
    let file = tempfile::NamedTempFile::new().unwrap();
    common::write_rows(
        file.path(),
        &[
            common::pending_row("dust", "1", "USDC", "Ethereum"),
            common::pending_row("exact", "2", "USDT", "Ethereum"),
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("refund-recon"));
    cmd.arg(file.path()).arg("query");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("dust,ORDER-dust,pending,overpayment,automatic_refund,1.00,USDC,0.00,2.00,0.008000,ETH"))
        .stdout(predicate::str::contains("exact,ORDER-exact,pending,overpayment,automatic_refund,2.00,USDT,0.00,2.00,0.008000,ETH"));
}

#[test]
fn test_extreme_decimal_precision() {
    let file = tempfile::NamedTempFile::new().unwrap();
    common::write_rows(
        file.path(),
        &[common::pending_row("eth", "0.0001", "ETH", "Ethereum")],
    )
    .unwrap();

    let output = Command::new(cargo_bin!("refund-recon"))
        .arg(file.path())
        .args(["summary", "--id", "eth"])
        .output()
        .unwrap();
    assert!(output.status.success());

    // 2 USD at 2500 USD/ETH is 0.0008 ETH, more than was paid
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["service_fee"], "0.0008");
    assert_eq!(summary["net_amount"], "0");
}

#[test]
fn test_unknown_currency_and_network_fall_back() {
    let file = tempfile::NamedTempFile::new().unwrap();
    common::write_rows(
        file.path(),
        &[common::pending_row("dai", "50", "DAI", "Gnosis")],
    )
    .unwrap();

    let output = Command::new(cargo_bin!("refund-recon"))
        .arg(file.path())
        .args(["summary", "--id", "dai"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["service_fee"], "2");
    assert_eq!(summary["net_amount"], "48");
    assert_eq!(summary["gas_fee_we_pay_amount"], "0.001");
    assert_eq!(summary["gas_fee_we_pay_token"], "TOKEN");
}

#[test]
fn test_zero_amount_is_zeroed_summary() {
    let file = tempfile::NamedTempFile::new().unwrap();
    common::write_rows(
        file.path(),
        &[common::pending_row("zero", "0", "USDC", "Polygon")],
    )
    .unwrap();

    let output = Command::new(cargo_bin!("refund-recon"))
        .arg(file.path())
        .args(["summary", "--id", "zero"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["net_amount"], "0");
    assert_eq!(summary["service_fee"], "0");
    assert_eq!(summary["gas_fee_we_pay_amount"], "0");
    assert_eq!(summary["gas_fee_we_pay_token"], "TOKEN");
}

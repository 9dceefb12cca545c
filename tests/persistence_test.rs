#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(db_path: &Path, args: &[&str]) -> Output {
    let output = Command::new(cargo_bin!("wallet-engine"))
        .arg("--db-path")
        .arg(db_path)
        .args(args)
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: create a wallet
    let created = run(&db_path, &["create"]);
    let stdout = String::from_utf8_lossy(&created.stdout);
    let (id, balance) = stdout.trim().split_once(',').unwrap();
    assert_eq!(balance, "0.00");

    // 2. Second run: deposit into it
    let deposited = run(&db_path, &["deposit", id, "100.00"]);
    assert_eq!(String::from_utf8_lossy(&deposited.stdout).trim(), "100.00");

    // 3. Third run: replay against the stored wallet by id
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "type, wallet, amount").unwrap();
    writeln!(csv, "withdraw, {id}, 30.00").unwrap();
    writeln!(csv, "deposit, {id}, 5.50").unwrap();
    let replayed = run(&db_path, &["replay", csv.path().to_str().unwrap()]);
    assert!(String::from_utf8_lossy(&replayed.stdout).contains(&format!("{id},{id},75.50")));

    // 4. Fourth run: the balance survived every restart
    let read = run(&db_path, &["--strategy", "locking", "balance", id]);
    assert_eq!(String::from_utf8_lossy(&read.stdout).trim(), "75.50");
}

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_replay_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    for strategy in ["locking", "atomic"] {
        let mut cmd = Command::new(cargo_bin!("wallet-engine"));
        cmd.arg("--strategy")
            .arg(strategy)
            .arg("replay")
            .arg("tests/fixtures/operations.csv");

        cmd.assert()
            .success()
            .stdout(predicate::str::starts_with("wallet,id,balance"))
            .stdout(predicate::str::is_match(r"(?m)^alice,[0-9a-f-]{36},333\.33$")?)
            .stdout(predicate::str::is_match(r"(?m)^bob,[0-9a-f-]{36},1\.50$")?)
            .stderr(predicate::str::contains("Insufficient funds"));
    }

    Ok(())
}

#[test]
fn test_cli_create_prints_zero_balance() {
    let mut cmd = Command::new(cargo_bin!("wallet-engine"));
    cmd.arg("create");

    cmd.assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f-]{36},0\.00\n$").unwrap());
}

#[test]
fn test_cli_unknown_wallet_fails() {
    let mut cmd = Command::new(cargo_bin!("wallet-engine"));
    cmd.args(["deposit", "5f0c4f5e-8f43-4b8e-9d51-0a4c2b2a6d11", "1.00"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "Wallet with id 5f0c4f5e-8f43-4b8e-9d51-0a4c2b2a6d11 not found",
        ));
}

#[test]
fn test_cli_invalid_amount_fails() {
    let mut cmd = Command::new(cargo_bin!("wallet-engine"));
    cmd.args(["withdraw", "5f0c4f5e-8f43-4b8e-9d51-0a4c2b2a6d11", "-5"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Amount must be positive"));
}

#[test]
fn test_cli_rejects_malformed_wallet_id() {
    let mut cmd = Command::new(cargo_bin!("wallet-engine"));
    cmd.args(["balance", "not-a-uuid"]);

    cmd.assert().failure();
}

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("paytrack"));
    cmd.arg("tests/fixtures/commands.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "payment,payer,payee,provider,status,expected,confirmed,discrepancy,flagged,reason",
        ))
        // Short-paid confirmation is flagged
        .stdout(predicate::str::contains(
            "p1,parent,child,VENMO,CONFIRMED,25.00,20.00,-5.00,true,",
        ))
        .stdout(predicate::str::contains(
            "p2,parent,child,CASHAPP,DISPUTED,10.00,,,,NEVER_RECEIVED",
        ))
        .stdout(predicate::str::contains("p3,parent,child,ZELLE,CREATED,5.00,,,,"))
        // Omitted amount confirms the expected one
        .stdout(predicate::str::contains(
            "p4,parent,child,PAYPAL,CONFIRMED,12.50,12.50,0.00,false,",
        ));

    Ok(())
}

#[test]
fn test_cli_rows_sorted_by_payment() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::new(cargo_bin!("paytrack"))
        .arg("tests/fixtures/commands.csv")
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let ids: Vec<&str> = stdout
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(ids, ["p1", "p2", "p3", "p4"]);

    Ok(())
}

#[test]
fn test_cli_missing_input_fails() {
    Command::new(cargo_bin!("paytrack"))
        .arg("tests/fixtures/does_not_exist.csv")
        .assert()
        .failure();
}

#[test]
fn test_cli_delivers_every_notification_before_exit() -> Result<(), Box<dyn std::error::Error>> {
    // Two transitions each for p1, p2 and p4; creation does not notify.
    for _ in 0..5 {
        let output = Command::new(cargo_bin!("paytrack"))
            .arg("tests/fixtures/commands.csv")
            .env("RUST_LOG", "info")
            .output()?;
        assert!(output.status.success());

        let stderr = String::from_utf8(output.stderr)?;
        assert_eq!(stderr.matches("notification queued").count(), 6);
        assert!(!stderr.contains("notification dispatch failed"));
    }

    Ok(())
}

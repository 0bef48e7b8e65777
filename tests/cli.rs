use super::*;

#[test]
fn shares_without_ledger_reports_zero() {
    let builder = CommandBuilder::new("shares");
    let path = builder.tempdir().join(soloist::ledger::LEDGER_FILE_NAME);

    let output = builder.run_and_deserialize_output::<Value>();

    assert_eq!(
        output,
        json!({
            "path": path,
            "total": 0,
            "updated": null,
        })
    );
}

#[test]
fn shares_reads_explicit_ledger() {
    let tempdir = TempDir::new().unwrap();
    let path = tempdir.path().join("shares.json");
    ShareLedger::write(&path, 7).unwrap();

    let output = CommandBuilder::new(vec![
        "--ledger".to_string(),
        path.display().to_string(),
        "shares".to_string(),
    ])
    .run_and_deserialize_output::<Value>();

    assert_eq!(output["total"], json!(7));
    assert!(output["updated"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn ledger_from_environment() {
    let tempdir = TempDir::new().unwrap();
    let path = tempdir.path().join("env.json");
    ShareLedger::write(&path, 3).unwrap();

    let output = CommandBuilder::new("shares")
        .env("SOLOIST_LEDGER", path.to_str().unwrap())
        .run_and_deserialize_output::<Value>();

    assert_eq!(output["total"], json!(3));
}

#[test]
fn mine_requires_username() {
    let (_, stderr) = CommandBuilder::new("--stratum-endpoint 127.0.0.1:3333 mine")
        .expected_exit_code(1)
        .run();

    assert!(stderr.contains("error: no username"), "{stderr}");
}

#[test]
fn mine_requires_endpoint() {
    let (_, stderr) = CommandBuilder::new("--username bc1qexample mine")
        .expected_exit_code(1)
        .run();

    assert!(stderr.contains("error: no stratum endpoint"), "{stderr}");
}

#[test]
fn invalid_environment_variable() {
    let (_, stderr) = CommandBuilder::new("shares")
        .env("SOLOIST_BATCH_SIZE", "lots")
        .expected_exit_code(1)
        .run();

    assert!(
        stderr.contains("failed to parse environment variable SOLOIST_BATCH_SIZE as u32"),
        "{stderr}"
    );
}

#[test]
fn config_file_is_loaded() {
    let tempdir = TempDir::new().unwrap();
    let ledger = tempdir.path().join("from-config.json");
    ShareLedger::write(&ledger, 11).unwrap();

    let config = tempdir.path().join("soloist.toml");
    fs::write(&config, format!("ledger = {:?}\n", ledger.display().to_string())).unwrap();

    let output = CommandBuilder::new(vec![
        "--config-dir".to_string(),
        tempdir.path().display().to_string(),
        "shares".to_string(),
    ])
    .run_and_deserialize_output::<Value>();

    assert_eq!(output["total"], json!(11));
}

#[test]
fn unknown_config_key_fails() {
    let tempdir = TempDir::new().unwrap();
    let config = tempdir.path().join("custom.toml");
    fs::write(&config, "difficulty = 1\n").unwrap();

    let (_, stderr) = CommandBuilder::new(vec![
        "--config".to_string(),
        config.display().to_string(),
        "shares".to_string(),
    ])
    .expected_exit_code(1)
    .run();

    assert!(stderr.contains("failed to deserialize config file"), "{stderr}");
}

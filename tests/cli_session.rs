use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use serde_json::{Value, json};

fn setup_fixture(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let docs = json!([
        {"id": "A", "title": "River flood", "text": "flood waters rising near the bridge",
         "trust": 0.9, "pogo": 0, "timestamp": 1_700_000_000, "reporter": "county"},
        {"id": "B", "title": "Flood relief", "text": "volunteers needed",
         "trust": 0.5, "pogo": 4},
        {"id": "C", "title": "Town fair", "text": "rides and games", "trust": "0.7"},
    ]);
    std::fs::write(
        data_dir.join("documents.json"),
        serde_json::to_string_pretty(&docs)?,
    )?;
    Ok(())
}

fn beacon(data_dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(beacon_bin())
        .args(args)
        .env("BEACON_DATA_DIR", data_dir)
        .env("BEACON_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn beacon");

    {
        let mut pipe = child.stdin.take().expect("stdin");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }

    let output = child.wait_with_output().expect("wait for beacon");
    assert!(
        output.status.success(),
        "beacon {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stored_docs(data_dir: &Path) -> Value {
    let content =
        std::fs::read_to_string(data_dir.join("documents.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn search_json_ranks_emergency_match() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let output = beacon(tempdir.path(), &["search", "Flod waters", "--json"], None);
    let result: Value = serde_json::from_slice(&output.stdout)?;

    assert_eq!(result["corrected_query"], json!("flood waters"));
    assert_eq!(result["emergency"], json!(true));
    assert_eq!(result["result_count"], json!(1));
    assert_eq!(result["results"][0]["id"], json!("A"));
    let score = result["results"][0]["score"].as_f64().unwrap();
    assert!((score - 1.17).abs() < 1e-9);
    Ok(())
}

#[test]
fn browse_quick_return_penalizes_document()
-> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    // Lines are consumed immediately, so the dwell is well under 8 seconds.
    let output = beacon(
        tempdir.path(),
        &["browse"],
        Some("flood waters\nopen 1\nback\nquit\n"),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Quick return detected"), "{stdout}");

    let docs = stored_docs(tempdir.path());
    assert_eq!(docs[0]["id"], json!("A"));
    assert_eq!(docs[0]["pogo"], json!(1));
    assert_eq!(docs[0]["reporter"], json!("county"));
    assert_eq!(docs[1]["pogo"], json!(4));
    Ok(())
}

#[test]
fn browse_open_another_result_counts_as_return()
-> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    // "flood" ranks A first (1.17) and B second (0.52).
    let output = beacon(
        tempdir.path(),
        &["browse"],
        Some("flood\nopen 1\nopen 2\nquit\n"),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Quick return detected").count(), 2, "{stdout}");

    let docs = stored_docs(tempdir.path());
    assert_eq!(docs[0]["pogo"], json!(1));
    assert_eq!(docs[1]["pogo"], json!(5));
    Ok(())
}

#[test]
fn zero_threshold_never_penalizes()
-> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    beacon(tempdir.path(), &["settings", "set", "pogo_threshold_secs", "0"], None);
    let output = beacon(
        tempdir.path(),
        &["browse"],
        Some("relief\nopen 1\nback\nquit\n"),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no penalty"), "{stdout}");

    let docs = stored_docs(tempdir.path());
    assert_eq!(docs[1]["pogo"], json!(4));
    Ok(())
}

#[test]
fn normalize_rewrites_store_canonically()
-> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    beacon(tempdir.path(), &["normalize"], None);

    let docs = stored_docs(tempdir.path());
    assert_eq!(docs[0]["timestamp"], json!("2023-11-14T22:13:20+00:00"));
    assert_eq!(docs[1]["timestamp"], json!(""));
    assert_eq!(docs[2]["trust"], json!(0.7));
    assert_eq!(docs[2]["source"], json!("unknown"));
    assert_eq!(docs[0]["reporter"], json!("county"));
    Ok(())
}

#[test]
fn settings_roundtrip_through_config_db()
-> Result<(), Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;

    beacon(tempdir.path(), &["settings", "set", "freshness", "on"], None);
    let output = beacon(tempdir.path(), &["settings", "show", "--json"], None);
    let settings: Value = serde_json::from_slice(&output.stdout)?;

    assert_eq!(settings["freshness"], json!(true));
    assert_eq!(settings["pogo_threshold_secs"], json!(8.0));
    assert_eq!(settings["preview_chars"], json!(250));

    beacon(tempdir.path(), &["settings", "clear", "freshness"], None);
    let output = beacon(tempdir.path(), &["settings", "show", "--json"], None);
    let settings: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(settings["freshness"], json!(false));
    Ok(())
}

fn beacon_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_beacon"))
}

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn uow_gen() -> Command {
    Command::cargo_bin("uow-gen").unwrap()
}

#[test]
fn cadence_tasks_are_printed_as_json() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params.toml");
    fs::write(
        &params,
        r#"
[cadence_range]
start_cadence = 0
end_cadence = 9
number_of_bins = 4
minimum_bin_size = 3

[cadence_type]
cadence_type = "long"
"#,
    )
    .unwrap();

    let output = uow_gen()
        .args(["cadence", "--params"])
        .arg(&params)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(output.status.success());

    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        tasks,
        serde_json::json!([
            { "start_cadence": 0, "end_cadence": 3 },
            { "start_cadence": 4, "end_cadence": 6 },
            { "start_cadence": 7, "end_cadence": 9 },
        ])
    );
}

#[test]
fn target_table_binning_reads_pixel_logs() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params.toml");
    fs::write(
        &params,
        r#"
[cadence_range]
start_cadence = 5
end_cadence = 14
bin_by_target_table = true

[cadence_type]
cadence_type = "short"
"#,
    )
    .unwrap();

    let logs: Vec<serde_json::Value> = (0..20)
        .map(|cadence| {
            serde_json::json!({
                "cadence_type": "short",
                "cadence_number": cadence,
                "sc_target_table_id": 30 + cadence / 10,
            })
        })
        .collect();
    let pixel_logs = dir.path().join("pixel_logs.json");
    fs::write(&pixel_logs, serde_json::to_string(&logs).unwrap()).unwrap();

    let output = uow_gen()
        .args(["cadence", "--params"])
        .arg(&params)
        .arg("--pixel-logs")
        .arg(&pixel_logs)
        .output()
        .unwrap();
    assert!(output.status.success());

    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        tasks,
        serde_json::json!([
            { "start_cadence": 5, "end_cadence": 9, "target_table_id": 30 },
            { "start_cadence": 10, "end_cadence": 14, "target_table_id": 31 },
        ])
    );
}

#[test]
fn kepler_id_chunks_from_catalog() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params.toml");
    fs::write(
        &params,
        r#"
[kepler_id_range]
start_kepler_id = 0
end_kepler_id = 1000

[kepler_id_chunk]
chunk_size = 0

[sky_group_id_lists]
"#,
    )
    .unwrap();
    let catalog = dir.path().join("catalog.json");
    fs::write(&catalog, r#"{"10": 1, "11": 1, "12": 2, "2000": 2}"#).unwrap();

    let output = uow_gen()
        .args(["kepler-id-chunk", "--params"])
        .arg(&params)
        .arg("--catalog")
        .arg(&catalog)
        .output()
        .unwrap();
    assert!(output.status.success());

    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        tasks,
        serde_json::json!([
            { "sky_group_id": 1, "start_kepler_id": 10, "end_kepler_id": 11 },
            { "sky_group_id": 2, "start_kepler_id": 12, "end_kepler_id": 12 },
        ])
    );
}

#[test]
fn missing_parameter_sections_fail_with_their_names() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params.toml");
    fs::write(&params, "[module_output_lists]\n").unwrap();

    uow_gen()
        .args(["mod-out-cadence", "--params"])
        .arg(&params)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "missing required parameters: cadence_range, cadence_type",
        ));
}

#[test]
fn show_required_lists_sections() {
    uow_gen()
        .args(["mod-out-cadence", "--show-required"])
        .assert()
        .success()
        .stdout("module_output_lists\ncadence_range\ncadence_type\n");
}

#[test]
fn logs_go_to_stderr() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params.toml");
    fs::write(&params, "[module_output_lists]\nchannels_per_task = 0\n").unwrap();

    uow_gen()
        .args(["mod-out", "--params"])
        .arg(&params)
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[{\"module_outputs\":"))
        .stderr(predicate::str::contains("generated unit of work tasks"));
}

use crate::fixture_path;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn autogen(out: &Path, extra: &[&str]) -> assert_cmd::assert::Assert {
    let input = fixture_path("autogen");
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args([
        "autogen",
        input.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ]);
    cmd.args(extra);
    cmd.assert()
}

fn read_yaml(path: &Path) -> serde_yaml::Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&content).unwrap()
}

#[test]
fn converts_every_description_file() {
    let tmp = tempfile::tempdir().unwrap();
    autogen(tmp.path(), &["--version", "1.60.0"])
        .success()
        .stderr(predicate::str::contains("Converted 2 generated resources"));

    let tracker = read_yaml(&tmp.path().join("resource_huaweicloud_cts_tracker.yaml"));
    assert_eq!(tracker["info"]["title"].as_str(), Some("resource_huaweicloud_cts_tracker"));
    assert_eq!(tracker["info"]["version"].as_str(), Some("1.60.0"));
    assert_eq!(tracker["host"].as_str(), Some("myhuaweicloud.com"));
    assert_eq!(
        tracker["servers"][0]["url"].as_str(),
        Some("https://cts.cn-north-4.myhuaweicloud.com")
    );
    assert_eq!(tracker["tags"].as_sequence().unwrap().len(), 1);
    assert_eq!(tracker["tags"][0]["name"].as_str(), Some("CTS"));

    let paths = &tracker["paths"];
    assert_eq!(paths.as_mapping().unwrap().len(), 2);
    let tracker_ops = &paths["/v3/{project_id}/tracker"];
    assert_eq!(tracker_ops["post"]["operationId"].as_str(), Some("createTracker"));
    assert_eq!(tracker_ops["put"]["tag"].as_str(), Some("CTS"));
    // keyed by the referenced API, not by the description's own path
    let trackers_ops = &paths["/v3/{project_id}/trackers"];
    assert_eq!(trackers_ops["delete"]["operationId"].as_str(), Some("deleteTracker"));
    assert_eq!(trackers_ops["get"]["operationId"].as_str(), Some("showTrackers"));

    let domains = read_yaml(&tmp.path().join("data_source_huaweicloud_aad_domains.yaml"));
    assert_eq!(
        domains["paths"]["/v1/aad/protected-domains"]["get"]["tag"].as_str(),
        Some("AAD")
    );
}

#[test]
fn schema_and_provider_select_documents() {
    let tmp = tempfile::tempdir().unwrap();
    let schema = tmp.path().join("schema.json");
    std::fs::write(
        &schema,
        r#"{"provider_schemas": {"registry.terraform.io/g42cloud/g42cloud": {
            "resource_schemas": {"g42cloud_cts_tracker": {"block": {}}},
            "data_source_schemas": {}
        }}}"#,
    )
    .unwrap();
    let out = tmp.path().join("api");

    autogen(
        &out,
        &[
            "--provider",
            "g42cloud",
            "--schema",
            schema.to_str().unwrap(),
            "--format",
            "json",
            "--quiet",
        ],
    )
    .success()
    .stderr(predicate::str::contains("Converted").not());

    let names: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["resource_g42cloud_cts_tracker.json"]);

    let content = std::fs::read_to_string(out.join("resource_g42cloud_cts_tracker.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["info"]["title"], "resource_g42cloud_cts_tracker");
}

#[test]
fn empty_input_directory_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    Command::cargo_bin("apiscan")
        .unwrap()
        .args([
            "autogen",
            input.to_str().unwrap(),
            "--output-dir",
            tmp.path().join("out").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No resource files found"));
}

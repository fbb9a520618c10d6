use crate::fixture_path;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn scan(out: &Path, extra: &[&str]) -> assert_cmd::assert::Assert {
    let provider = fixture_path("provider");
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args([
        "scan",
        "--path",
        provider.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--quiet",
    ]);
    cmd.args(extra);
    cmd.assert()
}

fn read_yaml(path: &Path) -> serde_yaml::Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&content).unwrap()
}

#[test]
fn writes_one_document_per_resource() {
    let tmp = tempfile::tempdir().unwrap();
    scan(tmp.path(), &[]).success();

    let mut names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "resource_huaweicloud_antiddos_basic.yaml",
            "resource_huaweicloud_aom_alarm_rule.yaml",
            "resource_huaweicloud_compute_servergroup.yaml",
            "resource_huaweicloud_dns_custom_line.yaml",
            "resource_huaweicloud_obs_bucket.yaml",
            "skip_files.txt",
        ]
    );
}

#[test]
fn rest_calls_follow_client_through_helpers() {
    let tmp = tempfile::tempdir().unwrap();
    scan(tmp.path(), &[]).success();

    let doc = read_yaml(&tmp.path().join("resource_huaweicloud_antiddos_basic.yaml"));
    assert_eq!(doc["info"]["title"].as_str(), Some("resource_huaweicloud_antiddos_basic"));
    assert_eq!(doc["host"].as_str(), Some("huaweicloud.com"));
    assert_eq!(doc["tags"][0]["name"].as_str(), Some("antiddos"));

    let paths = &doc["paths"];
    let list = &paths["/v1/{project_id}/antiddos"]["get"];
    assert_eq!(list["operationId"].as_str(), Some("ListStatus"));
    assert_eq!(list["tag"].as_str(), Some("antiddos"));

    // resolved through deleteProtection's caller
    let delete = &paths["/v1/{project_id}/antiddos/{floatingIpId}"]["delete"];
    assert_eq!(delete["operationId"].as_str(), Some("Delete"));
    assert_eq!(delete["tag"].as_str(), Some("antiddos"));
}

#[test]
fn tag_calls_keep_project_scope() {
    let tmp = tempfile::tempdir().unwrap();
    scan(tmp.path(), &[]).success();

    let doc = read_yaml(&tmp.path().join("resource_huaweicloud_compute_servergroup.yaml"));
    let action = &doc["paths"]["/v1/{project_id}/cloudservers/{id}/tags/action"];
    assert_eq!(action["post"]["tag"].as_str(), Some("ecs"));
    // the SDK call is seen before the helper and wins the merge
    assert_eq!(action["post"]["operationId"].as_str(), Some("Create"));
    assert_eq!(doc["paths"].as_mapping().unwrap().len(), 1);
}

#[test]
fn generated_sdk_calls_resolve() {
    let tmp = tempfile::tempdir().unwrap();
    scan(tmp.path(), &[]).success();

    let content =
        std::fs::read_to_string(tmp.path().join("resource_huaweicloud_aom_alarm_rule.yaml"))
            .unwrap();
    assert!(content.contains("alarm-rules"));
    assert!(content.contains("operationId: AddAlarmRule"));
    assert!(content.contains("tag: aom"));
}

#[test]
fn annotations_and_pending_upgrades() {
    let tmp = tempfile::tempdir().unwrap();
    scan(tmp.path(), &[]).success();

    let dns = read_yaml(&tmp.path().join("resource_huaweicloud_dns_custom_line.yaml"));
    assert_eq!(dns["tags"][0]["name"].as_str(), Some("DNS"));
    assert!(dns["paths"]["/v2.1/customlines"]["post"].is_mapping());
    assert!(dns["paths"]["/v2.1/customlines/{line_id}"]["get"].is_mapping());
    assert_eq!(dns["paths"].as_mapping().unwrap().len(), 2);

    let obs = read_yaml(&tmp.path().join("resource_huaweicloud_obs_bucket.yaml"));
    assert!(obs["info"]["description"]
        .as_str()
        .unwrap()
        .contains("waiting to be upgraded"));
    assert_eq!(obs["tags"][0]["name"].as_str(), Some("OBS"));
}

#[test]
fn skip_list_records_reasons() {
    let tmp = tempfile::tempdir().unwrap();
    scan(tmp.path(), &[]).success();

    let skipped = std::fs::read_to_string(tmp.path().join("skip_files.txt")).unwrap();
    assert!(skipped.contains("resource_huaweicloud_ecs_instance_v1.go: deprecated"));
    assert!(skipped.contains("resource_huaweicloud_helper.go: under skipped directory utils"));
    assert_eq!(skipped.lines().count(), 2);
}

#[test]
fn provider_and_format_flags() {
    let tmp = tempfile::tempdir().unwrap();
    scan(
        tmp.path(),
        &[
            "--provider",
            "g42cloud",
            "--format",
            "json",
            "--version",
            "1.40.0",
            "--filter",
            "antiddos",
        ],
    )
    .success();

    let path = tmp.path().join("resource_g42cloud_antiddos_basic.json");
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(doc["info"]["version"], "1.40.0");
    assert_eq!(doc["info"]["title"], "resource_g42cloud_antiddos_basic");
    assert_eq!(doc["schemes"][0], "https");
    assert!(!tmp
        .path()
        .join("resource_g42cloud_compute_servergroup.json")
        .exists());
}

#[test]
fn exclude_flag_skips_files() {
    let tmp = tempfile::tempdir().unwrap();
    scan(tmp.path(), &["--exclude", "services/**"]).success();

    assert!(!tmp
        .path()
        .join("resource_huaweicloud_aom_alarm_rule.yaml")
        .exists());
    let skipped = std::fs::read_to_string(tmp.path().join("skip_files.txt")).unwrap();
    assert!(skipped.contains("excluded by pattern"));
}

#[test]
fn missing_config_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("huaweicloud")).unwrap();
    let out = tmp.path().join("api");

    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["scan", "--path", tmp.path().to_str().unwrap(), "--quiet"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("provider config file"));
    assert!(!out.exists());
}

#[test]
fn progress_summary_unless_quiet() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = fixture_path("provider");
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args([
        "scan",
        "--path",
        provider.to_str().unwrap(),
        "--output-dir",
        tmp.path().to_str().unwrap(),
    ]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Wrote 5 documents"));
}

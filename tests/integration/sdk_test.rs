use crate::fixture_path;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn rest_package_table() {
    let dir = fixture_path("provider/vendor/github.com/chnsz/golangsdk/openstack/antiddos/v1/antiddos");
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["sdk", dir.to_str().unwrap(), "--format", "json"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["convention"], "rest");
    assert_eq!(report["functions"]["ListStatus"]["url"], "antiddos");
    assert_eq!(report["functions"]["ListStatus"]["method"], "get");
    assert_eq!(report["functions"]["Delete"]["url"], "antiddos/{floatingIpId}");
    assert_eq!(report["functions"]["Delete"]["method"], "delete");
}

#[test]
fn generated_package_table() {
    let dir = fixture_path(
        "provider/vendor/github.com/huaweicloud/huaweicloud-sdk-go-v3/services/aom/v2",
    );
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["sdk", dir.to_str().unwrap(), "--format", "json"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["convention"], "generated");
    let add = &report["functions"]["AddAlarmRule"];
    assert_eq!(add["url"], "/v2/{project_id}/alarm-rules");
    assert_eq!(add["method"], "post");
    assert!(report["functions"].get("NewAomClient").is_none());
}

#[test]
fn yaml_is_the_default_format() {
    let dir = fixture_path("provider/vendor/github.com/chnsz/golangsdk/openstack/common/tags");
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["sdk", dir.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("convention: rest"))
        .stdout(predicate::str::contains("Create:"))
        .stdout(predicate::str::contains("method: post"));
}

#[test]
fn unknown_directory_layout_fails() {
    let dir = fixture_path("provider/huaweicloud/config");
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["sdk", dir.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not an SDK package directory"));
}

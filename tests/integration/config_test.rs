use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn config_show_defaults() {
    // No config file present: shows all defaults
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["config", "show", "--path", tmp.path().to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Loaded config files: (none)"))
        .stdout(predicate::str::contains("Resolved settings:"))
        .stdout(predicate::str::contains("defaults.format: yaml <- default"))
        .stdout(predicate::str::contains("defaults.provider: huaweicloud <- default"))
        .stdout(predicate::str::contains("paths.vendor_dir: vendor <- default"));
}

#[test]
fn config_show_with_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".apiscan.toml"),
        r#"
[defaults]
format = "json"
provider = "g42cloud"

[paths]
vendor_dir = "third_party"
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["config", "show", "--path", tmp.path().to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(".apiscan.toml"))
        .stdout(predicate::str::contains("defaults.format: json <- project config"))
        .stdout(predicate::str::contains(
            "defaults.provider: g42cloud <- project config",
        ))
        .stdout(predicate::str::contains(
            "paths.vendor_dir: third_party <- project config",
        ));
}

#[test]
fn config_show_section() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["config", "show", "sdk", "--path", tmp.path().to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sdk.rest_prefix"))
        .stdout(predicate::str::contains("defaults.format").not());
}

#[test]
fn config_rejects_unknown_keys() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join(".apiscan.toml"),
        "[rules]\nthreshold = 3\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("apiscan").unwrap();
    cmd.args(["config", "show", "--path", tmp.path().to_str().unwrap()]);
    cmd.assert().failure();
}

//! CLI surface tests
//!
//! The flag names and the exit-status contract (0 on success, 1 on any
//! validation or orchestration failure) are part of the tool's interface.

use assert_cmd::Command;
use predicates::prelude::*;

fn aliawan() -> Command {
    let mut cmd = Command::cargo_bin("aliawan").unwrap();
    // Keep the test hermetic from any operator credentials in the
    // environment.
    cmd.env_remove("ALIBABA_CLOUD_ACCESS_KEY_ID")
        .env_remove("ALIBABA_CLOUD_ACCESS_KEY_SECRET");
    cmd
}

#[test]
fn no_subcommand_prints_usage_and_succeeds() {
    aliawan()
        .assert()
        .success()
        .stdout(predicate::str::contains("Aliawan"))
        .stdout(predicate::str::contains("aliawan images"))
        .stdout(predicate::str::contains("aliawan slb"));
}

#[test]
fn help_lists_both_subcommands() {
    aliawan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("images"))
        .stdout(predicate::str::contains("slb"));
}

#[test]
fn images_without_newname_exits_one() {
    aliawan()
        .arg("images")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Please provide new image name with --newname",
        ));
}

#[test]
fn images_without_oldname_exits_one() {
    aliawan()
        .args(["images", "--newname", "app-v2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Please provide old image name with --oldname",
        ));
}

#[test]
fn images_without_credentials_exits_one_before_any_network_call() {
    aliawan()
        .args(["images", "--oldname", "app-v1", "--newname", "app-v2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Credential"));
}

#[test]
fn slb_without_vgroupname_exits_one() {
    aliawan()
        .arg("slb")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Please provide VGroup Name with --vgroupname",
        ));
}

#[test]
fn slb_without_port_exits_one() {
    aliawan()
        .args(["slb", "--vgroupname", "web"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("--slbport"));
}

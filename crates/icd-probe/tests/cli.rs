use std::fs;
use std::path::PathBuf;

use assert_cmd::Command; // Bring Command into scope
use predicates::prelude::*; // Bring predicate traits into scope
use tempfile::tempdir;

use icd_probe::library::{driver_file_name, DriverLibrary};
use icd_probe::IcdManifest;

#[test]
fn test_symbols_lists_global_table() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.arg("symbols");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("vkCreateInstance"))
        .stdout(predicate::str::contains("vkEnumerateInstanceVersion"))
        .stdout(predicate::str::contains("vkDestroyInstance").not());

    Ok(())
}

#[test]
fn test_symbols_lists_device_extension_tables() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.args(["symbols", "--scope", "device"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("vkCreateSwapchainKHR"))
        .stdout(predicate::str::contains("vkGetDeviceQueue2"));

    Ok(())
}

#[test]
fn test_check_config_summarises_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("fixture.json");
    fs::write(
        &path,
        r#"{ "min_interface_version": 3, "enable_icd_wsi": true,
             "physical_devices": [ { "name": "A" }, { "name": "B" } ],
             "groups": [ { "devices": ["A", "B"] } ] }"#,
    )?;

    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.arg("check-config").arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("interface versions: 3-6"))
        .stdout(predicate::str::contains("physical devices: 2"))
        .stdout(predicate::str::contains("groups: 1"))
        .stdout(predicate::str::contains("driver-provided WSI: yes"));

    Ok(())
}

#[test]
fn test_check_config_reports_errors() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("fixture.json");
    fs::write(&path, r#"{ "groups": [ { "devices": ["ghost"] } ] }"#)?;

    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.arg("check-config").arg(&path);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown device 'ghost'"));

    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.arg("check-config").arg(dir.path().join("absent.json"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read fixture file"));

    Ok(())
}

#[test]
fn test_manifest_written_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("mock_icd.json");

    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.args(["manifest", "--library", "/opt/mock/libmock_icd.so", "--api-version", "1.2", "--output"])
        .arg(&output);
    cmd.assert().success();

    let manifest = IcdManifest::read_from(&output)?;
    assert_eq!(manifest.file_format_version, "1.0.1");
    assert_eq!(manifest.icd.library_path, PathBuf::from("/opt/mock/libmock_icd.so"));
    assert_eq!(manifest.icd.api_version, "1.2.0");
    Ok(())
}

#[test]
fn test_manifest_rejects_bad_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.args(["manifest", "--library", "libmock_icd.so", "--api-version", "one"]);
    cmd.assert().failure().stderr(predicate::str::contains("one"));
    Ok(())
}

#[test]
fn test_negotiate_with_missing_library() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.args(["negotiate", "--library", "/nonexistent/libmock_icd.so"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to load driver library"));
    Ok(())
}

/// Builds the driver library next to this test binary's target directory.
fn build_driver() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let status = std::process::Command::new(env!("CARGO"))
        .args(["build", "-p", "mock-icd"])
        .status()?;
    if !status.success() {
        return Err("building mock-icd failed".into());
    }
    let target = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target"));
    Ok(target.join("debug").join(driver_file_name()))
}

#[test]
#[ignore = "shells out to cargo to build the driver library"]
fn test_loads_built_driver() -> Result<(), Box<dyn std::error::Error>> {
    let path = build_driver()?;
    let library = unsafe { DriverLibrary::open(&path) }?;
    assert!(library.exports("vk_icdGetInstanceProcAddr"));
    assert!(library.exports("reset_icd_func"));

    let negotiation = library.negotiate(9)?;
    assert_eq!(negotiation.result, ash::vk::Result::SUCCESS);
    assert_eq!(negotiation.version, 6);
    assert!(library.instance_proc_addr(ash::vk::Instance::null(), "vkCreateInstance")?.is_some());
    assert!(library.instance_proc_addr(ash::vk::Instance::null(), "vkQueueSubmit")?.is_none());

    let mut cmd = Command::cargo_bin("icd-probe")?;
    cmd.args(["resolve", "--library"])
        .arg(&path)
        .args(["vkCreateInstance", "vkBogus"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("vkBogus = null"))
        .stdout(predicate::str::contains("vkCreateInstance = 0x"));
    Ok(())
}

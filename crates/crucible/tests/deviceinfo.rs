use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use crucible_bootstrap::parse::deviceinfo;

fn write_deviceinfo(tmp: &TempDir, content: &str) -> PathBuf {
    let path = tmp.path().join("deviceinfo");
    fs::write(&path, content).expect("write deviceinfo");
    path
}

#[test]
fn projects_prefixed_attributes() {
    let tmp = TempDir::new().expect("tempdir");
    let path = write_deviceinfo(
        &tmp,
        r#"deviceinfo_name="Test Device"
deviceinfo_manufacturer="Test"
deviceinfo_arch="armhf"
deviceinfo_keyboard="true"
deviceinfo_flash_methods="fastboot"
"#,
    );

    let info = deviceinfo(&path).expect("parse deviceinfo");
    assert_eq!(info.get("name"), "Test Device");
    assert_eq!(info.get("arch"), "armhf");
    assert_eq!(info.get("flash_methods"), "fastboot");
    // Attributes the file never set are present, but empty.
    assert_eq!(info.get("kernel_cmdline"), "");
}

#[test]
fn missing_name_or_arch_is_rejected() {
    let tmp = TempDir::new().expect("tempdir");
    let path = write_deviceinfo(&tmp, "deviceinfo_name=\"Test Device\"\n");

    let err = deviceinfo(&path).expect_err("missing arch must fail");
    assert!(err.to_string().contains("deviceinfo_arch"));
}

#[test]
fn unknown_flash_method_is_rejected() {
    let tmp = TempDir::new().expect("tempdir");
    let path = write_deviceinfo(
        &tmp,
        r#"deviceinfo_name="Test Device"
deviceinfo_arch="armhf"
deviceinfo_flash_methods="fastboot warpdrive"
"#,
    );

    let err = deviceinfo(&path).expect_err("unknown method must fail");
    assert!(err.to_string().contains("warpdrive"));
}

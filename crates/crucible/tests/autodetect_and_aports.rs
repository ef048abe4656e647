use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crucible_bootstrap::build::autodetect::{self, CrossCompile};
use crucible_bootstrap::build::find_aport;
use crucible_bootstrap::config::Config;
use crucible_bootstrap::parse::{Apkbuild, apkbuild};
use crucible_bootstrap::session::Session;

fn write_aport(root: &Path, repo: &str, pkgname: &str, content: &str) {
    let dir = root.join(repo).join(pkgname);
    fs::create_dir_all(&dir).expect("create aport dir");
    fs::write(dir.join("APKBUILD"), content).expect("write APKBUILD");
}

fn session_for(aports: &TempDir) -> Session {
    let mut config = Config::default();
    config.aports = aports.path().to_path_buf();
    Session::new(config)
}

/// A target arch that is guaranteed to differ from the test host.
fn foreign_arch(session: &Session) -> &'static str {
    if session.arch_native == "armhf" {
        "aarch64"
    } else {
        "armhf"
    }
}

fn parse(session: &mut Session, pkgname: &str) -> Apkbuild {
    let aport = find_aport(session, pkgname).expect("find aport");
    apkbuild(session, &aport.join("APKBUILD")).expect("parse APKBUILD")
}

#[test]
fn find_aport_locates_nested_packages() {
    let tmp = TempDir::new().expect("tempdir");
    write_aport(tmp.path(), "main", "hello", "pkgname=\"hello\"\n");

    let session = session_for(&tmp);
    let found = find_aport(&session, "hello").expect("aport exists");
    assert!(found.ends_with("main/hello"));

    assert!(find_aport(&session, "missing").is_err());
}

#[test]
fn noarch_package_builds_for_the_native_arch() {
    let tmp = TempDir::new().expect("tempdir");
    write_aport(
        tmp.path(),
        "main",
        "hello",
        "pkgname=\"hello\"\narch=\"noarch\"\n",
    );

    let mut session = session_for(&tmp);
    let native = session.arch_native.clone();
    assert_eq!(autodetect::arch(&mut session, "hello").expect("arch"), native);
}

#[test]
fn arch_specific_package_uses_the_first_listed_arch() {
    let tmp = TempDir::new().expect("tempdir");
    write_aport(
        tmp.path(),
        "device",
        "device-test",
        "pkgname=\"device-test\"\narch=\"armhf aarch64\"\n",
    );

    let mut session = session_for(&tmp);
    assert_eq!(
        autodetect::arch(&mut session, "device-test").expect("arch"),
        "armhf"
    );
}

#[test]
fn suffix_picks_the_build_environment() {
    let tmp = TempDir::new().expect("tempdir");
    write_aport(tmp.path(), "main", "hello", "pkgname=\"hello\"\n");
    write_aport(tmp.path(), "main", "foo-repack", "pkgname=\"foo-repack\"\n");
    write_aport(tmp.path(), "main", "linux-test", "pkgname=\"linux-test\"\n");

    let mut session = session_for(&tmp);
    session.config.cross = true;
    let native = session.arch_native.clone();
    let foreign = foreign_arch(&session);

    let hello = parse(&mut session, "hello");
    assert_eq!(autodetect::suffix(&session, &hello, &native), "native");
    assert_eq!(
        autodetect::suffix(&session, &hello, foreign),
        format!("buildroot_{foreign}")
    );

    // Repacked packages never leave the native environment.
    let repack = parse(&mut session, "foo-repack");
    assert_eq!(autodetect::suffix(&session, &repack, foreign), "native");

    // Kernels cross-compile natively when cross is enabled.
    let kernel = parse(&mut session, "linux-test");
    assert_eq!(autodetect::suffix(&session, &kernel, foreign), "native");
    session.config.cross = false;
    assert_eq!(
        autodetect::suffix(&session, &kernel, foreign),
        format!("buildroot_{foreign}")
    );
}

#[test]
fn crosscompile_decision() {
    let tmp = TempDir::new().expect("tempdir");
    write_aport(tmp.path(), "main", "hello", "pkgname=\"hello\"\n");
    write_aport(tmp.path(), "main", "linux-test", "pkgname=\"linux-test\"\n");

    let mut session = session_for(&tmp);
    let native = session.arch_native.clone();
    let foreign = foreign_arch(&session);
    let hello = parse(&mut session, "hello");
    let kernel = parse(&mut session, "linux-test");

    // Cross-compilation disabled: never.
    assert_eq!(
        autodetect::crosscompile(&session, &hello, foreign, "buildroot_armhf"),
        None
    );

    session.config.cross = true;

    // Native arch needs no emulation, so no cross-compiling either.
    assert_eq!(
        autodetect::crosscompile(&session, &hello, &native, "native"),
        None
    );

    let suffix = autodetect::suffix(&session, &kernel, foreign);
    assert_eq!(
        autodetect::crosscompile(&session, &kernel, foreign, &suffix),
        Some(CrossCompile::Native)
    );

    let suffix = autodetect::suffix(&session, &hello, foreign);
    assert_eq!(
        autodetect::crosscompile(&session, &hello, foreign, &suffix),
        Some(CrossCompile::Distcc)
    );
}

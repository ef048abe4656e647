use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// APKBUILD variables that get projected into a package record, and whether
/// the value is split into an array. This schema is fixed; it does not depend
/// on the parsed file.
pub const APKBUILD_ATTRIBUTES: &[(&str, bool)] = &[
    ("arch", true),
    ("depends", true),
    ("depends_dev", true),
    ("makedepends", true),
    ("options", true),
    ("pkgname", false),
    ("pkgdesc", false),
    ("pkgrel", false),
    ("pkgver", false),
    ("subpackages", true),
    // cross-compilers
    ("makedepends_build", true),
    ("makedepends_host", true),
    // kernels
    ("_flavor", false),
    ("_device", false),
    ("_kernver", false),
    // mesa
    ("_llvmver", false),
    // overridden packages
    ("_pkgver", false),
];

/// Variables read from deviceinfo files, without their `deviceinfo_` prefix.
pub const DEVICEINFO_ATTRIBUTES: &[&str] = &[
    // device
    "format_version",
    "name",
    "manufacturer",
    "date",
    "keyboard",
    "nonfree",
    "dtb",
    "modules_initfs",
    "external_disk",
    "external_disk_install",
    "flash_methods",
    "arch",
    // flash
    "generate_bootimg",
    "generate_legacy_uboot_initfs",
    "flash_heimdall_partition_kernel",
    "flash_heimdall_partition_initfs",
    "flash_heimdall_partition_system",
    "flash_fastboot_max_size",
    "flash_fastboot_vendor_id",
    "flash_offset_base",
    "flash_offset_kernel",
    "flash_offset_ramdisk",
    "flash_offset_second",
    "flash_offset_tags",
    "flash_pagesize",
    "flash_sparse",
    "kernel_cmdline",
    // keymaps
    "keymaps",
];

/// Supported flash method names.
pub const FLASH_METHODS: &[&str] = &["fastboot", "heimdall", "0xffff", "none"];

/// Architectures we build device packages for.
pub const BUILD_DEVICE_ARCHITECTURES: &[&str] = &["armhf", "aarch64"];

/// fnmatch patterns for pkgnames that can be cross-compiled directly in the
/// native build environment instead of going through distcc.
pub const BUILD_CROSS_NATIVE: &[&str] = &["linux-*", "arch-bin-masquerade"];

fn default_aports() -> PathBuf {
    PathBuf::from("aports")
}

fn default_device() -> String {
    "samsung-i9100".into()
}

fn default_work() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local/var/crucible"),
        None => PathBuf::from(".crucible"),
    }
}

fn default_jobs() -> usize {
    num_cpus::get() + 1
}

fn default_timezone() -> String {
    "GMT".into()
}

fn default_user() -> String {
    "user".into()
}

fn default_extra_packages() -> String {
    "none".into()
}

fn default_alpine_version() -> String {
    "edge".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Package recipe tree searched by `find_aport`.
    pub aports: PathBuf,
    pub device: String,
    /// Work folder for build environments and caches.
    pub work: PathBuf,
    pub jobs: usize,
    pub timezone: String,
    pub user: String,
    pub extra_packages: String,
    /// Allow cross-compilation in the native build environment.
    pub cross: bool,
    pub alpine_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aports: default_aports(),
            device: default_device(),
            work: default_work(),
            jobs: default_jobs(),
            timezone: default_timezone(),
            user: default_user(),
            extra_packages: default_extra_packages(),
            cross: false,
            alpine_version: default_alpine_version(),
        }
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .map_err(|e| Error::msg(format!("failed to read config {}: {e}", path.display())))?;
    let config = toml::from_str(&data)
        .map_err(|e| Error::msg(format!("TOML parse error in {}: {e}", path.display())))?;
    Ok(config)
}

pub fn save(path: &Path, config: &Config) -> Result<()> {
    let data = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::msg(format!("failed to create {}: {e}", parent.display())))?;
    }
    fs::write(path, data)
        .map_err(|e| Error::msg(format!("failed to write config {}: {e}", path.display())))?;
    Ok(())
}

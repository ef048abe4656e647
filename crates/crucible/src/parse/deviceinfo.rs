use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::{DEVICEINFO_ATTRIBUTES, FLASH_METHODS};
use crate::error::{Error, Result};
use crate::parse::shell::ShellParser;

/// Device metadata from a `deviceinfo` file: the same flat-assignment shell
/// dialect as APKBUILDs, with every variable prefixed `deviceinfo_`. All
/// attributes are scalars; missing ones are filled with empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deviceinfo {
    attributes: BTreeMap<String, String>,
}

impl Deviceinfo {
    pub fn get(&self, name: &str) -> &str {
        self.attributes.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

pub fn deviceinfo(path: &Path) -> Result<Deviceinfo> {
    let data = fs::read_to_string(path)?;
    let parsed = ShellParser::parse(&data, &BTreeMap::new())?;

    let mut attributes = BTreeMap::new();
    for &name in DEVICEINFO_ATTRIBUTES {
        let key = format!("deviceinfo_{name}");
        let value = parsed.var(&key).unwrap_or("").to_string();
        attributes.insert(name.to_string(), value);
    }
    let ret = Deviceinfo { attributes };

    for field in ["name", "arch"] {
        if ret.get(field).is_empty() {
            return Err(Error::msg(format!(
                "deviceinfo {} is missing 'deviceinfo_{}'",
                path.display(),
                field
            )));
        }
    }
    for method in ret.get("flash_methods").split_whitespace() {
        if !FLASH_METHODS.contains(&method) {
            return Err(Error::msg(format!(
                "deviceinfo {}: unknown flash method '{}' (supported: {})",
                path.display(),
                method,
                FLASH_METHODS.join(", ")
            )));
        }
    }

    Ok(ret)
}

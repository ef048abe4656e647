use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::config::APKBUILD_ATTRIBUTES;
use crate::error::{Error, Result};
use crate::parse::shell::ShellParser;
use crate::session::Session;

/// One attribute of a package record: a scalar string, or a whitespace-split
/// array of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(String),
    Array(Vec<String>),
}

/// The typed, schema-complete result of parsing one APKBUILD. Every
/// attribute of the schema is present; values the file never set are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Apkbuild {
    #[serde(flatten)]
    attributes: BTreeMap<String, AttrValue>,
}

impl Apkbuild {
    fn from_variables(vars: &BTreeMap<String, String>) -> Self {
        let mut attributes = BTreeMap::new();
        for &(name, is_array) in APKBUILD_ATTRIBUTES {
            let value = match vars.get(name) {
                Some(v) if is_array => AttrValue::Array(split_array(v)),
                Some(v) => AttrValue::Scalar(v.clone()),
                None if is_array => AttrValue::Array(Vec::new()),
                None => AttrValue::Scalar(String::new()),
            };
            attributes.insert(name.to_string(), value);
        }
        let mut ret = Self { attributes };
        ret.cut_off_function_names();
        ret
    }

    /// Subpackage entries may carry the builder function after a colon
    /// (`name:build_fn`); only the subpackage name is kept.
    fn cut_off_function_names(&mut self) {
        if let Some(AttrValue::Array(subpackages)) = self.attributes.get_mut("subpackages") {
            for entry in subpackages.iter_mut() {
                if let Some((name, _)) = entry.split_once(':') {
                    *entry = name.to_string();
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Scalar attribute value; empty for array attributes and unknown names.
    pub fn scalar(&self, name: &str) -> &str {
        match self.attributes.get(name) {
            Some(AttrValue::Scalar(s)) => s,
            _ => "",
        }
    }

    /// Array attribute tokens; empty for scalar attributes and unknown names.
    pub fn array(&self, name: &str) -> &[String] {
        match self.attributes.get(name) {
            Some(AttrValue::Array(items)) => items,
            _ => &[],
        }
    }

    pub fn pkgname(&self) -> &str {
        self.scalar("pkgname")
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }
}

/// Split an array attribute on single spaces. An empty value is an empty
/// array, never `[""]`. Runs of spaces produce empty tokens, which callers
/// see as-is.
fn split_array(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(' ').map(str::to_string).collect()
}

/// Parse the package metadata out of the APKBUILD at `path`.
///
/// Results are memoized per path for the lifetime of the session; the file
/// must not change while the session lives. Any parse or validation failure
/// is a hard error, nothing is returned partially.
pub fn apkbuild(session: &mut Session, path: &Path) -> Result<Apkbuild> {
    if let Some(hit) = session.apkbuild_cache.get(path) {
        debug!(path = %path.display(), "apkbuild cache hit");
        return Ok(hit);
    }

    let env = session.build_env();
    let data = fs::read_to_string(path)?;
    let parsed = ShellParser::parse(&data, &env)?;
    let ret = Apkbuild::from_variables(parsed.variables());

    // The pkgname must equal the name of the folder containing the APKBUILD.
    let real = fs::canonicalize(path)?;
    let suffix = format!("/{}/APKBUILD", ret.pkgname());
    if !real.to_string_lossy().ends_with(&suffix) {
        let folder = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        debug!(folder = %folder.display(), pkgname = ret.pkgname(), "pkgname mismatch");
        return Err(Error::PkgnameMismatch {
            folder,
            pkgname: ret.pkgname().to_string(),
        });
    }

    session.apkbuild_cache.insert(path.to_path_buf(), ret.clone());
    Ok(ret)
}

use glob::Pattern;

use crate::build::find_aport;
use crate::config::BUILD_CROSS_NATIVE;
use crate::error::{Error, Result};
use crate::parse::apkbuild::{self, Apkbuild};
use crate::session::Session;

/// How a package for a foreign architecture gets cross-compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossCompile {
    /// The cross-compiler runs directly in the native build environment.
    Native,
    /// The build runs in the foreign-arch environment, with compile jobs
    /// distributed back to the native side over distcc.
    Distcc,
}

/// Pick a default architecture to build `pkgname` for: the native arch when
/// the APKBUILD is arch-independent, otherwise the first listed arch.
pub fn arch(session: &mut Session, pkgname: &str) -> Result<String> {
    let aport = find_aport(session, pkgname)?;
    let apkbuild = apkbuild::apkbuild(session, &aport.join("APKBUILD"))?;
    let archs = apkbuild.array("arch");
    if archs.iter().any(|a| a == "noarch" || a == "all") {
        return Ok(session.arch_native.clone());
    }
    match archs.first() {
        Some(first) => Ok(first.clone()),
        None => Err(Error::msg(format!(
            "APKBUILD of '{}' does not list any architecture",
            pkgname
        ))),
    }
}

/// Name of the build environment a package gets built in: "native", or
/// "buildroot_<arch>" for a foreign architecture.
pub fn suffix(session: &Session, apkbuild: &Apkbuild, arch: &str) -> String {
    if arch == session.arch_native {
        return "native".to_string();
    }

    let pkgname = apkbuild.pkgname();
    if pkgname.ends_with("-repack") {
        return "native".to_string();
    }
    if session.config.cross {
        for pattern in BUILD_CROSS_NATIVE {
            let matches = Pattern::new(pattern)
                .map(|p| p.matches(pkgname))
                .unwrap_or(false);
            if matches {
                return "native".to_string();
            }
        }
    }

    format!("buildroot_{arch}")
}

/// Whether and how to cross-compile, given the chosen build environment.
pub fn crosscompile(
    session: &Session,
    apkbuild: &Apkbuild,
    arch: &str,
    suffix: &str,
) -> Option<CrossCompile> {
    if !session.config.cross {
        return None;
    }
    if apkbuild.pkgname().ends_with("-repack") {
        return None;
    }
    if !cpu_emulation_required(session, arch) {
        return None;
    }
    if suffix == "native" {
        Some(CrossCompile::Native)
    } else {
        Some(CrossCompile::Distcc)
    }
}

/// Foreign-arch environments run through CPU emulation; building there is
/// slow, which is what cross-compiling avoids.
fn cpu_emulation_required(session: &Session, arch: &str) -> bool {
    arch != session.arch_native
}

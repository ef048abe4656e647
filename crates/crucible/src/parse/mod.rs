pub mod apkbuild;
pub mod deviceinfo;
pub mod shell;

pub use apkbuild::{Apkbuild, AttrValue, apkbuild};
pub use deviceinfo::{Deviceinfo, deviceinfo};
pub use shell::ShellParser;

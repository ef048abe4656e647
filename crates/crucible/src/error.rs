use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    /// A `$name` or `${name}` referenced a variable absent from the table.
    UndefinedVariable(String),
    /// A `${...}` label matched none of the recognized expression forms.
    UnrecognizedExpression(String),
    /// The extracted pkgname does not match the folder containing the APKBUILD.
    PkgnameMismatch { folder: PathBuf, pkgname: String },
    Io(io::Error),
    Msg(String),
}

impl Error {
    pub fn msg<M: Into<String>>(msg: M) -> Self {
        Self::Msg(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UndefinedVariable(name) => {
                write!(f, "reference to undefined variable '{name}'")
            }
            Error::UnrecognizedExpression(label) => {
                write!(f, "could not evaluate expression '${{{label}}}'")
            }
            Error::PkgnameMismatch { folder, pkgname } => write!(
                f,
                "pkgname '{}' must equal the name of the folder that contains the APKBUILD (folder: '{}')",
                pkgname,
                folder.display()
            ),
            Error::Io(err) => write!(f, "{err}"),
            Error::Msg(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::msg(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::msg(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

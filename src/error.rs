use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    /// A block start marker at `offset` has no matching end marker
    UnterminatedBlock { marker: &'static str, offset: usize },
    /// The code editor could not be found at the configured path
    EditorNotFound(PathBuf),
    /// An external command ran but exited unsuccessfully
    CommandFailed { program: String, code: Option<i32> },
    /// The fetched plugin source carries no readable version line
    MissingVersion,
    Io(std::io::Error),
    Json(serde_json::Error),
    Xml(serde_xml_rs::Error),
    Http(ureq::Error),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
impl From<serde_xml_rs::Error> for Error {
    fn from(value: serde_xml_rs::Error) -> Self {
        Self::Xml(value)
    }
}
impl From<ureq::Error> for Error {
    fn from(value: ureq::Error) -> Self {
        Self::Http(value)
    }
}
impl From<glob::PatternError> for Error {
    fn from(value: glob::PatternError) -> Self {
        Self::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, value))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedBlock { marker, offset } => {
                write!(f, "'{marker}' at byte {offset} is never closed")
            }
            Self::EditorNotFound(path) => write!(f, "code editor not found at '{}'", path.display()),
            Self::CommandFailed { program, code: Some(code) } => {
                write!(f, "'{program}' exited with status {code}")
            }
            Self::CommandFailed { program, code: None } => {
                write!(f, "'{program}' was terminated by a signal")
            }
            Self::MissingVersion => write!(f, "no version found in the published plugin source"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::Xml(err) => write!(f, "{err}"),
            Self::Http(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

//! Published-version check and debugger extension download.
//!
//! The published plugin source is only read for its version header, it is
//! never written over local files.

use std::io::{BufReader, Read};

use chrono::{DateTime, Duration, Utc};
use tempfile::TempPath;

use crate::{Error, Result, editor::CodeEditor};

pub const PLUGIN_URL: &str =
    "https://raw.githubusercontent.com/dotBunny/VSCode/master/Plugins/Editor/VSCode.cs";
pub const DEBUGGER_URL: &str =
    "https://raw.githubusercontent.com/dotBunny/VSCode-Test/master/Downloads/unity-debug-101.vsix";

/// Version of the plugin this integration corresponds to.
pub const CURRENT_VERSION: f64 = 2.45;

const USER_AGENT: &str = concat!("unity-vscode/", env!("CARGO_PKG_VERSION"));

/// Line of the header comment holding the version number.
const VERSION_LINE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateCheck {
    pub published: f64,
    pub checked_at: DateTime<Utc>,
}

impl UpdateCheck {
    pub fn is_newer(&self) -> bool {
        self.published > CURRENT_VERSION
    }
}

/// Date checks are counted from before the first check ever ran.
pub fn epoch() -> DateTime<Utc> {
    chrono::NaiveDate::from_ymd_opt(2015, 10, 8)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
        .unwrap_or(DateTime::UNIX_EPOCH)
}

pub fn is_due(last: DateTime<Utc>, interval_days: i64, now: DateTime<Utc>) -> bool {
    now >= last + Duration::days(interval_days)
}

/// Version number from the header comment of the plugin source.
///
/// ```text
/// /*
///  * Unity VSCode Support
///  *
///  * Seamless support for Microsoft Visual Studio Code in Unity
///  *
///  * Version:
///  *   2.45
/// ```
pub fn parse_version(source: &str) -> Option<f64> {
    // downloads occasionally carry a byte order mark or other junk up front
    let source = match source.find("/*") {
        Some(start) => &source[start..],
        None => source,
    };

    source
        .lines()
        .nth(VERSION_LINE)
        .and_then(|line| line.replace('*', "").trim().parse().ok())
}

pub fn check(url: &str) -> Result<UpdateCheck> {
    log::debug!("[update] checking {url}");
    let response = ureq::get(url).header("User-Agent", USER_AGENT).call()?;
    let source = std::io::read_to_string(response.into_body().into_reader())?;

    let published = parse_version(&source).ok_or(Error::MissingVersion)?;
    Ok(UpdateCheck {
        published,
        checked_at: Utc::now(),
    })
}

/// Downloads the debugger extension and installs it into the editor.
pub fn install_debugger(url: &str, editor: &CodeEditor) -> Result<()> {
    log::debug!("[update] downloading {url}");
    let response = ureq::get(url).header("User-Agent", USER_AGENT).call()?;

    let body = BufReader::new(response.into_body().into_reader());
    let package = stage_package(body, editor.is_detached())?;

    log::debug!("[update] installing {}", package.display());
    editor.install_extension(&package)
}

/// Writes the package to a `.vsix` temp file.
///
/// A detached editor reads the package after the install command has
/// returned, so with `keep` the file outlives the returned path.
fn stage_package(mut body: impl Read, keep: bool) -> Result<TempPath> {
    let mut package = tempfile::Builder::new()
        .prefix("unity-debug")
        .suffix(".vsix")
        .disable_cleanup(keep)
        .tempfile()?;
    std::io::copy(&mut body, &mut package)?;

    let mut path = package.into_temp_path();
    path.disable_cleanup(keep);
    Ok(path)
}

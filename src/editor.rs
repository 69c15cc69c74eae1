use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{Error, Result};

/// Arguments the host passes to the external script editor.
pub const SCRIPT_EDITOR_ARGS: &str = "-r -g \"$(File):$(Line)\"";

/// Environment override for the code editor binary.
pub const PATH_VAR: &str = "VSCODE_PATH";

pub struct CodeEditor {
    path: PathBuf,
}

impl CodeEditor {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Editor from `VSCODE_PATH`, or the platform's default install.
    pub fn locate() -> Self {
        Self::new(
            std::env::var_os(PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_path),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open_project(&self, project: &Path) -> bool {
        self.spawn(project_args(project))
    }

    pub fn open_file(&self, project: &Path, file: &Path, line: Option<u32>) -> bool {
        self.spawn(file_args(project, file, line))
    }

    /// App bundles are started through `open`, which returns before the
    /// editor has handled its arguments.
    pub fn is_detached(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "app")
    }

    /// Installs a `.vsix` package and waits for the editor to finish.
    pub fn install_extension(&self, vsix: &Path) -> Result<()> {
        let status = self
            .command(vec!["--install-extension".into(), vsix.into()])
            .stdin(Stdio::null())
            .status()
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => Error::EditorNotFound(self.path.clone()),
                _ => Error::Io(err),
            })?;

        if !status.success() {
            return Err(Error::CommandFailed {
                program: self.path.display().to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }

    /// App bundles go through `open` so a new window gets the arguments.
    fn command(&self, args: Vec<OsString>) -> Command {
        let mut command = if self.is_detached() {
            let mut command = Command::new("open");
            command.args(["-n", "-a"]).arg(&self.path).arg("--args");
            command
        } else {
            Command::new(&self.path)
        };
        command.args(args);
        command
    }

    fn spawn(&self, args: Vec<OsString>) -> bool {
        log::debug!("[code] {} {:?}", self.path.display(), args);
        match self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_) => true,
            Err(err) => {
                log::error!("[code] failed to launch {}: {err}", self.path.display());
                false
            }
        }
    }
}

pub fn default_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    let default = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("C:\\Users\\Default\\AppData\\Local"))
        .join("Code")
        .join("bin")
        .join("code.cmd");
    #[cfg(target_os = "macos")]
    let default = PathBuf::from("/Applications/Visual Studio Code.app");
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let default = PathBuf::from("/usr/local/bin/code");

    default
}

/// `<project> -r`
pub fn project_args(project: &Path) -> Vec<OsString> {
    vec![project.into(), "-r".into()]
}

/// `<project> <file> -r`, or `<project> -g <file>:<line> -r` with a line.
pub fn file_args(project: &Path, file: &Path, line: Option<u32>) -> Vec<OsString> {
    match line {
        Some(line) => {
            let mut target = OsString::from(file);
            target.push(format!(":{line}"));
            vec![project.into(), "-g".into(), target, "-r".into()]
        }
        None => vec![project.into(), file.into(), "-r".into()],
    }
}

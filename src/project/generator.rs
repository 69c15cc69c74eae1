use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Host side regeneration of the solution and project files.
pub trait ProjectFileGenerator {
    fn sync(&mut self) -> Result<()>;
}

impl<F: FnMut() -> Result<()>> ProjectFileGenerator for F {
    fn sync(&mut self) -> Result<()> {
        self()
    }
}

/// Regenerates project files by running the Unity editor in batch mode.
pub struct UnityBatchGenerator {
    unity: PathBuf,
    project: PathBuf,
}

impl UnityBatchGenerator {
    pub const SYNC_METHOD: &'static str = "UnityEditor.SyncVS.SyncSolution";

    pub fn new(unity: impl AsRef<Path>, project: impl AsRef<Path>) -> Self {
        Self {
            unity: unity.as_ref().to_path_buf(),
            project: project.as_ref().to_path_buf(),
        }
    }
}

impl ProjectFileGenerator for UnityBatchGenerator {
    fn sync(&mut self) -> Result<()> {
        let now = std::time::Instant::now();
        let result = std::process::Command::new(&self.unity)
            .args(["-batchmode", "-quit", "-nographics"])
            .arg("-projectPath")
            .arg(&self.project)
            .args(["-executeMethod", Self::SYNC_METHOD])
            .output()?;

        log::debug!(
            "[sync] {} {:.3} s",
            self.project.display(),
            now.elapsed().as_secs_f64()
        );

        if !result.status.success() {
            return Err(Error::CommandFailed {
                program: self.unity.display().to_string(),
                code: result.status.code(),
            });
        }
        Ok(())
    }
}

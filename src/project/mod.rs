pub mod csproj;
pub mod patch;
pub mod solution;

mod generator;
use std::path::{Path, PathBuf};

pub use generator::{ProjectFileGenerator, UnityBatchGenerator};

use crate::{Error, Result};

/// What happened to a single file during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Patched,
    Unchanged,
    /// Left untouched because patching it would have broken it
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub patched: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl Summary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Patched => self.patched += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// Generated solution and project files in the root of a project.
pub struct ProjectFiles {
    root: PathBuf,
}

impl ProjectFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn solutions(&self) -> Result<Vec<PathBuf>> {
        self.find("sln")
    }

    pub fn projects(&self) -> Result<Vec<PathBuf>> {
        self.find("csproj")
    }

    pub fn unity_projects(&self) -> Result<Vec<PathBuf>> {
        self.find("unityproj")
    }

    fn find(&self, extension: &str) -> Result<Vec<PathBuf>> {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let pattern = format!("{root}/*.{extension}");

        let mut files = glob::glob(&pattern)?
            .filter_map(|entry| match entry {
                Ok(path) => path.is_file().then_some(path),
                Err(err) => {
                    log::warn!("[project] {err}");
                    None
                }
            })
            .collect::<Vec<_>>();
        files.sort();
        Ok(files)
    }

    /// Deletes every generated solution and project file, returning how many
    /// were removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self
            .solutions()?
            .into_iter()
            .chain(self.projects()?)
            .chain(self.unity_projects()?)
        {
            log::debug!("[project] removing {}", path.display());
            std::fs::remove_file(&path)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Patches every solution and project file in place.
    pub fn update(&self, options: &csproj::ScrubOptions) -> Result<Summary> {
        let mut summary = Summary::default();

        for path in self.solutions()? {
            summary.record(update_solution_file(&path)?);
        }

        for path in self.projects()? {
            let outcome = match update_project_file(&path, options) {
                Ok(outcome) => outcome,
                Err(err @ Error::UnterminatedBlock { .. }) => {
                    log::warn!("[patch] leaving {} untouched: {err}", path.display());
                    Outcome::Skipped
                }
                Err(err) => return Err(err),
            };
            summary.record(outcome);
        }

        log::debug!(
            "[patch] {} patched, {} unchanged, {} skipped",
            summary.patched,
            summary.unchanged,
            summary.skipped
        );
        Ok(summary)
    }
}

pub fn update_solution_file(path: &Path) -> Result<Outcome> {
    let original = std::fs::read_to_string(path)?;
    let patched = patch::scrub_blank_lines(&solution::scrub(&original));
    write_if_changed(path, &original, &patched)
}

/// Patches one project file.
///
/// Fails with [`Error::UnterminatedBlock`] without touching the file when a
/// property group is never closed.
pub fn update_project_file(path: &Path, options: &csproj::ScrubOptions) -> Result<Outcome> {
    let original = std::fs::read_to_string(path)?;
    let patched = patch::scrub_blank_lines(&csproj::scrub(&original, options)?);

    if log::log_enabled!(log::Level::Debug) {
        if let Ok(project) = csproj::Project::parse(&patched) {
            log::debug!(
                "[patch] {} lang {}",
                project.assembly_name().unwrap_or("<unnamed>"),
                project.lang_version().unwrap_or("<unset>")
            );
        }
    }

    write_if_changed(path, &original, &patched)
}

fn write_if_changed(path: &Path, original: &str, patched: &str) -> Result<Outcome> {
    if patched == original {
        return Ok(Outcome::Unchanged);
    }

    log::debug!("[patch] {}", path.display());
    std::fs::write(path, patched)?;
    Ok(Outcome::Patched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> csproj::ScrubOptions {
        csproj::ScrubOptions {
            downgrade_framework: false,
        }
    }

    #[test]
    fn finds_files_by_extension_only_in_the_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Game.sln"), "").unwrap();
        std::fs::write(dir.path().join("Assembly-CSharp.csproj"), "").unwrap();
        std::fs::write(dir.path().join("Assembly-UnityScript.unityproj"), "").unwrap();
        std::fs::create_dir(dir.path().join("Library")).unwrap();
        std::fs::write(dir.path().join("Library").join("Nested.csproj"), "").unwrap();

        let files = ProjectFiles::new(dir.path());
        assert_eq!(files.solutions().unwrap().len(), 1);
        assert_eq!(files.projects().unwrap(), vec![dir.path().join("Assembly-CSharp.csproj")]);
        assert_eq!(files.unity_projects().unwrap().len(), 1);

        assert_eq!(files.clear().unwrap(), 3);
        assert!(files.projects().unwrap().is_empty());
        assert!(dir.path().join("Library").join("Nested.csproj").exists());
    }

    #[test]
    fn unterminated_project_is_left_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.csproj");
        let content = "<Project>\n\n  <PropertyGroup>\n    <A>1</A>\n</Project>\n";
        std::fs::write(&path, content).unwrap();

        let summary = ProjectFiles::new(dir.path()).update(&options()).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn second_update_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Assembly-CSharp.csproj");
        std::fs::write(
            &path,
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n\n  <PropertyGroup>\n    <AssemblyName>Assembly-CSharp</AssemblyName>\n  </PropertyGroup>\n</Project>\n",
        )
        .unwrap();

        let files = ProjectFiles::new(dir.path());
        assert_eq!(files.update(&options()).unwrap().patched, 1);
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(!first.contains("\n\n"));

        assert_eq!(files.update(&options()).unwrap().unchanged, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn patched_projects_still_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Game.Scripts.csproj");
        let content = "<Project Sdk=\"Microsoft.NET.Sdk\">\r\n  <PropertyGroup>\r\n    <AssemblyName>Game.Scripts</AssemblyName>\r\n\r\n  </PropertyGroup>\r\n  <PropertyGroup>\r\n    <Nullable>enable</Nullable>\r\n  </PropertyGroup>\r\n</Project>\r\n";
        assert!(csproj::Project::parse(content).is_ok());
        std::fs::write(&path, content).unwrap();

        assert_eq!(update_project_file(&path, &options()).unwrap(), Outcome::Patched);

        let patched = std::fs::read_to_string(&path).unwrap();
        assert_eq!(patched.matches("<LangVersion>default</LangVersion>\r\n").count(), 2);
        let project = csproj::Project::parse(&patched).unwrap();
        assert_eq!(project.property_groups(), 2);
        assert_eq!(project.assembly_name(), Some("Game.Scripts"));
        assert_eq!(project.lang_version(), Some("default"));
        assert_eq!(project.property("Nullable"), Some("enable"));
    }
}

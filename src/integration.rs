use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{
    Result,
    config::{Preferences, keys},
    debug::{self, Configuration, LaunchFile, launch::UNITY_TARGETS},
    editor::{CodeEditor, SCRIPT_EDITOR_ARGS},
    project::{ProjectFileGenerator, ProjectFiles, Summary, csproj::ScrubOptions},
    update::{self, UpdateCheck},
    workspace,
};

/// Informational messages, shown only when debug output is switched on.
macro_rules! verbose {
    ($integration:expr, $($arg:tt)+) => {
        if $integration.debug() {
            log::info!($($arg)+);
        }
    };
}

/// Visual Studio Code integration for one Unity project.
///
/// Every public method that takes `&mut self` corresponds to something the
/// host editor does: toggling a preference, regenerating project files,
/// entering play mode, opening an asset.
pub struct Integration<P, G> {
    project: PathBuf,
    prefs: P,
    generator: G,
    editor: CodeEditor,
    scrub: ScrubOptions,
    process: String,
    find_port: fn(&str) -> Option<u16>,
    update_url: String,
    debugger_url: String,
}

impl<P: Preferences, G: ProjectFileGenerator> Integration<P, G> {
    pub fn new(project: impl AsRef<Path>, prefs: P, generator: G) -> Self {
        Self {
            project: project.as_ref().to_path_buf(),
            prefs,
            generator,
            editor: CodeEditor::locate(),
            scrub: ScrubOptions::default(),
            process: debug::port::UNITY_PROCESS.to_string(),
            find_port: debug::find_debug_port,
            update_url: update::PLUGIN_URL.to_string(),
            debugger_url: update::DEBUGGER_URL.to_string(),
        }
    }

    pub fn with_editor(mut self, editor: CodeEditor) -> Self {
        self.editor = editor;
        self
    }

    pub fn with_scrub_options(mut self, scrub: ScrubOptions) -> Self {
        self.scrub = scrub;
        self
    }

    /// Process whose debugger port ends up in the launch file.
    pub fn with_process(mut self, process: impl Into<String>) -> Self {
        self.process = process.into();
        self
    }

    pub fn with_port_lookup(mut self, find_port: fn(&str) -> Option<u16>) -> Self {
        self.find_port = find_port;
        self
    }

    pub fn with_update_urls(mut self, plugin: impl Into<String>, debugger: impl Into<String>) -> Self {
        self.update_url = plugin.into();
        self.debugger_url = debugger.into();
        self
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    pub fn editor(&self) -> &CodeEditor {
        &self.editor
    }

    pub fn preferences(&self) -> &P {
        &self.prefs
    }

    pub fn into_preferences(self) -> P {
        self.prefs
    }

    pub fn launch_path(&self) -> PathBuf {
        workspace::launch_path(&self.project)
    }

    pub fn enabled(&self) -> bool {
        self.prefs.get_bool(keys::ENABLED, false)
    }

    /// Turning the integration on clears stale project files, has the host
    /// regenerate them and points the host's script editor at Code. Turning
    /// it off restores the host's previous script editor settings.
    pub fn set_enabled(&mut self, value: bool) -> Result<()> {
        let was = self.enabled();

        if !was && value {
            let removed = ProjectFiles::new(&self.project).clear()?;
            log::debug!("[vscode] removed {removed} stale project files");
            if let Err(err) = self.generator.sync() {
                log::warn!("[vscode] project files were not regenerated: {err}");
            }
        }

        self.prefs.set_bool(keys::ENABLED, value);

        if was != value {
            self.update_editor_preferences(value);
            verbose!(
                self,
                "[vscode] integration {}",
                if value { "enabled" } else { "disabled" }
            );
        }
        Ok(())
    }

    pub fn debug(&self) -> bool {
        self.prefs.get_bool(keys::DEBUG, false)
    }

    pub fn set_debug(&mut self, value: bool) {
        self.prefs.set_bool(keys::DEBUG, value);
    }

    pub fn write_launch_file(&self) -> bool {
        self.prefs.get_bool(keys::WRITE_LAUNCH_FILE, true)
    }

    pub fn set_write_launch_file(&mut self, value: bool) {
        self.prefs.set_bool(keys::WRITE_LAUNCH_FILE, value);
    }

    pub fn use_unity_debugger(&self) -> bool {
        self.prefs.get_bool(keys::USE_UNITY_DEBUGGER, false)
    }

    /// The debugger extension brings its own launch targets, so switching it
    /// on stops the attach configuration from being written.
    pub fn set_use_unity_debugger(&mut self, value: bool) -> Result<()> {
        if value == self.use_unity_debugger() {
            return Ok(());
        }

        self.prefs.set_bool(keys::USE_UNITY_DEBUGGER, value);
        if value {
            self.set_write_launch_file(false);
        }
        self.update_launch_file()?;
        Ok(())
    }

    pub fn revert_on_exit(&self) -> bool {
        self.prefs.get_bool(keys::REVERT_ON_EXIT, true)
    }

    pub fn set_revert_on_exit(&mut self, value: bool) {
        self.prefs.set_bool(keys::REVERT_ON_EXIT, value);
    }

    pub fn automatic_updates(&self) -> bool {
        self.prefs.get_bool(keys::AUTOMATIC_UPDATES, false)
    }

    pub fn set_automatic_updates(&mut self, value: bool) {
        self.prefs.set_bool(keys::AUTOMATIC_UPDATES, value);
    }

    /// Days between update checks, 1 to 31.
    pub fn update_time(&self) -> i64 {
        self.prefs.get_int(keys::UPDATE_TIME, 7).clamp(1, 31)
    }

    pub fn set_update_time(&mut self, days: i64) {
        self.prefs.set_int(keys::UPDATE_TIME, days.clamp(1, 31));
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&self.prefs.get_string(keys::LAST_UPDATE))
            .map(|time| time.with_timezone(&Utc))
            .unwrap_or_else(|_| update::epoch())
    }

    pub fn published_version(&self) -> f64 {
        self.prefs
            .get_float(keys::GITHUB_VERSION, update::CURRENT_VERSION)
    }

    /// Host editor finished loading this project.
    pub fn startup(&mut self) -> Result<()> {
        if !self.enabled() {
            return Ok(());
        }

        self.update_editor_preferences(true);
        self.update_launch_file()?;

        if self.automatic_updates() && update::is_due(self.last_update(), self.update_time(), Utc::now()) {
            if let Err(err) = self.check_for_update() {
                verbose!(self, "[vscode] {err}");
            }
        }
        Ok(())
    }

    /// Host editor is unloading this project.
    pub fn unload(&mut self) {
        if self.enabled() && self.revert_on_exit() {
            self.update_editor_preferences(false);
        }
    }

    /// The preferences panel changed something.
    pub fn preferences_changed(&mut self) {
        let enabled = self.enabled();
        self.update_editor_preferences(enabled);
    }

    /// Host editor regenerated its solution and project files.
    pub fn project_files_generated(&mut self) -> Result<Summary> {
        self.update_solution()
    }

    /// Patches the solution and project files so Code can load them.
    pub fn update_solution(&self) -> Result<Summary> {
        if !self.enabled() {
            return Ok(Summary::default());
        }

        verbose!(self, "[vscode] updating solution & project files");
        ProjectFiles::new(&self.project).update(&self.scrub)
    }

    /// Entering play mode is when the debugger agent is listening.
    pub fn play_mode_changed(&mut self, playing: bool) -> Result<Option<PathBuf>> {
        if !playing {
            return Ok(None);
        }
        self.update_launch_file()
    }

    /// Opens a script in Code, returning whether the open was handled here.
    ///
    /// `asset` may be relative to the project root. Anything that is not a C#
    /// script is left for the host to open.
    pub fn asset_opened(&self, asset: &Path, line: Option<u32>) -> bool {
        if !self.enabled() {
            return false;
        }
        if !asset.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("cs")) {
            return false;
        }

        let file = self.project.join(asset);
        self.editor.open_file(&self.project, &file, line)
    }

    /// Regenerates project files and opens the project root in Code. Does
    /// nothing while the integration is off.
    pub fn open_project(&mut self) -> Result<bool> {
        if !self.enabled() {
            return Ok(false);
        }

        self.generator.sync()?;
        Ok(self.editor.open_project(&self.project))
    }

    /// Writes the launch configuration matching the current preferences,
    /// returning the path written to.
    pub fn update_launch_file(&self) -> Result<Option<PathBuf>> {
        if !self.enabled() {
            return Ok(None);
        }

        let path = self.launch_path();
        if self.use_unity_debugger() {
            LaunchFile::update(&path, UNITY_TARGETS.map(Configuration::launch))?;
            return Ok(Some(path));
        }

        if !self.write_launch_file() {
            return Ok(None);
        }

        match (self.find_port)(&self.process) {
            Some(port) => {
                LaunchFile::update(&path, [Configuration::attach(port)])?;
                verbose!(self, "[vscode] debug port found ({port})");
                Ok(Some(path))
            }
            None => {
                if self.debug() {
                    log::warn!("[vscode] unable to determine debug port");
                }
                Ok(None)
            }
        }
    }

    pub fn write_workspace_settings(&self) -> Result<PathBuf> {
        let path = workspace::write_settings(&self.project)?;
        verbose!(self, "[vscode] workspace settings written");
        Ok(path)
    }

    /// Looks up the published version and records when the check ran.
    pub fn check_for_update(&mut self) -> Result<UpdateCheck> {
        let check = update::check(&self.update_url)?;

        self.prefs
            .set_string(keys::LAST_UPDATE, &check.checked_at.to_rfc3339());
        self.prefs.set_float(keys::GITHUB_VERSION, check.published);

        if check.is_newer() {
            log::info!(
                "[vscode] version {:.2} is available (current {:.2})",
                check.published,
                update::CURRENT_VERSION
            );
        }
        Ok(check)
    }

    pub fn install_debugger(&self) -> Result<()> {
        update::install_debugger(&self.debugger_url, &self.editor)
    }

    /// Points the host's external script editor at Code, or puts back what
    /// was there before.
    ///
    /// A host value is snapshotted only when it differs from the value about
    /// to replace it, so applying twice keeps the original snapshot.
    pub fn update_editor_preferences(&mut self, enabled: bool) {
        use keys::host;

        if enabled {
            let app = self.editor.path().display().to_string();

            let current_app = self.prefs.get_string(host::SCRIPTS_DEFAULT_APP);
            if current_app != app {
                self.prefs.set_string(keys::PREVIOUS_APP, &current_app);
            }
            self.prefs.set_string(host::SCRIPTS_DEFAULT_APP, &app);

            let current_args = self.prefs.get_string(host::SCRIPT_EDITOR_ARGS);
            if current_args != SCRIPT_EDITOR_ARGS {
                self.prefs.set_string(keys::PREVIOUS_ARGS, &current_args);
            }
            self.prefs.set_string(host::SCRIPT_EDITOR_ARGS, SCRIPT_EDITOR_ARGS);
            self.prefs.set_string(
                &format!("{}{app}", host::SCRIPT_EDITOR_ARGS),
                SCRIPT_EDITOR_ARGS,
            );

            if self.prefs.get_bool(host::MONO_DEVELOP_SOLUTION_PROPERTIES, false) {
                self.prefs.set_bool(keys::PREVIOUS_MD, true);
            }
            self.prefs.set_bool(host::MONO_DEVELOP_SOLUTION_PROPERTIES, false);

            if self.prefs.get_bool(host::SUPPORTS_UNITY_PROJ, false) {
                self.prefs.set_bool(keys::PREVIOUS_UNITY_PROJ, true);
            }
            self.prefs.set_bool(host::SUPPORTS_UNITY_PROJ, false);

            if !self.prefs.get_bool(host::ALLOW_ATTACHED_DEBUGGING, false) {
                self.prefs.set_bool(keys::PREVIOUS_ATTACH, false);
            }
            self.prefs.set_bool(host::ALLOW_ATTACHED_DEBUGGING, true);
        } else {
            if self.prefs.has(keys::PREVIOUS_APP) {
                let previous = self.prefs.get_string(keys::PREVIOUS_APP);
                self.prefs.set_string(host::SCRIPTS_DEFAULT_APP, &previous);
            }

            if self.prefs.has(keys::PREVIOUS_ARGS) {
                let previous = self.prefs.get_string(keys::PREVIOUS_ARGS);
                self.prefs.set_string(host::SCRIPT_EDITOR_ARGS, &previous);
            }

            if self.prefs.get_bool(keys::PREVIOUS_MD, false) {
                self.prefs.set_bool(host::MONO_DEVELOP_SOLUTION_PROPERTIES, true);
            }

            if self.prefs.get_bool(keys::PREVIOUS_UNITY_PROJ, false) {
                self.prefs.set_bool(host::SUPPORTS_UNITY_PROJ, true);
            }

            if !self.prefs.get_bool(keys::PREVIOUS_ATTACH, true) {
                self.prefs.set_bool(host::ALLOW_ATTACHED_DEBUGGING, false);
            }

            for key in [
                keys::PREVIOUS_APP,
                keys::PREVIOUS_ARGS,
                keys::PREVIOUS_MD,
                keys::PREVIOUS_UNITY_PROJ,
                keys::PREVIOUS_ATTACH,
            ] {
                self.prefs.remove(key);
            }
        }
    }
}

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Preference keys read and written by the integration.
pub mod keys {
    pub const ENABLED: &str = "VSCode_Enabled";
    pub const DEBUG: &str = "VSCode_Debug";
    pub const WRITE_LAUNCH_FILE: &str = "VSCode_WriteLaunchFile";
    pub const USE_UNITY_DEBUGGER: &str = "VSCode_UseUnityDebugger";
    pub const REVERT_ON_EXIT: &str = "VSCode_RevertScriptEditorOnExit";
    pub const AUTOMATIC_UPDATES: &str = "VSCode_AutomaticUpdates";
    pub const UPDATE_TIME: &str = "VSCode_UpdateTime";
    pub const LAST_UPDATE: &str = "VSCode_LastUpdate";
    pub const GITHUB_VERSION: &str = "VSCode_GitHubVersion";

    pub const PREVIOUS_APP: &str = "VSCode_PreviousApp";
    pub const PREVIOUS_ARGS: &str = "VSCode_PreviousArgs";
    pub const PREVIOUS_MD: &str = "VSCode_PreviousMD";
    pub const PREVIOUS_UNITY_PROJ: &str = "VSCode_PreviousUnityProj";
    pub const PREVIOUS_ATTACH: &str = "VSCode_PreviousAttach";

    /// Keys owned by the host editor
    pub mod host {
        pub const SCRIPTS_DEFAULT_APP: &str = "kScriptsDefaultApp";
        pub const SCRIPT_EDITOR_ARGS: &str = "kScriptEditorArgs";
        pub const MONO_DEVELOP_SOLUTION_PROPERTIES: &str = "kMonoDevelopSolutionProperties";
        pub const SUPPORTS_UNITY_PROJ: &str = "kExternalEditorSupportsUnityProj";
        pub const ALLOW_ATTACHED_DEBUGGING: &str = "AllowAttachedDebuggingOfEditor";
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Persistent key/value store shared with the host editor.
///
/// Missing keys fall back to the caller's default, strings default to empty
/// the same way the host's own store does.
pub trait Preferences {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(value)) => value,
            _ => default,
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, Value::Bool(value));
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(Value::Int(value)) => value,
            _ => default,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.set(key, Value::Int(value));
    }

    fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(Value::Float(value)) => value,
            Some(Value::Int(value)) => value as f64,
            _ => default,
        }
    }

    fn set_float(&mut self, key: &str, value: f64) {
        self.set(key, Value::Float(value));
    }

    fn get_string(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(value)) => value,
            _ => String::new(),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.set(key, Value::String(value.to_string()));
    }
}

impl<P: Preferences + ?Sized> Preferences for &mut P {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        (**self).set(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, Value>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Preferences persisted as a flat json object.
///
/// Changes stay in memory until [`FilePreferences::save`] is called.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl FilePreferences {
    /// Default location under the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("unity-vscode").join("preferences.json"))
    }

    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            BTreeMap::new()
        };

        log::debug!("[prefs] loaded {} keys from {}", values.len(), path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const VERSION: &str = "0.2.0";

/// Name of the attach-by-port configuration.
pub const ATTACH_NAME: &str = "Unity";

/// Targets the Unity debugger extension can launch against.
pub const UNITY_TARGETS: [&str; 6] = [
    "Unity Editor",
    "Windows Player",
    "OSX Player",
    "Linux Player",
    "iOS Player",
    "Android Player",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Fields this crate does not manage, kept as found
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Configuration {
    /// Mono soft debugger attach to a local port.
    pub fn attach(port: u16) -> Self {
        Self {
            name: ATTACH_NAME.to_string(),
            kind: "mono".to_string(),
            request: "attach".to_string(),
            address: Some("localhost".to_string()),
            port: Some(port),
            extra: serde_json::Map::new(),
        }
    }

    /// Unity debugger extension launch against `target`.
    pub fn launch(target: &str) -> Self {
        Self {
            name: target.to_string(),
            kind: "unity".to_string(),
            request: "launch".to_string(),
            address: None,
            port: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchFile {
    pub version: String,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
}

impl Default for LaunchFile {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            configurations: Vec::new(),
        }
    }
}

impl LaunchFile {
    pub fn get(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|config| config.name == name)
    }

    /// Replaces the configuration with the same name, or appends it.
    ///
    /// Unmanaged fields of a replaced configuration carry over unless the new
    /// one sets them too.
    pub fn upsert(&mut self, configuration: Configuration) {
        match self
            .configurations
            .iter_mut()
            .find(|config| config.name == configuration.name)
        {
            Some(existing) => {
                let mut extra = std::mem::take(&mut existing.extra);
                extra.extend(configuration.extra);
                *existing = Configuration {
                    extra,
                    ..configuration
                };
            }
            None => self.configurations.push(configuration),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> crate::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Reads `path`, starting over when it is missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        match Self::read(path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("[launch] replacing unreadable {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Overwrites `path` with the whole document, tab indented.
    pub fn write(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;

        std::fs::write(path, buffer)?;
        Ok(())
    }

    /// Merges `configurations` into the file at `path` and writes it back.
    pub fn update(
        path: impl AsRef<Path>,
        configurations: impl IntoIterator<Item = Configuration>,
    ) -> crate::Result<Self> {
        let path = path.as_ref();
        let mut file = Self::load(path);
        file.version = VERSION.to_string();
        for configuration in configurations {
            file.upsert(configuration);
        }

        file.write(path)?;
        log::debug!(
            "[launch] wrote {} configurations to {}",
            file.configurations.len(),
            path.display()
        );
        Ok(file)
    }
}

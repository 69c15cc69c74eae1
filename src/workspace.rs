use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Files and folders hidden from the editor's explorer and search.
pub const EXCLUDES: &[&str] = &[
    // hidden files
    "**/.DS_Store",
    "**/.git",
    "**/.gitignore",
    "**/.gitattributes",
    "**/.gitmodules",
    "**/.svn",
    // project files
    "**/*.booproj",
    "**/*.pidb",
    "**/*.suo",
    "**/*.user",
    "**/*.userprefs",
    "**/*.unityproj",
    "**/*.dll",
    "**/*.exe",
    // media
    "**/*.pdf",
    "**/*.mid",
    "**/*.midi",
    "**/*.wav",
    "**/*.gif",
    "**/*.ico",
    "**/*.jpg",
    "**/*.jpeg",
    "**/*.png",
    "**/*.psd",
    "**/*.tga",
    "**/*.tif",
    "**/*.tiff",
    // models
    "**/*.3ds",
    "**/*.3DS",
    "**/*.fbx",
    "**/*.FBX",
    "**/*.lxo",
    "**/*.LXO",
    "**/*.ma",
    "**/*.MA",
    "**/*.obj",
    "**/*.OBJ",
    // unity
    "**/*.asset",
    "**/*.cubemap",
    "**/*.flare",
    "**/*.mat",
    "**/*.meta",
    "**/*.prefab",
    "**/*.unity",
    // folders
    "build/",
    "Build/",
    "Library/",
    "library/",
    "obj/",
    "Obj/",
    "ProjectSettings/",
    "temp/",
    "Temp/",
];

pub fn settings_folder(project: &Path) -> PathBuf {
    project.join(".vscode")
}

pub fn settings_path(project: &Path) -> PathBuf {
    settings_folder(project).join("settings.json")
}

pub fn launch_path(project: &Path) -> PathBuf {
    settings_folder(project).join("launch.json")
}

/// Writes the exclusion list to `.vscode/settings.json`.
///
/// Other settings already in the file are kept; an unreadable file is
/// replaced.
pub fn write_settings(project: &Path) -> crate::Result<PathBuf> {
    let path = settings_path(project);
    std::fs::create_dir_all(settings_folder(project))?;

    let mut settings = std::fs::read_to_string(&path)
        .ok()
        .and_then(|data| match serde_json::from_str::<Map<String, Value>>(&data) {
            Ok(settings) => Some(settings),
            Err(err) => {
                log::warn!("[settings] replacing unreadable {}: {err}", path.display());
                None
            }
        })
        .unwrap_or_default();

    let excludes = EXCLUDES
        .iter()
        .map(|pattern| (pattern.to_string(), Value::Bool(true)))
        .collect::<Map<_, _>>();
    settings.insert("files.exclude".to_string(), Value::Object(excludes));

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(&settings, &mut serializer)?;
    std::fs::write(&path, buffer)?;

    log::debug!("[settings] wrote {}", path.display());
    Ok(path)
}

use std::{fs, path::Path};

use unity_vscode::{
    Integration, MemoryPreferences, Preferences, Result,
    config::keys,
    debug::LaunchFile,
    editor::{CodeEditor, SCRIPT_EDITOR_ARGS},
    project::csproj::ScrubOptions,
};

const SOLUTION: &str = "Microsoft Visual Studio Solution File, Format Version 11.00\n# Visual Studio 2008\nProject(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Assembly-CSharp\", \"Assembly-CSharp.csproj\", \"{0D4A}\"\nEndProject\nGlobal\n\tGlobalSection(SolutionProperties) = preSolution\n\t\tHideSolutionNode = FALSE\n\tEndGlobalSection\nEndGlobal\n";

const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="4.0" DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <TargetFrameworkVersion>v3.5</TargetFrameworkVersion>
    <AssemblyName>Assembly-CSharp</AssemblyName>
  </PropertyGroup>
  <ItemGroup>
    <Compile Include="Assets\Player.cs" />
  </ItemGroup>
</Project>
"#;

// Stands in for the host writing fresh project files.
fn generate(root: &Path) -> Result<()> {
    fs::write(root.join("Game.sln"), SOLUTION)?;
    fs::write(root.join("Assembly-CSharp.csproj"), PROJECT)?;
    Ok(())
}

#[test]
fn enable_then_sync_patches_generated_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    fs::write(root.join("Stale.csproj"), "<Project />").unwrap();

    let mut vscode = Integration::new(&root, MemoryPreferences::new(), || generate(&root))
        .with_editor(CodeEditor::new("/opt/code/bin/code"))
        .with_scrub_options(ScrubOptions {
            downgrade_framework: true,
        })
        .with_port_lookup(|_| None);

    vscode.set_enabled(true).unwrap();
    assert!(!root.join("Stale.csproj").exists());

    let summary = vscode.project_files_generated().unwrap();
    assert_eq!(summary.patched, 2);
    assert_eq!(summary.skipped, 0);

    let solution = fs::read_to_string(root.join("Game.sln")).unwrap();
    assert!(solution.starts_with("Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio 2012\n"));
    assert!(!solution.contains("SolutionProperties"));

    let project = fs::read_to_string(root.join("Assembly-CSharp.csproj")).unwrap();
    assert_eq!(project.matches("<LangVersion>default</LangVersion>").count(), 1);
    assert!(project.contains("<TargetFrameworkVersion>v2.0</TargetFrameworkVersion>"));

    // a second pass finds nothing left to do
    let summary = vscode.update_solution().unwrap();
    assert_eq!(summary.patched, 0);
    assert_eq!(summary.unchanged, 2);
}

#[test]
fn disabled_integration_leaves_files_alone() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path()).unwrap();

    let vscode = Integration::new(dir.path(), MemoryPreferences::new(), || -> Result<()> { Ok(()) });
    assert_eq!(vscode.update_solution().unwrap().patched, 0);
    assert_eq!(fs::read_to_string(dir.path().join("Game.sln")).unwrap(), SOLUTION);
}

#[test]
fn launch_file_keeps_unrelated_configurations() {
    let dir = tempfile::tempdir().unwrap();
    let launch = dir.path().join(".vscode").join("launch.json");
    fs::create_dir_all(launch.parent().unwrap()).unwrap();
    fs::write(
        &launch,
        r#"{
	"version": "0.2.0",
	"configurations": [
		{ "name": "Unity", "type": "mono", "request": "attach", "address": "localhost", "port": 1 },
		{ "name": "Server", "type": "coreclr", "request": "launch", "program": "bin/Server.dll" }
	]
}"#,
    )
    .unwrap();

    let mut vscode = Integration::new(dir.path(), MemoryPreferences::new(), || -> Result<()> { Ok(()) })
        .with_editor(CodeEditor::new("/opt/code/bin/code"))
        .with_port_lookup(|_| Some(56000));
    vscode.set_enabled(true).unwrap();
    assert_eq!(vscode.play_mode_changed(true).unwrap(), Some(launch.clone()));

    let file = LaunchFile::read(&launch).unwrap();
    assert_eq!(file.configurations.len(), 2);
    assert_eq!(file.get("Unity").and_then(|config| config.port), Some(56000));
    assert_eq!(file.get("Server").unwrap().extra["program"], "bin/Server.dll");
}

#[test]
fn preferences_survive_a_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut prefs = MemoryPreferences::new();
    prefs.set_string(keys::host::SCRIPTS_DEFAULT_APP, "/usr/bin/monodevelop");
    prefs.set_string(keys::host::SCRIPT_EDITOR_ARGS, "$(File)");

    let mut vscode = Integration::new(dir.path(), prefs, || -> Result<()> { Ok(()) })
        .with_editor(CodeEditor::new("/opt/code/bin/code"))
        .with_port_lookup(|_| None);

    vscode.set_enabled(true).unwrap();
    vscode.startup().unwrap();
    assert_eq!(
        vscode.preferences().get_string(keys::host::SCRIPT_EDITOR_ARGS),
        SCRIPT_EDITOR_ARGS
    );

    vscode.unload();
    let prefs = vscode.into_preferences();
    assert_eq!(prefs.get_string(keys::host::SCRIPTS_DEFAULT_APP), "/usr/bin/monodevelop");
    assert_eq!(prefs.get_string(keys::host::SCRIPT_EDITOR_ARGS), "$(File)");
    assert!(prefs.get_bool(keys::ENABLED, false));
}

#[cfg(unix)]
#[test]
fn scripts_open_through_the_editor() {
    let dir = tempfile::tempdir().unwrap();
    let mut vscode = Integration::new(dir.path(), MemoryPreferences::new(), || -> Result<()> { Ok(()) })
        .with_editor(CodeEditor::new("true"))
        .with_port_lookup(|_| None);
    vscode.set_enabled(true).unwrap();

    assert!(vscode.asset_opened(Path::new("Assets/Player.cs"), Some(12)));
    assert!(!vscode.asset_opened(Path::new("Assets/Player.prefab"), None));
}

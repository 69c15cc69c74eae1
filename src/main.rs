use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use unity_vscode::{
    FilePreferences, Integration, Preferences, ProjectFileGenerator, Result,
    debug::{find_debug_port, port::UNITY_PROCESS},
    editor::CodeEditor,
    project::UnityBatchGenerator,
};

#[derive(Parser)]
#[command(
    name = "unity-vscode",
    version,
    about = "Visual Studio Code as the script editor of a Unity project"
)]
struct Cli {
    /// Unity project root (defaults to the current directory)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    project: Option<PathBuf>,

    /// Preference store (defaults to the user config directory)
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    preferences: Option<PathBuf>,

    /// Code editor binary or app bundle
    #[arg(long, global = true, value_hint = clap::ValueHint::ExecutablePath)]
    code: Option<PathBuf>,

    /// Unity editor used to regenerate project files in batch mode
    #[arg(long, global = true, value_hint = clap::ValueHint::ExecutablePath)]
    unity: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn the integration on
    Enable,
    /// Turn the integration off and restore the previous script editor
    Disable,
    /// Show the integration preferences
    Status,
    /// Change an integration preference
    Set {
        option: Toggle,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
    /// Days between automatic update checks
    UpdateInterval { days: i64 },
    /// Patch the generated solution and project files
    Sync,
    /// Write .vscode/launch.json for the current debugger choice
    Launch,
    /// Print the debugger port of a running process
    Port {
        #[arg(default_value = UNITY_PROCESS)]
        process: String,
    },
    /// Open the project, or a script in it
    Open {
        file: Option<PathBuf>,
        #[arg(short, long)]
        line: Option<u32>,
    },
    /// Write .vscode/settings.json
    Settings,
    /// Check for a newer published plugin version
    CheckUpdate,
    /// Download and install the Unity debugger extension
    InstallDebugger,
    /// Reapply the script editor override and run a due update check
    Startup,
    /// Restore the host's script editor as an editor unload would
    Unload,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    Debug,
    WriteLaunchFile,
    UseUnityDebugger,
    RevertOnExit,
    AutomaticUpdates,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        project,
        preferences,
        code,
        unity,
        command,
        ..
    } = cli;

    if let Commands::Port { process } = &command {
        match find_debug_port(process) {
            Some(port) => println!("{port}"),
            None => log::warn!("no listening port found for {process}"),
        }
        return Ok(());
    }

    let project = dunce::canonicalize(project.unwrap_or_else(|| PathBuf::from(".")))?;
    let preferences = preferences
        .or_else(FilePreferences::default_path)
        .unwrap_or_else(|| project.join(".vscode").join("unity-vscode.json"));
    let mut prefs = FilePreferences::open(preferences)?;

    let mut unity = unity.map(|unity| UnityBatchGenerator::new(unity, &project));
    let generator = move || -> Result<()> {
        match unity.as_mut() {
            Some(unity) => unity.sync(),
            None => {
                log::warn!("[sync] no --unity given, regenerate project files from the editor");
                Ok(())
            }
        }
    };

    {
        let mut vscode = Integration::new(&project, &mut prefs, generator);
        if let Some(code) = code {
            vscode = vscode.with_editor(CodeEditor::new(code));
        }
        execute(&mut vscode, command)?;
    }

    prefs.save()
}

fn execute<P: Preferences, G: ProjectFileGenerator>(
    vscode: &mut Integration<P, G>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Enable => {
            vscode.set_enabled(true)?;
            vscode.update_solution()?;
            vscode.update_launch_file()?;
        }
        Commands::Disable => vscode.set_enabled(false)?,
        Commands::Status => status(vscode),
        Commands::Set { option, value } => match option {
            Toggle::Debug => vscode.set_debug(value),
            Toggle::WriteLaunchFile => vscode.set_write_launch_file(value),
            Toggle::UseUnityDebugger => vscode.set_use_unity_debugger(value)?,
            Toggle::RevertOnExit => vscode.set_revert_on_exit(value),
            Toggle::AutomaticUpdates => vscode.set_automatic_updates(value),
        },
        Commands::UpdateInterval { days } => vscode.set_update_time(days),
        Commands::Sync => {
            if !vscode.enabled() {
                log::warn!("integration is disabled, run `unity-vscode enable` first");
            }
            let summary = vscode.project_files_generated()?;
            println!(
                "{} patched, {} unchanged, {} skipped",
                summary.patched, summary.unchanged, summary.skipped
            );
        }
        Commands::Launch => match vscode.update_launch_file()? {
            Some(path) => println!("{}", path.display()),
            None => log::warn!("no launch configuration written"),
        },
        Commands::Open { file: Some(file), line } => {
            if !vscode.asset_opened(&file, line) {
                log::warn!("{} was not opened in Code", file.display());
            }
        }
        Commands::Open { file: None, .. } => {
            if !vscode.open_project()? {
                log::warn!("{} was not opened in Code", vscode.project().display());
            }
        }
        Commands::Settings => {
            let path = vscode.write_workspace_settings()?;
            println!("{}", path.display());
        }
        Commands::CheckUpdate => {
            let check = vscode.check_for_update()?;
            if check.is_newer() {
                println!("{:.2} is available", check.published);
            } else {
                println!("up to date ({:.2})", check.published);
            }
        }
        Commands::InstallDebugger => vscode.install_debugger()?,
        Commands::Startup => vscode.startup()?,
        Commands::Unload => vscode.unload(),
        Commands::Port { .. } => {}
    }
    Ok(())
}

fn status<P: Preferences, G: ProjectFileGenerator>(vscode: &Integration<P, G>) {
    println!("project:            {}", vscode.project().display());
    println!("code:               {}", vscode.editor().path().display());
    println!("enabled:            {}", vscode.enabled());
    println!("debug output:       {}", vscode.debug());
    println!("write launch file:  {}", vscode.write_launch_file());
    println!("unity debugger:     {}", vscode.use_unity_debugger());
    println!("revert on exit:     {}", vscode.revert_on_exit());
    println!("automatic updates:  {} (every {} days)", vscode.automatic_updates(), vscode.update_time());
    println!("last update check:  {}", vscode.last_update().to_rfc3339());
    println!("published version:  {:.2}", vscode.published_version());
}

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

pub mod commands;
pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;

use commands::package_cmds::{launch_unit_cmd, load_package_cmd};
use commands::tracking_cmds::{get_session_snapshot_cmd, handle_api_call, ApiCall};
use commands::AppState;
use services::config::load_config;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "scorm-sandbox",
    version,
    about = "Load a SCORM 1.2 package and drive it through an emulated LMS runtime"
)]
pub struct CliArgs {
    /// SCORM package (.zip) to load
    pub package: PathBuf,

    /// JSON config file (learner profile, loader limits)
    #[arg(long, env = "SCORM_SANDBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the rewritten entry page of this launchable unit
    #[arg(long)]
    pub unit: Option<String>,

    /// JSON array of LMS calls to replay against the runtime, e.g.
    /// [{"method":"LMSInitialize","args":[""]}]
    #[arg(long)]
    pub calls: Option<PathBuf>,
}

/// Load the package, print its descriptor and optionally a unit's page and
/// the outcome of a scripted call sequence.
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let state = Arc::new(AppState::new(config));

    let bytes = tokio::fs::read(&args.package)
        .await
        .with_context(|| format!("Failed to read package {}", args.package.display()))?;
    let file_name = args
        .package
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let descriptor = load_package_cmd(Arc::clone(&state), file_name, bytes).await?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);

    if let Some(unit) = &args.unit {
        let page = launch_unit_cmd(&state, unit)?;
        println!("{page}");
    }

    if let Some(path) = &args.calls {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read call script {}", path.display()))?;
        let calls: Vec<ApiCall> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid call script {}", path.display()))?;

        for call in &calls {
            let result = handle_api_call(&state, call);
            println!("{:?}({:?}) -> {:?}", call.method, call.args, result);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&get_session_snapshot_cmd(&state))?
        );
    }

    Ok(())
}

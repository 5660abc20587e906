use clap::Parser;
use scorm_sandbox_lib::CliArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    scorm_sandbox_lib::run(CliArgs::parse()).await
}

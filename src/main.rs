use std::process::ExitCode;

use jira_worklog::Config;
use log::error;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = jira_worklog::serve(config).await {
        error!("Server stopped: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

use libris_api::config::{load_dotenv, ServerConfig};
use libris_api::server::serve;
use libris_core::init_logging;
use log::error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("logging setup failed: {err}");
        return ExitCode::FAILURE;
    }

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_start module=api status=error detail={err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

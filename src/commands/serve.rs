use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use dinspect_lib::server::gemini::GeminiClient;
use dinspect_lib::server::{serve, AppState};
use dinspect_lib::{Config, InspectError};
use tracing::info;

use crate::cli::OutputFormat;
use crate::formatting::render_error;
use crate::settings::load_config;

/// Run the backend until the process is stopped.
pub async fn run_serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    model: Option<String>,
) -> ExitCode {
    let result = match load_config(config_path) {
        Ok(config) => start(config, host, port, model).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err, OutputFormat::Pretty, None),
    }
}

async fn start(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    model: Option<String>,
) -> Result<(), InspectError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(model) = model {
        config.server.model = model;
    }

    let addr = listen_addr(&config.server.host, config.server.port)?;
    let client = GeminiClient::new(config.api_key()?, config.server.model.clone())?;
    info!(%addr, model = %client.model(), "starting prompt backend");
    serve(addr, AppState::new(Arc::new(client))).await
}

fn listen_addr(host: &str, port: u16) -> Result<SocketAddr, InspectError> {
    let host = if host == "localhost" { "127.0.0.1" } else { host };
    format!("{host}:{port}")
        .parse()
        .or_else(|_| format!("[{host}]:{port}").parse())
        .map_err(|_| InspectError::Config(format!("Invalid listen address: {host}:{port}")))
}

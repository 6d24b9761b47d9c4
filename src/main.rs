mod cli;
mod commands;
mod formatting;
mod pipeline;
mod settings;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use cli::Commands;
use commands::{
    run_capture, run_element, run_enhance, run_flags, run_inspect, run_prompt, run_scroll,
    run_serve,
};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);
    let config = args.config.as_deref();

    match args.command {
        Commands::Inspect {
            source,
            only,
            palette_css,
            display,
            browser,
            output,
        } => run_inspect(config, source, only, palette_css, display, browser, output).await,
        Commands::Flags {
            source,
            fail_on,
            browser,
            output,
        } => run_flags(config, source, fail_on, browser, output).await,
        Commands::Scroll {
            source,
            code,
            control,
            action,
            value,
            browser,
            output,
        } => run_scroll(config, source, code, control, action, value, browser, output).await,
        Commands::Element {
            source,
            selector,
            compare,
            highlight,
            browser,
            output,
        } => run_element(config, source, selector, compare, highlight, browser, output).await,
        Commands::Enhance {
            url,
            selector,
            backend_url,
            no_copy,
            save_image,
            browser,
            output,
        } => {
            let args = commands::EnhanceArgs {
                url,
                selector,
                backend_url,
                no_copy,
                save_image,
            };
            run_enhance(config, args, browser, output).await
        }
        Commands::Capture {
            url,
            snapshot,
            browser,
            output,
        } => run_capture(config, url, snapshot, browser, output).await,
        Commands::Prompt {
            source,
            kind,
            display,
            browser,
            output,
        } => run_prompt(config, source, kind, display, browser, output).await,
        Commands::Serve { host, port, model } => run_serve(config, host, port, model).await,
    }
}

/// Logs go to stderr so stdout stays machine-readable.
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn,dinspect=info,dinspect_lib=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

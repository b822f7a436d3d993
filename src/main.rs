use clap::Parser;
use log::{error, info};
use meter2sigfox::{run, AppError, ConfigHolder, RunOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Send the registers of a meter reading log as Sigfox uplinks
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file, defaults to config/m2s.yaml or m2s.yaml
    #[arg(short, long, env = "M2S_CONFIG")]
    config: Option<PathBuf>,

    /// Log file to read instead of the configured one
    #[arg(short, long)]
    log_file: Option<String>,

    /// Serial device of the modem instead of the configured one
    #[arg(short, long)]
    port: Option<String>,

    /// Encode and print the chunks without opening the serial port
    #[arg(long)]
    dry_run: bool,
}

async fn execute(args: Args) -> Result<(), AppError> {
    let mut holder = ConfigHolder::load(args.config.as_deref())?;
    if let Some(log_file) = args.log_file {
        /* taken relative to the working directory, not the config file */
        holder.config.log_file = log_file;
        holder.base_path = PathBuf::new();
    }
    if let Some(port) = args.port {
        holder.config.serial.port = port;
    }

    let options = RunOptions { dry_run: args.dry_run };
    let summary = run(&holder, &options).await?;

    if options.dry_run {
        let uplink = &summary.uplink;
        match serde_json::to_string_pretty(&uplink.readings) {
            Ok(report) => println!("{}", report),
            Err(e) => error!("Unable to render readings: {e:?}"),
        }
        println!("payload: {}", uplink.payload);
        if let Some(ciphertext) = &uplink.ciphertext {
            println!("ciphertext: {}", ciphertext);
        }
        for chunk in uplink.chunks.iter() {
            println!("AT$SF={}", chunk);
        }
    }

    info!("Run finished, {} frames sent", summary.frames_sent);
    Ok(())
}

/// Logs the failure, and writes it to `out` as well when error logging is filtered out.
fn report_failure(e: &AppError, logging: bool, out: &mut impl Write) {
    if logging {
        error!("{}", e);
    } else {
        let _ = writeln!(out, "Error: {}", e);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    let default_filter = std::env::var("M2S_LOG_LEVEL").unwrap_or("info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let args = Args::parse();

    match execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, log::log_enabled!(log::Level::Error), &mut std::io::stderr());
            ExitCode::FAILURE
        }
    }
}

use anyhow::{Context, Result};
use std::path::Path;
use verstamp::config::{self, Invocation};
use verstamp::{log_error, log_info, version_file, BuildStamp};

fn main() {
    let code = match run_app() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            -1
        }
    };
    let _ = verstamp::logger::finalize_logs();
    std::process::exit(code);
}

fn run_app() -> Result<i32> {
    let args: Vec<String> = std::env::args().collect();
    let program = args
        .first()
        .and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or("verstamp")
        .to_string();

    let options = match config::parse_args(args) {
        Ok(Invocation::Run(options)) => options,
        Ok(Invocation::Help) => {
            print!("{}", config::usage(&program));
            return Ok(-1);
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            print!("{}", config::usage(&program));
            return Ok(e.exit_code());
        }
    };

    if let Some(target) = &options.log {
        verstamp::logger::init_logger(target, "verstamp").context("Failed to start session log")?;
        if let Some(log_path) = verstamp::logger::get_log_path() {
            log_info!("Log file: {}", log_path.display());
        }
    }

    let engine = &options.engine;
    log_info!(
        "Stamping {} (inc={}, rev={}, sim={}, verbose={})",
        engine.path.display(),
        engine.increment_build,
        engine.increment_revision,
        engine.simulate,
        engine.verbose
    );

    let stamp = BuildStamp::now();
    let stdout = std::io::stdout();
    match version_file::run(engine, &stamp, &mut stdout.lock()) {
        Ok(_) => Ok(0),
        Err(e) => {
            log_error!("{}", e);
            eprintln!("ERROR: {}", e);
            Ok(e.exit_code())
        }
    }
}

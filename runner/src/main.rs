use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use ls8::constants::TRACE_TARGET;

mod run;

/// Run an LS-8 program image
#[derive(Parser, Debug)]
#[command(name = "ls8", version)]
struct Args {
    /// Program image: one binary byte per line, `#` starts a comment
    program: PathBuf,

    /// Print the machine state before every instruction
    #[arg(long)]
    trace: bool,
}

/// Enables the per-instruction trace regardless of `RUST_LOG`
fn trace_directive() -> Directive {
    format!("{}=trace", TRACE_TARGET)
        .parse()
        .unwrap_or_else(|_| LevelFilter::WARN.into())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if args.trace {
        env_filter = env_filter.add_directive(trace_directive());
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(!args.trace)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run::run(&args.program) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use exn::ResultExt;
use poster::error::{ErrorKind, Result};
use poster::{Cli, logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

async fn execute(cli: &Cli) -> Result<()> {
    let config = cli.resolve().or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Configuration resolved");
    let report = poster::run(config).await?;
    for path in &report.written {
        println!("wrote {}", path.display());
    }
    for failure in &report.failed {
        eprintln!("error: {:?}", failure.error);
    }
    report.check()
}

use anyhow::Result;
use javasema::cli;

fn main() -> Result<()> {
    let cli = cli::parse_args();
    cli::init_logging(cli.verbosity);
    let config = cli::load_configuration(cli.config.as_deref())?;
    log::debug!("Running {:?}", cli.command);
    cli::run(cli.command, &config, cli.format)
}

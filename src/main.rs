use clap::Parser;
use log::*;

use repodesk::{cli, server};

fn initialize_logger(debug: bool) -> color_eyre::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("repodesk")
        .add_filter_allow_str("actix_web")
        .add_filter_allow_str("actix_server")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = cli_args.resolve_config()?;
    debug!("resolved configuration: {config:?}");

    server::run(config).await?;

    Ok(())
}

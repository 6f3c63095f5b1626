use cardigan::config::{CardiganConfig, StoreOptions};
use cardigan::dispatch::{self, Request};
use cardigan::error::Result;
use cardigan::model::Author;
use cardigan::reply::Reply;
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

mod args;
use args::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    config: CardiganConfig,
    options: StoreOptions,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = init_context(&cli)?;
    let request = Request {
        deck_id: cli.deck.clone(),
        author: Author::new(cli.user_id.clone(), cli.user_name.clone()),
        credential: cli.token.clone(),
        text: cli.command_text(),
    };

    let reply = dispatch::handle(&ctx.options, &ctx.config, &request);
    if cli.plain {
        print_plain(&reply);
    } else if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!("{}", serde_json::to_string(&reply)?);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("CARDIGAN_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => CardiganConfig::default_dir()?,
    };
    let mut config = CardiganConfig::load(&config_dir)?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    let options = config.store_options()?;
    tracing::debug!(config_dir = %config_dir.display(), data_dir = %options.data_dir.display(), "Loaded config");

    Ok(AppContext { config, options })
}

fn print_plain(reply: &Reply) {
    if reply.is_ephemeral() {
        println!("{}", reply.text.yellow());
    } else {
        println!("{}", reply.text);
    }
    for attachment in &reply.attachments {
        for line in attachment.text.lines() {
            println!("  {}", line.dimmed());
        }
    }
}

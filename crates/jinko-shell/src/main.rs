use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use jinko_client::HttpVaultApi;
use jinko_core::VaultApi;
use jinko_shell::{Console, ShellConfig};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("jinko")
        .version(jinko_core::VERSION)
        .about("Jinko Vault agent console")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("API base address (overrides JINKO_API_URL)"),
        )
        .arg(
            Arg::new("agent")
                .long("agent")
                .global(true)
                .help("Agent to sign in at startup (overrides JINKO_AGENT)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("run").about("Interactive console on stdin (default)"))
        .subcommand(
            Command::new("script")
                .about("Run commands from a file")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Command file, one command per line"),
                ),
        )
        .subcommand(Command::new("health").about("Check the Jinko service"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<ShellConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    config = config.with_env(|key| std::env::var(key).ok());
    if let Some(url) = matches.get_one::<String>("api-url") {
        config = config.with_api_url(url.clone());
    }
    if let Some(agent) = matches.get_one::<String>("agent") {
        config = config.with_agent(agent.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = load_config(&matches)?;
    let api = HttpVaultApi::with_timeout(&config.api_base_url, config.request_timeout())
        .context("cannot create API client")?;
    tracing::info!("using Jinko API at {}", api.base_url());

    let mut stdout = std::io::stdout();
    match matches.subcommand() {
        Some(("health", _)) => {
            let health = api.health().await.context("health check failed")?;
            println!("{} (v{})", health.status, health.version);
        }
        Some(("script", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("script file is required")?;
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            let console = Console::new(api, &config).await;
            console.run(BufReader::new(file), &mut stdout).await?;
        }
        _ => {
            println!("Jinko Vault console {} (type 'help')", jinko_core::VERSION);
            let console = Console::new(api, &config).await;
            console
                .run(BufReader::new(tokio::io::stdin()), &mut stdout)
                .await?;
        }
    }
    Ok(())
}

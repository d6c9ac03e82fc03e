//! ncdiscover CLI binary.
//!
//! Discovers the operational state of one network element over NETCONF
//! and logs every retrieved subtree.
//!
//! ```text
//! ncdiscover --type sros --device pe1 --username admin --password admin
//! ```
//!
//! Exits 1 when any error was counted.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use ncdiscover::config::{Config, ConfigOverrides};
use ncdiscover::{
    Discovery, DiscoveryReport, Family, SessionParams, TcpConnector, TransportKind, VERSION,
};

/// Flags accepted with a single dash for compatibility with older scripts
const LEGACY_FLAGS: [&str; 4] = ["-type", "-device", "-username", "-password"];

/// Flags whose value is the next argument when not given as `--flag=value`
const VALUE_FLAGS: [&str; 9] = [
    "--type",
    "--device",
    "--username",
    "--password",
    "--port",
    "--transport",
    "--command-timeout",
    "--session-timeout",
    "--config",
];

#[derive(Parser)]
#[command(name = "ncdiscover")]
#[command(version = VERSION)]
#[command(about = "NETCONF operational-state discovery", long_about = None)]
struct Cli {
    /// Device family (sros)
    #[arg(long = "type", value_name = "FAMILY")]
    family: Option<Family>,

    /// Device host name or address
    #[arg(long, allow_hyphen_values = true)]
    device: Option<String>,

    /// Login user
    #[arg(long, allow_hyphen_values = true)]
    username: Option<String>,

    /// Login password
    #[arg(long, allow_hyphen_values = true)]
    password: Option<String>,

    /// NETCONF port [default: 830]
    #[arg(long)]
    port: Option<u16>,

    /// Transport (ssh, tcp) [default: ssh]
    #[arg(long)]
    transport: Option<TransportKind>,

    /// Per-command timeout in seconds [default: 300]
    #[arg(long, value_name = "SECS")]
    command_timeout: Option<u64>,

    /// Session inactivity timeout in seconds [default: 3600]
    #[arg(long, value_name = "SECS")]
    session_timeout: Option<u64>,

    /// Config file (default: ~/.config/ncdiscover/config.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    /// List the catalog for the device family and exit
    #[arg(long)]
    list_catalog: bool,
}

impl Cli {
    /// Flags given on the command line, as the top config layer
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.device.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            transport: self.transport,
            command_timeout_secs: self.command_timeout,
            session_timeout_secs: self.session_timeout,
            family: self.family,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_legacy_args(std::env::args()));
    init_logging(cli.verbose, cli.log_json);

    let config = load_config(&cli)?;
    let family = config.discovery.family;

    if cli.list_catalog {
        list_catalog(family);
        return Ok(());
    }

    for (value, flag) in [
        (&config.session.host, "--device"),
        (&config.session.username, "--username"),
        (&config.session.password, "--password"),
    ] {
        if value.is_none() {
            Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    format!("the following required argument was not provided: {flag}"),
                )
                .exit();
        }
    }
    let params = config.to_session_params()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(discover(config.session.transport, family, &params))?;

    render(&report, cli.json)?;

    if report.error_count() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Rewrite `-device x` style flags to `--device x`; flag values are left alone
fn normalize_legacy_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut takes_value = false;
    args.into_iter()
        .map(|arg| {
            if std::mem::take(&mut takes_value) {
                return arg;
            }
            let name = arg.split('=').next().unwrap_or(&arg);
            let arg = if LEGACY_FLAGS.contains(&name) {
                format!("-{arg}")
            } else {
                arg
            };
            takes_value = VALUE_FLAGS.contains(&arg.as_str());
            arg
        })
        .collect()
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// File, then environment, then CLI flags; later layers win
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let file = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Config::from_file(path)?
            },
            None => Config::default(),
        },
    };

    Ok(file.apply(ConfigOverrides::from_env()).apply(cli.overrides()))
}

async fn discover(
    transport: TransportKind,
    family: Family,
    params: &SessionParams,
) -> anyhow::Result<DiscoveryReport> {
    let report = match transport {
        #[cfg(feature = "ssh")]
        TransportKind::Ssh => {
            Discovery::new(ncdiscover::SshConnector::new(), family)
                .run(params)
                .await
        },
        #[cfg(not(feature = "ssh"))]
        TransportKind::Ssh => anyhow::bail!("built without SSH support, use --transport tcp"),
        TransportKind::Tcp => Discovery::new(TcpConnector::new(), family).run(params).await,
    };
    Ok(report)
}

fn render(report: &DiscoveryReport, json: bool) -> anyhow::Result<()> {
    for doc in &report.documents {
        tracing::info!(
            "{}: {}\n{}",
            doc.namespace(),
            doc.element(),
            doc.content().unwrap_or("(no state)")
        );
    }
    for issue in &report.issues {
        tracing::warn!("{}", issue);
    }
    tracing::info!(
        "Discovery of {} completed with {} errors in {}ms",
        report.host,
        report.error_count(),
        report.elapsed().num_milliseconds()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}

fn list_catalog(family: Family) {
    let catalog = family.driver().catalog_for(None);
    println!("Catalog {} ({} subtrees)", catalog.name(), catalog.len());
    println!("{}", "=".repeat(60));
    for (index, descriptor) in catalog.descriptors().iter().enumerate() {
        println!("{:>3}  {}", index + 1, descriptor.namespace());
    }
    if !catalog.excluded().is_empty() {
        println!();
        println!("Never queried:");
        for descriptor in catalog.excluded() {
            println!("     {}", descriptor.namespace());
        }
    }
}

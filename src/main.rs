mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use redfish::resource::{self, Resource};
use redfish::schemas::ComputerSystem;
use redfish::transport::SERVICE_ROOT;
use redfish::{Client, ClientConfig, ErrorKind};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for Redfish BMCs
#[derive(Parser, Debug)]
#[command(name = "redfish", version, about, long_about = None)]
struct Args {
    /// Service base URL, e.g. https://bmc.example.com
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    #[arg(short, long, global = true)]
    username: Option<String>,

    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Use HTTP basic auth instead of a session
    #[arg(long, global = true)]
    basic: bool,

    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: Output,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the service root
    Root,
    /// GET any URI and print the body
    Get { uri: String },
    /// List the member URIs of a collection
    List { uri: String },
    /// Show the links and actions of a resource
    Links { uri: String },
    /// Fetch every computer system
    Systems,
    /// Reset a computer system
    Reset {
        system_id: String,
        /// On, ForceOff, GracefulShutdown, GracefulRestart, ForceRestart, ...
        reset_type: redfish::common::ResetType,
    },
    /// Persist endpoint, username and flags to the config file
    ConfigSave,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", log_path.display(), e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("redfish started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("redfish").join("redfish.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".redfish").join("redfish.log");
    }
    PathBuf::from("redfish.log")
}

/// Short, user-facing message for a failed command.
fn format_error(error: &anyhow::Error) -> String {
    let Some(err) = error.downcast_ref::<redfish::Error>() else {
        return format!("{:#}", error);
    };

    let detail = err
        .extended_info()
        .first()
        .map(|m| format!(" ({})", m.message))
        .unwrap_or_default();

    match err.kind() {
        ErrorKind::Auth => format!("Authentication failed. Check username and password.{}", detail),
        ErrorKind::NotFound => format!("Resource not found.{}", detail),
        ErrorKind::Conflict => format!("Resource changed on the service; fetch it again.{}", detail),
        ErrorKind::ServerError => format!("The service reported an internal error.{}", detail),
        ErrorKind::Transport => "Cannot reach the service. Check --endpoint and --insecure.".to_string(),
        ErrorKind::Cancelled => "Cancelled.".to_string(),
        _ => format!("{:#}", error),
    }
}

fn print<T: Serialize>(output: Output, value: &T) -> Result<()> {
    let text = match output {
        Output::Json => serde_json::to_string_pretty(value)?,
        Output::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

/// Link and action names found in an untyped resource body.
fn describe_links(body: &Value) -> Value {
    fn uris(value: &Value) -> Vec<String> {
        match value {
            Value::Object(map) => map
                .get("@odata.id")
                .and_then(Value::as_str)
                .map(|uri| vec![uri.to_string()])
                .unwrap_or_default(),
            Value::Array(items) => items.iter().flat_map(uris).collect(),
            _ => Vec::new(),
        }
    }

    let mut links = serde_json::Map::new();
    let sources = body
        .as_object()
        .into_iter()
        .chain(body.get("Links").and_then(Value::as_object));
    for map in sources {
        for (name, value) in map {
            if name == "Links" || name == "Oem" || name.starts_with('@') {
                continue;
            }
            let found = uris(value);
            if !found.is_empty() {
                links.insert(name.clone(), found.into());
            }
        }
    }

    let mut actions = serde_json::Map::new();
    if let Some(map) = body.get("Actions").and_then(Value::as_object) {
        for (name, action) in map {
            if let Some(target) = action.get("target") {
                actions.insert(name.trim_start_matches('#').to_string(), target.clone());
            }
        }
    }

    serde_json::json!({ "Links": links, "Actions": actions })
}

fn client_config(args: &Args, config: &Config) -> Result<ClientConfig> {
    let endpoint = config
        .effective_endpoint(args.endpoint.as_deref())
        .context("No endpoint configured. Use --endpoint or set REDFISH_ENDPOINT")?;

    let mut client_config = ClientConfig::new(endpoint)
        .with_insecure(args.insecure || config.insecure);

    if let Some(fan_out) = config.fan_out {
        client_config = client_config.with_fan_out(fan_out);
    }
    if let Some(secs) = config.timeout_secs {
        client_config = client_config.with_timeout(Duration::from_secs(secs));
    }

    let username = config.effective_username(args.username.as_deref());
    let password = config.effective_password(args.password.as_deref());
    client_config = match (username, password) {
        (Some(user), Some(pass)) if args.basic || config.basic_auth => {
            client_config.with_basic_auth(&user, &pass)
        }
        (Some(user), Some(pass)) => client_config.with_session(&user, &pass),
        _ => client_config.without_auth(),
    };

    Ok(client_config)
}

async fn run(args: &Args, client: &Client) -> Result<()> {
    match &args.command {
        Command::Root => {
            let body = client.get_json(SERVICE_ROOT).await?;
            print(args.output, &body)
        }
        Command::Get { uri } => {
            let body = client
                .get_json(uri)
                .await
                .with_context(|| format!("GET {}", uri))?;
            print(args.output, &body)
        }
        Command::List { uri } => {
            let index = resource::collect_uris(client, uri).await?;
            print(
                args.output,
                &serde_json::json!({
                    "Members": index.members,
                    "Members@odata.count": index.len(),
                    "ReportedCount": index.reported_count,
                }),
            )
        }
        Command::Links { uri } => {
            let body = client.get_json(uri).await?;
            print(args.output, &describe_links(&body))
        }
        Command::Systems => {
            let root = client.service_root().await?;
            let mut systems = root.systems().await?;
            systems.sort_by_id();
            for (uri, err) in &systems.failures.0 {
                eprintln!("{}: {}", uri, err);
            }
            print(args.output, &systems.members)
        }
        Command::Reset {
            system_id,
            reset_type,
        } => {
            let uri = format!("/redfish/v1/Systems/{}", system_id);
            let system = ComputerSystem::get(client, &uri)
                .await
                .with_context(|| format!("fetching system {}", system_id))?;
            system.reset(*reset_type).await?;
            println!("{} {} accepted", system.odata_id(), reset_type.as_str());
            Ok(())
        }
        // Handled in `execute` before connecting.
        Command::ConfigSave => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = execute(args).await {
        tracing::error!("{:#}", err);
        eprintln!("Error: {}", format_error(&err));
        std::process::exit(1);
    }
}

async fn execute(args: Args) -> Result<()> {
    let mut config = Config::load();

    if let Command::ConfigSave = args.command {
        if let Some(endpoint) = &args.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(username) = &args.username {
            config.username = Some(username.clone());
        }
        config.insecure |= args.insecure;
        config.basic_auth |= args.basic;
        config.save()?;
        if let Some(path) = Config::config_path() {
            println!("Saved {}", path.display());
        }
        return Ok(());
    }

    let client = Client::connect(client_config(&args, &config)?).await?;
    tracing::info!("Connected to {}", client.config().endpoint);

    let result = run(&args, &client).await;

    if let Err(e) = client.logout().await {
        tracing::warn!("Failed to close session: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_links() {
        let body = json!({
            "@odata.id": "/redfish/v1/Systems/1",
            "Bios": {"@odata.id": "/redfish/v1/Systems/1/Bios"},
            "Status": {"State": "Enabled"},
            "Links": {"Chassis": [{"@odata.id": "/redfish/v1/Chassis/1"}]},
            "Actions": {"#ComputerSystem.Reset": {"target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"}}
        });
        let described = describe_links(&body);
        assert_eq!(described["Links"]["Bios"], json!(["/redfish/v1/Systems/1/Bios"]));
        assert_eq!(described["Links"]["Chassis"], json!(["/redfish/v1/Chassis/1"]));
        assert!(described["Links"].get("Status").is_none());
        assert_eq!(
            described["Actions"]["ComputerSystem.Reset"],
            json!("/redfish/v1/Systems/1/Actions/ComputerSystem.Reset")
        );
    }

    #[test]
    fn test_format_error_plain() {
        let err = anyhow::anyhow!("No endpoint configured");
        assert_eq!(format_error(&err), "No endpoint configured");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "redfish",
            "--endpoint",
            "https://bmc",
            "reset",
            "1",
            "ForceRestart",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Reset { reset_type: redfish::common::ResetType::ForceRestart, .. }
        ));
    }
}

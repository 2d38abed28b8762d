//! OPNS CLI
//!
//! Command-line tools for the `.opns` name service: name validation,
//! resolution, and owned-domain discovery.

use std::process::ExitCode;

use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use opns_core::constants::{
    default_known_names, BALANCE_EXAMPLE_ADDRESS, NATIVE_SYMBOL, SAMPLE_NAMES, TLD,
    TOKEN_PROBE_FIRST, TOKEN_PROBE_LAST,
};
use opns_core::{canonicalize, checksum, parse_address, validate_name, ChainClient, OpnsConfig, OpnsError};
use opns_registrar::{
    check_availability, list_owned_domains_with_progress, resolve_name, scan_known_names,
    scan_token_owners, AddressRecord, ChunkOutcome, ContractSet, KnownNamesReport,
    NameResolution, TextRecord, TokenProbe,
};
use opns_rpc::{RpcClient, RpcConfig};

const OWNED_USAGE: &str = "usage: opns owned <address>";

/// OPNS - .opns name service tools
#[derive(Parser)]
#[command(name = "opns")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", global = true)]
    rpc_url: Option<String>,

    /// Registrar contract address
    #[arg(long, env = "REGISTRAR_ADDRESS", global = true)]
    registrar: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a name and check whether it is available (JSON)
    Check {
        /// Name to check; extra arguments are ignored
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Walk sample names, token IDs and a balance through the contracts
    Demo,

    /// List names minted to an address (JSON)
    Owned {
        /// Owner address
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Resolve one name to its token, owner and records (JSON)
    Resolve {
        /// Name to resolve
        name: String,
    },

    /// Check a list of candidate names for ownership by an address (JSON)
    Known {
        /// Owner address
        address: String,
        /// Candidate names (default: 000-020, team, dev)
        names: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::FAILURE;
            }
        },
    };

    init_logging(cli.verbose);

    let output = match &cli.command {
        Commands::Check { args } => cmd_check(&cli, args.first().map(String::as_str)).await,
        Commands::Demo => {
            return match cmd_demo(&cli).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{} {:#}", "❌".red(), e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Owned { args } => match owned_address(args) {
            Ok(address) => JsonOutput::from_result(cmd_owned(&cli, address).await),
            Err(usage) => usage,
        },
        Commands::Resolve { name } => JsonOutput::from_result(cmd_resolve(&cli, name).await),
        Commands::Known { address, names } => {
            JsonOutput::from_result(cmd_known(&cli, address, names).await)
        }
    };
    output.emit()
}

/// Logs go to stderr so stdout carries only program output.
fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "opns=debug"
    } else {
        "opns=warn"
    }
}

/// Environment configuration with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<OpnsConfig> {
    let config = OpnsConfig::from_env().context("Failed to load configuration")?;
    let config = apply_overrides(config, non_blank(&cli.rpc_url), non_blank(&cli.registrar))?;
    config.validate()?;
    Ok(config)
}

/// Blank flag or environment values count as unset.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn apply_overrides(
    mut config: OpnsConfig,
    rpc_url: Option<&str>,
    registrar: Option<&str>,
) -> Result<OpnsConfig> {
    if let Some(url) = rpc_url {
        config = config.with_rpc(url);
    }
    if let Some(raw) = registrar {
        let registrar = parse_address(raw).context("Invalid --registrar")?;
        config = config.with_registrar(registrar);
    }
    Ok(config)
}

fn connect(config: &OpnsConfig) -> Result<RpcClient> {
    RpcClient::with_config(RpcConfig::from(config)).context("Failed to build RPC client")
}

async fn ensure_connected(client: &RpcClient) -> Result<()> {
    if client.is_connected().await {
        Ok(())
    } else {
        Err(OpnsError::NotConnected(client.rpc_url().to_string()).into())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// One line of JSON for stdout and the exit status that goes with it.
#[derive(Debug, PartialEq, Eq)]
struct JsonOutput {
    body: String,
    status: u8,
}

impl JsonOutput {
    fn error(message: &str) -> Self {
        Self {
            body: json!({ "error": message }).to_string(),
            status: 1,
        }
    }

    /// Serialized in field order; errors become `{"error": ...}` with status 1.
    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        let body = result.and_then(|value| {
            serde_json::to_string(&value).context("Failed to serialize output")
        });
        match body {
            Ok(body) => Self { body, status: 0 },
            Err(e) => Self::error(&format!("{:#}", e)),
        }
    }

    fn emit(self) -> ExitCode {
        println!("{}", self.body);
        ExitCode::from(self.status)
    }
}

/// The single address argument of `owned`, or the usage error.
fn owned_address(args: &[String]) -> std::result::Result<&str, JsonOutput> {
    match args {
        [address] => Ok(address.as_str()),
        _ => Err(JsonOutput::error(OWNED_USAGE)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate a name and check availability
async fn cmd_check(cli: &Cli, name: Option<&str>) -> JsonOutput {
    let Some(name) = name else {
        return JsonOutput {
            status: 0,
            ..JsonOutput::error("no name provided")
        };
    };

    let verdict = validate_name(name);
    if !verdict.is_valid {
        return JsonOutput::from_result(Ok(verdict));
    }

    let (registrar, client) = match load_config(cli).and_then(|c| Ok((c.registrar, connect(&c)?))) {
        Ok((registrar, client)) => (registrar, Some(client)),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "availability check skipped");
            (OpnsConfig::default().registrar, None)
        }
    };

    let availability = check_availability(
        client.as_ref().map(|c| c as &dyn ChainClient),
        registrar,
        &verdict.validated_name,
    )
    .await;

    JsonOutput::from_result(Ok(verdict.with_availability(availability.is_available())))
}

/// List domains minted to an address
async fn cmd_owned(cli: &Cli, address: &str) -> Result<serde_json::Value> {
    let config = load_config(cli)?;
    let client = connect(&config)?;

    // Hidden automatically when stderr is not a terminal.
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {pos} chunks {msg}")?);

    let domains = list_owned_domains_with_progress(&client, &config, address, |range, outcome| {
        pb.inc(1);
        match outcome {
            ChunkOutcome::Fetched(n) => pb.set_message(format!("blocks {} ({} events)", range, n)),
            ChunkOutcome::Failed(_) => pb.set_message(format!("blocks {} (skipped)", range)),
        }
    })
    .await;
    pb.finish_and_clear();

    Ok(json!({ "domains": domains? }))
}

/// Resolve a single name
async fn cmd_resolve(cli: &Cli, name: &str) -> Result<NameResolution> {
    let verdict = validate_name(name);
    if !verdict.is_valid {
        return Err(OpnsError::ValidationError(verdict.reason).into());
    }

    let config = load_config(cli)?;
    let client = connect(&config)?;
    ensure_connected(&client).await?;

    let contracts = ContractSet {
        registrar: config.registrar,
        resolver: config.resolver,
    };
    Ok(resolve_name(&client, contracts, &verdict.validated_name).await)
}

/// Check candidate names for ownership
async fn cmd_known(cli: &Cli, address: &str, names: &[String]) -> Result<KnownNamesReport> {
    let owner = parse_address(address)?;
    let names: Vec<String> = if names.is_empty() {
        default_known_names()
    } else {
        names.iter().map(|n| canonicalize(n)).collect()
    };

    let config = load_config(cli)?;
    let client = connect(&config)?;
    ensure_connected(&client).await?;

    Ok(scan_known_names(&client, config.registrar, owner, &names).await)
}

/// Walk the sample names, probe token IDs, and print a balance
async fn cmd_demo(cli: &Cli) -> Result<()> {
    println!("{}", "🔗 Connecting to IOPN Testnet...".cyan().bold());

    let config = load_config(cli)?;
    let client = connect(&config)?;

    if !client.is_connected().await {
        println!("{}", "❌ Failed to connect to IOPN Testnet".red());
        return Ok(());
    }

    println!("{}", "✅ Connected to IOPN Testnet".green());
    let head = client
        .block_number()
        .await
        .context("Failed to read block number")?;
    println!("📊 Current block: {}", head);

    let contracts = ContractSet {
        registrar: config.registrar,
        resolver: config.resolver,
    };

    println!("\n{}", "🔍 Testing Domain Resolution:".cyan().bold());
    println!("{}", "=".repeat(50));
    for name in SAMPLE_NAMES {
        println!("\n📝 Checking domain: {}.{}", name, TLD);
        for line in resolution_lines(&resolve_name(&client, contracts, name).await) {
            println!("{}", line);
        }
    }

    for (label, registrar) in [
        ("New Contract", config.registrar),
        ("Old Contract", config.legacy_registrar),
    ] {
        println!(
            "\n{}",
            format!("🎨 Checking for existing NFTs ({}):", label).cyan().bold()
        );
        println!("{}", "=".repeat(45));
        let probes =
            scan_token_owners(&client, registrar, TOKEN_PROBE_FIRST..=TOKEN_PROBE_LAST).await;
        for line in probe_lines(&probes) {
            println!("{}", line);
        }
    }

    println!("\n{}", "💰 Balance Check Example:".cyan().bold());
    println!("{}", "=".repeat(30));
    let example = parse_address(BALANCE_EXAMPLE_ADDRESS)?;
    match client.get_balance(example).await {
        Ok(wei) => println!(
            "📊 Balance of {}: {} {}",
            checksum(&example),
            format_balance(wei),
            NATIVE_SYMBOL
        ),
        Err(e) => println!("{} {}", "❌ Error getting balance:".red(), e),
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

fn resolution_lines(resolution: &NameResolution) -> Vec<String> {
    match resolution {
        NameResolution::Unregistered { name } => {
            vec![format!("❌ Domain {}.{} is NOT registered", name, TLD)]
        }
        NameResolution::Failed { name, error } => {
            vec![format!("❌ Error checking domain {}: {}", name, error)]
        }
        NameResolution::Registered(r) => {
            let mut lines = vec![
                format!(
                    "✅ Domain {}.{} is registered (Token ID: {})",
                    r.name, TLD, r.token_id
                ),
                format!("👤 Owner: {}", checksum(&r.owner)),
            ];
            lines.push(match &r.address {
                AddressRecord::Custom(addr) => format!("🔗 Resolved Address: {}", checksum(addr)),
                AddressRecord::Unset => "🔗 No custom address set (using owner address)".into(),
                AddressRecord::Failed(e) => format!("⚠️  Could not resolve address: {}", e),
            });
            match &r.text {
                TextRecord::Set(text) => lines.push(format!("📄 Text Record: {}", text)),
                TextRecord::Empty => {}
                TextRecord::Failed(e) => lines.push(format!("⚠️  Could not get text record: {}", e)),
            }
            lines
        }
    }
}

fn probe_lines(probes: &[TokenProbe]) -> Vec<String> {
    let mut lines = Vec::new();
    for probe in probes {
        match probe {
            TokenProbe::Minted {
                token_id,
                owner,
                name,
            } => {
                lines.push(format!("🆔 Token ID {}: owned by {}", token_id, checksum(owner)));
                lines.push(format!(
                    "   📝 Name: {}",
                    name.as_deref().unwrap_or("(unable to retrieve)")
                ));
            }
            TokenProbe::NotMinted {
                token_id,
                diagnostic,
            } => lines.push(format!(
                "🆔 Token ID {}: not minted or error ({})",
                token_id, diagnostic
            )),
        }
    }
    lines
}

/// Wei as a decimal ether amount without trailing zeros.
fn format_balance(wei: U256) -> String {
    let ether = format_ether(wei);
    match ether.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => ether,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use opns_registrar::RegisteredName;

    #[test]
    fn test_parse_check_without_name() {
        let cli = Cli::try_parse_from(["opns", "check"]).unwrap();
        match cli.command {
            Commands::Check { args } => assert!(args.is_empty()),
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_parse_owned_keeps_extra_args() {
        let cli = Cli::try_parse_from(["opns", "owned", "0xabc", "extra"]).unwrap();
        match cli.command {
            Commands::Owned { args } => assert_eq!(args.len(), 2),
            _ => panic!("expected owned"),
        }
    }

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "opns",
            "resolve",
            "alice",
            "--rpc-url",
            "http://localhost:8545",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.rpc_url.as_deref(), Some("http://localhost:8545"));
    }

    #[test]
    fn test_blank_overrides_keep_defaults() {
        let cli =
            Cli::try_parse_from(["opns", "demo", "--rpc-url", "  ", "--registrar", ""]).unwrap();
        assert_eq!(non_blank(&cli.rpc_url), None);
        assert_eq!(non_blank(&cli.registrar), None);

        let config = apply_overrides(
            OpnsConfig::default(),
            non_blank(&cli.rpc_url),
            non_blank(&cli.registrar),
        )
        .unwrap();
        let defaults = OpnsConfig::default();
        assert_eq!(config.rpc_url, defaults.rpc_url);
        assert_eq!(config.registrar, defaults.registrar);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_are_trimmed_and_applied() {
        let registrar = Address::repeat_byte(0x42);
        let cli = Cli::try_parse_from([
            "opns".to_string(),
            "demo".to_string(),
            "--rpc-url".to_string(),
            " http://localhost:8545 ".to_string(),
            "--registrar".to_string(),
            checksum(&registrar),
        ])
        .unwrap();

        let config = apply_overrides(
            OpnsConfig::default(),
            non_blank(&cli.rpc_url),
            non_blank(&cli.registrar),
        )
        .unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.registrar, registrar);

        assert!(apply_overrides(OpnsConfig::default(), None, Some("0x1234")).is_err());
    }

    #[test]
    fn test_log_filter_scopes_to_opns_targets() {
        assert_eq!(log_filter(false), "opns=warn");
        assert_eq!(log_filter(true), "opns=debug");
    }

    #[tokio::test]
    async fn test_check_without_name_exits_zero() {
        let cli = Cli::try_parse_from(["opns", "check"]).unwrap();
        let output = cmd_check(&cli, None).await;
        assert_eq!(
            output,
            JsonOutput {
                body: r#"{"error":"no name provided"}"#.into(),
                status: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_check_invalid_name_omits_availability() {
        let cli = Cli::try_parse_from(["opns", "check", "ab"]).unwrap();
        let output = cmd_check(&cli, Some("ab")).await;
        assert_eq!(output.status, 0);
        assert_eq!(
            output.body,
            r#"{"name":"ab","is_valid":false,"reason":"Name must be 3-32 chars"}"#
        );
    }

    #[test]
    fn test_owned_requires_exactly_one_address() {
        let usage = JsonOutput {
            body: r#"{"error":"usage: opns owned <address>"}"#.into(),
            status: 1,
        };
        assert_eq!(owned_address(&[]), Err(usage));

        let two = vec!["0xabc".to_string(), "extra".to_string()];
        assert_eq!(owned_address(&two).unwrap_err().status, 1);

        let one = vec!["0xabc".to_string()];
        assert_eq!(owned_address(&one), Ok("0xabc"));
    }

    #[test]
    fn test_error_result_is_json_with_status_one() {
        let output = JsonOutput::from_result::<()>(Err(anyhow::anyhow!("boom")));
        assert_eq!(
            output,
            JsonOutput {
                body: r#"{"error":"boom"}"#.into(),
                status: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_known_with_malformed_address_fails() {
        let cli = Cli::try_parse_from(["opns", "known", "0x1234"]).unwrap();
        let output = JsonOutput::from_result(cmd_known(&cli, "0x1234", &[]).await);
        assert_eq!(output.status, 1);
        let parsed: serde_json::Value = serde_json::from_str(&output.body).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("0x1234"));
    }

    #[test]
    fn test_success_keeps_field_order() {
        let report = KnownNamesReport {
            owner: checksum(&Address::repeat_byte(0xaa)),
            checked: 0,
            owned: Vec::new(),
            errors: Vec::new(),
        };
        let output = JsonOutput::from_result(Ok(report));
        assert_eq!(output.status, 0);
        assert!(output.body.starts_with(r#"{"owner":"#));
        assert!(output.body.ends_with(r#""checked":0,"owned":[],"errors":[]}"#));
    }

    #[test]
    fn test_unregistered_lines() {
        let lines = resolution_lines(&NameResolution::Unregistered {
            name: "bob".into(),
        });
        assert_eq!(lines, vec!["❌ Domain bob.opns is NOT registered"]);
    }

    #[test]
    fn test_registered_lines() {
        let owner = Address::repeat_byte(0xaa);
        let lines = resolution_lines(&NameResolution::Registered(RegisteredName {
            name: "alice".into(),
            token_id: U256::from(3u64),
            owner,
            address: AddressRecord::Unset,
            text: TextRecord::Empty,
        }));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "✅ Domain alice.opns is registered (Token ID: 3)");
        assert_eq!(lines[1], format!("👤 Owner: {}", checksum(&owner)));
        assert_eq!(lines[2], "🔗 No custom address set (using owner address)");
    }

    #[test]
    fn test_probe_lines() {
        let owner = Address::repeat_byte(0xcc);
        let lines = probe_lines(&[
            TokenProbe::Minted {
                token_id: 1,
                owner,
                name: None,
            },
            TokenProbe::NotMinted {
                token_id: 2,
                diagnostic: "reverted".into(),
            },
        ]);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "   📝 Name: (unable to retrieve)");
        assert_eq!(lines[2], "🆔 Token ID 2: not minted or error (reverted)");
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(U256::ZERO), "0");
        assert_eq!(
            format_balance(U256::from(1_500_000_000_000_000_000u64)),
            "1.5"
        );
        assert_eq!(format_balance(U256::from(1u64)), "0.000000000000000001");
    }
}

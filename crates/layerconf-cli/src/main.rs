use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use layerconf_core::cast::Raw;
use layerconf_core::sources::KeyMaterial;
use layerconf_core::{
    Config, ConfigError, FernetKey, Manifest, MemoryLogger, Policy, Request, SourceSpec,
};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "LAYERCONF_LOG";

#[derive(Parser)]
#[command(name = "layerconf", version, about = "Layered configuration and secrets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new encryption key
    Genkey(GenkeyCmd),
    /// Encrypt a value with a key file
    Encrypt(EncryptCmd),
    /// Decrypt a token with a key file
    Decrypt(DecryptCmd),
    /// Resolve one key and print its value
    Get(GetCmd),
    /// Resolve several keys and report where each came from
    Check(CheckCmd),
}

#[derive(Args)]
struct GenkeyCmd {
    /// Write the key to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
    /// Put the new key first in an existing key file, keeping the old keys
    #[arg(long, requires = "out")]
    rotate: bool,
    /// Replace an existing key file
    #[arg(long, requires = "out", conflicts_with = "rotate")]
    force: bool,
}

#[derive(Args)]
struct KeyFileArgs {
    #[arg(long)]
    key_file: PathBuf,
    /// Accept a key file readable by its group
    #[arg(long)]
    group_readable: bool,
}

impl KeyFileArgs {
    fn material(&self) -> KeyMaterial {
        let policy = if self.group_readable {
            Policy::OwnerOrGroup
        } else {
            Policy::OwnerOnly
        };
        KeyMaterial::file(&self.key_file, policy)
    }
}

#[derive(Args)]
struct EncryptCmd {
    #[command(flatten)]
    keys: KeyFileArgs,
    /// Value to encrypt; read from stdin when omitted
    value: Option<String>,
}

#[derive(Args)]
struct DecryptCmd {
    #[command(flatten)]
    keys: KeyFileArgs,
    /// Reject tokens older than this many seconds
    #[arg(long)]
    ttl: Option<u64>,
    token: String,
}

#[derive(Args)]
struct SourceArgs {
    /// Source spec such as `env`, `file@.env.key:.env`, `dir:/etc/app`, `secrets:/run/secrets`
    #[arg(long = "source", value_name = "SPEC")]
    sources: Vec<SourceSpec>,
    /// YAML manifest listing sources
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Args)]
struct GetCmd {
    key: String,
    #[command(flatten)]
    sources: SourceArgs,
    /// Only read from encrypted sources and decrypt the value
    #[arg(long)]
    sensitive: bool,
    #[arg(long, requires = "sensitive")]
    ttl: Option<u64>,
    #[arg(long)]
    default: Option<String>,
    /// Print nothing instead of failing when the key is undefined
    #[arg(long)]
    debug: bool,
}

#[derive(Args)]
struct CheckCmd {
    /// Plain keys to resolve
    keys: Vec<String>,
    /// Sensitive keys to resolve
    #[arg(long = "secret", value_name = "KEY")]
    secrets: Vec<String>,
    #[command(flatten)]
    sources: SourceArgs,
    #[arg(long)]
    json: bool,
    /// Fail when any warning is raised
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Genkey(cmd) => handle_genkey(cmd),
        Command::Encrypt(cmd) => handle_encrypt(cmd),
        Command::Decrypt(cmd) => handle_decrypt(cmd),
        Command::Get(cmd) => handle_get(cmd),
        Command::Check(cmd) => handle_check(cmd),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn handle_genkey(cmd: GenkeyCmd) -> Result<()> {
    let key = FernetKey::generate().to_base64();
    let Some(path) = cmd.out else {
        println!("{key}");
        return Ok(());
    };

    let contents = if cmd.rotate && path.exists() {
        let existing = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        format!("{key}\n{existing}")
    } else {
        if path.exists() && !cmd.force {
            bail!("{} already exists (use --rotate or --force)", path.display());
        }
        format!("{key}\n")
    };
    write_private(&path, &contents)?;
    eprintln!("wrote key to {}", path.display());
    Ok(())
}

/// Write `contents` to `path` with owner-only permissions
fn write_private(path: &Path, contents: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    // `mode` only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

fn handle_encrypt(cmd: EncryptCmd) -> Result<()> {
    let value = match cmd.value {
        Some(value) => value,
        None => read_stdin()?,
    };
    let token = cmd
        .keys
        .material()
        .encrypt(&key_label(&cmd.keys.key_file), &value)
        .context("encryption failed")?;
    println!("{token}");
    Ok(())
}

fn handle_decrypt(cmd: DecryptCmd) -> Result<()> {
    let plaintext = cmd
        .keys
        .material()
        .decrypt(&key_label(&cmd.keys.key_file), cmd.token.trim(), cmd.ttl)
        .context("decryption failed")?;
    println!("{plaintext}");
    Ok(())
}

fn key_label(path: &Path) -> String {
    format!("key file {}", path.display())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read value from stdin")?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

/// Sources from the manifest, then `--source` specs; the user manifest or
/// the process environment when neither is given
fn build_config(args: &SourceArgs) -> Result<Config> {
    let mut config = match &args.manifest {
        Some(path) => Config::from_manifest(path)
            .with_context(|| format!("failed to load manifest {}", path.display()))?,
        None if args.sources.is_empty() => {
            let user = Manifest::user_path();
            if user.exists() {
                tracing::debug!(manifest = %user.display(), "using user manifest");
                Config::from_manifest(&user)
                    .with_context(|| format!("failed to load manifest {}", user.display()))?
            } else {
                Config::new().env()
            }
        }
        None => Config::new(),
    };
    for spec in &args.sources {
        let source = spec
            .build()
            .with_context(|| format!("invalid source '{spec}'"))?;
        config = config.source(source);
    }
    Ok(config)
}

fn handle_get(cmd: GetCmd) -> Result<()> {
    let config = build_config(&cmd.sources)?;
    if cmd.debug {
        config.set_debug(true);
    }

    let mut request = Request::new(&cmd.key);
    if let Some(default) = cmd.default {
        request = request.default(default);
    }
    if cmd.sensitive {
        request = request.sensitive();
    }
    request.ttl = cmd.ttl;

    match config.resolve(&request, &Raw)? {
        Some(value) => println!("{value}"),
        None => tracing::debug!(key = %cmd.key, "no value"),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CheckEntry {
    key: String,
    source: String,
    default_used: bool,
    sensitive: bool,
    value: String,
}

#[derive(Debug, Default, Serialize)]
struct CheckReport {
    entries: Vec<CheckEntry>,
    missing: Vec<String>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl CheckReport {
    fn failed(&self, strict: bool) -> bool {
        !self.missing.is_empty() || !self.errors.is_empty() || (strict && !self.warnings.is_empty())
    }

    fn print_table(&self) {
        let width = self.entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
        for entry in &self.entries {
            let marker = if entry.default_used { " (default)" } else { "" };
            println!(
                "{:width$}  {}  {}{}",
                entry.key, entry.value, entry.source, marker
            );
        }
        for key in &self.missing {
            println!("{key:width$}  missing");
        }
        for error in &self.errors {
            eprintln!("error: {error}");
        }
        for warning in &self.warnings {
            eprintln!("warning: {warning}");
        }
    }
}

/// Resolve every key in debug mode, collecting warnings instead of logging them
fn run_check(config: Config, keys: &[String], secrets: &[String]) -> Result<CheckReport> {
    let logger = Arc::new(MemoryLogger::new());
    let config = config.with_logger(logger.clone());
    let _debug = config.debug_scope(true);

    let requests = keys
        .iter()
        .map(|key| Request::new(key))
        .chain(secrets.iter().map(|key| Request::new(key).sensitive()));

    let mut report = CheckReport::default();
    for request in requests {
        match config.resolve(&request, &Raw) {
            Ok(Some(_)) => {
                let Some(resolution) = config.resolution(&request.key) else {
                    bail!("{} resolved without a record", request.key);
                };
                report.entries.push(CheckEntry {
                    key: request.key.clone(),
                    source: resolution.origin().to_string(),
                    default_used: resolution.default_used,
                    sensitive: resolution.sensitive,
                    value: resolution.display_value(),
                });
            }
            Ok(None) => report.missing.push(request.key.clone()),
            Err(err @ ConfigError::Policy(_)) => return Err(err.into()),
            Err(err) => report.errors.push(err.to_string()),
        }
    }
    // Undefined keys are already listed under `missing`
    report.warnings = logger
        .warnings()
        .into_iter()
        .filter(|w| !w.contains(" is not defined; checked: "))
        .collect();
    Ok(report)
}

fn handle_check(cmd: CheckCmd) -> Result<()> {
    if cmd.keys.is_empty() && cmd.secrets.is_empty() {
        bail!("no keys given");
    }
    let config = build_config(&cmd.sources)?;
    let report = run_check(config, &cmd.keys, &cmd.secrets)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_table();
    }
    if report.failed(cmd.strict) {
        bail!(
            "{} missing, {} errors, {} warnings",
            report.missing.len(),
            report.errors.len(),
            report.warnings.len()
        );
    }
    Ok(())
}

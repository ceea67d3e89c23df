//! cvault: CryptoVault file encryption CLI
//!
//! Commands:
//!   encrypt <input> [-o <output>]   - encrypt a file into a passphrase-protected container
//!   decrypt <input> [-o <output>]   - restore the original bytes from a container
//!   inspect <input>                 - show the container header (no passphrase needed)
//!   config show                     - display current configuration

mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use zeroize::Zeroize;

use cvault_core::config::CvaultConfig;
use cvault_core::{CvaultError, CvaultResult};
use cvault_crypto::{Container, CryptoError};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cvault",
    version,
    about = "CryptoVault client-side file encryption",
    long_about = "cvault: encrypt and decrypt files locally with a passphrase (PBKDF2-SHA256 + AES-256-GCM)"
)]
struct Cli {
    /// Path to cvault.toml configuration file
    #[arg(long, short = 'c', env = "CVAULT_CONFIG", default_value = "~/.config/cvault/config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides log.level
    #[arg(long, env = "CVAULT_LOG")]
    log: Option<String>,

    /// Log format; overrides log.format
    #[arg(long, env = "CVAULT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file with a passphrase
    ///
    /// The passphrase is read from the environment variable named in
    /// passphrase.env_var (default CVAULT_PASSPHRASE), or prompted for.
    Encrypt {
        /// File to encrypt
        input: PathBuf,
        /// Destination (default: <input>.encrypted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Replace the destination if it exists
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Decrypt a container produced by `cvault encrypt`
    Decrypt {
        /// Encrypted file
        input: PathBuf,
        /// Destination (default: input name without the .encrypted suffix)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Replace the destination if it exists
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show the salt, nonce, and sizes of a container without decrypting it
    Inspect {
        /// Encrypted file
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        if let Some(CvaultError::Crypto(c)) = e.downcast_ref::<CvaultError>() {
            if c.is_recoverable() {
                eprintln!("       check the input file and passphrase, then try again");
            }
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = load_config(&config_path).await?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli.log_format.clone().unwrap_or(match config.log.format.as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    });
    init_logging(&level, &format);

    check_config_mode(&config, &config_path);

    match cli.command {
        Commands::Encrypt { input, output, force } => {
            cmd_encrypt(&config, &input, output.as_deref(), force).await
        }
        Commands::Decrypt { input, output, force } => {
            cmd_decrypt(&config, &input, output.as_deref(), force).await
        }
        Commands::Inspect { input, json } => cmd_inspect(&input, json).await,
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &config_path),
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

async fn load_config(path: &Path) -> Result<CvaultConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config: {}", path.display()))?;
        CvaultConfig::from_toml_str(&content)
            .with_context(|| format!("parsing config: {}", path.display()))
    } else {
        Ok(CvaultConfig::default())
    }
}

fn check_config_mode(config: &CvaultConfig, path: &Path) {
    if !config.config_file_mode_check || !path.exists() {
        return;
    }
    match cvault_core::config::is_world_readable(path) {
        Ok(true) => warn!(
            config = %path.display(),
            "config file is world-readable; consider chmod 600"
        ),
        Ok(false) => {}
        Err(e) => warn!(config = %path.display(), "could not stat config file: {e}"),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Expand `~` in path to the user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{home}/{rest}"))
    } else {
        path.to_path_buf()
    }
}

// ── Passphrase ────────────────────────────────────────────────────────────────

fn read_passphrase(config: &CvaultConfig, confirm: bool) -> Result<SecretString> {
    let env_var = &config.passphrase.env_var;
    if let Ok(value) = std::env::var(env_var) {
        info!(env_var = %env_var, "using passphrase from environment");
        return Ok(SecretString::from(value));
    }

    let first = rpassword::prompt_password("Passphrase: ").context("reading passphrase")?;
    if confirm {
        let mut second =
            rpassword::prompt_password("Confirm passphrase: ").context("reading passphrase")?;
        let matches = first == second;
        second.zeroize();
        if !matches {
            let mut first = first;
            first.zeroize();
            anyhow::bail!("passphrases do not match");
        }
    }
    Ok(SecretString::from(first))
}

// ── Progress helpers ──────────────────────────────────────────────────────────

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

async fn read_input(input: &Path) -> Result<Vec<u8>> {
    let data = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading: {}", input.display()))?;
    Ok(data)
}

// ── `cvault encrypt` ──────────────────────────────────────────────────────────

async fn cmd_encrypt(
    config: &CvaultConfig,
    input: &Path,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    if !input.is_file() {
        return Err(CvaultError::Crypto(CryptoError::InvalidInput(format!(
            "no file to encrypt at {}",
            input.display()
        )))
        .into());
    }
    let dest = match output {
        Some(p) => p.to_path_buf(),
        None => output::encrypt_target(&config.files, input)?,
    };

    let passphrase = read_passphrase(config, config.passphrase.confirm_on_encrypt)?;
    cvault_crypto::validate_passphrase(&passphrase).map_err(CvaultError::from)?;

    let plaintext = read_input(input).await?;
    let plaintext_len = plaintext.len();

    let pb = make_spinner("encrypt");
    pb.set_message(format!("{}", input.display()));
    let container = run_blocking(move || Ok(cvault_crypto::encrypt(&plaintext, &passphrase)?))
        .await?;
    pb.finish_and_clear();

    output::write_atomic(&dest, &container, force || config.files.overwrite).await?;

    info!(
        input = %input.display(),
        output = %dest.display(),
        bytes = plaintext_len,
        "encrypted file"
    );
    println!("Encrypted {} → {}", input.display(), dest.display());
    println!("  plaintext: {}", fmt_bytes(plaintext_len as u64));
    println!("  container: {}", fmt_bytes(container.len() as u64));
    Ok(())
}

// ── `cvault decrypt` ──────────────────────────────────────────────────────────

async fn cmd_decrypt(
    config: &CvaultConfig,
    input: &Path,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    if !input.is_file() {
        return Err(CvaultError::Crypto(CryptoError::InvalidInput(format!(
            "no file to decrypt at {}",
            input.display()
        )))
        .into());
    }
    let dest = match output {
        Some(p) => p.to_path_buf(),
        None => output::decrypt_target(&config.files, input)?,
    };

    // Only non-empty: containers from other clients may use shorter passphrases
    let passphrase = read_passphrase(config, false)?;
    if passphrase.expose_secret().is_empty() {
        return Err(CvaultError::Crypto(CryptoError::InvalidInput(
            "passphrase is required".into(),
        ))
        .into());
    }

    let container = read_input(input).await?;

    let pb = make_spinner("decrypt");
    pb.set_message(format!("{}", input.display()));
    let result = run_blocking(move || Ok(cvault_crypto::decrypt(&container, &passphrase)?)).await;
    pb.finish_and_clear();
    let plaintext = result?;

    output::write_atomic(&dest, &plaintext, force || config.files.overwrite).await?;

    info!(
        input = %input.display(),
        output = %dest.display(),
        bytes = plaintext.len(),
        "decrypted file"
    );
    println!("Decrypted {} → {}", input.display(), dest.display());
    println!("  plaintext: {}", fmt_bytes(plaintext.len() as u64));
    Ok(())
}

/// Run CPU-bound crypto off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> CvaultResult<T> + Send + 'static,
    T: Send + 'static,
{
    let out = tokio::task::spawn_blocking(f)
        .await
        .context("crypto task panicked")??;
    Ok(out)
}

// ── `cvault inspect` ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ContainerInfo {
    path: String,
    container_bytes: usize,
    salt: String,
    nonce: String,
    sealed_bytes: usize,
    plaintext_bytes: usize,
}

async fn cmd_inspect(input: &Path, json: bool) -> Result<()> {
    let blob = read_input(input).await?;
    let container = Container::parse(&blob).map_err(CvaultError::from)?;

    let info = ContainerInfo {
        path: input.display().to_string(),
        container_bytes: blob.len(),
        salt: hex::encode(container.salt()),
        nonce: hex::encode(container.nonce()),
        sealed_bytes: container.sealed().len(),
        plaintext_bytes: container.plaintext_len(),
    };

    if json {
        let rendered = serde_json::to_string_pretty(&info).context("serializing container info")?;
        println!("{rendered}");
    } else {
        println!("Container: {}", info.path);
        println!("  size:       {}", fmt_bytes(info.container_bytes as u64));
        println!("  salt:       {}", info.salt);
        println!("  nonce:      {}", info.nonce);
        println!("  sealed:     {} (ciphertext + tag)", fmt_bytes(info.sealed_bytes as u64));
        println!("  plaintext:  {} (if the passphrase is correct)", fmt_bytes(info.plaintext_bytes as u64));
    }
    Ok(())
}

// ── `cvault config show` ──────────────────────────────────────────────────────

fn cmd_config_show(config: &CvaultConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Utilities ─────────────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

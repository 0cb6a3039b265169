//! `multipass` — CLI entry point.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from `MULTIPASS_*` environment variables.
//! 3. Initialise structured JSON logging to stderr.
//! 4. Build or open a token and print the result to stdout.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use common::{CustomerData, MultipassError, Payload};
use tracing::info;

use multipass::{config::Config, telemetry};

/// Exit code for configuration and usage errors.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "multipass",
    version,
    about = "Build and open Multipass single sign-on tokens",
    long_about = "Build and open Multipass single sign-on tokens.\n\n\
        The shared secret is read from MULTIPASS_SECRET. Tokens are printed to\n\
        stdout; logs go to stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seal a payload into a token
    Build(BuildArgs),

    /// Verify a token and print its payload
    Open(OpenArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Raw payload, used as-is. Read from stdin when neither this nor --email is given
    #[arg(long, conflicts_with = "email")]
    payload: Option<String>,

    /// Customer email; builds the payload from the customer flags
    #[arg(long, requires = "created_at")]
    email: Option<String>,

    /// ISO-8601 timestamp for the customer payload
    #[arg(long, requires = "email")]
    created_at: Option<String>,

    #[arg(long, requires = "email")]
    first_name: Option<String>,

    #[arg(long, requires = "email")]
    last_name: Option<String>,

    /// Comma-separated customer tags
    #[arg(long, requires = "email")]
    tag_string: Option<String>,

    #[arg(long, requires = "email")]
    identifier: Option<String>,

    #[arg(long, requires = "email")]
    remote_ip: Option<String>,

    /// URL to redirect to after login
    #[arg(long, requires = "email")]
    return_to: Option<String>,
}

#[derive(Args, Debug)]
struct OpenArgs {
    /// Token to verify and decrypt
    token: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init_telemetry(&cfg.log_level) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::from(EXIT_CONFIG);
    }
    info!(version = env!("CARGO_PKG_VERSION"), "multipass starting");

    // -----------------------------------------------------------------------
    // 3. Command
    // -----------------------------------------------------------------------
    let result = match cli.command {
        Command::Build(args) => run_build(&cfg, args),
        Command::Open(args) => run_open(&cfg, &args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run_build(cfg: &Config, args: BuildArgs) -> Result<()> {
    let payload = payload_from_args(args)?;
    let token = cfg.token_builder()?.build(&payload)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{token}").context("failed to write token to stdout")?;
    Ok(())
}

fn run_open(cfg: &Config, args: &OpenArgs) -> Result<()> {
    let payload = cfg.token_reader()?.open(&args.token)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(payload.as_bytes())
        .and_then(|()| writeln!(stdout))
        .context("failed to write payload to stdout")?;
    Ok(())
}

fn payload_from_args(args: BuildArgs) -> Result<Payload> {
    if let Some(raw) = args.payload {
        return Ok(Payload::from(raw.into_bytes()));
    }

    if let (Some(email), Some(created_at)) = (args.email, args.created_at) {
        let customer = CustomerData {
            email,
            created_at,
            first_name: args.first_name,
            last_name: args.last_name,
            tag_string: args.tag_string,
            identifier: args.identifier,
            remote_ip: args.remote_ip,
            return_to: args.return_to,
        };
        return Ok(Payload::from_json(&customer)?);
    }

    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("failed to read payload from stdin")?;
    // A trailing newline from `echo` is not part of the payload.
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Payload::from(buf))
}

fn exit_code(e: &anyhow::Error) -> u8 {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<MultipassError>())
        .map_or(1, MultipassError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn customer_flags_build_json_payload() {
        let cli = Cli::try_parse_from([
            "multipass",
            "build",
            "--email",
            "a@example.com",
            "--created-at",
            "2015-07-24T12:36:40-0400",
            "--return-to",
            "https://store.example.com/",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build subcommand");
        };
        let payload: CustomerData = payload_from_args(args).unwrap().to_json().unwrap();
        assert_eq!(payload.email, "a@example.com");
        assert_eq!(payload.return_to.as_deref(), Some("https://store.example.com/"));
    }

    #[test]
    fn email_requires_created_at() {
        assert!(Cli::try_parse_from(["multipass", "build", "--email", "a@example.com"]).is_err());
    }

    #[test]
    fn payload_conflicts_with_email() {
        assert!(Cli::try_parse_from([
            "multipass",
            "build",
            "--payload",
            "{}",
            "--email",
            "a@example.com",
            "--created-at",
            "now",
        ])
        .is_err());
    }

    #[test]
    fn exit_code_follows_error_kind() {
        let e = anyhow::Error::new(MultipassError::SignatureMismatch).context("opening token");
        assert_eq!(exit_code(&e), 76);
        assert_eq!(exit_code(&anyhow::anyhow!("stdout closed")), 1);
    }
}

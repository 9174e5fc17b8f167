// SPDX-FileCopyrightText: 2026 CredParser Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CredParser - reversible credential strings for config files.
//!
//! This is the binary entry point. All codec logic lives in
//! `credparser-codec`; this crate only parses arguments, prompts and prints.

mod prompt;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use credparser_codec::{CredParser, CredParserBuilder, MasterSeed, default_seed_path, mask_secret};
use credparser_config::{
    CodecConfig, ConfigError, ConfigOverrides, default_config_path, load_config,
    load_config_from_path, render_errors,
};
use credparser_core::{CredParserError, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// CredParser - encode username/password pairs into opaque credential strings.
#[derive(Parser, Debug)]
#[command(name = "credparser", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Master seed file (defaults to ~/.credparser/master.seed).
    #[arg(long, global = true, value_name = "PATH")]
    seed: Option<PathBuf>,

    /// Config file (defaults to <config dir>/credparser/config).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Signer to bind credential strings to (defaults to the OS account name).
    #[arg(long, global = true)]
    signer: Option<String>,

    /// Override the salt length.
    #[arg(long, global = true)]
    salt_len: Option<usize>,

    /// Override the minimum number of hash rounds.
    #[arg(long, global = true)]
    min_hash_rounds: Option<u32>,

    /// Override the maximum number of hash rounds.
    #[arg(long, global = true)]
    max_hash_rounds: Option<u32>,
}

impl GlobalArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            salt_len: self.salt_len,
            min_hash_rounds: self.min_hash_rounds,
            max_hash_rounds: self.max_hash_rounds,
        }
    }

    fn resolve_config(&self) -> std::result::Result<CodecConfig, Vec<ConfigError>> {
        match &self.config {
            Some(path) => load_config_from_path(&self.overrides(), path),
            None => load_config(&self.overrides()),
        }
    }

    fn parser_builder(&self, config: CodecConfig) -> CredParserBuilder {
        let mut builder = CredParser::builder().config(config);
        if let Some(seed) = &self.seed {
            builder = builder.seed_path(seed);
        }
        if let Some(signer) = &self.signer {
            builder = builder.signer(signer);
        }
        builder
    }

    fn seed_path(&self) -> Result<PathBuf> {
        match &self.seed {
            Some(path) => Ok(path.clone()),
            None => default_seed_path(),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a username/password pair into a credential string.
    Make {
        /// What the credentials are for, shown in the prompt.
        #[arg(long)]
        label: Option<String>,
        /// Username or label; read from stdin when omitted.
        #[arg(long)]
        username: Option<String>,
    },
    /// Decode a credential string.
    Decode {
        credentials: String,
        /// Print the password instead of a masked form.
        #[arg(long)]
        show_password: bool,
    },
    /// Create the master seed. Fails if it already exists.
    InitSeed,
    /// Print the resolved configuration.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.global.log_level);

    let config = match cli.global.resolve_config() {
        Ok(config) => config,
        Err(errors) => {
            render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    debug!(%config, "configuration resolved, dispatching command");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Commands::Make { label, username } => prompt_credentials(label.as_deref(), username)
            .and_then(|(username, password)| {
                cmd_make(&cli.global, config, username, password, &mut out)
            }),
        Commands::Decode {
            credentials,
            show_password,
        } => cmd_decode(&cli.global, config, &credentials, show_password, &mut out),
        Commands::InitSeed => cmd_init_seed(&cli.global, &mut out),
        Commands::Config => cmd_config(&cli.global, config, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("credparser: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Collect the username (argument or stdin line) and the password for `make`.
fn prompt_credentials(
    label: Option<&str>,
    username: Option<String>,
) -> Result<(String, SecretString)> {
    if let Some(label) = label {
        eprintln!("Enter credentials for: {label}");
    }

    let username = match username {
        Some(username) => username,
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            prompt::read_username(&mut stdin.lock(), interactive)?
        }
    };
    let password = prompt::read_password()?;
    Ok((username, password))
}

fn cmd_make(
    global: &GlobalArgs,
    config: CodecConfig,
    username: String,
    password: SecretString,
    out: &mut impl Write,
) -> Result<()> {
    let parser = global
        .parser_builder(config)
        .username(username)
        .password(password.expose_secret())
        .build()?;
    debug!(
        credentials = %mask_secret(parser.credentials().unwrap_or_default()),
        "credential string generated"
    );

    print_made(&parser, out)
}

fn print_made(parser: &CredParser, out: &mut impl Write) -> Result<()> {
    let credentials = parser.credentials().unwrap_or_default();
    let username = parser.username()?.unwrap_or_default();
    let stars = parser
        .password()?
        .map(|p| "*".repeat(p.expose_secret().len()))
        .unwrap_or_default();

    writeln!(out, "{credentials}").map_err(write_failure)?;
    writeln!(out, "username: {username}").map_err(write_failure)?;
    writeln!(out, "password: {stars}").map_err(write_failure)?;
    Ok(())
}

fn cmd_decode(
    global: &GlobalArgs,
    config: CodecConfig,
    credentials: &str,
    show_password: bool,
    out: &mut impl Write,
) -> Result<()> {
    let parser = global.parser_builder(config).build()?;
    let (username, password) = parser.decode(credentials, None)?;
    debug!(signer = parser.signer(), "credential string decoded");

    let password = if show_password {
        password.expose_secret().to_string()
    } else {
        mask_secret(password.expose_secret())
    };

    writeln!(out, "username: {username}").map_err(write_failure)?;
    writeln!(out, "password: {password}").map_err(write_failure)?;
    Ok(())
}

fn cmd_init_seed(global: &GlobalArgs, out: &mut impl Write) -> Result<()> {
    let path = global.seed_path()?;
    debug!(path = %path.display(), "initializing master seed");
    let seed = MasterSeed::create(path)?;
    writeln!(out, "master seed created at {}", seed.path().display()).map_err(write_failure)?;
    Ok(())
}

fn cmd_config(global: &GlobalArgs, config: CodecConfig, out: &mut impl Write) -> Result<()> {
    let config_file = global.config.clone().or_else(default_config_path);
    let config_file = config_file
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());
    let seed = global
        .seed_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "<unresolved>".to_string());

    writeln!(out, "{config}").map_err(write_failure)?;
    writeln!(out, "config file: {config_file}").map_err(write_failure)?;
    writeln!(out, "master seed: {seed}").map_err(write_failure)?;
    Ok(())
}

fn write_failure(e: io::Error) -> CredParserError {
    CredParserError::Usage(format!("failed to write output: {e}"))
}

/// Initialize the tracing subscriber with an env-filter, writing to stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credparser={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use credparser_test_utils::TestHarness;

    const KNOWN_ANSWER: &str = "aaaaaaaaaaaahGZ9r9ZuSR9GQUbtH4Sgjrpf+9oB/1Hsfg==";

    fn global_for(harness: &TestHarness) -> GlobalArgs {
        GlobalArgs {
            log_level: "warn".to_string(),
            seed: Some(harness.seed_path().to_path_buf()),
            signer: Some(harness.signer().to_string()),
            ..GlobalArgs::default()
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "credparser",
            "config",
            "--salt-len",
            "16",
            "--seed",
            "/tmp/seed",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.global.salt_len, Some(16));
        assert_eq!(cli.global.seed, Some(PathBuf::from("/tmp/seed")));
        assert_eq!(cli.global.log_level, "warn");

        let overrides = cli.global.overrides();
        assert_eq!(overrides.salt_len, Some(16));
        assert_eq!(overrides.min_hash_rounds, None);
    }

    #[test]
    fn decode_requires_credentials() {
        assert!(Cli::try_parse_from(["credparser", "decode"]).is_err());
        let cli = Cli::try_parse_from(["credparser", "decode", KNOWN_ANSWER, "--show-password"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Decode {
                show_password: true,
                ..
            }
        ));
    }

    #[test]
    fn decode_masks_password_by_default() {
        let harness = TestHarness::builder().build().unwrap();
        let global = global_for(&harness);

        let mut buf = Vec::new();
        cmd_decode(&global, harness.config(), KNOWN_ANSWER, false, &mut buf).unwrap();
        assert_eq!(output(buf), "username: user\npassword: ****\n");

        let mut buf = Vec::new();
        cmd_decode(&global, harness.config(), KNOWN_ANSWER, true, &mut buf).unwrap();
        assert_eq!(output(buf), "username: user\npassword: password\n");
    }

    #[test]
    fn decode_with_wrong_signer_fails() {
        let harness = TestHarness::builder().build().unwrap();
        let mut global = global_for(&harness);
        global.signer = Some("intruder".to_string());

        let mut buf = Vec::new();
        let err = cmd_decode(&global, harness.config(), KNOWN_ANSWER, false, &mut buf).unwrap_err();
        assert!(matches!(err, CredParserError::DecodeFailure(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn made_output_stars_the_password() {
        let harness = TestHarness::builder().build().unwrap();
        let parser = harness
            .parser_builder()
            .username("svc-backup")
            .password("hunter2")
            .build()
            .unwrap();

        let mut buf = Vec::new();
        print_made(&parser, &mut buf).unwrap();
        let text = output(buf);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], parser.credentials().unwrap());
        assert_eq!(lines[1], "username: svc-backup");
        assert_eq!(lines[2], "password: *******");
    }

    #[test]
    fn make_accepts_username_from_piped_input() {
        let harness = TestHarness::builder().without_seed().build().unwrap();
        let global = global_for(&harness);

        let mut piped = io::Cursor::new("svc-backup\n");
        let username = prompt::read_username(&mut piped, false).unwrap();

        let mut buf = Vec::new();
        cmd_make(
            &global,
            harness.config(),
            username,
            SecretString::from("hunter2".to_string()),
            &mut buf,
        )
        .unwrap();

        let text = output(buf);
        assert!(text.contains("username: svc-backup\n"));
        assert!(text.ends_with("password: *******\n"));
        assert!(MasterSeed::exists(harness.seed_path()));
    }

    #[test]
    fn init_seed_refuses_existing_seed() {
        let harness = TestHarness::builder().build().unwrap();
        let global = global_for(&harness);

        let err = cmd_init_seed(&global, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CredParserError::InitFailure(_)));
    }

    #[test]
    fn init_seed_creates_missing_seed() {
        let harness = TestHarness::builder().without_seed().build().unwrap();
        let global = global_for(&harness);

        let mut buf = Vec::new();
        cmd_init_seed(&global, &mut buf).unwrap();
        assert!(MasterSeed::exists(harness.seed_path()));
        assert!(output(buf).starts_with("master seed created at "));
    }

    #[test]
    fn config_prints_resolved_values() {
        let harness = TestHarness::builder().build().unwrap();
        let mut global = global_for(&harness);
        global.config = Some(harness.root().join("missing-config"));

        let mut buf = Vec::new();
        cmd_config(&global, harness.config(), &mut buf).unwrap();
        let text = output(buf);
        assert!(text.starts_with(
            "CodecConfig(salt_len=12, min_hash_rounds=3, max_hash_rounds=24)\n"
        ));
        assert!(text.contains("missing-config"));
    }
}

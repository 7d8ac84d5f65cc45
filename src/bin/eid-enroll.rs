// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! e-ID Certificate Enrollment Command-Line Tool
//!
//! Drives the registration authority's enrollment process step by step.
//! The server-assigned process id is persisted in a small state file so
//! the process can be resumed across invocations.
//!
//! # Usage
//!
//! ```text
//! eid-enroll [OPTIONS] <COMMAND>
//!
//! Commands:
//!   init      Start a new enrollment process
//!   status    Show the process status and id fingerprint
//!   auth      Select an authentication method
//!   eid       Run the e-ID authentication via the local agent
//!   email     Submit the e-mail address
//!   validate  Submit the e-mail validation code
//!   showdata  Show the personal data that will go into the certificates
//!   csr       Upload a certificate signing request
//!   csrdone   Tell the server all CSRs have been uploaded
//!   getcert   Download a signed certificate to a file
//!   finalize  End the current process
//!
//! Options:
//!   -s, --server <URL>       Override the registration authority URL
//!       --state-file <PATH>  Override the process-id state file
//!   -v, --verbose            Enable verbose output
//!   -q, --quiet              Suppress non-error output
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use eid_ra_client::{
    bundled_trust_anchor, CertType, RaClient, RaClientConfig, TrustAnchors,
};

/// e-ID Certificate Enrollment Command-Line Tool
#[derive(Parser)]
#[command(name = "eid-enroll")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Certificate enrollment against the e-ID registration authority", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Override the registration authority URL
    #[arg(short, long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Override the process-id state file
    #[arg(long, global = true, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new enrollment process
    Init,

    /// Show the process status and id fingerprint
    Status,

    /// Select an authentication method (e.g. eid, postid)
    Auth {
        /// Authentication method, passed to the server as-is
        method: String,
    },

    /// Run the e-ID authentication via the local agent
    Eid,

    /// Submit the e-mail address
    Email {
        /// Address the validation code is mailed to
        address: String,
    },

    /// Submit the e-mail validation code
    Validate {
        /// Code received by e-mail
        code: String,
    },

    /// Show the personal data that will go into the certificates
    Showdata,

    /// Upload a certificate signing request
    Csr {
        /// Certificate type (sign, auth, or encr)
        cert_type: CertType,

        /// DER-encoded PKCS#10 file to upload
        file: PathBuf,
    },

    /// Tell the server all CSRs have been uploaded
    Csrdone,

    /// Download a signed certificate to a file
    Getcert {
        /// Certificate type (sign, auth, or encr)
        cert_type: CertType,

        /// Output file; must not exist yet
        file: PathBuf,
    },

    /// End the current process
    Finalize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_command(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let state_file = state_file_path(&cli);

    let mut client = RaClient::new(build_config(&cli)?)?;

    // Every command except init resumes the persisted process.
    let process_id = load_process_id(&state_file);
    if process_id.is_empty() && !matches!(cli.command, Commands::Init) {
        return Err("could not load a process id; run 'eid-enroll init' first".into());
    }
    client.set_process_id(process_id);

    match &cli.command {
        Commands::Init => {
            println!("Initializing a new process...");
            client.start_process().await?;
            store_process_id(&state_file, client.process_id())?;
            println!("Process id has been saved. Fingerprint:");
            println!("{}", client.process_id_hash());
        }
        Commands::Status => {
            println!("Process id fingerprint:");
            println!("{}", client.process_id_hash());
            // status is printed below like for every other command
        }
        Commands::Auth { method } => {
            println!("Setting authentication method {}...", method);
            client.select_auth_method(method).await?;
        }
        Commands::Eid => {
            println!("Starting e-ID authentication...");
            client.authenticate_eid().await?;
            println!("Authentication successful.");
        }
        Commands::Email { address } => {
            println!("Submitting e-mail address '{}'...", address);
            client.submit_email(address).await?;
        }
        Commands::Validate { code } => {
            println!("Submitting validation code '{}'...", code);
            client.validate_email(code).await?;
        }
        Commands::Showdata => {
            println!("Requesting personal data...");
            println!("{}", client.fetch_personal_data().await?);
        }
        Commands::Csr { cert_type, file } => {
            let csr = std::fs::read(file)?;
            println!("Sending CSR of type '{}'...", cert_type);
            client.upload_csr(*cert_type, &csr).await?;
        }
        Commands::Csrdone => {
            client.finish_csr_uploads().await?;
        }
        Commands::Getcert { cert_type, file } => {
            if file.exists() {
                return Err(format!("file '{}' already exists", file.display()).into());
            }
            println!("Requesting signed certificate of type '{}'...", cert_type);
            let cert = client.download_certificate(*cert_type).await?;
            std::fs::write(file, cert)?;
        }
        Commands::Finalize => {
            store_process_id(&state_file, "")?;
            client.finalize_process().await?;
            println!("Process finalized.");
        }
    }

    if !client.process_id().is_empty() {
        println!("process status: {}", client.process_status().await?);
    }

    Ok(())
}

/// Assemble the client configuration from flags and the bundled trust store.
fn build_config(cli: &Cli) -> Result<RaClientConfig, Box<dyn std::error::Error>> {
    let mut builder = RaClientConfig::builder();

    if let Some(ref server) = cli.server {
        builder = builder.server_url(server)?;
    }

    // Pin the authority's root CA; without the bundle the platform trust
    // store still applies, so a broken resource degrades, not breaks.
    match bundled_trust_anchor() {
        Ok(anchor) => builder = builder.trust_pinned(anchor),
        Err(e) => {
            tracing::warn!("unable to load the pinned trust store: {}", e);
            builder = builder.trust_webpki_roots();
        }
    }

    let config = builder.build();
    if let TrustAnchors::Pinned(ref anchor) = config.trust_anchors {
        tracing::debug!("pinned trust store loaded ({} certificates)", anchor.len());
    }
    Ok(config)
}

/// Resolve the process-id state file location.
///
/// Order: `--state-file`, `$EID_ENROLL_STATE`, `~/.config/eid-enroll/process-id`,
/// `./.eid-enroll-process`.
fn state_file_path(cli: &Cli) -> PathBuf {
    if let Some(ref path) = cli.state_file {
        return path.clone();
    }
    if let Ok(path) = std::env::var("EID_ENROLL_STATE") {
        return PathBuf::from(path);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("eid-enroll")
            .join("process-id");
    }
    PathBuf::from(".eid-enroll-process")
}

fn load_process_id(path: &PathBuf) -> String {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn store_process_id(path: &PathBuf, id: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, id)
}

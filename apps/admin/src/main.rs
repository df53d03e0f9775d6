use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_admin::candidate::CandidateFile;
use folio_admin::client::UploadClient;
use folio_admin::panel::{AdminPanel, UploadStatus};
use folio_admin::preferences::PreferencesStore;

/// Manage the résumé published on the portfolio site.
#[derive(Debug, Parser)]
#[command(name = "folio-admin", version, about)]
struct Cli {
    /// Base URL of the Folio API
    #[arg(long, env = "FOLIO_SERVER_URL", default_value = "http://localhost:4000")]
    server: String,

    /// Where the displayed résumé link and remembered token are cached
    #[arg(long, env = "FOLIO_PREFS", default_value = ".folio-admin.json")]
    prefs: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a new résumé (PDF, DOC or DOCX, at most 10MB)
    Upload {
        file: PathBuf,

        /// Shared upload secret; falls back to the remembered token
        #[arg(long, env = "FOLIO_UPLOAD_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Remember the token in the preferences file
        #[arg(long)]
        remember_token: bool,
    },
    /// Go back to the default résumé link
    Reset,
    /// Print the résumé link currently displayed
    Show,
    /// Check that the API is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = UploadClient::new(&cli.server);
    let mut panel = AdminPanel::open(client, PreferencesStore::new(&cli.prefs))?;
    run_panel(&mut panel, cli.command).await
}

async fn run_panel(panel: &mut AdminPanel, command: Command) -> Result<()> {
    match command {
        Command::Upload {
            file,
            token,
            remember_token,
        } => {
            if let Some(token) = token.as_deref() {
                if !panel.session_mut().sign_in(token) {
                    bail!("The upload token must not be blank");
                }
            }
            if !panel.session().is_authenticated() {
                bail!("No upload token given; pass --token or set FOLIO_UPLOAD_TOKEN");
            }
            if remember_token {
                panel.remember_token()?;
            }

            let candidate = CandidateFile::from_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            panel.select_file(candidate);
            report(panel.upload().await)?;
            println!("Résumé link: {}", panel.resume().url);
        }
        Command::Reset => {
            panel.reset_to_default();
            report(panel.status())?;
        }
        Command::Show => {
            let resume = panel.resume();
            match &resume.name {
                Some(name) => println!("{} ({name})", resume.url),
                None => println!("{}", resume.url),
            }
        }
        Command::Health => {
            let client = panel.client();
            let ok = client
                .health()
                .await
                .with_context(|| format!("Health check against {} failed", client.base_url()))?;
            println!("{}: {}", client.base_url(), if ok { "ok" } else { "not ok" });
        }
    }
    Ok(())
}

fn report(status: &UploadStatus) -> Result<()> {
    match status {
        UploadStatus::Success(message) => {
            println!("{message}");
            Ok(())
        }
        UploadStatus::Error { kind, message } => bail!("{message} ({kind:?})"),
        UploadStatus::Idle | UploadStatus::Uploading => Ok(()),
    }
}

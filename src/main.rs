use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use payment_reconciler::config::{ReconcilerArgs, ServeArgs, StoreArgs};
use payment_reconciler::interfaces::csv::payment_reader::PaymentReader;
use payment_reconciler::interfaces::http::{self, AppState};
use payment_reconciler::telemetry;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, env = "LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Remove duplicate pending payments once and print the removed ids.
    Reconcile(ReconcilerArgs),
    /// Load payments from a CSV file and print the created ids.
    Import {
        /// Input payments CSV file
        input: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    match cli.command {
        Command::Serve(args) => {
            let reconciler = args.reconciler.build().into_diagnostic()?;
            http::serve(args.bind, AppState::new(reconciler))
                .await
                .into_diagnostic()?;
        }
        Command::Reconcile(args) => {
            let reconciler = args.build().into_diagnostic()?;
            let report = reconciler.reconcile_duplicates().await.into_diagnostic()?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for id in &report.removed {
                writeln!(out, "{id}").into_diagnostic()?;
            }
            for id in &report.failed {
                eprintln!("Failed to remove duplicate payment: {id}");
            }
        }
        Command::Import { input, store } => {
            let store = store.open().into_diagnostic()?;
            let file = File::open(input).into_diagnostic()?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for row in PaymentReader::new(file).payments() {
                match row {
                    Ok(new) => {
                        let payment = store.create(new).await.into_diagnostic()?;
                        writeln!(out, "{}", payment.id).into_diagnostic()?;
                    }
                    Err(e) => {
                        eprintln!("Error reading payment: {}", e);
                    }
                }
            }
        }
    }

    Ok(())
}

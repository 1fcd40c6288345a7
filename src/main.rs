use std::sync::Arc;

use anyhow::Context;
use args::Args;
use clap::Parser;
use log::info;
use tokio::io::BufReader;

use rustedbytes_explorer::console::{self, ConsoleNotifier};
use rustedbytes_explorer::{Action, Explorer, HttpService};

mod args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parsing degli argomenti da linea di comando
    let args = Args::parse();

    env_logger::builder()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    let config = args.explorer_config();
    info!("downloads go to {:?}", config.download_dir);

    let service = HttpService::new(&config)
        .with_context(|| format!("invalid service URL {:?}", config.base_url))?;

    let (mut explorer, mut completions) =
        Explorer::new(Arc::new(service), Arc::new(ConsoleNotifier), config);

    // Riprende la sessione remota se il servizio ne ha già una aperta
    explorer.dispatch(Action::RestoreSession);
    if args.connect {
        explorer.dispatch(Action::Connect);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    console::run(&mut explorer, &mut completions, stdin)
        .await
        .context("console input failed")?;

    if explorer.is_connected() {
        explorer.dispatch(Action::Disconnect);
        // Lascia al disconnect il tempo di raggiungere il servizio
        let _ = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            completions.recv(),
        )
        .await;
    }
    Ok(())
}

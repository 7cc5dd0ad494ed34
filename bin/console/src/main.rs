use deal_desk_console::{Console, ConsoleConfig, ConsoleError, Reply};
use deal_desk_gateway::HttpBackend;
use deal_desk_workflow::WorkflowSession;
use rootcause::Report;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const PROMPT: &[u8] = b"deal-desk> ";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!("{report}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Report<ConsoleError>> {
    let config = ConsoleConfig::from_env().map_err(ConsoleError::from)?;
    tracing::info!(base_url = %config.backend.base_url, "Loaded configuration");

    let backend =
        HttpBackend::new(&config.backend).map_err(|report| report.context(ConsoleError::Backend))?;
    let console = Console::new(WorkflowSession::new(backend));

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Reply::Output(text) = console.handle_line("refresh").await {
        write_block(&mut stdout, &text).await?;
    }

    loop {
        stdout.write_all(PROMPT).await.map_err(ConsoleError::from)?;
        stdout.flush().await.map_err(ConsoleError::from)?;

        let line = tokio::select! {
            line = lines.next_line() => line.map_err(ConsoleError::from)?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            stdout.write_all(b"\n").await.map_err(ConsoleError::from)?;
            break;
        };

        match console.handle_line(&line).await {
            Reply::Output(text) => write_block(&mut stdout, &text).await?,
            Reply::Quit => break,
        }
    }

    tracing::debug!("console exiting");
    Ok(())
}

async fn write_block(stdout: &mut tokio::io::Stdout, text: &str) -> Result<(), Report<ConsoleError>> {
    if text.is_empty() {
        return Ok(());
    }
    stdout
        .write_all(format!("{text}\n").as_bytes())
        .await
        .map_err(ConsoleError::from)?;
    stdout.flush().await.map_err(ConsoleError::from)?;
    Ok(())
}

//! The `maskfill run` command.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{info, warn};

use maskfill_core::engine::{SubmitOutcome, TraversalEngine};
use maskfill_core::handle::{Dispatch, SessionEvent, SessionHandle};
use maskfill_core::view::SessionView;
use maskfill_store::create_store;

use super::StoreSource;
use crate::render::render;

pub async fn execute(
    round: Option<String>,
    dataset: Option<String>,
    quota: Option<usize>,
    source: StoreSource,
) -> Result<()> {
    let (config, store_config) = source.load()?;

    let mut setup = config.session.clone();
    if quota.is_some() {
        setup.quota = quota;
    }
    anyhow::ensure!(setup.quota != Some(0), "quota must be at least 1");

    let store = create_store(&store_config)?;
    let engine = TraversalEngine::new(store, config.engine_options()).with_setup(setup);
    info!(
        session = %engine.id(),
        store = engine.store_name(),
        "starting survey session"
    );
    let handle = SessionHandle::new(engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    run_session(&handle, round, dataset, &mut lines).await
}

/// Drive one session from line-oriented input until it ends.
pub async fn run_session<R>(
    handle: &SessionHandle,
    round: Option<String>,
    dataset: Option<String>,
    lines: &mut Lines<R>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let SessionView::Setup {
        round: default_round,
        dataset: default_dataset,
    } = handle.view().await
    else {
        anyhow::bail!("session already started");
    };

    let round = match round {
        Some(round) => round,
        None => ask_or_default(lines, "Round", default_round).await?,
    };
    let dataset = match dataset {
        Some(dataset) => dataset,
        None => ask_or_default(lines, "Dataset", default_dataset).await?,
    };

    if let Err(e) = handle
        .dispatch(SessionEvent::ConfirmSetup { round, dataset })
        .await
    {
        if e.is_blocking() {
            println!("{}", render(&handle.view().await));
        }
        return Err(e.into());
    }

    loop {
        let view = handle.view().await;
        let SessionView::Collecting { prompt, .. } = &view else {
            println!("{}", render(&view));
            return Ok(());
        };
        println!("{}", render(&view));

        for slot in 0..prompt.blanks {
            let value = ask(lines, &format!("  [{}] ", slot + 1)).await?;
            handle
                .dispatch(SessionEvent::BlankChanged { slot, value })
                .await?;
        }

        match handle.dispatch(SessionEvent::SubmitPressed).await? {
            Dispatch::Submitted(SubmitOutcome::Unsaved(record)) => {
                warn!(sentence_id = %record.sentence_id, "response was not saved");
            }
            Dispatch::Busy => anyhow::bail!("session is busy"),
            _ => {}
        }
    }
}

async fn ask<R>(lines: &mut Lines<R>, prompt: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    print!("{prompt}");
    std::io::stdout().flush()?;
    let line = lines
        .next_line()
        .await?
        .context("input closed before the session finished")?;
    Ok(line.trim().to_string())
}

async fn ask_or_default<R>(lines: &mut Lines<R>, label: &str, default: String) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let answer = ask(lines, &format!("{label} [{default}]: ")).await?;
    Ok(if answer.is_empty() { default } else { answer })
}

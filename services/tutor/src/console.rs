//! Terminal conversation loop.
//!
//! Reads one utterance per line, hands it to the session and writes the reply
//! back before reading the next line. The loop ends on EOF, an exit word, or
//! when the shutdown future resolves.

use anyhow::{Context, Result};
use hans_core::{Command, session::TutorSession};
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

const FAREWELL: &str = "Tschüss! Bis bald!";
// "bye" and "tschüss" are vocabulary answers, so they cannot end the session.
const EXIT_WORDS: &[&str] = &["quit", "exit"];

fn is_exit(line: &str) -> bool {
    let line = line.trim().to_lowercase();
    EXIT_WORDS.contains(&line.as_str())
}

async fn write_reply<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n\n").await?;
    output.flush().await?;
    Ok(())
}

/// Runs the conversation until input ends, the learner says goodbye, or
/// `shutdown` completes.
pub async fn run_conversation<R, W, S>(
    session: &mut TutorSession,
    input: R,
    mut output: W,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();

    write_reply(&mut output, &session.greeting()).await?;

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read learner input")?,
            _ = &mut shutdown => {
                info!("Received shutdown signal. Ending conversation...");
                break;
            }
        };
        let Some(line) = line else {
            info!("Input closed. Ending conversation.");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        if is_exit(&line) {
            write_reply(&mut output, FAREWELL).await?;
            break;
        }

        debug!(utterance = %line, "Learner utterance");
        match session.handle_utterance(&line).await {
            Command::SpeakText(text) => write_reply(&mut output, &text).await?,
            Command::SessionComplete(text) => {
                info!(
                    completed = session.state().progress.completed_lessons().len(),
                    "Learner finished the curriculum"
                );
                write_reply(&mut output, &text).await?;
            }
        }
    }

    Ok(())
}

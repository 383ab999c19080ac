//! Print-mode speech collaborators: stdout instead of speakers, stdin
//! instead of a microphone.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use gamebox_core::speech::{SpeechSink, SpeechSource};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Prints every utterance as `<< text`.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl SpeechSink for ConsoleSink {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        println!("<< {}", text);
        Ok(())
    }
}

/// Reads one line per utterance after a `>> ` prompt.
pub struct ConsoleSource<R = BufReader<Stdin>> {
    lines: Mutex<Lines<R>>,
}

impl ConsoleSource {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> ConsoleSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

#[async_trait]
impl<R> SpeechSource for ConsoleSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn listen(&self) -> Result<Option<String>> {
        print!(">> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let line = self
            .lines
            .lock()
            .await
            .next_line()
            .await
            .context("Failed to read from stdin")?;

        match line {
            Some(line) if line.trim().is_empty() => Ok(None),
            Some(line) => Ok(Some(line.trim().to_string())),
            None => bail!("Input closed"),
        }
    }
}

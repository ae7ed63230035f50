//! Operator-facing terminal: line input, yes/no prompts and the chat transcript.

use crate::types::ChatMessage;
use async_trait::async_trait;
use crossterm::style::Stylize;
use std::io;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stderr, Stdin, Stdout,
};

const WELCOME: &str = "Welcome to the chatbot! Type 'exit' to quit.";
const GOODBYE: &str = "👋 Bye...";

#[async_trait]
pub trait Operator: Send {
    /// Shows `prompt` and reads one line. `None` means end of input.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Asks a yes/no question until the answer is recognised. End of input
    /// counts as "no".
    async fn confirm(&mut self, question: &str) -> io::Result<bool>;

    async fn notice(&mut self, line: &str) -> io::Result<()>;

    async fn transcript(&mut self, message: &ChatMessage) -> io::Result<()>;

    async fn error(&mut self, line: &str) -> io::Result<()>;

    async fn welcome(&mut self) -> io::Result<()>;

    async fn goodbye(&mut self) -> io::Result<()>;
}

/// Console over a line reader, a transcript writer and a separate error
/// writer so failures stay out of the transcript.
pub struct ConsoleOperator<R, W, E> {
    reader: R,
    writer: W,
    errors: E,
}

impl ConsoleOperator<BufReader<Stdin>, Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            tokio::io::stderr(),
        )
    }
}

impl<R, W, E> ConsoleOperator<R, W, E>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, errors: E) -> Self {
        Self {
            reader,
            writer,
            errors,
        }
    }

    /// Returns the transcript and error writers.
    pub fn into_parts(self) -> (W, E) {
        (self.writer, self.errors)
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}

#[async_trait]
impl<R, W, E> Operator for ConsoleOperator<R, W, E>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    E: AsyncWrite + Unpin + Send,
{
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    async fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let prompt = format!("{question} (y/n) ");
        loop {
            let Some(answer) = self.read_line(&prompt).await? else {
                return Ok(false);
            };
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" | "" => return Ok(false),
                _ => self.write_line("Please answer 'y' or 'n'.").await?,
            }
        }
    }

    async fn notice(&mut self, line: &str) -> io::Result<()> {
        self.write_line(&format!("⚙️: {line}")).await
    }

    async fn transcript(&mut self, message: &ChatMessage) -> io::Result<()> {
        self.write_line(&format!("🤖: {message}")).await
    }

    async fn error(&mut self, line: &str) -> io::Result<()> {
        let styled = format!("{}\n", line.red());
        self.errors.write_all(styled.as_bytes()).await?;
        self.errors.flush().await
    }

    async fn welcome(&mut self) -> io::Result<()> {
        self.write_line(&format!("{}", WELCOME.green())).await
    }

    async fn goodbye(&mut self) -> io::Result<()> {
        self.write_line(&format!("{}", GOODBYE.red())).await
    }
}

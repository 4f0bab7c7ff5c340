//! Line driver for the CLI.
//!
//! Implements the [`Driver`] trait over a line reader and a writer: each
//! input line is parsed as a [`Command`] and applied to the App, and each
//! render prints the view unless it matches the one printed last.

use std::io::Write;

use chatty_app::{App, AppAction, Driver};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::{
    CliError,
    command::{self, Command},
    view,
};

/// Line driver implementing the [`Driver`] trait.
pub struct LineDriver<R, W> {
    lines: Lines<R>,
    out: W,
    last_view: Option<String>,
}

impl<R, W> LineDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Create a driver reading commands from `input` and printing to `out`.
    pub fn new(input: R, out: W) -> Self {
        Self { lines: input.lines(), out, last_view: None }
    }

    /// Output written so far.
    pub fn output(&self) -> &W {
        &self.out
    }

    fn apply(command: Command, app: &mut App) -> Vec<AppAction> {
        match command {
            Command::Chats => app.refresh_chats(),
            Command::Select { chat_id } => app.select_chat(Some(chat_id)),
            Command::Create { name, participant_emails } => app.create_chat(name, participant_emails),
            Command::More => app.request_history(),
            Command::Reconnect => app.reconnect(),
            Command::Quit => app.quit(),
            Command::Message { content } => app.send_message(content),
            Command::Unknown { input } => {
                app.set_status(format!("Unknown command: {input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                app.set_status(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }
}

impl<R, W> Driver for LineDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    type Error = CliError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        // End of input quits
        match self.lines.next_line().await? {
            Some(line) => Ok(Self::apply(command::parse(&line), app)),
            None => Ok(app.quit()),
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let view = view::render(app);
        if self.last_view.as_ref() == Some(&view) {
            return Ok(());
        }
        writeln!(self.out, "{view}")?;
        writeln!(self.out)?;
        self.out.flush()?;
        self.last_view = Some(view);
        Ok(())
    }

    fn stop(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "failed to flush output");
        }
    }
}

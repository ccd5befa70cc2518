use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use localchat_core::{ConversationSession, Turn, DEFAULT_HISTORY_WINDOW};
use log::{debug, error};
use std::io::{BufRead, Write};
use std::time::Duration;

use crate::backend::ChatBackend;

/// Sequential read-eval-print loop over a [`ChatBackend`].
///
/// One exchange completes (reply or failure) before the next prompt is shown.
/// The full history stays local; only the last `history_window` turns are sent.
pub struct ChatLoop<B> {
    backend: B,
    session: ConversationSession,
    history_window: usize,
    show_spinner: bool,
}

impl<B: ChatBackend> ChatLoop<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: ConversationSession::new(),
            history_window: DEFAULT_HISTORY_WINDOW,
            show_spinner: false,
        }
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    pub fn with_spinner(mut self, show_spinner: bool) -> Self {
        self.show_spinner = show_spinner;
        self
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Runs until `exit` is typed or input ends.
    ///
    /// Replies go to `out`, diagnostics for failed exchanges go to `err`.
    pub async fn run<R, W, E>(&mut self, mut input: R, out: &mut W, err: &mut E) -> Result<()>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        loop {
            write!(out, "{}: ", "You".green().bold()).context("Failed to write prompt")?;
            out.flush().context("Failed to flush stdout")?;

            let mut line = String::new();
            let read = input.read_line(&mut line).context("Failed to read input")?;
            if read == 0 {
                debug!("Input closed, leaving chat loop");
                break;
            }

            let line = line.trim_end_matches(&['\n', '\r'][..]);
            if line.eq_ignore_ascii_case("exit") {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            self.session.append(Turn::user(line));

            let spinner = self.start_spinner();
            let outcome = self
                .backend
                .exchange(self.session.recent_window(self.history_window))
                .await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            match outcome {
                Ok(reply) => {
                    writeln!(out, "{}: {}\n", "Bot".blue().bold(), reply)
                        .context("Failed to write reply")?;
                    self.session.append(Turn::assistant(reply));
                }
                Err(e) => {
                    error!("Exchange failed: {}", e);
                    writeln!(err, "{}", e.to_string().red()).context("Failed to write error")?;
                    if let Some(hint) = e.hint() {
                        writeln!(err, "{}", hint).context("Failed to write error")?;
                    }
                    writeln!(err).context("Failed to write error")?;
                }
            }
        }

        Ok(())
    }

    fn start_spinner(&self) -> Option<ProgressBar> {
        if !self.show_spinner {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message("Thinking...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ExchangeError;
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// Records every window it receives and answers "reply N"
    #[derive(Clone, Default)]
    struct Recorder {
        windows: Arc<Mutex<Vec<Vec<Turn>>>>,
    }

    #[async_trait]
    impl ChatBackend for Recorder {
        async fn exchange(&self, window: &[Turn]) -> Result<String, ExchangeError> {
            let mut windows = self.windows.lock().unwrap();
            windows.push(window.to_vec());
            Ok(format!("reply {}", windows.len()))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl ChatBackend for Unreachable {
        async fn exchange(&self, _window: &[Turn]) -> Result<String, ExchangeError> {
            Err(ExchangeError::Connection("connection refused".to_string()))
        }
    }

    async fn run_with<B: ChatBackend>(chat: &mut ChatLoop<B>, input: &str) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        chat.run(Cursor::new(input.to_string()), &mut out, &mut err)
            .await
            .unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_exit_sends_nothing() {
        let recorder = Recorder::default();
        let mut chat = ChatLoop::new(recorder.clone());

        run_with(&mut chat, "exit\nhello\n").await;

        assert!(recorder.windows.lock().unwrap().is_empty());
        assert!(chat.session().is_empty());
    }

    #[tokio::test]
    async fn test_exit_is_case_insensitive() {
        let recorder = Recorder::default();
        let mut chat = ChatLoop::new(recorder.clone());

        run_with(&mut chat, "ExIt\r\nhello\n").await;

        assert!(recorder.windows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_lines_reprompt_without_recording() {
        let recorder = Recorder::default();
        let mut chat = ChatLoop::new(recorder.clone());

        let (out, _) = run_with(&mut chat, "\n   \n\t\nexit\n").await;

        assert!(recorder.windows.lock().unwrap().is_empty());
        assert!(chat.session().is_empty());
        assert_eq!(out.matches("You").count(), 4);
    }

    #[tokio::test]
    async fn test_exchange_appends_both_turns() {
        let recorder = Recorder::default();
        let mut chat = ChatLoop::new(recorder.clone());

        let (out, _) = run_with(&mut chat, "hello there\nexit\n").await;

        assert!(out.contains("reply 1"));
        assert_eq!(
            chat.session().turns(),
            &[Turn::user("hello there"), Turn::assistant("reply 1")]
        );
        assert_eq!(
            recorder.windows.lock().unwrap()[0],
            vec![Turn::user("hello there")]
        );
    }

    #[tokio::test]
    async fn test_end_of_input_ends_loop() {
        let recorder = Recorder::default();
        let mut chat = ChatLoop::new(recorder.clone());

        run_with(&mut chat, "one").await;

        assert_eq!(recorder.windows.lock().unwrap().len(), 1);
        assert_eq!(chat.session().len(), 2);
    }

    #[tokio::test]
    async fn test_window_bounds_transmitted_history() {
        let recorder = Recorder::default();
        let mut chat = ChatLoop::new(recorder.clone()).with_history_window(10);

        let input: String = (0..8).map(|i| format!("message {}\n", i)).collect();
        run_with(&mut chat, &input).await;

        let windows = recorder.windows.lock().unwrap();
        assert_eq!(windows.len(), 8);
        // 8th exchange: 14 turns stored before sending, 15 with the new user turn
        let last = &windows[7];
        assert_eq!(last.len(), 10);
        assert_eq!(last.last(), Some(&Turn::user("message 7")));
        assert_eq!(last[0], Turn::assistant("reply 3"));
        assert_eq!(chat.session().len(), 16);
    }

    #[tokio::test]
    async fn test_failure_keeps_loop_alive() {
        let mut chat = ChatLoop::new(Unreachable);

        let (out, err) = run_with(&mut chat, "first\nsecond\nexit\n").await;

        assert!(err.contains("connection refused"));
        assert!(err.contains("Is the server running?"));
        assert_eq!(out.matches("You").count(), 3);
        // User turns stay, no assistant turn is recorded
        assert_eq!(
            chat.session().turns(),
            &[Turn::user("first"), Turn::user("second")]
        );
    }
}

//! One visitor's terminal session.

use std::fmt;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Terminal, TerminalOptions, Viewport};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use super::terminal::TerminalHandle;
use crate::error::{Error, Result};
use crate::feed::FeedSnapshot;
use crate::storage::CountryStats;
use crate::ui::{Action, App, Key};

/// Input delivered to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A decoded keystroke.
    Key(Key),
    /// The client's window changed size.
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
}

/// Result of work the session ran off its own task.
#[derive(Debug)]
enum Completion {
    Feed(Result<FeedSnapshot>),
    Stats(Result<CountryStats>),
}

/// Drives an [`App`] and draws it to the channel.
pub struct Session {
    app: App,
    terminal: Terminal<CrosstermBackend<TerminalHandle>>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    jobs_tx: mpsc::UnboundedSender<Completion>,
    jobs_rx: mpsc::UnboundedReceiver<Completion>,
    next_tick: Option<Instant>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("app", &self.app)
            .field("next_tick", &self.next_tick)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// A session drawing `app` into a `width` x `height` terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up.
    pub fn new(
        mut app: App,
        output: TerminalHandle,
        width: u16,
        height: u16,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Result<Self> {
        let terminal = Terminal::with_options(
            CrosstermBackend::new(output),
            TerminalOptions {
                viewport: Viewport::Fixed(Rect::new(0, 0, width, height)),
            },
        )?;
        app.on_resize(width, height);
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();

        Ok(Self {
            app,
            terminal,
            events,
            jobs_tx,
            jobs_rx,
            next_tick: None,
        })
    }

    /// Run until the visitor quits or the input channel closes.
    ///
    /// After every event the page is redrawn. At most one animation tick is
    /// pending; a new tick request replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if output can no longer be written.
    pub async fn run(mut self) -> Result<()> {
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)?;
        self.terminal.clear()?;
        let action = self.app.init();
        self.apply(action);
        self.draw()?;

        loop {
            let action = tokio::select! {
                event = self.events.recv() => match event {
                    Some(SessionEvent::Key(key)) => self.app.on_key(key),
                    Some(SessionEvent::Resize { width, height }) => {
                        self.resize(width, height)?;
                        Action::None
                    }
                    None => {
                        debug!("Session input closed");
                        return Ok(());
                    }
                },
                Some(done) = self.jobs_rx.recv() => {
                    match done {
                        Completion::Feed(result) => self.app.on_feed(result),
                        Completion::Stats(result) => self.app.on_stats(result),
                    }
                    Action::None
                }
                () = wait_until(self.next_tick) => {
                    self.next_tick = None;
                    self.app.on_tick()
                }
            };

            if action == Action::Quit {
                break;
            }
            self.apply(action);
            self.draw()?;
        }

        debug!("Visitor quit");
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Tick(delay) => self.next_tick = Some(Instant::now() + delay),
            Action::FetchFeed => self.spawn_fetch(),
            Action::LoadStats => self.spawn_stats(),
            Action::None | Action::Quit => {}
        }
    }

    fn spawn_fetch(&self) {
        let Some(service) = self.app.feed_service() else {
            return;
        };
        let results = self.jobs_tx.clone();
        tokio::spawn(async move {
            let _ = results.send(Completion::Feed(service.latest().await));
        });
    }

    /// Country statistics read `SQLite` and GeoLite2 synchronously, so they
    /// run on the blocking pool.
    fn spawn_stats(&self) {
        let Some((store, path)) = self.app.stats_request() else {
            return;
        };
        let results = self.jobs_tx.clone();
        tokio::spawn(async move {
            let stats = tokio::task::spawn_blocking(move || store.country_stats(&path))
                .await
                .unwrap_or_else(|e| Err(Error::internal(e.to_string())));
            let _ = results.send(Completion::Stats(stats));
        });
    }

    fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.app.on_resize(width, height);
        self.terminal.resize(Rect::new(0, 0, width, height))?;
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.terminal.draw(|frame| self.app.render(frame))?;
        Ok(())
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::VisitorStore;
    use crate::ui::SessionInfo;

    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        events: mpsc::UnboundedSender<SessionEvent>,
        output: mpsc::UnboundedReceiver<Vec<u8>>,
        task: tokio::task::JoinHandle<Result<()>>,
    }

    fn start(width: u16, height: u16) -> Harness {
        start_with(SessionInfo::default(), width, height)
    }

    fn start_with(info: SessionInfo, width: u16, height: u16) -> Harness {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (output_tx, output) = mpsc::unbounded_channel();
        let session = Session::new(
            App::new(info),
            TerminalHandle::from_sender(output_tx),
            width,
            height,
            events_rx,
        )
        .unwrap();
        Harness {
            events,
            output,
            task: tokio::spawn(session.run()),
        }
    }

    fn drain(output: &mut mpsc::UnboundedReceiver<Vec<u8>>) -> String {
        let mut bytes = Vec::new();
        while let Ok(chunk) = output.try_recv() {
            bytes.extend(chunk);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn test_quit_restores_screen() {
        let mut harness = start(80, 24);
        harness.events.send(SessionEvent::Key(Key::Char('q'))).unwrap();
        harness.task.await.unwrap().unwrap();

        let text = drain(&mut harness.output);
        assert!(text.starts_with("\x1b[?1049h"));
        assert!(text.contains("enter: continue"));
        assert!(text.contains("\x1b[?1049l"));
    }

    #[tokio::test]
    async fn test_closed_input_ends_session() {
        let harness = start(80, 24);
        drop(harness.events);
        harness.task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_navigation_and_resize() {
        let mut harness = start(80, 24);
        for event in [
            SessionEvent::Resize {
                width: 100,
                height: 40,
            },
            SessionEvent::Key(Key::Enter),
            SessionEvent::Key(Key::Down),
            SessionEvent::Key(Key::Enter),
            SessionEvent::Key(Key::Esc),
            SessionEvent::Key(Key::Char('q')),
        ] {
            harness.events.send(event).unwrap();
        }
        harness.task.await.unwrap().unwrap();

        let text = drain(&mut harness.output);
        assert!(text.contains("Projects"));
    }

    #[tokio::test]
    async fn test_privacy_stats_arrive_from_blocking_pool() {
        let store = Arc::new(VisitorStore::open_in_memory().unwrap());
        let mut harness = start_with(
            SessionInfo {
                store: Some(store),
                geolite_path: Some(PathBuf::from("/nonexistent/GeoLite2-Country.mmdb")),
                ..SessionInfo::default()
            },
            100,
            40,
        );
        harness.events.send(SessionEvent::Key(Key::Enter)).unwrap();
        for _ in 0..5 {
            harness.events.send(SessionEvent::Key(Key::Down)).unwrap();
        }
        harness.events.send(SessionEvent::Key(Key::Enter)).unwrap();

        let mut text = String::new();
        while !text.contains("Unavailable") {
            let chunk = tokio::time::timeout(Duration::from_secs(5), harness.output.recv())
                .await
                .expect("stats never drawn")
                .unwrap();
            text.push_str(&String::from_utf8_lossy(&chunk));
        }

        harness.events.send(SessionEvent::Key(Key::Char('q'))).unwrap();
        harness.task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_closed_output_fails() {
        let harness = start(80, 24);
        drop(harness.output);
        harness.events.send(SessionEvent::Key(Key::Enter)).unwrap();
        assert!(harness.task.await.unwrap().is_err());
    }
}

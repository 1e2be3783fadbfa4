//! Event loop: draws the app, feeds it keys and API replies, and executes the
//! effects it returns.
//!
//! The loop itself runs on the calling thread. Requests are spawned on a tokio
//! runtime and report back through an unbounded channel drained every frame.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::api::{ApiClient, Reply, RequestKind};
use crate::app::{App, Effect, MountId};
use crate::error::ApiError;
use crate::{terminal, ui};

/// How long to wait for input before redrawing.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct ReplyEvent {
    pub mount: MountId,
    pub kind: RequestKind,
    pub result: Result<Reply, ApiError>,
}

pub struct Runtime {
    app: App,
    api: ApiClient,
    handle: Handle,
    inbox_tx: mpsc::UnboundedSender<ReplyEvent>,
    inbox_rx: mpsc::UnboundedReceiver<ReplyEvent>,
}

impl Runtime {
    pub fn new(app: App, api: ApiClient, handle: Handle) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            app,
            api,
            handle,
            inbox_tx,
            inbox_rx,
        }
    }

    /// Takes over the terminal until the user quits.
    pub fn run(mut self, initial_path: &str) -> Result<()> {
        terminal::install_panic_hook();
        let mut tui = terminal::setup()?;

        let result = self.event_loop(&mut tui, initial_path);

        terminal::restore()?;
        tui.show_cursor()?;
        result
    }

    fn event_loop(&mut self, tui: &mut terminal::Tui, initial_path: &str) -> Result<()> {
        let effects = self.app.navigate(initial_path);
        if self.execute(effects) {
            return Ok(());
        }

        loop {
            self.app.tick(Instant::now());
            tui.draw(|frame| ui::render(frame, &self.app))?;

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let effects = self.app.handle_key(key);
                        if self.execute(effects) {
                            return Ok(());
                        }
                    }
                }
            }

            while let Ok(reply) = self.inbox_rx.try_recv() {
                let effects = self.app.handle_reply(reply.mount, reply.kind, reply.result);
                if self.execute(effects) {
                    return Ok(());
                }
            }
        }
    }

    /// Returns `true` when the app asked to quit.
    fn execute(&self, effects: Vec<Effect>) -> bool {
        for effect in effects {
            match effect {
                Effect::Quit => return true,
                Effect::Send {
                    mount,
                    request,
                    cancel,
                } => {
                    let api = self.api.clone();
                    let tx = self.inbox_tx.clone();
                    let kind = request.kind();
                    self.handle.spawn(async move {
                        tokio::select! {
                            () = cancel.cancelled() => {
                                tracing::debug!(?kind, ?mount, "request cancelled");
                            }
                            result = api.execute(request) => {
                                let _ = tx.send(ReplyEvent { mount, kind, result });
                            }
                        }
                    });
                }
            }
        }
        false
    }
}

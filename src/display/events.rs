use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{thread, time::Duration};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct EventConfig {
    pub exit_key: KeyEvent,
    pub tick_rate: Duration,
}

impl Default for EventConfig {
    fn default() -> EventConfig {
        EventConfig {
            exit_key: KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            tick_rate: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(KeyEvent),
    /// Redraw cadence from the input thread.
    Tick,
    /// One countdown second, tagged with the ticker generation.
    Second(u64),
    Exit,
}

pub struct Events {
    rx: UnboundedReceiver<Event>,
    tx: UnboundedSender<Event>,
}

impl Events {
    pub fn with_config(config: EventConfig) -> Events {
        let (tx, rx) = mpsc::unbounded_channel();

        let event_tx = tx.clone();
        thread::spawn(move || loop {
            match event::poll(config.tick_rate) {
                Ok(true) => match event::read() {
                    Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        let exit = key.code == config.exit_key.code
                            && key.modifiers == config.exit_key.modifiers;
                        let event = if exit { Event::Exit } else { Event::Input(key) };
                        if event_tx.send(event).is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => warn!(%err, "could not read terminal event"),
                },
                Ok(false) => {}
                Err(err) => {
                    warn!(%err, "terminal input stopped");
                    let _ = event_tx.send(Event::Exit);
                    return;
                }
            }

            if event_tx.send(Event::Tick).is_err() {
                return;
            }
        });

        Events { rx, tx }
    }

    pub fn sender(&self) -> UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

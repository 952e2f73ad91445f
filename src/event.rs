use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

/// Input events delivered to the main loop. Ticks fire when no terminal
/// event arrives within the poll window, keeping the UI redrawing.
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize,
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let message = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) => Some(AppEvent::Key(key)),
                    Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
                    _ => None,
                }
            } else {
                Some(AppEvent::Tick)
            };
            if let Some(message) = message {
                if tx.send(message).is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::KeyEventKind;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

/// Key bindings of the session view. Anything unbound is typed into the
/// input box.
pub fn map_input(input: Input) -> Event {
    return match (input.key.clone(), input.ctrl) {
        (Key::Char('c'), true) => Event::KeyboardCTRLC(),
        (Key::Char('l'), true) => Event::KeyboardCTRLL(),
        (Key::Char('p'), true) => Event::KeyboardCTRLP(),
        (Key::Char('r'), true) => Event::KeyboardCTRLR(),
        (Key::Char('d'), true) | (Key::PageDown, _) => Event::UIScrollPageDown(),
        (Key::Char('u'), true) | (Key::PageUp, _) => Event::UIScrollPageUp(),
        (Key::Down | Key::MouseScrollDown, _) => Event::UIScrollDown(),
        (Key::Up | Key::MouseScrollUp, _) => Event::UIScrollUp(),
        (Key::Enter, _) => Event::KeyboardEnter(),
        _ => Event::KeyboardCharInput(input),
    };
}

fn map_mouse(kind: MouseEventKind) -> Option<Event> {
    return match kind {
        MouseEventKind::ScrollDown => Some(Event::UIScrollDown()),
        MouseEventKind::ScrollUp => Some(Event::UIScrollUp()),
        _ => None,
    };
}

pub fn map_terminal_event(event: CrosstermEvent) -> Option<Event> {
    return match event {
        // Some terminals report releases too, which would double every key.
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Release => None,
        CrosstermEvent::Key(key) => Some(map_input(key.into())),
        CrosstermEvent::Mouse(mouse) => map_mouse(mouse.kind),
        CrosstermEvent::Paste(text) => Some(Event::KeyboardPaste(text)),
        _ => None,
    };
}

/// Single source of events for the render loop. Terminal input, events from
/// the services and a periodic redraw tick all come out of `next`.
pub struct EventsService {
    events: mpsc::UnboundedReceiver<Event>,
    events_open: bool,
    redraw_every: Duration,
    terminal: EventStream,
}

impl EventsService {
    pub fn new(events: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            events,
            events_open: true,
            redraw_every: Duration::from_millis(500),
            terminal: EventStream::new(),
        };
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let event = tokio::select! {
                event = self.events.recv(), if self.events_open => {
                    if event.is_none() {
                        tracing::debug!("Service events closed");
                        self.events_open = false;
                    }
                    event
                }
                event = self.terminal.next() => match event {
                    Some(Ok(event)) => map_terminal_event(event),
                    Some(Err(err)) => {
                        tracing::warn!(error = ?err, "Failed to read terminal event");
                        None
                    }
                    None => None,
                },
                _ = time::sleep(self.redraw_every) => Some(Event::UITick()),
            };

            if let Some(event) = event {
                return Ok(event);
            }
        }
    }
}

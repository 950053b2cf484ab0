use anyhow::bail;
use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use tui_textarea::Input;
use tui_textarea::Key;

use super::map_input;
use super::map_terminal_event;
use crate::domain::models::Event;

fn ctrl(c: char) -> Input {
    return Input {
        key: Key::Char(c),
        ctrl: true,
        ..Default::default()
    };
}

fn key(key: Key) -> Input {
    return Input {
        key,
        ..Default::default()
    };
}

fn mouse(kind: MouseEventKind) -> CrosstermEvent {
    return CrosstermEvent::Mouse(MouseEvent {
        kind,
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    });
}

#[test]
fn it_maps_session_shortcuts() {
    assert!(matches!(map_input(ctrl('c')), Event::KeyboardCTRLC()));
    assert!(matches!(map_input(ctrl('l')), Event::KeyboardCTRLL()));
    assert!(matches!(map_input(ctrl('p')), Event::KeyboardCTRLP()));
    assert!(matches!(map_input(ctrl('r')), Event::KeyboardCTRLR()));
    assert!(matches!(map_input(key(Key::Enter)), Event::KeyboardEnter()));
}

#[test]
fn it_maps_scrolling_keys() {
    assert!(matches!(map_input(key(Key::Up)), Event::UIScrollUp()));
    assert!(matches!(map_input(key(Key::Down)), Event::UIScrollDown()));
    assert!(matches!(map_input(key(Key::MouseScrollUp)), Event::UIScrollUp()));
    assert!(matches!(map_input(key(Key::PageUp)), Event::UIScrollPageUp()));
    assert!(matches!(map_input(key(Key::PageDown)), Event::UIScrollPageDown()));
    assert!(matches!(map_input(ctrl('u')), Event::UIScrollPageUp()));
    assert!(matches!(map_input(ctrl('d')), Event::UIScrollPageDown()));
}

#[test]
fn it_types_unbound_keys() -> Result<()> {
    match map_input(key(Key::Char('l'))) {
        Event::KeyboardCharInput(input) => {
            assert_eq!(input.key, Key::Char('l'));
            assert!(!input.ctrl);
        }
        _ => bail!("Wrong enum"),
    }

    assert!(matches!(
        map_input(ctrl('x')),
        Event::KeyboardCharInput(Input { ctrl: true, .. })
    ));

    return Ok(());
}

#[test]
fn it_maps_terminal_events() -> Result<()> {
    let press = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
    assert!(matches!(
        map_terminal_event(CrosstermEvent::Key(press)),
        Some(Event::KeyboardCTRLP())
    ));

    match map_terminal_event(CrosstermEvent::Paste("notes".to_string())) {
        Some(Event::KeyboardPaste(text)) => assert_eq!(text, "notes"),
        _ => bail!("Wrong enum"),
    }

    assert!(matches!(
        map_terminal_event(mouse(MouseEventKind::ScrollDown)),
        Some(Event::UIScrollDown())
    ));
    assert!(map_terminal_event(mouse(MouseEventKind::Moved)).is_none());
    assert!(map_terminal_event(CrosstermEvent::FocusGained).is_none());

    return Ok(());
}

#[test]
fn it_ignores_key_releases() {
    let release = KeyEvent::new_with_kind(
        KeyCode::Char('p'),
        KeyModifiers::CONTROL,
        KeyEventKind::Release,
    );

    assert!(map_terminal_event(CrosstermEvent::Key(release)).is_none());
}

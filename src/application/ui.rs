use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Gauge;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::ChatMessage;
use crate::domain::models::Event;
use crate::domain::models::PomodoroMode;
use crate::domain::models::PomodoroState;
use crate::domain::models::StudySession;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

fn render_pomodoro(frame: &mut Frame, rect: Rect, pomodoro: &PomodoroState, running: bool) {
    let mut status = "CTRL+P to start";
    if running {
        status = "CTRL+P to pause";
    } else if pomodoro.is_finished() {
        status = "CTRL+R to start over";
    }

    let color = match pomodoro.mode {
        PomodoroMode::Work => Color::Red,
        PomodoroMode::ShortBreak => Color::Green,
        PomodoroMode::LongBreak => Color::Blue,
        PomodoroMode::Finished => Color::DarkGray,
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} · {} · {status}", pomodoro.mode, pomodoro.cycle_label())),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(pomodoro.progress() / 100.0)
        .label(pomodoro.remaining.to_string());

    frame.render_widget(gauge, rect);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut textarea = TextArea::default();
    let has_session = app_state.session.is_some();

    // First page of history, matching what the session page shows on load.
    app_state.load_more(&tx)?;

    loop {
        terminal.draw(|frame| {
            let mut constraints = vec![Constraint::Min(1), Constraint::Length(3)];
            if has_session {
                constraints.push(Constraint::Max(4));
            }

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(frame.size());

            if layout[0].width != app_state.last_known_width
                || layout[0].height != app_state.last_known_height
            {
                app_state.set_rect(layout[0]);
            }

            app_state.chat_log.render(
                frame,
                layout[0],
                &app_state.chat_title(),
                app_state.scroll.position,
            );
            render_pomodoro(
                frame,
                layout[1],
                &app_state.pomodoro,
                app_state.pomodoro_running,
            );

            if has_session {
                frame.render_widget(textarea.widget(), layout[2]);
            }
        })?;

        match events.next().await? {
            Event::ChannelClosed() => {
                app_state.handle_channel_closed();
            }
            Event::ChannelMessage(message) => {
                app_state.handle_channel_message(message);
            }
            Event::HistoryPage(cursor, page) => {
                app_state.handle_history_page(&cursor, page);
            }
            Event::HistoryFailed(cursor) => {
                app_state.handle_history_failed(&cursor);
            }
            Event::KeyboardCharInput(input) => {
                if has_session {
                    textarea.input(input);
                }
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardCTRLL() => {
                app_state.load_more(&tx)?;
            }
            Event::KeyboardCTRLP() => {
                app_state.toggle_pomodoro(&tx)?;
            }
            Event::KeyboardCTRLR() => {
                app_state.reset_pomodoro(&tx)?;
            }
            Event::KeyboardEnter() => {
                let input_str = textarea.lines().join("\n");
                if app_state.send_message(&input_str, &tx)? {
                    textarea = TextArea::default();
                }
            }
            Event::KeyboardPaste(text) => {
                if has_session {
                    textarea.insert_str(&text);
                }
            }
            Event::NotifyError(text) => {
                app_state.add_message(ChatMessage::new_error(&text));
            }
            Event::PomodoroTick(run) => {
                app_state.handle_pomodoro_tick(run, &tx)?;
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UITick() => (),
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    session: Option<StudySession>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::new(session);

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}

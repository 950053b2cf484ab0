use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use mockito::Matcher;
use test_utils::history_page_fixture;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time;

use super::ActionsService;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::PageCursor;
use crate::domain::models::StudySession;
use crate::infrastructure::api::StudySessionApi;

const PAGE_PATH: &str = "/main/collaborative-study-session-menu/study-session/a1b2c3";

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Result<Event> {
    return match time::timeout(Duration::from_secs(5), rx.recv()).await? {
        Some(event) => Ok(event),
        None => bail!("Event channel closed"),
    };
}

fn service(
    server_url: &str,
    with_session: bool,
) -> Result<(ActionsService, mpsc::UnboundedReceiver<Event>)> {
    let api = StudySessionApi::new(server_url, "");
    let mut session = None;
    if with_session {
        session = Some(api.session("a1b2c3")?);
    }

    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let service = ActionsService::new(api, session, Duration::from_millis(1000), tx);
    return Ok((service, rx));
}

#[tokio::test]
async fn it_loads_history_pages() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", PAGE_PATH)
        .match_query(Matcher::UrlEncoded("messages-page".into(), "1".into()))
        .with_status(200)
        .with_body(history_page_fixture())
        .create_async()
        .await;

    let (mut service, mut rx) = service(&server.url(), true)?;
    service
        .handle(Action::LoadHistory(PageCursor::first()))
        .await?;

    let (cursor, page) = match next_event(&mut rx).await? {
        Event::HistoryPage(cursor, page) => (cursor, page),
        _ => bail!("Wrong enum"),
    };

    assert_eq!(cursor, PageCursor::first());
    assert_eq!(page.messages.len(), 3);
    assert_eq!(page.next_messages_page, Some(PageCursor::new("2")));
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_reports_failed_history_loads() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", PAGE_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let (mut service, mut rx) = service(&server.url(), true)?;
    service
        .handle(Action::LoadHistory(PageCursor::new("3")))
        .await?;

    match next_event(&mut rx).await? {
        Event::HistoryFailed(cursor) => assert_eq!(cursor, PageCursor::new("3")),
        _ => bail!("Wrong enum"),
    }

    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_shows_server_errors_from_history_loads() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", PAGE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"error": "Study session not found"}"#)
        .create_async()
        .await;

    let (mut service, mut rx) = service(&server.url(), true)?;
    service
        .handle(Action::LoadHistory(PageCursor::first()))
        .await?;

    match next_event(&mut rx).await? {
        Event::NotifyError(text) => assert_eq!(text, "Study session not found"),
        _ => bail!("Wrong enum"),
    }
    match next_event(&mut rx).await? {
        Event::HistoryFailed(cursor) => assert_eq!(cursor, PageCursor::first()),
        _ => bail!("Wrong enum"),
    }

    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_fails_history_without_session() -> Result<()> {
    let (mut service, mut rx) = service("http://localhost:8000", false)?;
    service
        .handle(Action::LoadHistory(PageCursor::first()))
        .await?;

    match next_event(&mut rx).await? {
        Event::HistoryFailed(cursor) => assert_eq!(cursor, PageCursor::first()),
        _ => bail!("Wrong enum"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_notifies_when_the_channel_cannot_connect() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let (service, mut rx) = service(&format!("http://{addr}"), true)?;
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let worker = tokio::spawn(async move {
        return service.start("", &mut action_rx).await;
    });

    match next_event(&mut rx).await? {
        Event::NotifyError(text) => {
            assert!(text.starts_with("Could not connect to study session a1b2c3"));
        }
        _ => bail!("Wrong enum"),
    }

    // Sending without a channel is dropped instead of failing the service.
    action_tx.send(Action::SendMessage("hello".to_string()))?;
    drop(action_tx);
    worker.await??;

    assert!(next_event(&mut rx).await.is_err());
    return Ok(());
}

#[tokio::test]
async fn it_skips_connecting_without_session() -> Result<()> {
    let (service, mut rx) = service("http://localhost:8000", false)?;
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    drop(action_tx);

    service.start("", &mut action_rx).await?;

    assert!(next_event(&mut rx).await.is_err());
    return Ok(());
}

#[tokio::test]
async fn it_keeps_ticking_while_the_channel_connects() -> Result<()> {
    // Accepts the socket but never answers the websocket handshake.
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        }
    });

    let api = StudySessionApi::new(&format!("http://{addr}"), "");
    let session = api.session("a1b2c3")?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let service = ActionsService::new(api, Some(session), Duration::from_millis(10), tx);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    tokio::spawn(async move {
        return service.start("", &mut action_rx).await;
    });
    action_tx.send(Action::PomodoroStart(1))?;

    match next_event(&mut rx).await? {
        Event::PomodoroTick(run) => assert_eq!(run, 1),
        _ => bail!("Wrong enum"),
    }

    return Ok(());
}

#[tokio::test(start_paused = true)]
async fn it_drives_the_pomodoro_timer() -> Result<()> {
    let session = StudySession::new("http://localhost:8000", "a1b2c3")?;
    let api = StudySessionApi::new("http://localhost:8000", "");
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut service = ActionsService::new(api, Some(session), Duration::from_millis(1000), tx);

    service.handle(Action::PomodoroStart(1)).await?;
    time::sleep(Duration::from_millis(2500)).await;
    service.handle(Action::PomodoroStop()).await?;

    let mut ticks = 0;
    while let Ok(event) = rx.try_recv() {
        if let Event::PomodoroTick(run) = event {
            assert_eq!(run, 1);
            ticks += 1;
        }
    }
    assert_eq!(ticks, 2);

    time::sleep(Duration::from_millis(5000)).await;
    assert!(rx.try_recv().is_err());

    service.handle(Action::PomodoroStart(2)).await?;
    service.handle(Action::PomodoroReset()).await?;
    time::sleep(Duration::from_millis(5000)).await;
    assert!(rx.try_recv().is_err());

    return Ok(());
}

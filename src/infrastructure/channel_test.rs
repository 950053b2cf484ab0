use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use futures::SinkExt;
use futures::StreamExt;
use test_utils::inbound_envelope_fixture;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::decode;
use super::SessionChannel;
use crate::domain::models::ChatMessage;
use crate::domain::models::Event;
use crate::domain::models::StudySession;

async fn local_session() -> Result<(TcpListener, StudySession)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let session = StudySession::new(&format!("http://{addr}"), "a1b2c3")?;

    return Ok((listener, session));
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<Event>) -> Result<ChatMessage> {
    let event = time::timeout(Duration::from_secs(5), rx.recv()).await?;
    let message = match event {
        Some(Event::ChannelMessage(message)) => message,
        _ => bail!("Wrong enum"),
    };

    return Ok(message);
}

#[test]
fn it_decodes_envelopes() -> Result<()> {
    let message = decode(inbound_envelope_fixture())?;
    assert_eq!(message.sender, "ana");
    assert_eq!(message.content, "Starting the next pomodoro");
    assert_eq!(message.profile_picture_url, "/media/profile_pictures/ana.png");

    assert!(decode("not json").is_err());
    return Ok(());
}

#[tokio::test]
async fn it_sends_and_receives_broadcasts() -> Result<()> {
    let (listener, session) = local_session().await?;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let mut ws = tokio_tungstenite::accept_async(stream).await?;

        // Broadcast whatever the client sends back to it, like the server
        // does for every member of the group.
        let sent = match ws.next().await {
            Some(Ok(WsMessage::Text(text))) => text,
            _ => bail!("Expected a text frame"),
        };
        let outbound: serde_json::Value = serde_json::from_str(&sent)?;
        let broadcast = serde_json::json!({
            "message": outbound["message"],
            "sender": "ana",
            "datetime": "2023-11-02T10:20:00Z",
            "profile_picture_url": outbound["profile_picture_url"],
        });
        ws.send(WsMessage::Text(broadcast.to_string())).await?;

        return Ok::<String, anyhow::Error>(sent);
    });

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut channel = SessionChannel::connect(&session, "/media/ana.png", tx).await?;
    channel.send("hello everyone").await?;

    let message = next_message(&mut rx).await?;
    assert_eq!(message.sender, "ana");
    assert_eq!(message.content, "hello everyone");
    assert_eq!(message.profile_picture_url, "/media/ana.png");

    let sent = server.await??;
    assert_eq!(
        sent,
        r#"{"message":"hello everyone","profile_picture_url":"/media/ana.png"}"#
    );

    return Ok(());
}

#[tokio::test]
async fn it_forwards_messages_in_arrival_order() -> Result<()> {
    let (listener, session) = local_session().await?;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let mut ws = tokio_tungstenite::accept_async(stream).await?;
        for idx in 0..5 {
            let text = serde_json::json!({ "message": format!("msg {idx}") }).to_string();
            ws.send(WsMessage::Text(text)).await?;
        }
        ws.send(WsMessage::Text("garbage".to_string())).await?;
        ws.send(WsMessage::Text(r#"{"message": "last"}"#.to_string()))
            .await?;

        return Ok::<(), anyhow::Error>(());
    });

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let _channel = SessionChannel::connect(&session, "", tx).await?;

    for idx in 0..5 {
        let message = next_message(&mut rx).await?;
        assert_eq!(message.content, format!("msg {idx}"));
    }
    assert_eq!(next_message(&mut rx).await?.content, "last");

    server.await??;
    return Ok(());
}

#[tokio::test]
async fn it_stays_closed_after_server_closes() -> Result<()> {
    let (listener, session) = local_session().await?;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let mut ws = tokio_tungstenite::accept_async(stream).await?;
        ws.close(None).await?;

        return Ok::<(), anyhow::Error>(());
    });

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let channel = SessionChannel::connect(&session, "", tx).await?;
    server.await??;

    time::timeout(Duration::from_secs(5), async {
        while channel.is_open() {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    assert!(!channel.is_open());
    match rx.try_recv() {
        Ok(Event::ChannelClosed()) => (),
        _ => bail!("Expected a single close notification"),
    }
    assert!(rx.try_recv().is_err());
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_connect_without_server() -> Result<()> {
    let (listener, session) = local_session().await?;
    drop(listener);

    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let res = SessionChannel::connect(&session, "", tx).await;

    assert!(res.is_err());
    return Ok(());
}

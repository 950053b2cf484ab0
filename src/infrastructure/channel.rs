#[cfg(test)]
#[path = "channel_test.rs"]
mod tests;

use anyhow::Result;
use futures::stream::SplitSink;
use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::WebSocketStream;

use crate::domain::models::ChatMessage;
use crate::domain::models::Event;
use crate::domain::models::InboundEnvelope;
use crate::domain::models::OutboundEnvelope;
use crate::domain::models::StudySession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub fn decode(text: &str) -> Result<ChatMessage> {
    let envelope: InboundEnvelope = serde_json::from_str(text)?;
    return Ok(ChatMessage::from(envelope));
}

/// Persistent connection to a study session's broadcast group. Sending is
/// fire and forget, and incoming broadcasts are forwarded to the UI as
/// `Event::ChannelMessage`. When the connection drops `Event::ChannelClosed`
/// is sent once and the channel stays down.
pub struct SessionChannel {
    profile_picture_url: String,
    reader: JoinHandle<()>,
    writer: SplitSink<WsStream, WsMessage>,
}

impl SessionChannel {
    pub async fn connect(
        session: &StudySession,
        profile_picture_url: &str,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Result<SessionChannel> {
        let url = session.channel_url();
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        tracing::info!(url = %url, "Connected to study session channel");

        let (writer, mut read) = stream.split();
        let reader = tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => match decode(&text) {
                        Ok(message) => {
                            if tx.send(Event::ChannelMessage(message)).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            tracing::warn!(error = ?err, body = %text, "Skipping malformed envelope");
                        }
                    },
                    Ok(WsMessage::Close(frame)) => {
                        tracing::error!(frame = ?frame, "Chat socket closed unexpectedly");
                        let _ = tx.send(Event::ChannelClosed());
                        return;
                    }
                    Ok(_) => (),
                    Err(err) => {
                        tracing::error!(error = ?err, "Chat socket closed unexpectedly");
                        let _ = tx.send(Event::ChannelClosed());
                        return;
                    }
                }
            }

            tracing::error!("Chat socket closed unexpectedly");
            let _ = tx.send(Event::ChannelClosed());
        });

        return Ok(SessionChannel {
            profile_picture_url: profile_picture_url.to_string(),
            reader,
            writer,
        });
    }

    pub fn is_open(&self) -> bool {
        return !self.reader.is_finished();
    }

    /// Writes one chat message to the session. The message is not echoed
    /// locally; it arrives back through the broadcast like everyone else's.
    pub async fn send(&mut self, content: &str) -> Result<()> {
        let envelope = OutboundEnvelope::new(content, &self.profile_picture_url);
        let payload = serde_json::to_string(&envelope)?;
        self.writer.send(WsMessage::Text(payload)).await?;

        return Ok(());
    }
}

impl Drop for SessionChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

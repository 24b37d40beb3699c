//! A terminal "chat": stdin lines in, stdout lines out.

use std::io::BufRead;
use std::sync::Arc;

use async_trait::async_trait;
use herald::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// The single user typing into the terminal.
pub struct ConsoleMember {
    id: String,
    permissions: Vec<String>,
}

impl ConsoleMember {
    pub fn new(id: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            id: id.into(),
            permissions,
        }
    }
}

impl Member for ConsoleMember {
    fn id(&self) -> &str {
        &self.id
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Writes bot replies to stdout.
pub struct ConsoleChannel;

struct PrintedLine {
    text: String,
}

#[async_trait]
impl SentMessage for PrintedLine {
    async fn delete(&self) -> ChatResult<()> {
        println!("~ (expired) {}", self.text);
        Ok(())
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    async fn send(&self, text: &str) -> ChatResult<Box<dyn SentMessage>> {
        println!("< {text}");
        Ok(Box::new(PrintedLine {
            text: text.to_string(),
        }))
    }
}

struct ConsoleLine {
    content: String,
    member: Arc<ConsoleMember>,
    channel: Arc<ConsoleChannel>,
}

impl InboundMessage for ConsoleLine {
    fn content(&self) -> &str {
        &self.content
    }

    fn member(&self) -> &dyn Member {
        self.member.as_ref()
    }

    fn channel(&self) -> &dyn Channel {
        self.channel.as_ref()
    }
}

/// Forwards stdin lines as messages until EOF or the receiver goes away.
///
/// Blocks, so it runs on its own thread.
pub fn pump_stdin(member: Arc<ConsoleMember>, sender: mpsc::Sender<BoxedMessage>) {
    let channel = Arc::new(ConsoleChannel);

    for line in std::io::stdin().lock().lines() {
        let content = match line {
            Ok(content) => content,
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                return;
            }
        };
        let message: BoxedMessage = Arc::new(ConsoleLine {
            content,
            member: Arc::clone(&member),
            channel: Arc::clone(&channel),
        });
        if sender.blocking_send(message).is_err() {
            return;
        }
    }
    debug!("stdin closed");
}

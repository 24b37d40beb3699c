//! Test doubles for the chat collaborator traits.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use herald_core::{
    BoxError, BoxedCommand, BoxedMessage, Channel, ChatError, ChatResult, CommandDescriptor,
    CommandInfo, InboundMessage, Member, SentMessage, command_fn,
};

pub(crate) struct TestMember {
    id: String,
    permissions: HashSet<String>,
}

impl TestMember {
    pub(crate) fn new(id: &str, permissions: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Member for TestMember {
    fn id(&self) -> &str {
        &self.id
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Records every sent and deleted text.
#[derive(Clone, Default)]
pub(crate) struct RecordingChannel {
    pub(crate) sent: Arc<Mutex<Vec<String>>>,
    pub(crate) deleted: Arc<Mutex<Vec<String>>>,
    pub(crate) fail_sends: bool,
}

impl RecordingChannel {
    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

struct RecordedMessage {
    text: String,
    deleted: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SentMessage for RecordedMessage {
    async fn delete(&self) -> ChatResult<()> {
        self.deleted.lock().push(self.text.clone());
        Ok(())
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send(&self, text: &str) -> ChatResult<Box<dyn SentMessage>> {
        if self.fail_sends {
            return Err(ChatError::NotConnected);
        }
        self.sent.lock().push(text.to_string());
        Ok(Box::new(RecordedMessage {
            text: text.to_string(),
            deleted: Arc::clone(&self.deleted),
        }))
    }
}

pub(crate) struct TestMessage {
    content: String,
    member: TestMember,
    channel: RecordingChannel,
}

impl InboundMessage for TestMessage {
    fn content(&self) -> &str {
        &self.content
    }

    fn member(&self) -> &dyn Member {
        &self.member
    }

    fn channel(&self) -> &dyn Channel {
        &self.channel
    }
}

pub(crate) fn message(content: &str, member: TestMember, channel: &RecordingChannel) -> BoxedMessage {
    Arc::new(TestMessage {
        content: content.to_string(),
        member,
        channel: channel.clone(),
    })
}

/// A command that records the arguments of every call.
pub(crate) fn recording_command() -> (BoxedCommand, Arc<Mutex<Vec<Vec<String>>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let command = command_fn(move |_, _, args| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().push(args);
            Ok::<(), BoxError>(())
        }
    });
    (Arc::new(command), calls)
}

/// A command that fails with `error` and counts its calls.
pub(crate) fn failing_command(error: &'static str) -> (BoxedCommand, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let command = command_fn(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Err::<(), BoxError>(error.into()) }
    });
    (Arc::new(command), calls)
}

pub(crate) fn noop() -> BoxedCommand {
    Arc::new(command_fn(|_, _, _| async { Ok::<(), BoxError>(()) }))
}

pub(crate) fn descriptor(info: CommandInfo, source: &str) -> CommandDescriptor {
    CommandDescriptor::new(info, noop(), source)
}

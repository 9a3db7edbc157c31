// ABOUTME: Integration tests for the session loop in both replay and checkpoint modes.
// ABOUTME: Drives scripted input through fake models and checks history, payloads, and the log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use parley::checkpoint::{
    CheckpointStore, CheckpointedChat, FileCheckpointStore, InMemoryCheckpointStore, StatefulChat,
    ThreadId,
};
use parley::error::{CheckpointError, ModelError};
use parley::llm::ChatModel;
use parley::session::{
    CheckpointSession, ConversationStrategy, GenerationParams, InteractionLog, Message,
    ReplaySession, finish_session, run_session,
};

/// Replies from a script and records every conversation it receives.
/// `None` in the script makes that call fail.
struct ScriptedModel {
    replies: Mutex<VecDeque<Option<&'static str>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Option<&'static str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(&self, messages: &[Message]) -> Result<Message, ModelError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front().flatten() {
            Some(text) => Ok(Message::assistant(text)),
            None => Err(ModelError::Http {
                provider: "scripted",
                status: 503,
                message: "service unavailable".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "deepseek-r1:8b"
    }

    fn params(&self) -> GenerationParams {
        GenerationParams::default()
    }
}

/// Stateful endpoint that records the exact payload of each call.
#[derive(Default)]
struct RecordingEndpoint {
    payloads: Arc<Mutex<Vec<(ThreadId, Message)>>>,
    history: Vec<Message>,
}

#[async_trait]
impl StatefulChat for RecordingEndpoint {
    async fn invoke(
        &mut self,
        thread_id: &ThreadId,
        message: Message,
    ) -> Result<Message, ModelError> {
        self.payloads
            .lock()
            .unwrap()
            .push((thread_id.clone(), message.clone()));
        let reply = Message::assistant(format!("ack {}", message.content));
        self.history.push(message);
        self.history.push(reply.clone());
        Ok(reply)
    }

    fn history(&self, _thread_id: &ThreadId) -> Result<Vec<Message>, CheckpointError> {
        Ok(self.history.clone())
    }

    fn model_name(&self) -> &str {
        "recording"
    }

    fn params(&self) -> GenerationParams {
        GenerationParams::default()
    }
}

async fn drive(strategy: &mut dyn ConversationStrategy, script: &str) -> String {
    let mut input = script.as_bytes();
    let mut out = Vec::new();
    run_session(strategy, &mut input, &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn replay_sends_prior_turns_plus_new_message() {
    let model = ScriptedModel::new(vec![Some("r1"), Some("r2"), Some("r3")]);
    let mut session = ReplaySession::new(model.clone());

    drive(&mut session, "m1\nm2\nm3\nexit\n").await;

    let calls = model.calls();
    assert_eq!(calls.len(), 3);
    let mut expected = Vec::new();
    for (n, (user, reply)) in [("m1", "r1"), ("m2", "r2"), ("m3", "r3")].into_iter().enumerate() {
        expected.push(Message::user(user));
        assert_eq!(calls[n], expected, "call {} payload", n + 1);
        expected.push(Message::assistant(reply));
    }
    assert_eq!(session.history().unwrap(), expected);
}

#[tokio::test]
async fn checkpoint_sends_only_new_message_and_stable_thread() {
    let endpoint = RecordingEndpoint::default();
    let payloads = endpoint.payloads.clone();
    let thread = ThreadId::new("thread-42");
    let mut session = CheckpointSession::new(Box::new(endpoint), thread.clone()).unwrap();

    drive(&mut session, "first\nsecond\nthird\nquit\n").await;

    let payloads = payloads.lock().unwrap();
    assert_eq!(payloads.len(), 3);
    for ((id, message), text) in payloads.iter().zip(["first", "second", "third"]) {
        assert_eq!(id, &thread);
        assert_eq!(message, &Message::user(text));
    }
    assert_eq!(session.history().unwrap().len(), 6);
}

#[tokio::test]
async fn checkpoint_store_supplies_history_to_model() {
    let model = ScriptedModel::new(vec![Some("a1"), Some("a2")]);
    let chat = CheckpointedChat::new(model.clone(), Box::new(InMemoryCheckpointStore::new()));
    let mut session = CheckpointSession::new(Box::new(chat), ThreadId::generate()).unwrap();

    drive(&mut session, "u1\nu2\nsair\n").await;

    let calls = model.calls();
    assert_eq!(
        calls[1],
        vec![
            Message::user("u1"),
            Message::assistant("a1"),
            Message::user("u2"),
        ]
    );
    assert_eq!(
        session.history().unwrap(),
        vec![
            Message::user("u1"),
            Message::assistant("a1"),
            Message::user("u2"),
            Message::assistant("a2"),
        ]
    );
}

#[tokio::test]
async fn failed_turn_keeps_history_and_loop_continues() {
    let model = ScriptedModel::new(vec![Some("a1"), None, Some("a3")]);
    let mut session = ReplaySession::new(model.clone());

    let output = drive(&mut session, "u1\nu2\nu3\nq\n").await;

    assert!(output.contains("Error:"), "error should be shown: {output}");
    assert!(output.contains("service unavailable"));
    assert_eq!(model.calls().len(), 3, "turn 3 should still be submitted");
    assert_eq!(
        session.history().unwrap(),
        vec![
            Message::user("u1"),
            Message::assistant("a1"),
            Message::user("u2"),
            Message::user("u3"),
            Message::assistant("a3"),
        ]
    );
}

#[tokio::test]
async fn checkpoint_failed_turn_keeps_user_message_and_continues() {
    let model = ScriptedModel::new(vec![Some("a1"), None, Some("a3")]);
    let chat = CheckpointedChat::new(model.clone(), Box::new(InMemoryCheckpointStore::new()));
    let mut session = CheckpointSession::new(Box::new(chat), ThreadId::new("t")).unwrap();

    let output = drive(&mut session, "u1\nu2\nu3\nexit\n").await;

    assert!(output.contains("Error:"), "error should be shown: {output}");
    assert!(output.contains("service unavailable"));
    let calls = model.calls();
    assert_eq!(calls.len(), 3, "turn 3 should still be submitted");
    assert_eq!(
        calls[2],
        vec![
            Message::user("u1"),
            Message::assistant("a1"),
            Message::user("u2"),
            Message::user("u3"),
        ]
    );
    assert_eq!(
        session.history().unwrap(),
        vec![
            Message::user("u1"),
            Message::assistant("a1"),
            Message::user("u2"),
            Message::user("u3"),
            Message::assistant("a3"),
        ]
    );
}

fn prefilled_file_store(dir: &std::path::Path, thread: &ThreadId) -> FileCheckpointStore {
    let mut store = FileCheckpointStore::new(dir);
    store.append_turn(thread, Message::user("old question")).unwrap();
    store.append_turn(thread, Message::assistant("old answer")).unwrap();
    store
}

#[tokio::test]
async fn resumed_thread_without_new_turns_writes_no_block() {
    let tmp = tempfile::tempdir().unwrap();
    let log_path = tmp.path().join("interactions.json");
    let log = InteractionLog::new(&log_path);
    let thread = ThreadId::new("t1");
    let store = prefilled_file_store(&tmp.path().join("threads"), &thread);

    let chat = CheckpointedChat::new(ScriptedModel::new(vec![]), Box::new(store));
    let mut session = CheckpointSession::new(Box::new(chat), thread).unwrap();

    let mut input = "exit\n".as_bytes();
    let mut out = Vec::new();
    run_session(&mut session, &mut input, &mut out).await.unwrap();
    let block = finish_session(&session, &log, &mut out).unwrap();

    assert!(block.is_none());
    assert!(!log_path.exists());
}

#[tokio::test]
async fn resumed_thread_logs_only_this_runs_turns() {
    let tmp = tempfile::tempdir().unwrap();
    let log = InteractionLog::new(tmp.path().join("interactions.json"));
    let thread = ThreadId::new("t1");
    let store = prefilled_file_store(&tmp.path().join("threads"), &thread);

    let model = ScriptedModel::new(vec![Some("new answer")]);
    let chat = CheckpointedChat::new(model.clone(), Box::new(store));
    let mut session = CheckpointSession::new(Box::new(chat), thread).unwrap();

    let mut input = "new question\nsair\n".as_bytes();
    let mut out = Vec::new();
    run_session(&mut session, &mut input, &mut out).await.unwrap();
    finish_session(&session, &log, &mut out).unwrap();

    assert_eq!(model.calls()[0].len(), 3, "earlier turns still reach the model");
    let entries = log.load().unwrap();
    assert_eq!(
        entries[0]["messages"],
        serde_json::json!([
            {"type": "HumanMessage", "content": "new question"},
            {"type": "AIMessage", "content": "new answer"}
        ])
    );
}

#[tokio::test]
async fn unreadable_input_ends_session_and_keeps_turns() {
    let tmp = tempfile::tempdir().unwrap();
    let log = InteractionLog::new(tmp.path().join("interactions.json"));
    let model = ScriptedModel::new(vec![Some("a1"), Some("a2")]);
    let mut session = ReplaySession::new(model.clone());

    let mut input: &[u8] = b"u1\n\xff\xfe\nu2\n";
    let mut out = Vec::new();
    let summary = run_session(&mut session, &mut input, &mut out).await.unwrap();
    finish_session(&session, &log, &mut out).unwrap();

    assert_eq!(summary.turns, 1);
    assert_eq!(model.calls().len(), 1);
    assert!(String::from_utf8_lossy(&out).contains("Error:"));
    assert_eq!(log.load().unwrap()[0]["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn exit_token_stops_before_model_call() {
    let model = ScriptedModel::new(vec![]);
    let mut session = ReplaySession::new(model.clone());

    drive(&mut session, "SAIR\nnever sent\n").await;

    assert!(model.calls().is_empty());
    assert!(session.history().unwrap().is_empty());
}

#[tokio::test]
async fn end_of_input_ends_session() {
    let model = ScriptedModel::new(vec![Some("hi")]);
    let mut session = ReplaySession::new(model.clone());

    drive(&mut session, "hello").await;

    assert_eq!(model.calls().len(), 1);
    assert_eq!(session.history().unwrap().len(), 2);
}

#[tokio::test]
async fn blank_lines_are_skipped() {
    let model = ScriptedModel::new(vec![Some("ok")]);
    let mut session = ReplaySession::new(model.clone());

    drive(&mut session, "\n   \nreal\nexit\n").await;

    assert_eq!(model.calls(), vec![vec![Message::user("real")]]);
}

#[tokio::test]
async fn greeting_scenario_writes_one_block() {
    let tmp = tempfile::tempdir().unwrap();
    let log = InteractionLog::new(tmp.path().join("interactions.json"));
    let model = ScriptedModel::new(vec![Some("Olá! Como posso ajudar?")]);
    let mut session = ReplaySession::new(model);

    let mut input = "Olá\nsair\n".as_bytes();
    let mut out = Vec::new();
    run_session(&mut session, &mut input, &mut out).await.unwrap();
    finish_session(&session, &log, &mut out).unwrap();

    let entries = log.load().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["model"], "deepseek-r1:8b");
    assert_eq!(entries[0]["temperature"], serde_json::Value::Null);
    assert_eq!(
        entries[0]["messages"],
        serde_json::json!([
            {"type": "HumanMessage", "content": "Olá"},
            {"type": "AIMessage", "content": "Olá! Como posso ajudar?"}
        ])
    );

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Exiting..."));
    assert!(output.contains("Interactions saved to:"));
}

#[tokio::test]
async fn empty_session_leaves_no_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("interactions.json");
    let log = InteractionLog::new(&path);
    let mut session = ReplaySession::new(ScriptedModel::new(vec![]));

    let mut input = "exit\n".as_bytes();
    let mut out = Vec::new();
    run_session(&mut session, &mut input, &mut out).await.unwrap();
    let block = finish_session(&session, &log, &mut out).unwrap();

    assert!(block.is_none());
    assert!(!path.exists());
    assert!(!String::from_utf8(out).unwrap().contains("Interactions saved to:"));
}

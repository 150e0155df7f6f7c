use std::sync::Arc;

use crate::test_support::FakeVcs;
use crate::vcs::{AuthContext, Revision};

use super::*;

struct CountingDialog {
    shown: usize,
    outcome: DialogOutcome,
}

impl ActionDialog for CountingDialog {
    fn show_modal(&mut self, kind: &mut ActionKind, _targets: &[String]) -> DialogOutcome {
        self.shown += 1;
        if let ActionKind::Mkdir { name, .. } = kind {
            *name = "branches".to_string();
        }
        self.outcome
    }
}

fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn codes(events: &[ActionEvent], code: EventCode) -> usize {
    events.iter().filter(|event| event.code() == code).count()
}

#[test]
fn failing_target_reports_once_and_batch_continues() {
    let client = FakeVcs::new().fail_on("/wc/b");
    let tracer = MemoryTracer::new();
    let mut events = Vec::new();
    let summary = run_batch(
        7,
        &ActionKind::delete(),
        &targets(&["/wc/a", "/wc/b", "/wc/c"]),
        &client,
        None,
        &tracer,
        |event| events.push(event),
    );

    let attempted: Vec<String> = client.calls().into_iter().map(|call| call.target).collect();
    assert_eq!(attempted, targets(&["/wc/a", "/wc/b", "/wc/c"]));
    assert_eq!(codes(&events, EventCode::InternalError), 1);
    assert_eq!(codes(&events, EventCode::ActionEnd), 1);
    assert_eq!(events.last().map(ActionEvent::code), Some(EventCode::ActionEnd));
    assert!(matches!(
        &events[0].kind,
        EventKind::String { code: EventCode::InternalError, text } if text.starts_with("/wc/b: ")
    ));

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].target, "/wc/b");
    assert!(tracer.lines().iter().any(|line| line == "Delete failed:"));
    assert!(tracer.lines().iter().any(|line| line.contains("E160013")));
}

#[test]
fn terminal_event_is_posted_even_when_every_target_fails() {
    let client = FakeVcs::new().fail_on("/wc/a").fail_on("/wc/b");
    let mut events = Vec::new();
    let summary = run_batch(
        1,
        &ActionKind::unlock(),
        &targets(&["/wc/a", "/wc/b"]),
        &client,
        None,
        &LogTracer,
        |event| events.push(event),
    );
    assert_eq!(codes(&events, EventCode::InternalError), 2);
    assert_eq!(codes(&events, EventCode::ActionEnd), 1);
    assert_eq!(summary.succeeded, 0);
    assert!(!summary.is_success());
    match &events[2].kind {
        EventKind::Data {
            payload: Some(payload),
            ..
        } => assert_eq!(payload, &summary),
        other => panic!("expected summary payload, got {other:?}"),
    }
}

#[test]
fn cancelled_dialog_starts_no_worker() {
    let (bridge, queue) = event_channel();
    let client = Arc::new(FakeVcs::new());
    let action = FileAction::new(
        ActionKind::delete(),
        targets(&["/wc/a"]),
        bridge,
        client.clone(),
    );
    let mut dialog = CountingDialog {
        shown: 0,
        outcome: DialogOutcome::Cancelled,
    };
    assert!(action.perform_action(&mut dialog).unwrap().is_none());
    assert_eq!(dialog.shown, 1);
    assert!(client.calls().is_empty());
    assert!(queue.drain().is_empty());
}

#[test]
fn confirmed_action_runs_on_worker_and_posts_in_order() {
    let (bridge, queue) = event_channel();
    let client = Arc::new(FakeVcs::new());
    let action = FileAction::new(
        ActionKind::mkdir(),
        targets(&["/wc/a", "/wc/b"]),
        bridge,
        client.clone(),
    )
    .with_context(Some(AuthContext::new("alice", None)));
    let id = action.id();
    let mut dialog = CountingDialog {
        shown: 0,
        outcome: DialogOutcome::Confirmed,
    };
    let handle = action.perform_action(&mut dialog).unwrap().unwrap();
    assert_eq!(handle.id(), id);
    let summary = handle.join().unwrap();
    assert!(summary.is_success());
    assert_eq!(summary.succeeded, 2);

    let events = queue.drain();
    assert!(events.iter().all(|event| event.action == id));
    assert_eq!(events.last().map(ActionEvent::code), Some(EventCode::ActionEnd));
    let traces: Vec<&str> = events
        .iter()
        .filter_map(|event| match &event.kind {
            EventKind::String {
                code: EventCode::Trace,
                text,
            } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(traces[0], "Mkdir: /wc/a");
    assert!(traces.iter().position(|t| t.contains("/wc/a")) < traces.iter().position(|t| t.contains("/wc/b")));

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].target.ends_with("branches"));
    assert_eq!(calls[0].username.as_deref(), Some("alice"));
}

#[test]
fn shared_tracer_receives_lines_instead_of_events() {
    let (bridge, queue) = event_channel();
    let tracer = MemoryTracer::new();
    let action = FileAction::new(
        ActionKind::update(),
        targets(&["/wc/a"]),
        bridge,
        Arc::new(FakeVcs::new()),
    )
    .with_tracer(TracerSlot::Shared(Arc::new(tracer.clone())));
    let handle = action
        .perform_action(&mut DialogOutcome::Confirmed)
        .unwrap()
        .unwrap();
    handle.join().unwrap();
    assert_eq!(tracer.lines(), vec!["Update: /wc/a", "update /wc/a"]);
    let events = queue.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code(), EventCode::ActionEnd);
}

#[test]
fn invalid_options_are_rejected_before_spawning() {
    let (bridge, queue) = event_channel();
    let client = Arc::new(FakeVcs::new());
    let commit = FileAction::new(
        ActionKind::commit(),
        targets(&["/wc/a"]),
        bridge.clone(),
        client.clone(),
    );
    assert!(matches!(
        commit.perform_action(&mut DialogOutcome::Confirmed),
        Err(ActionError::InvalidOptions(_))
    ));

    let empty = FileAction::new(ActionKind::delete(), Vec::new(), bridge, client.clone());
    assert!(matches!(
        empty.perform_action(&mut DialogOutcome::Confirmed),
        Err(ActionError::InvalidOptions(_))
    ));
    assert!(client.calls().is_empty());
    assert!(queue.drain().is_empty());
}

#[test]
fn merge_login_overrides_bookmark_context() {
    let client = FakeVcs::new();
    let mut kind = ActionKind::merge("svn://host/repo/trunk");
    if let ActionKind::Merge {
        username, path2_rev, ..
    } = &mut kind
    {
        *username = "merger".to_string();
        *path2_rev = Revision::Number(12);
    }
    let bookmark = AuthContext::new("alice", None);
    kind.execute_one(&client, "/wc/a", Some(&bookmark)).unwrap();
    ActionKind::unlock()
        .execute_one(&client, "/wc/a", Some(&bookmark))
        .unwrap();
    let users: Vec<Option<String>> = client.calls().into_iter().map(|call| call.username).collect();
    assert_eq!(users, vec![Some("merger".into()), Some("alice".into())]);
}

#[test]
fn tree_refresh_only_for_structural_actions() {
    assert!(ActionKind::delete().affects_tree());
    assert!(ActionKind::mkdir().affects_tree());
    assert!(ActionKind::update().affects_tree());
    assert!(ActionKind::merge("x").affects_tree());
    assert!(!ActionKind::commit().affects_tree());
    assert!(!ActionKind::export().affects_tree());
    assert!(!ActionKind::unlock().affects_tree());
}

#[test]
fn summary_describes_outcome() {
    let summary = ActionSummary {
        action: 3,
        label: "Export".into(),
        total: 2,
        succeeded: 1,
        failures: vec![TargetFailure {
            target: "a".into(),
            message: "boom".into(),
        }],
    };
    assert_eq!(summary.describe(), "Export finished with errors: 1 of 2 failed");
}

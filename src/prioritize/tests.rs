use super::*;
use crate::test_support::{at, task_due, FakeTaskSource};
use tasknudge_core::{
    clock::{Clock, ManualClock},
    task::{Project, TaskUpdate, TimeMarker},
};

struct Harness {
    source: Arc<FakeTaskSource>,
    clock: Arc<ManualClock>,
    prioritizer: Prioritizer,
}

fn harness(tasks: Vec<tasknudge_core::task::Task>) -> Harness {
    let source = Arc::new(FakeTaskSource::with_tasks(tasks));
    let clock = Arc::new(ManualClock::new(at(2026, 3, 10, 20)));
    let service = Arc::new(TaskService::new(
        source.clone(),
        clock.clone(),
        std::time::Duration::from_secs(3600),
    ));
    Harness {
        source,
        clock,
        prioritizer: Prioritizer::new(service, Duration::hours(24)),
    }
}

fn unprioritized(id: &str) -> tasknudge_core::task::Task {
    task_due(id, "2026-03-11", Priority::P4, &[])
}

fn priority(task_id: &str, priority: Priority) -> CallbackEvent {
    CallbackEvent::PriorityChosen {
        task_id: task_id.into(),
        priority,
    }
}

fn time(task_id: &str, label: Option<TimeMarker>) -> CallbackEvent {
    CallbackEvent::TimeLabelChosen {
        task_id: task_id.into(),
        label,
    }
}

fn move_project(task_id: &str, yes: bool) -> CallbackEvent {
    CallbackEvent::ProjectMoveDecided {
        task_id: task_id.into(),
        move_project: yes,
    }
}

fn edit_text(reply: &Reply) -> &str {
    match reply {
        Reply::Edit { text, .. } => text,
        Reply::Alert(text) => panic!("expected edit, got alert {text:?}"),
    }
}

fn callback_data(reply: &Reply) -> Vec<String> {
    match reply {
        Reply::Edit {
            keyboard: Some(kb), ..
        } => kb.buttons().map(|b| b.callback_data.clone()).collect(),
        other => panic!("expected keyboard, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_dialogs_saves_state_per_task() {
    let h = harness(vec![
        unprioritized("a"),
        unprioritized("b"),
        task_due("c", "2026-03-11", Priority::P2, &[]),
        task_due("d", "2026-03-11", Priority::P4, &["12pm"]),
    ]);

    let prompts = h.prioritizer.start_dialogs().await.unwrap();
    assert_eq!(prompts.len(), 2);
    assert_eq!(h.prioritizer.states().len(), 2);

    let first = &prompts[0];
    assert_eq!(first.text, format!("📋 Task: Task {}\n\nSelect priority:", first.task_id));
    let data: Vec<_> = first.keyboard.buttons().map(|b| b.callback_data.as_str()).collect();
    let id = &first.task_id;
    assert_eq!(
        data,
        [
            format!("prio|priority|{id}|4"),
            format!("prio|priority|{id}|3"),
            format!("prio|priority|{id}|2"),
            format!("prio|priority|{id}|1"),
        ]
    );

    let state = h.prioritizer.states().get(id, h.clock.now()).unwrap();
    assert_eq!(state.stage, Stage::AwaitingPriority);
    assert_eq!(state.priority, Priority::P4);
}

#[tokio::test]
async fn test_full_dialog_p1_noon_no_move() {
    let h = harness(vec![unprioritized("T")]);
    h.prioritizer.start_dialogs().await.unwrap();

    let reply = h.prioritizer.handle(priority("T", Priority::P1)).await;
    assert_eq!(edit_text(&reply), "📋 Task: Task T\nPriority: 🔴\n\nSelect time:");
    assert_eq!(callback_data(&reply), ["prio|time|T|12pm", "prio|time|T|none"]);

    let reply = h.prioritizer.handle(time("T", Some(TimeMarker::Noon))).await;
    assert_eq!(
        edit_text(&reply),
        "📋 Task: Task T\nPriority: 🔴\nTime: 12pm\n\nMove to project?"
    );
    assert_eq!(callback_data(&reply), ["prio|project|T|yes", "prio|project|T|no"]);

    let reply = h.prioritizer.handle(move_project("T", false)).await;
    assert_eq!(
        reply,
        Reply::Edit {
            text: "✅ Task updated successfully!\n\n📋 Task: Task T\nPriority: 🔴\nTime: 12pm"
                .into(),
            keyboard: None,
        }
    );

    assert_eq!(
        h.source.updates(),
        vec![(
            "T".to_string(),
            TaskUpdate {
                priority: Priority::P1,
                labels: vec!["12pm".into()],
            }
        )]
    );
    assert!(h.prioritizer.states().get("T", h.clock.now()).is_none());
}

#[tokio::test]
async fn test_p2_skips_time_step() {
    let h = harness(vec![unprioritized("a")]);
    h.prioritizer.start_dialogs().await.unwrap();

    let reply = h.prioritizer.handle(priority("a", Priority::P2)).await;
    assert_eq!(edit_text(&reply), "📋 Task: Task a\nPriority: 🟠\n\nMove to project?");
    assert_eq!(
        h.prioritizer.states().get("a", h.clock.now()).unwrap().stage,
        Stage::AwaitingProjectMoveDecision
    );

    h.prioritizer.handle(move_project("a", false)).await;
    assert_eq!(h.source.updates()[0].1.labels, Vec::<String>::new());
    assert_eq!(h.source.updates()[0].1.priority, Priority::P2);
}

#[tokio::test]
async fn test_p4_time_choices_and_none() {
    let h = harness(vec![unprioritized("a")]);
    h.prioritizer.start_dialogs().await.unwrap();

    let reply = h.prioritizer.handle(priority("a", Priority::P4)).await;
    assert_eq!(callback_data(&reply), ["prio|time|a|9pm", "prio|time|a|none"]);

    let reply = h.prioritizer.handle(time("a", None)).await;
    assert_eq!(
        edit_text(&reply),
        "📋 Task: Task a\nPriority: ⚪\nTime: None\n\nMove to project?"
    );

    let reply = h.prioritizer.handle(move_project("a", false)).await;
    assert_eq!(
        edit_text(&reply),
        "✅ Task updated successfully!\n\n📋 Task: Task a\nPriority: ⚪"
    );
    assert!(h.source.updates()[0].1.labels.is_empty());
}

#[tokio::test]
async fn test_later_none_press_keeps_chosen_time_label() {
    let h = harness(vec![unprioritized("a")]);
    h.prioritizer.start_dialogs().await.unwrap();

    h.prioritizer.handle(priority("a", Priority::P4)).await;
    h.prioritizer.handle(time("a", Some(TimeMarker::Night))).await;
    let reply = h.prioritizer.handle(time("a", None)).await;
    assert_eq!(
        edit_text(&reply),
        "📋 Task: Task a\nPriority: ⚪\nTime: 9pm\n\nMove to project?"
    );

    h.prioritizer.handle(move_project("a", false)).await;
    assert_eq!(h.source.updates()[0].1.labels, ["9pm"]);
}

#[tokio::test]
async fn test_move_to_project_lists_projects_two_per_row() {
    let h = harness(vec![unprioritized("a")]);
    h.source.set_projects(vec![
        Project {
            id: "p1".into(),
            name: "Inbox".into(),
            is_inbox_project: true,
        },
        Project {
            id: "p2".into(),
            name: "Home".into(),
            is_inbox_project: false,
        },
        Project {
            id: "p3".into(),
            name: "Work".into(),
            is_inbox_project: false,
        },
    ]);
    h.prioritizer.start_dialogs().await.unwrap();
    h.prioritizer.handle(priority("a", Priority::P3)).await;

    let reply = h.prioritizer.handle(move_project("a", true)).await;
    assert_eq!(edit_text(&reply), "📋 Task: Task a\nPriority: 🔵\n\nSelect project:");
    let Reply::Edit {
        keyboard: Some(kb), ..
    } = &reply
    else {
        panic!("expected keyboard");
    };
    let rows: Vec<usize> = kb.rows.iter().map(Vec::len).collect();
    assert_eq!(rows, [2, 1, 1]);
    assert_eq!(kb.rows[0][1].text, "Home");
    assert_eq!(kb.rows[0][1].callback_data, "prio|project_select|a|p2");
    assert_eq!(kb.rows[2][0].text, "⏭️ Keep Current");
    assert_eq!(kb.rows[2][0].callback_data, "prio|project_select|a|current");
    assert_eq!(
        h.prioritizer.states().get("a", h.clock.now()).unwrap().stage,
        Stage::AwaitingProjectChoice
    );

    let reply = h
        .prioritizer
        .handle(CallbackEvent::ProjectSelected {
            task_id: "a".into(),
            project: ProjectChoice::Project("p3".into()),
        })
        .await;
    assert!(edit_text(&reply).starts_with("✅ Task updated successfully!"));
    assert_eq!(h.source.updates().len(), 1);
    assert!(h.prioritizer.states().is_empty());
}

#[tokio::test]
async fn test_project_list_failure_keeps_state() {
    let h = harness(vec![unprioritized("a")]);
    h.source.fail_projects(true);
    h.prioritizer.start_dialogs().await.unwrap();
    h.prioritizer.handle(priority("a", Priority::P2)).await;

    let reply = h.prioritizer.handle(move_project("a", true)).await;
    assert_eq!(reply, Reply::Alert("Failed to load projects. Please try again.".into()));
    assert!(h.prioritizer.states().get("a", h.clock.now()).is_some());
}

#[tokio::test]
async fn test_update_failure_keeps_state_for_retry() {
    let h = harness(vec![unprioritized("a")]);
    h.prioritizer.start_dialogs().await.unwrap();
    h.prioritizer.handle(priority("a", Priority::P2)).await;

    h.source.fail_updates(true);
    let reply = h.prioritizer.handle(move_project("a", false)).await;
    assert_eq!(reply, Reply::Alert("Failed to update task. Please try again.".into()));
    assert!(h.prioritizer.states().get("a", h.clock.now()).is_some());

    h.source.fail_updates(false);
    let reply = h.prioritizer.handle(move_project("a", false)).await;
    assert!(edit_text(&reply).starts_with("✅ Task updated successfully!"));
    assert!(h.prioritizer.states().get("a", h.clock.now()).is_none());
}

#[tokio::test]
async fn test_unknown_task_reports_expired_without_creating_state() {
    let h = harness(vec![]);
    let expired = Reply::Alert("Task state expired. Please start again.".into());

    assert_eq!(h.prioritizer.handle(priority("ghost", Priority::P1)).await, expired);
    assert_eq!(h.prioritizer.handle(time("ghost", None)).await, expired);
    assert_eq!(h.prioritizer.handle(move_project("ghost", true)).await, expired);
    assert_eq!(h.prioritizer.handle(move_project("ghost", false)).await, expired);
    assert_eq!(
        h.prioritizer
            .handle(CallbackEvent::ProjectSelected {
                task_id: "ghost".into(),
                project: ProjectChoice::KeepCurrent,
            })
            .await,
        expired
    );
    assert!(h.prioritizer.states().is_empty());
    assert!(h.source.updates().is_empty());
}

#[tokio::test]
async fn test_state_expires_after_a_day() {
    let h = harness(vec![unprioritized("a")]);
    h.prioritizer.start_dialogs().await.unwrap();

    h.clock.advance(Duration::hours(25));
    let reply = h.prioritizer.handle(priority("a", Priority::P1)).await;
    assert_eq!(reply, Reply::Alert("Task state expired. Please start again.".into()));
    // Swept at the start of the callback.
    assert!(h.prioritizer.states().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dialogs_do_not_interfere() {
    let h = Arc::new(harness(vec![unprioritized("a"), unprioritized("b")]));
    h.prioritizer.start_dialogs().await.unwrap();

    let run = |task_id: &'static str, chosen: Priority, label: Option<TimeMarker>| {
        let h = h.clone();
        tokio::spawn(async move {
            h.prioritizer.handle(priority(task_id, chosen)).await;
            if label.is_some() {
                h.prioritizer.handle(time(task_id, label)).await;
            }
            h.prioritizer.handle(move_project(task_id, false)).await
        })
    };

    let (ra, rb) = tokio::join!(
        run("a", Priority::P1, Some(TimeMarker::Noon)),
        run("b", Priority::P3, None)
    );
    assert!(edit_text(&ra.unwrap()).contains("Time: 12pm"));
    assert!(!edit_text(&rb.unwrap()).contains("Time:"));

    let mut updates = h.source.updates();
    updates.sort_by(|x, y| x.0.cmp(&y.0));
    assert_eq!(
        updates,
        vec![
            (
                "a".to_string(),
                TaskUpdate {
                    priority: Priority::P1,
                    labels: vec!["12pm".into()],
                }
            ),
            (
                "b".to_string(),
                TaskUpdate {
                    priority: Priority::P3,
                    labels: vec![],
                }
            ),
        ]
    );
    assert!(h.prioritizer.states().is_empty());
}

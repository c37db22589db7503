mod common;

use common::{harness, harness_with_policy, harness_with_source, pdf, MIB};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uptrack_core::api::{
    FileDescriptor, ProbeOutcome, SeededRandom, TaskEvent, TaskId, TaskStatus, TimerDriver,
    UploadPolicy, UploadTracker, ValidationError, MAX_RETRIES, MAX_UPLOAD_BYTES,
};

#[tokio::test]
async fn scenario_a_three_neutral_ticks_fail_the_task() {
    let h = harness(vec![0.5]);
    let id = h.submit_pdf("report.pdf").await;

    let task = h.tracker.get_task(id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Processing);
    assert_eq!(task.retries, 0);
    let handle = task.timer().expect("processing task owns a timer");

    for expected_retries in 1..MAX_RETRIES {
        assert!(h.tick(id).await);
        let task = h.tracker.get_task(id).await.unwrap();
        assert_eq!(task.status, TaskStatus::Processing);
        assert_eq!(task.retries, expected_retries);
    }

    assert!(h.tick(id).await);
    let task = h.tracker.get_task(id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.retries, MAX_RETRIES);
    assert!(!task.has_timer());
    assert!(!h.driver.is_active(handle));
    assert_eq!(h.driver.active_timers(), 0);
}

#[tokio::test]
async fn scenario_b_success_roll_on_first_tick() {
    let h = harness(vec![0.2]);
    let id = h.submit_pdf("report.pdf").await;

    assert!(h.tick(id).await);
    let task = h.tracker.get_task(id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Success);
    assert_eq!(task.retries, 0);
    assert!(!task.has_timer());
    assert_eq!(h.driver.active_timers(), 0);
}

#[tokio::test]
async fn scenario_c_oversized_pdf_is_rejected() {
    let h = harness(vec![0.5]);
    let err = h
        .tracker
        .submit_file(pdf("huge.pdf", 3 * MIB))
        .await
        .unwrap_err();

    assert!(matches!(err, ValidationError::TooLarge { .. }));
    assert_eq!(err.to_string(), "Only PDFs and images under 2MB are allowed.");
    assert!(h.tracker.list_tasks().await.is_empty());
    assert_eq!(h.driver.active_timers(), 0);
}

#[tokio::test]
async fn scenario_d_cancel_before_first_tick() {
    let h = harness(vec![0.2]);
    let id = h.submit_pdf("report.pdf").await;
    let handle = h.tracker.get_task(id).await.unwrap().timer().unwrap();

    assert!(h.tracker.cancel_task(id).await);
    let task = h.tracker.get_task(id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert_eq!(task.retries, 0);
    assert!(!task.has_timer());

    assert!(!h.driver.fire(handle).await);
    for _ in 0..5 {
        h.tracker.on_tick(id).await;
    }
    let after = h.tracker.get_task(id).await.unwrap();
    assert_eq!(after.status, TaskStatus::Cancelled);
    assert_eq!(after.retries, 0);
    assert_eq!(h.rng.draws(), 0, "stale ticks must not draw samples");
}

#[tokio::test]
async fn rejected_files_leave_registry_unchanged() {
    let h = harness(vec![0.5]);
    h.submit_pdf("keep.pdf").await;

    let rejected = [
        FileDescriptor::new("notes.txt", "text/plain", 10),
        FileDescriptor::new("photo.png", "image/png", 10),
        pdf("edge.pdf", MAX_UPLOAD_BYTES),
        pdf("big.pdf", MAX_UPLOAD_BYTES + 1),
    ];
    for file in rejected {
        assert!(h.tracker.submit_file(file).await.is_err());
        assert_eq!(h.tracker.list_tasks().await.len(), 1);
    }
    assert_eq!(h.driver.active_timers(), 1);
}

#[tokio::test]
async fn images_accepted_when_policy_allows() {
    let h = harness_with_policy(vec![0.5], UploadPolicy::default().with_images(true));
    let id = h
        .tracker
        .submit_file(FileDescriptor::new("photo.png", "image/png", MIB))
        .await
        .unwrap();
    let task = h.tracker.get_task(id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Processing);
    assert_eq!(task.mime_type, "image/png");
}

#[tokio::test]
async fn accepted_file_creates_exactly_one_processing_task() {
    let h = harness(vec![0.5]);
    let id = h.submit_pdf("a.pdf").await;

    let tasks = h.tracker.list_tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);
    assert_eq!(tasks[0].name, "a.pdf");
    assert_eq!(tasks[0].status, TaskStatus::Processing);
    assert_eq!(tasks[0].retries, 0);
    assert!(tasks[0].has_timer());
    assert_eq!(h.driver.active_timers(), 1);
}

#[tokio::test]
async fn fail_roll_consumes_a_retry_like_neither() {
    let h = harness(vec![0.05, 0.0, 0.5]);
    let id = h.submit_pdf("a.pdf").await;
    let mut events = h.tracker.subscribe();

    h.tick(id).await;
    let task = h.tracker.get_task(id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Processing);
    assert_eq!(task.retries, 1);

    match events.recv().await.unwrap() {
        TaskEvent::Retried {
            retries, outcome, ..
        } => {
            assert_eq!(retries, 1);
            assert_eq!(outcome, ProbeOutcome::FailRoll);
        }
        other => panic!("expected Retried, got {other:?}"),
    }

    h.tick(id).await;
    match events.recv().await.unwrap() {
        TaskEvent::Retried { outcome, .. } => assert_eq!(outcome, ProbeOutcome::Neither),
        other => panic!("expected Retried, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelling_non_processing_tasks_is_a_noop() {
    let h = harness(vec![0.2]);
    let done = h.submit_pdf("done.pdf").await;
    h.tick(done).await;

    let cancelled = h.submit_pdf("cancelled.pdf").await;
    h.tracker.cancel_task(cancelled).await;

    let failed = {
        let h2 = harness(vec![0.5]);
        let id = h2.submit_pdf("failed.pdf").await;
        for _ in 0..MAX_RETRIES {
            h2.tick(id).await;
        }
        assert!(!h2.tracker.cancel_task(id).await);
        h2.tracker.get_task(id).await.unwrap().status
    };
    assert_eq!(failed, TaskStatus::Failed);

    assert!(!h.tracker.cancel_task(done).await);
    assert!(!h.tracker.cancel_task(cancelled).await);
    assert!(!h.tracker.cancel_task(TaskId::new()).await);

    assert_eq!(
        h.tracker.get_task(done).await.unwrap().status,
        TaskStatus::Success
    );
    assert_eq!(
        h.tracker.get_task(cancelled).await.unwrap().status,
        TaskStatus::Cancelled
    );
}

#[tokio::test]
async fn ticks_after_success_are_ignored() {
    let h = harness(vec![0.2]);
    let id = h.submit_pdf("a.pdf").await;
    h.tick(id).await;
    let draws = h.rng.draws();

    for _ in 0..3 {
        h.tracker.on_tick(id).await;
    }
    assert_eq!(h.rng.draws(), draws);
    assert_eq!(
        h.tracker.get_task(id).await.unwrap().status,
        TaskStatus::Success
    );
}

#[tokio::test]
async fn tasks_progress_independently_and_keep_order() {
    let h = harness(vec![0.5]);
    let a = h.submit_pdf("a.pdf").await;
    let b = h.submit_pdf("b.pdf").await;
    let c = h.submit_pdf("c.pdf").await;

    h.tick(b).await;
    h.tick(b).await;
    h.tracker.cancel_task(c).await;

    let tasks = h.tracker.list_tasks().await;
    let summary: Vec<_> = tasks
        .iter()
        .map(|t| (t.id, t.status, t.retries))
        .collect();
    assert_eq!(
        summary,
        vec![
            (a, TaskStatus::Processing, 0),
            (b, TaskStatus::Processing, 2),
            (c, TaskStatus::Cancelled, 0),
        ]
    );
    assert_eq!(h.driver.active_timers(), 2);
}

#[tokio::test]
async fn retries_stay_within_bounds_for_random_runs() {
    for seed in 0..20u64 {
        let (tracker, driver) = harness_with_source(Arc::new(SeededRandom::new(seed)));
        let ids = submit_many(&tracker, 4).await;

        let mut rounds = 0u32;
        while !tracker.is_idle().await {
            driver.fire_all().await;
            rounds += 1;
            for task in tracker.list_tasks().await {
                assert!(task.retries <= MAX_RETRIES, "seed {seed}: {task:?}");
                assert_eq!(
                    task.has_timer(),
                    task.status == TaskStatus::Processing,
                    "seed {seed}: timer iff processing"
                );
            }
            assert!(rounds <= MAX_RETRIES, "seed {seed}: exceeded retry bound");
        }

        assert_eq!(driver.active_timers(), 0);
        for id in ids {
            let task = tracker.get_task(id).await.unwrap();
            assert!(task.status.is_terminal());
        }
    }
}

async fn submit_many(tracker: &UploadTracker, n: usize) -> Vec<TaskId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let id = tracker
            .submit_file(pdf(&format!("f{i}.pdf"), MIB))
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

#[tokio::test]
async fn events_describe_the_lifecycle() {
    let h = harness(vec![0.2]);
    let mut events = h.tracker.subscribe();
    let id = h.submit_pdf("a.pdf").await;
    h.tick(id).await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    assert!(matches!(seen[0], TaskEvent::Submitted { task_id, .. } if task_id == id));
    assert!(matches!(
        seen[1],
        TaskEvent::StatusChanged {
            from: TaskStatus::Pending,
            to: TaskStatus::Processing,
            ..
        }
    ));
    assert!(matches!(
        seen[2],
        TaskEvent::StatusChanged {
            from: TaskStatus::Processing,
            to: TaskStatus::Success,
            retries: 0,
            ..
        }
    ));
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn rejection_is_published_without_task() {
    let h = harness(vec![0.5]);
    let mut events = h.tracker.subscribe();
    let _ = h
        .tracker
        .submit_file(FileDescriptor::new("a.zip", "application/zip", 1))
        .await;

    match events.try_recv().unwrap() {
        TaskEvent::Rejected { name, reason, .. } => {
            assert_eq!(name, "a.zip");
            assert!(reason.contains("application/zip"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn on_task_changed_forwards_task_events() {
    let h = harness(vec![0.2]);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let forwarder = h.tracker.on_task_changed(move |event| {
        let _ = tx.send(event.clone());
    });

    let _ = h
        .tracker
        .submit_file(FileDescriptor::new("bad.txt", "text/plain", 1))
        .await;
    let id = h.submit_pdf("a.pdf").await;
    h.tick(id).await;

    let mut statuses = Vec::new();
    while statuses.len() < 2 {
        let event = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("event forwarded in time")
            .expect("channel open");
        assert_eq!(event.task_id(), Some(id), "rejections are not task changes");
        if let TaskEvent::StatusChanged { to, .. } = event {
            statuses.push(to);
        }
    }
    assert_eq!(statuses, vec![TaskStatus::Processing, TaskStatus::Success]);
    forwarder.abort();
}

#[tokio::test]
async fn clear_finished_and_cancel_all() {
    let h = harness(vec![0.2, 0.2, 0.5]);
    let done = h.submit_pdf("done.pdf").await;
    h.tick(done).await;
    let a = h.submit_pdf("a.pdf").await;
    let b = h.submit_pdf("b.pdf").await;

    let stats = h.tracker.stats().await;
    assert_eq!((stats.success, stats.processing), (1, 2));

    assert_eq!(h.tracker.cancel_all().await, 2);
    assert!(h.tracker.is_idle().await);
    assert_eq!(h.driver.active_timers(), 0);

    assert_eq!(h.tracker.clear_finished().await, 3);
    assert!(h.tracker.list_tasks().await.is_empty());
    assert!(h.tracker.get_task(a).await.is_none());
    assert!(!h.tracker.cancel_task(b).await);
}

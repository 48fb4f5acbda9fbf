//! End-to-end test: both trigger jobs wired through the registry,
//! resolver and scheduler, running against the in-memory collaborators.

use chrono::{Duration as ChronoDuration, Utc};
use mediva_trigger_server::audit::MemoryAuditLog;
use mediva_trigger_server::background_jobs::jobs::{CheckoutRecoveryJob, TicketAutoCloseJob};
use mediva_trigger_server::background_jobs::{
    create_scheduler, JobContext, JobRegistry, ServiceResolver,
};
use mediva_trigger_server::checkout::{
    CheckoutSession, CheckoutStore, ContactInfo, MemoryCheckoutStore,
};
use mediva_trigger_server::config::{CheckoutRecoverySettings, TicketAutoCloseSettings};
use mediva_trigger_server::messaging::LoggingRecoveryMessenger;
use mediva_trigger_server::tickets::{MemoryTicketStore, SupportTicket, TicketStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn abandoned_session(key: &str, minutes_ago: i64) -> CheckoutSession {
    let at = Utc::now() - ChronoDuration::minutes(minutes_ago);
    CheckoutSession {
        session_key: key.to_string(),
        contact: ContactInfo::email(format!("{}@example.com", key)),
        started_at: at,
        completed_at: None,
        last_event_at: at,
    }
}

fn resolved_ticket(id: &str, days_ago: i64) -> SupportTicket {
    SupportTicket {
        id: id.to_string(),
        status: TicketStatus::Resolved,
        resolved_at: Some(Utc::now() - ChronoDuration::days(days_ago)),
        last_patient_response_at: None,
    }
}

#[tokio::test]
async fn test_startup_runs_drive_both_engines() {
    let checkout_store = Arc::new(MemoryCheckoutStore::new());
    let ticket_store = Arc::new(MemoryTicketStore::new());
    let audit_log = Arc::new(MemoryAuditLog::new());

    // One actionable entity per engine, plus one that must stay put.
    checkout_store.insert_session(abandoned_session("abandoned", 90));
    checkout_store.insert_session(abandoned_session("too_recent", 30));
    ticket_store.insert_ticket(resolved_ticket("stale", 4));
    ticket_store.insert_ticket(resolved_ticket("fresh", 1));

    let services = Arc::new(ServiceResolver::new(
        checkout_store.clone(),
        ticket_store.clone(),
        Arc::new(LoggingRecoveryMessenger),
        audit_log.clone(),
    ));

    let recovery_settings = CheckoutRecoverySettings {
        run_on_startup: true,
        startup_delay_secs: 0,
        ..Default::default()
    };
    let autoclose_settings = TicketAutoCloseSettings {
        run_on_startup: true,
        startup_delay_secs: 0,
        ..Default::default()
    };

    let mut registry = JobRegistry::new();
    registry
        .register(Arc::new(
            CheckoutRecoveryJob::from_settings(&recovery_settings).unwrap(),
        ))
        .unwrap();
    registry
        .register(Arc::new(
            TicketAutoCloseJob::from_settings(&autoclose_settings).unwrap(),
        ))
        .unwrap();

    let shutdown_token = CancellationToken::new();
    let job_context = JobContext::new(shutdown_token.child_token(), services);
    let (mut scheduler, handle) = create_scheduler(
        Arc::new(registry),
        Duration::from_millis(25),
        shutdown_token.clone(),
        job_context,
    );

    let scheduler_task = tokio::spawn(async move { scheduler.run().await });
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Recovery engine: exactly one trigger, for the abandoned session.
    assert_eq!(checkout_store.trigger_count(), 1);
    assert!(checkout_store
        .recovery_trigger("abandoned")
        .await
        .unwrap()
        .is_some());
    assert!(checkout_store
        .recovery_trigger("too_recent")
        .await
        .unwrap()
        .is_none());

    // Auto-close engine: the stale ticket closed with an audit entry,
    // the fresh one untouched.
    assert_eq!(
        ticket_store.ticket("stale").unwrap().status,
        TicketStatus::Closed
    );
    assert_eq!(
        ticket_store.ticket("fresh").unwrap().status,
        TicketStatus::Resolved
    );
    assert_eq!(audit_log.len(), 1);
    assert_eq!(audit_log.entries()[0].subject, "stale");

    // Both jobs report a successful last run through the handle.
    let jobs = handle.list_jobs().await;
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "checkout_recovery");
    assert_eq!(jobs[1].id, "ticket_autoclose");
    for job in jobs {
        assert!(!job.is_running);
        assert!(job.last_result.unwrap().is_success(), "job {}", job.id);
    }

    shutdown_token.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(2), scheduler_task).await;
}

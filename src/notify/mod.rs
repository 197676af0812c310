//! Best-effort employee notifications sent after an adjudication commits.
//!
//! Jobs go through a bounded channel to one background worker. Delivery
//! failures are logged and dropped; nothing is retried.

pub mod template;
pub mod transport;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::leave_type::LeaveType;
use crate::store::LeaveStore;
use template::{EmailTemplates, NoticeContext, message_for};
use transport::{EmailSender, MessageSender};

const UNKNOWN_REVIEWER: &str = "your reviewer";

/// Snapshot of a committed adjudication.
#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub id: Uuid,
    pub request: LeaveRequest,
    pub employee: Employee,
    pub leave_type: LeaveType,
    pub approved_for: f64,
}

impl NotificationJob {
    pub fn new(request: LeaveRequest, employee: Employee, leave_type: LeaveType, approved_for: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            employee,
            leave_type,
            approved_for,
        }
    }
}

/// Sending half of the notification channel. Never waits.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<NotificationJob>,
}

impl NotificationQueue {
    pub fn enqueue(&self, job: NotificationJob) {
        let job_id = job.id;
        let leave_id = job.request.id;
        match self.tx.try_send(job) {
            Ok(()) => debug!(%job_id, leave_id, "Notification queued"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                error!(%job_id, leave_id, "Notification queue full, notification dropped")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(%job_id, leave_id, "Notification queue closed, notification dropped")
            }
        }
    }
}

pub struct Dispatcher {
    store: Arc<dyn LeaveStore>,
    email: Arc<dyn EmailSender>,
    message: Arc<dyn MessageSender>,
    templates: EmailTemplates,
    dashboard_url: String,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        email: Arc<dyn EmailSender>,
        message: Arc<dyn MessageSender>,
        dashboard_url: impl Into<String>,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            store,
            email,
            message,
            templates: EmailTemplates::new()?,
            dashboard_url: dashboard_url.into(),
        })
    }

    /// Starts the worker on the current runtime.
    pub fn spawn(self, capacity: usize) -> (NotificationQueue, DispatcherHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(self.run(rx, shutdown_rx));

        (
            NotificationQueue { tx },
            DispatcherHandle { shutdown: shutdown_tx, join },
        )
    }

    async fn run(self, mut rx: mpsc::Receiver<NotificationJob>, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                job = rx.recv() => match job {
                    Some(job) => self.dispatch(job).await,
                    None => break,
                },
                _ = &mut shutdown => {
                    rx.close();
                    let mut drained = 0usize;
                    while let Some(job) = rx.recv().await {
                        self.dispatch(job).await;
                        drained += 1;
                    }
                    info!(drained, "Notification worker drained");
                    break;
                }
            }
        }
    }

    /// Sends one job's email and, when possible, its phone message.
    pub async fn dispatch(&self, job: NotificationJob) {
        let NotificationJob { id, request, employee, leave_type, approved_for } = job;

        let reviewer_id = match request.status {
            LeaveStatus::Approved | LeaveStatus::PartiallyApproved => request.approved_by(),
            LeaveStatus::Rejected => request.rejected_by(),
            LeaveStatus::Pending => {
                debug!(job_id = %id, leave_id = request.id, "Pending request, nothing to notify");
                return;
            }
        };

        let reviewer_name = match reviewer_id {
            Some(reviewer_id) => match self.store.employee_name(reviewer_id).await {
                Ok(name) => name.unwrap_or_else(|| UNKNOWN_REVIEWER.to_string()),
                Err(e) => {
                    error!(job_id = %id, leave_id = request.id, error = %e, "Reviewer lookup failed, notification dropped");
                    return;
                }
            },
            None => UNKNOWN_REVIEWER.to_string(),
        };

        let employee_name = employee.full_name();
        let ctx = NoticeContext {
            status: request.status,
            employee_name: &employee_name,
            reviewer_name: &reviewer_name,
            leave_type: &leave_type.name,
            from: request.from_date,
            to: request.to_date,
            applied_days: request.applied_days,
            approved_for,
            remarks: request.remarks.as_deref(),
        };

        if let (Some((phone, country_code)), Some(message)) = (employee.phone_contact(), message_for(&ctx)) {
            match self.message.send_message(phone, country_code, &message).await {
                Ok(()) => info!(job_id = %id, leave_id = request.id, template = message.template, "Leave message sent"),
                Err(e) => warn!(job_id = %id, leave_id = request.id, error = %e, "Leave message failed"),
            }
        }

        let notice = match self.templates.render(&ctx, &self.dashboard_url) {
            Ok(notice) => notice,
            Err(e) => {
                warn!(job_id = %id, leave_id = request.id, error = %e, "Leave email could not be rendered");
                return;
            }
        };
        match self.email.send_email(&employee.email, &notice).await {
            Ok(()) => info!(job_id = %id, leave_id = request.id, "Leave email sent"),
            Err(e) => warn!(job_id = %id, leave_id = request.id, error = %e, "Leave email failed"),
        }
    }
}

pub struct DispatcherHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Stops accepting jobs and waits until everything queued has been sent.
    pub async fn drain(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.join.await {
            error!(error = %e, "Notification worker ended abnormally");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::template::{EmailNotice, TemplatedMessage};
    use super::transport::{EmailSender, MessageSender, TransportError};

    /// Transport that records what it was asked to send.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub emails: Mutex<Vec<(String, EmailNotice)>>,
        pub messages: Mutex<Vec<(String, TemplatedMessage)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingTransport {
        async fn send_email(&self, to: &str, notice: &EmailNotice) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Rejected { status: 503, body: "down".into() });
            }
            self.emails.lock().unwrap().push((to.to_string(), notice.clone()));
            Ok(())
        }
    }

    #[async_trait]
    impl MessageSender for RecordingTransport {
        async fn send_message(
            &self,
            phone: &str,
            _country_code: &str,
            message: &TemplatedMessage,
        ) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Rejected { status: 503, body: "down".into() });
            }
            self.messages.lock().unwrap().push((phone.to_string(), message.clone()));
            Ok(())
        }
    }
}

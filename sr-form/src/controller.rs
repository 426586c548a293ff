//! FormController - intake form lifecycle
//!
//! Owns the form values and drives submission:
//!
//! ```text
//! submit()
//!     ├─ 1. Reject if a submission is already in flight (Busy)
//!     ├─ 2. Validating: run validation over the current values
//!     │      └─ violations → Idle, inline errors, no network call
//!     ├─ 3. Submitting: build the payload, call the ticket service
//!     │      (the state lock is released while awaiting)
//!     ├─ 4a. Success: clear the draft, reset values, show the ticket
//!     └─ 4b. Failed: keep values and draft, raise a notification
//! ```
//!
//! Every edit schedules a debounced draft write. Unmounting stops the
//! autosave and detaches the controller from its view: an in-flight
//! submission still finishes, but its result no longer touches form state.

use crate::config::AttachmentPolicy;
use crate::draft::{DraftAutosaver, DraftStore};
use crate::mapping::{CategoryMapping, build_payload};
use crate::progress::progress;
use crate::service::{SubmissionError, TicketService};
use crate::validation::{Field, FieldErrors, validate};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared::{FormFields, ReferenceData, Ticket};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Title of the notification raised when a submission fails
pub const FAILURE_TITLE: &str = "제출 실패";

/// Question asked before a reset
pub const RESET_PROMPT: &str = "모든 입력 내용을 초기화하시겠습니까?";

/// Where the submission state machine currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    /// Ticket created; shown until the next submission or a new request
    Success(Ticket),
    /// User-facing failure message
    Failed(String),
}

impl SubmissionPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

/// Dismissible message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            title: FAILURE_TITLE.to_string(),
            message: message.into(),
        }
    }
}

/// Result of one call to [`FormController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(Ticket),
    /// Validation failed; nothing was sent
    Invalid(FieldErrors),
    Failed(SubmissionError),
    /// Another submission is in flight
    Busy,
    /// The form is unmounted
    Disposed,
}

/// The user declined a destructive reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Reset cancelled by user")]
pub struct ConfirmationAbort;

/// Asks the user a yes/no question
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Point-in-time copy of everything the form displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub fields: FormFields,
    pub errors: FieldErrors,
    pub progress: u8,
    pub phase: SubmissionPhase,
    pub notification: Option<Notification>,
    /// A stored draft was restored at mount
    pub draft_restored: bool,
    /// When the restored draft was saved, if it says
    pub restored_from: Option<DateTime<Utc>>,
}

impl FormView {
    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        !self.phase.is_busy()
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        match &self.phase {
            SubmissionPhase::Success(ticket) => Some(ticket),
            _ => None,
        }
    }
}

/// Collaborators handed to [`FormController::mount`]
pub struct FormContext {
    pub drafts: DraftStore,
    pub service: Arc<dyn TicketService>,
    pub reference: Arc<ReferenceData>,
    pub policy: AttachmentPolicy,
    pub debounce: Duration,
}

#[derive(Default)]
struct FormState {
    fields: FormFields,
    errors: FieldErrors,
    /// Set after a submit attempt fails validation; edits re-validate
    revalidate: bool,
    phase: SubmissionPhase,
    notification: Option<Notification>,
    draft_restored: bool,
    restored_from: Option<DateTime<Utc>>,
    mounted: bool,
}

struct Inner {
    state: Mutex<FormState>,
    autosaver: DraftAutosaver,
    service: Arc<dyn TicketService>,
    reference: Arc<ReferenceData>,
    mapping: CategoryMapping,
    policy: AttachmentPolicy,
}

/// Handle to a mounted intake form. Clones share the same form.
#[derive(Clone)]
pub struct FormController {
    inner: Arc<Inner>,
}

impl FormController {
    /// Mount the form: restore the stored draft, if any, and start autosave.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(context: FormContext) -> Self {
        let mut state = FormState {
            mounted: true,
            ..Default::default()
        };

        if let Some(draft) = context.drafts.load() {
            tracing::info!(saved_at = ?draft.saved_at, "Restored form draft");
            state.fields = draft.fields;
            state.draft_restored = true;
            state.restored_from = draft.saved_at;
        }

        let mapping = CategoryMapping::from_reference(&context.reference);
        let autosaver = DraftAutosaver::spawn(context.drafts, context.debounce);

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                autosaver,
                service: context.service,
                reference: context.reference,
                mapping,
                policy: context.policy,
            }),
        }
    }

    /// Snapshot of the form as it should be displayed now
    pub fn view(&self) -> FormView {
        let state = self.inner.state.lock();
        FormView {
            progress: progress(&state.fields, self.inner.policy),
            fields: state.fields.clone(),
            errors: state.errors.clone(),
            phase: state.phase.clone(),
            notification: state.notification.clone(),
            draft_restored: state.draft_restored,
            restored_from: state.restored_from,
        }
    }

    pub fn fields(&self) -> FormFields {
        self.inner.state.lock().fields.clone()
    }

    pub fn progress(&self) -> u8 {
        progress(&self.inner.state.lock().fields, self.inner.policy)
    }

    /// Apply a change to the form values. Ignored after unmount.
    pub fn edit(&self, change: impl FnOnce(&mut FormFields)) {
        let mut state = self.inner.state.lock();
        if !state.mounted {
            tracing::debug!("Edit ignored, form is unmounted");
            return;
        }

        change(&mut state.fields);
        if state.revalidate {
            state.errors = validate(&state.fields, self.inner.policy).err().unwrap_or_default();
        }
        self.inner.autosaver.schedule(state.fields.clone());
    }

    /// Select a system and derive the assignee from the directory.
    ///
    /// A single candidate is filled in; an assignee not responsible for the
    /// new system is cleared.
    pub fn select_system(&self, system: &str) {
        let reference = self.inner.reference.clone();
        self.edit(|fields| {
            fields.system_name = system.to_string();
            match reference.assignees_for(system) {
                [only] => fields.assignee = only.name.clone(),
                _ if !reference.is_assignee_of(system, &fields.assignee) => fields.assignee.clear(),
                _ => {}
            }
        });
    }

    /// Validate and submit the current values.
    ///
    /// Re-entrant calls while a submission is in flight return
    /// [`SubmitOutcome::Busy`] without doing anything.
    pub async fn submit(&self) -> SubmitOutcome {
        let payload = {
            let mut state = self.inner.state.lock();
            if !state.mounted {
                return SubmitOutcome::Disposed;
            }
            if state.phase.is_busy() {
                tracing::debug!("Submit ignored, submission already in flight");
                return SubmitOutcome::Busy;
            }

            state.phase = SubmissionPhase::Validating;
            state.notification = None;

            let checked = validate(&state.fields, self.inner.policy).and_then(|()| {
                build_payload(&state.fields, &self.inner.mapping)
                    .ok_or_else(|| FieldErrors::missing(Field::RequestDate))
            });
            match checked {
                Ok(payload) => {
                    state.errors = FieldErrors::default();
                    state.revalidate = false;
                    state.phase = SubmissionPhase::Submitting;
                    payload
                }
                Err(errors) => {
                    tracing::debug!(count = errors.len(), "Submission blocked by validation");
                    state.errors = errors.clone();
                    state.revalidate = true;
                    state.phase = SubmissionPhase::Idle;
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };

        tracing::info!(title = %payload.title, system = %payload.system_name, "Submitting service request");
        let result = self.inner.service.submit(payload).await;

        let mut state = self.inner.state.lock();
        match result {
            Ok(response) => {
                let ticket = Ticket::from(response);
                tracing::info!(ticket_id = %ticket.ticket_id, status = %ticket.status, "Service request submitted");

                // The request is filed whether or not anyone is still watching
                self.inner.autosaver.clear_draft();

                if state.mounted {
                    state.fields = FormFields::default();
                    state.errors = FieldErrors::default();
                    state.draft_restored = false;
                    state.restored_from = None;
                    state.phase = SubmissionPhase::Success(ticket.clone());
                }
                SubmitOutcome::Submitted(ticket)
            }
            Err(err) => {
                tracing::error!("Service request submission failed: {err}");
                if state.mounted {
                    let message = err.user_message().to_string();
                    state.notification = Some(Notification::failure(message.clone()));
                    state.phase = SubmissionPhase::Failed(message);
                }
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Leave a finished submission and return to an idle form
    pub fn start_new_request(&self) {
        let mut state = self.inner.state.lock();
        if matches!(state.phase, SubmissionPhase::Success(_) | SubmissionPhase::Failed(_)) {
            state.phase = SubmissionPhase::Idle;
            state.notification = None;
        }
    }

    /// Close the notification; a failed submission returns to idle
    pub fn dismiss_notification(&self) {
        let mut state = self.inner.state.lock();
        state.notification = None;
        if matches!(state.phase, SubmissionPhase::Failed(_)) {
            state.phase = SubmissionPhase::Idle;
        }
    }

    /// Clear every value and delete the draft, after the user confirms
    pub fn reset(&self, confirm: &dyn Confirm) -> Result<(), ConfirmationAbort> {
        if !confirm.confirm(RESET_PROMPT) {
            tracing::debug!("Reset declined");
            return Err(ConfirmationAbort);
        }

        let mut state = self.inner.state.lock();
        self.inner.autosaver.clear_draft();
        if state.mounted {
            state.fields = FormFields::default();
            state.errors = FieldErrors::default();
            state.revalidate = false;
            state.notification = None;
            state.draft_restored = false;
            state.restored_from = None;
            if !state.phase.is_busy() {
                state.phase = SubmissionPhase::Idle;
            }
        }
        tracing::info!("Form reset, draft deleted");
        Ok(())
    }

    /// Write the current values to the draft store without waiting for the
    /// debounce window
    pub fn save_draft_now(&self) {
        let state = self.inner.state.lock();
        if state.mounted {
            self.inner.autosaver.save_now(&state.fields);
        }
    }

    /// Detach from the view and stop autosave. A pending write is dropped.
    pub fn unmount(&self) {
        let mut state = self.inner.state.lock();
        if !state.mounted {
            return;
        }
        state.mounted = false;
        self.inner.autosaver.dispose();
        tracing::debug!("Form unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.state.lock().mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{DEFAULT_REFERENCE_DATA, parse_reference_data};
    use crate::draft::MemoryDraftBackend;
    use crate::service::GENERIC_FAILURE_MESSAGE;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use shared::{ServiceRequestCreate, TicketResponse};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const WINDOW: Duration = Duration::from_millis(1000);

    /// Replies with queued results, recording every payload
    #[derive(Default)]
    struct StubService {
        replies: Mutex<VecDeque<Result<TicketResponse, SubmissionError>>>,
        payloads: Mutex<Vec<ServiceRequestCreate>>,
    }

    impl StubService {
        fn replying(reply: Result<TicketResponse, SubmissionError>) -> Arc<Self> {
            let stub = Self::default();
            stub.replies.lock().push_back(reply);
            Arc::new(stub)
        }

        fn calls(&self) -> usize {
            self.payloads.lock().len()
        }
    }

    #[async_trait]
    impl TicketService for StubService {
        async fn submit(&self, payload: ServiceRequestCreate) -> Result<TicketResponse, SubmissionError> {
            self.payloads.lock().push(payload);
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(SubmissionError::Network("no reply queued".into())))
        }
    }

    /// Holds every submission until released
    #[derive(Default)]
    struct GatedService {
        entered: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TicketService for GatedService {
        async fn submit(&self, _payload: ServiceRequestCreate) -> Result<TicketResponse, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(ticket_response())
        }
    }

    fn ticket_response() -> TicketResponse {
        TicketResponse {
            id: 42,
            ticket_id: "SR-2024-0042".to_string(),
            status: "접수".to_string(),
            notion_page_id: None,
        }
    }

    fn complete() -> FormFields {
        FormFields {
            company: "아성다이소".to_string(),
            team: "IT개발팀".to_string(),
            requester: "홍길동".to_string(),
            title: "로그인 오류".to_string(),
            system_name: "DMS".to_string(),
            assignee: "최지영".to_string(),
            request_type: "장애".to_string(),
            request_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            description: "로그인 화면에서 오류가 발생합니다".to_string(),
            ..Default::default()
        }
    }

    fn drafts() -> (DraftStore, Arc<MemoryDraftBackend>) {
        let backend = Arc::new(MemoryDraftBackend::new());
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()));
        (DraftStore::new(backend.clone(), clock), backend)
    }

    fn mount_with(drafts: DraftStore, service: Arc<dyn TicketService>) -> FormController {
        let reference = parse_reference_data(DEFAULT_REFERENCE_DATA).unwrap();
        FormController::mount(FormContext {
            drafts,
            service,
            reference: Arc::new(reference),
            policy: AttachmentPolicy::Optional,
            debounce: WINDOW,
        })
    }

    fn fill(controller: &FormController, values: FormFields) {
        controller.edit(|fields| *fields = values);
    }

    #[tokio::test]
    async fn test_mount_without_draft_starts_empty() {
        let (store, _) = drafts();
        let controller = mount_with(store, StubService::replying(Ok(ticket_response())));

        let view = controller.view();
        assert!(view.fields.is_blank());
        assert_eq!(view.progress, 0);
        assert_eq!(view.phase, SubmissionPhase::Idle);
        assert!(!view.draft_restored);
        assert!(view.can_submit());
    }

    #[tokio::test]
    async fn test_mount_restores_draft() {
        let (store, _) = drafts();
        store.save(&complete());

        let controller = mount_with(store, StubService::replying(Ok(ticket_response())));
        let view = controller.view();
        assert_eq!(view.fields, complete());
        assert_eq!(view.progress, 100);
        assert!(view.draft_restored);
        assert_eq!(view.restored_from, Some(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_are_autosaved() {
        let (store, backend) = drafts();
        let controller = mount_with(store.clone(), StubService::replying(Ok(ticket_response())));

        controller.edit(|f| f.title = "로그".into());
        controller.edit(|f| f.title = "로그인 오류".into());
        assert_eq!(controller.progress(), 11);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(backend.writes(), 1);
        assert_eq!(store.load().unwrap().fields.title, "로그인 오류");
    }

    #[tokio::test]
    async fn test_invalid_submit_makes_no_call() {
        let (store, _) = drafts();
        let service = StubService::replying(Ok(ticket_response()));
        let controller = mount_with(store, service.clone());

        let mut values = complete();
        values.description.clear();
        fill(&controller, values);

        let SubmitOutcome::Invalid(errors) = controller.submit().await else {
            panic!("expected validation failure");
        };
        assert!(errors.get(Field::Description).unwrap().contains("최소 10자 이상"));
        assert_eq!(service.calls(), 0);

        let view = controller.view();
        assert_eq!(view.phase, SubmissionPhase::Idle);
        assert_eq!(view.errors, errors);
    }

    #[tokio::test]
    async fn test_errors_revalidate_on_edit() {
        let (store, _) = drafts();
        let controller = mount_with(store, StubService::replying(Ok(ticket_response())));

        controller.edit(|f| f.title = "로그인 오류".into());
        assert!(controller.view().errors.is_empty(), "no errors before a submit attempt");

        controller.submit().await;
        assert!(controller.view().errors.contains(Field::Company));

        controller.edit(|f| f.company = "아성다이소".into());
        let errors = controller.view().errors;
        assert!(!errors.contains(Field::Company));
        assert!(errors.contains(Field::Team));
    }

    #[tokio::test]
    async fn test_successful_submit_resets_form() {
        let (store, _) = drafts();
        let service = StubService::replying(Ok(ticket_response()));
        let controller = mount_with(store.clone(), service.clone());

        fill(&controller, complete());
        controller.save_draft_now();
        assert!(store.load().is_some());

        let outcome = controller.submit().await;
        let ticket = Ticket::from(ticket_response());
        assert_eq!(outcome, SubmitOutcome::Submitted(ticket.clone()));

        let view = controller.view();
        assert_eq!(view.ticket(), Some(&ticket));
        assert!(view.fields.is_blank());
        assert_eq!(view.progress, 0);
        assert!(store.load().is_none());

        let payload = service.payloads.lock()[0].clone();
        assert_eq!(payload.category, "장애");
        assert_eq!(payload.system_name, "DMS");
        assert_eq!(payload.reply_email, None);

        controller.start_new_request();
        assert_eq!(controller.view().phase, SubmissionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_discards_pending_autosave() {
        let (store, _) = drafts();
        let controller = mount_with(store.clone(), StubService::replying(Ok(ticket_response())));

        fill(&controller, complete());
        assert!(matches!(controller.submit().await, SubmitOutcome::Submitted(_)));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_values_and_draft() {
        let (store, _) = drafts();
        let service = StubService::replying(Err(SubmissionError::Rejected {
            status: 500,
            message: "DB unavailable".to_string(),
        }));
        let controller = mount_with(store.clone(), service);

        fill(&controller, complete());
        controller.save_draft_now();

        assert!(matches!(controller.submit().await, SubmitOutcome::Failed(_)));

        let view = controller.view();
        assert_eq!(view.phase, SubmissionPhase::Failed("DB unavailable".into()));
        assert_eq!(
            view.notification,
            Some(Notification {
                title: FAILURE_TITLE.to_string(),
                message: "DB unavailable".to_string(),
            })
        );
        assert_eq!(view.fields, complete());
        assert_eq!(view.progress, 100);
        assert_eq!(store.load().unwrap().fields, complete());

        controller.dismiss_notification();
        let view = controller.view();
        assert_eq!(view.phase, SubmissionPhase::Idle);
        assert!(view.notification.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_shows_generic_message() {
        let (store, _) = drafts();
        let service = StubService::replying(Err(SubmissionError::Network("connection refused".into())));
        let controller = mount_with(store, service);

        fill(&controller, complete());
        controller.submit().await;

        assert_eq!(
            controller.view().phase,
            SubmissionPhase::Failed(GENERIC_FAILURE_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let (store, _) = drafts();
        let service = Arc::new(StubService::default());
        service
            .replies
            .lock()
            .extend([Err(SubmissionError::Network("timeout".into())), Ok(ticket_response())]);
        let controller = mount_with(store, service.clone());

        fill(&controller, complete());
        assert!(matches!(controller.submit().await, SubmitOutcome::Failed(_)));
        assert!(matches!(controller.submit().await, SubmitOutcome::Submitted(_)));
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn test_reentrant_submit_is_rejected() {
        let (store, _) = drafts();
        let service = Arc::new(GatedService::default());
        let controller = mount_with(store, service.clone());
        fill(&controller, complete());

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        service.entered.notified().await;

        assert!(!controller.view().can_submit());
        assert_eq!(controller.view().phase, SubmissionPhase::Submitting);
        assert_eq!(controller.submit().await, SubmitOutcome::Busy);

        service.release.notify_one();
        assert!(matches!(first.await.unwrap(), SubmitOutcome::Submitted(_)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unmount_during_submission() {
        let (store, _) = drafts();
        let service = Arc::new(GatedService::default());
        let controller = mount_with(store.clone(), service.clone());
        fill(&controller, complete());
        controller.save_draft_now();

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        service.entered.notified().await;
        controller.unmount();

        service.release.notify_one();
        assert!(matches!(first.await.unwrap(), SubmitOutcome::Submitted(_)));

        let view = controller.view();
        assert_eq!(view.phase, SubmissionPhase::Submitting, "view is left alone");
        assert_eq!(view.fields, complete());
        assert!(store.load().is_none());

        assert_eq!(controller.submit().await, SubmitOutcome::Disposed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_pending_autosave() {
        let (store, backend) = drafts();
        let controller = mount_with(store, StubService::replying(Ok(ticket_response())));

        controller.edit(|f| f.title = "로그인 오류".into());
        controller.unmount();
        controller.edit(|f| f.title = "ignored".into());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.writes(), 0);
        assert!(!controller.is_mounted());
        assert_eq!(controller.fields().title, "로그인 오류");
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let (store, _) = drafts();
        let controller = mount_with(store.clone(), StubService::replying(Ok(ticket_response())));
        fill(&controller, complete());
        controller.save_draft_now();

        let decline = |_: &str| false;
        assert_eq!(controller.reset(&decline), Err(ConfirmationAbort));
        assert_eq!(controller.fields(), complete());
        assert!(store.load().is_some());

        let accept = |prompt: &str| prompt == RESET_PROMPT;
        assert_eq!(controller.reset(&accept), Ok(()));
        assert!(controller.fields().is_blank());
        assert_eq!(controller.progress(), 0);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_select_system_derives_assignee() {
        let (store, _) = drafts();
        let controller = mount_with(store, StubService::replying(Ok(ticket_response())));

        controller.select_system("DMS");
        assert_eq!(controller.fields().assignee, "최지영");

        controller.select_system("Mobile-QIS");
        assert_eq!(controller.fields().assignee, "한지민");

        controller.select_system("기타 시스템");
        let fields = controller.fields();
        assert_eq!(fields.system_name, "기타 시스템");
        assert_eq!(fields.assignee, "");
    }
}

//! In-memory implementations of the ports used by session verification.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            payment_provider::{CheckoutSession, CheckoutSessionId, CheckoutSessionPort},
            plan_generation::PlanGenerationTrigger,
        },
        use_cases::verify_session::{
            CreateSubscriptionInput, ProfileRepoTrait, SubscriptionRepoTrait, UserPlanRepoTrait,
        },
    },
    domain::entities::{subscription::SubscriptionProfile, user_profile::UserProfile},
};

// ============================================================================
// StubCheckoutProvider
// ============================================================================

/// Serves checkout sessions from memory. Unknown ids fail the way the payment
/// provider reports a missing resource.
#[derive(Default)]
pub struct StubCheckoutProvider {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    hang: bool,
    calls: AtomicUsize,
}

impl StubCheckoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: Vec<CheckoutSession>) -> Self {
        let map = sessions
            .into_iter()
            .map(|s| (s.id.as_str().to_string(), s))
            .collect();
        Self {
            sessions: Mutex::new(map),
            ..Self::default()
        }
    }

    /// A provider that never answers.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckoutSessionPort for StubCheckoutProvider {
    async fn retrieve_checkout_session(
        &self,
        session_id: &CheckoutSessionId,
    ) -> AppResult<CheckoutSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hang {
            std::future::pending::<()>().await;
        }

        self.sessions
            .lock()
            .unwrap()
            .get(session_id.as_str())
            .cloned()
            .ok_or_else(|| {
                AppError::PaymentProvider(format!("No such checkout.session: '{session_id}'"))
            })
    }
}

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    subscriptions: Mutex<Vec<SubscriptionProfile>>,
    /// Row another request inserts right before our insert lands.
    concurrent_insert: Mutex<Option<SubscriptionProfile>>,
    fail_inserts: bool,
    stall_after_insert: bool,
    lookups: AtomicUsize,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: Vec<SubscriptionProfile>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions),
            ..Self::default()
        }
    }

    pub fn set_concurrent_insert(&self, subscription: SubscriptionProfile) {
        *self.concurrent_insert.lock().unwrap() = Some(subscription);
    }

    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    /// Inserts are stored but the call never returns, like a commit whose
    /// acknowledgement is lost.
    pub fn stalling_after_insert(mut self) -> Self {
        self.stall_after_insert = true;
        self
    }

    pub fn all(&self) -> Vec<SubscriptionProfile> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionRepoTrait for InMemorySubscriptionRepo {
    async fn get_by_stripe_session_id(
        &self,
        stripe_session_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.stripe_session_id == stripe_session_id)
            .cloned())
    }

    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<SubscriptionProfile> {
        if self.fail_inserts {
            return Err(AppError::Database("connection reset by peer".into()));
        }

        let subscription = {
            let mut subscriptions = self.subscriptions.lock().unwrap();

            if let Some(winner) = self.concurrent_insert.lock().unwrap().take() {
                subscriptions.push(winner);
            }

            if subscriptions
                .iter()
                .any(|s| s.stripe_session_id == input.stripe_session_id)
            {
                return Err(AppError::DuplicateSession);
            }

            let subscription = SubscriptionProfile {
                id: Uuid::new_v4(),
                user_id: input.user_id,
                plan_id: input.plan_id.clone(),
                plan_name: input.plan_name.clone(),
                status: input.status.clone(),
                includes_addon: input.includes_addon,
                start_date: input.start_date,
                end_date: input.end_date,
                stripe_session_id: input.stripe_session_id.clone(),
                created_at: Some(Utc::now()),
            };
            subscriptions.push(subscription.clone());
            subscription
        };

        if self.stall_after_insert {
            std::future::pending::<()>().await;
        }
        Ok(subscription)
    }
}

// ============================================================================
// InMemoryProfileRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryProfileRepo {
    profiles: Mutex<Vec<UserProfile>>,
    lookups: AtomicUsize,
}

impl InMemoryProfileRepo {
    pub fn with_profiles(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileRepoTrait for InMemoryProfileRepo {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == email)
            .cloned())
    }
}

// ============================================================================
// InMemoryUserPlanRepo
// ============================================================================

/// Tracks which subscriptions already have a generated plan.
#[derive(Default)]
pub struct InMemoryUserPlanRepo {
    subscription_ids: Mutex<Vec<Uuid>>,
}

impl InMemoryUserPlanRepo {
    pub fn with_subscriptions(subscription_ids: Vec<Uuid>) -> Self {
        Self {
            subscription_ids: Mutex::new(subscription_ids),
        }
    }
}

#[async_trait]
impl UserPlanRepoTrait for InMemoryUserPlanRepo {
    async fn exists_for_subscription(&self, subscription_id: Uuid) -> AppResult<bool> {
        Ok(self
            .subscription_ids
            .lock()
            .unwrap()
            .contains(&subscription_id))
    }
}

// ============================================================================
// RecordingPlanTrigger
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerBehavior {
    #[default]
    Succeed,
    Fail,
    /// Never completes.
    Hang,
}

/// Records every trigger call and forwards it on a channel so tests can await
/// the detached dispatch.
pub struct RecordingPlanTrigger {
    calls: Mutex<Vec<(Uuid, Uuid)>>,
    notify: mpsc::UnboundedSender<(Uuid, Uuid)>,
    behavior: TriggerBehavior,
}

impl RecordingPlanTrigger {
    pub fn new(behavior: TriggerBehavior) -> (Self, mpsc::UnboundedReceiver<(Uuid, Uuid)>) {
        let (notify, rx) = mpsc::unbounded_channel();
        let trigger = Self {
            calls: Mutex::new(vec![]),
            notify,
            behavior,
        };
        (trigger, rx)
    }

    /// `(user_id, subscription_id)` pairs in call order.
    pub fn calls(&self) -> Vec<(Uuid, Uuid)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanGenerationTrigger for RecordingPlanTrigger {
    async fn trigger(&self, user_id: Uuid, subscription_id: Uuid) -> AppResult<()> {
        self.calls.lock().unwrap().push((user_id, subscription_id));
        let _ = self.notify.send((user_id, subscription_id));

        match self.behavior {
            TriggerBehavior::Succeed => Ok(()),
            TriggerBehavior::Fail => Err(AppError::Internal(
                "generate-plan returned 500 Internal Server Error".into(),
            )),
            TriggerBehavior::Hang => std::future::pending().await,
        }
    }
}

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::{
    payment_provider::{CheckoutSessionId, CheckoutSessionPort},
    plan_generation::PlanGenerationTrigger,
};
use crate::domain::entities::{
    checkout_metadata::CheckoutMetadata,
    subscription::{SubscriptionProfile, SubscriptionStatus},
    user_profile::UserProfile,
};

// ============================================================================
// Constants
// ============================================================================

pub const SESSION_ID_REQUIRED: &str = "sessionId is required";
pub const PAYMENT_NOT_COMPLETED: &str = "Payment not completed";
pub const NEEDS_ACCOUNT: &str = "No se encontró una cuenta con ese email. Regístrate primero.";
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait SubscriptionRepoTrait: Send + Sync {
    async fn get_by_stripe_session_id(
        &self,
        stripe_session_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>>;

    /// Insert a subscription. Returns [`AppError::DuplicateSession`] when one
    /// already exists for `input.stripe_session_id`.
    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<SubscriptionProfile>;
}

#[async_trait]
pub trait ProfileRepoTrait: Send + Sync {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
}

#[async_trait]
pub trait UserPlanRepoTrait: Send + Sync {
    /// Whether plan generation already produced a plan for the subscription.
    async fn exists_for_subscription(&self, subscription_id: Uuid) -> AppResult<bool>;
}

// ============================================================================
// Input / Output Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscriptionInput {
    pub user_id: Uuid,
    pub plan_id: String,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub includes_addon: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub stripe_session_id: String,
}

impl CreateSubscriptionInput {
    pub fn from_checkout(
        user_id: Uuid,
        session_id: &CheckoutSessionId,
        metadata: &CheckoutMetadata,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            plan_id: metadata.plan_id.clone(),
            plan_name: metadata.plan_name.clone(),
            status: SubscriptionStatus::Active,
            includes_addon: metadata.includes_addon,
            start_date,
            end_date: metadata.duration.end_date(start_date),
            stripe_session_id: session_id.as_str().to_string(),
        }
    }
}

/// Expected results of a verification. Faults are reported as [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The provider does not report the session as paid yet.
    PaymentIncomplete,
    /// A subscription was recorded for this session by an earlier call.
    AlreadyProcessed {
        subscription_id: Uuid,
        plan_exists: bool,
    },
    /// Paid, but nobody is registered with the purchase email.
    NeedsAccount,
    Activated {
        subscription_id: Uuid,
        user_id: Uuid,
    },
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct VerifySessionUseCases {
    checkout: Arc<dyn CheckoutSessionPort>,
    subscription_repo: Arc<dyn SubscriptionRepoTrait>,
    profile_repo: Arc<dyn ProfileRepoTrait>,
    user_plan_repo: Arc<dyn UserPlanRepoTrait>,
    plan_trigger: Arc<dyn PlanGenerationTrigger>,
    step_timeout: Duration,
}

impl VerifySessionUseCases {
    pub fn new(
        checkout: Arc<dyn CheckoutSessionPort>,
        subscription_repo: Arc<dyn SubscriptionRepoTrait>,
        profile_repo: Arc<dyn ProfileRepoTrait>,
        user_plan_repo: Arc<dyn UserPlanRepoTrait>,
        plan_trigger: Arc<dyn PlanGenerationTrigger>,
        step_timeout: Duration,
    ) -> Self {
        Self {
            checkout,
            subscription_repo,
            profile_repo,
            user_plan_repo,
            plan_trigger,
            step_timeout,
        }
    }

    /// Confirm a checkout session and activate its subscription once.
    pub async fn verify(&self, session_id: &str) -> AppResult<VerifyOutcome> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            warn!(step = "Validate input", "Rejected request without sessionId");
            return Err(AppError::InvalidInput(SESSION_ID_REQUIRED.into()));
        }

        info!(step = "Verifying session", session_id, "Verifying checkout session");
        let session_id = CheckoutSessionId::new(session_id);

        let session = self
            .bounded(
                "Retrieve checkout session",
                self.checkout.retrieve_checkout_session(&session_id),
            )
            .await?;

        info!(
            step = "Session retrieved",
            session_id = %session.id,
            payment_status = session.payment_status.as_str(),
            email = session.metadata.get("email").map(String::as_str),
            "Checkout session retrieved"
        );

        if !session.payment_status.is_paid() {
            info!(
                step = "Payment not completed",
                session_id = %session.id,
                payment_status = session.payment_status.as_str(),
                "Checkout session is not paid"
            );
            return Ok(VerifyOutcome::PaymentIncomplete);
        }

        if let Some(existing) = self
            .bounded(
                "Look up subscription",
                self.subscription_repo
                    .get_by_stripe_session_id(session.id.as_str()),
            )
            .await?
        {
            info!(
                step = "Subscription already exists",
                subscription_id = %existing.id,
                "Checkout session already processed"
            );
            return self.already_processed(existing.id).await;
        }

        let metadata = CheckoutMetadata::from_metadata(&session.metadata).inspect_err(|e| {
            error!(
                step = "Resolve metadata",
                session_id = %session.id,
                error = %e,
                "Paid checkout session is missing required metadata"
            );
        })?;

        let Some(profile) = self
            .bounded("Look up profile", self.profile_repo.get_by_email(&metadata.email))
            .await?
        else {
            info!(
                step = "No user found for email",
                email = %metadata.email,
                "Purchaser has no account"
            );
            return Ok(VerifyOutcome::NeedsAccount);
        };

        info!(step = "User found", user_id = %profile.user_id, "Purchaser resolved");

        if !metadata.duration.is_recognized() {
            warn!(
                step = "Compute dates",
                duration = metadata.duration.as_label(),
                session_id = %session.id,
                "Unrecognized plan duration, subscription window has zero length"
            );
        }

        let input =
            CreateSubscriptionInput::from_checkout(profile.user_id, &session.id, &metadata, Utc::now());

        let subscription = match self
            .bounded("Create subscription", self.subscription_repo.create(&input))
            .await
        {
            Ok(subscription) => subscription,
            Err(AppError::DuplicateSession) => return self.recover_duplicate(&session.id).await,
            Err(e @ AppError::Timeout(_)) => {
                // The row may have committed anyway. A retry then reports it as
                // already processed and plan generation is never dispatched.
                warn!(
                    step = "Create subscription",
                    session_id = %session.id,
                    user_id = %profile.user_id,
                    "Insert outcome unknown, plan generation may need a manual trigger"
                );
                return Err(e);
            }
            Err(AppError::Database(msg)) => {
                return Err(AppError::Database(format!(
                    "Failed to create subscription: {msg}"
                )));
            }
            Err(e) => return Err(e),
        };

        info!(
            step = "Subscription created",
            subscription_id = %subscription.id,
            user_id = %subscription.user_id,
            start_date = %subscription.start_date,
            end_date = %subscription.end_date,
            "Subscription activated"
        );

        self.dispatch_plan_generation(profile.user_id, subscription.id);

        Ok(VerifyOutcome::Activated {
            subscription_id: subscription.id,
            user_id: profile.user_id,
        })
    }

    // ========================================================================
    // Private Helpers
    // ========================================================================

    async fn already_processed(&self, subscription_id: Uuid) -> AppResult<VerifyOutcome> {
        let plan_exists = self
            .bounded(
                "Look up user plan",
                self.user_plan_repo.exists_for_subscription(subscription_id),
            )
            .await?;

        Ok(VerifyOutcome::AlreadyProcessed {
            subscription_id,
            plan_exists,
        })
    }

    /// Another request inserted the subscription between our lookup and our
    /// insert. Report the winner's record.
    async fn recover_duplicate(&self, session_id: &CheckoutSessionId) -> AppResult<VerifyOutcome> {
        warn!(
            step = "Create subscription",
            session_id = %session_id,
            "Concurrent activation detected, returning existing subscription"
        );

        let existing = self
            .bounded(
                "Look up subscription",
                self.subscription_repo
                    .get_by_stripe_session_id(session_id.as_str()),
            )
            .await?
            .ok_or(AppError::DuplicateSession)?;

        self.already_processed(existing.id).await
    }

    /// Notify plan generation on a detached task. Its outcome only reaches the
    /// logs; the caller never waits for it.
    fn dispatch_plan_generation(&self, user_id: Uuid, subscription_id: Uuid) {
        let trigger = Arc::clone(&self.plan_trigger);

        tokio::spawn(async move {
            match trigger.trigger(user_id, subscription_id).await {
                Ok(()) => info!(
                    step = "Plan generation accepted",
                    %user_id,
                    %subscription_id,
                    "Plan generation request delivered"
                ),
                Err(e) => error!(
                    step = "Plan generation trigger error",
                    %user_id,
                    %subscription_id,
                    error = %e,
                    "Plan generation request failed"
                ),
            }
        });

        info!(
            step = "Plan generation triggered",
            %user_id,
            %subscription_id,
            "Plan generation dispatched"
        );
    }

    /// Run one outbound step under the step timeout, logging faults with the
    /// step label.
    async fn bounded<T>(
        &self,
        step: &'static str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let result = match tokio::time::timeout(self.step_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(step)),
        };

        match &result {
            Err(AppError::DuplicateSession) | Ok(_) => {}
            Err(e) => {
                error!(step, error = %e, code = e.code().as_str(), "Verification step failed")
            }
        }

        result
    }
}

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::constants::{
    DISCOUNT_SENT_MESSAGE, DUPLICATE_EMAIL_ERROR, INVALID_EMAIL_ERROR, INVALID_NAME_ERROR,
    MISSING_FIELDS_ERROR, UNKNOWN_PRIZE_ERROR,
};
use shared::discount_claim::{SendDiscountRequest, SendDiscountResponse};
use shared::validation::{normalize_email, validate_email, validate_name};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::services::mail_service::DiscountEmail;
use crate::AppState;

/// Remembers which emails already received a code. Emails are compared in
/// normalized form (trimmed, lowercased).
pub trait ClaimStore: Send + Sync {
    fn has_claimed(&self, email: &str) -> bool;

    fn mark_claimed(&self, email: &str);

    /// Forgets a claim so the email can try again.
    fn release(&self, email: &str);

    /// Marks the email as claimed and reports whether it was free. Stores that
    /// can do this atomically should override it.
    fn try_claim(&self, email: &str) -> bool {
        if self.has_claimed(email) {
            return false;
        }
        self.mark_claimed(email);
        true
    }
}

/// Process-lifetime claim set. Everything is forgotten on restart.
#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    emails: Mutex<HashSet<String>>,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn emails(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-request.
        self.emails.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClaimStore for MemoryClaimStore {
    fn has_claimed(&self, email: &str) -> bool {
        self.emails().contains(&normalize_email(email))
    }

    fn mark_claimed(&self, email: &str) {
        self.emails().insert(normalize_email(email));
    }

    fn release(&self, email: &str) {
        self.emails().remove(&normalize_email(email));
    }

    fn try_claim(&self, email: &str) -> bool {
        self.emails().insert(normalize_email(email))
    }
}

/// `<prefix><percentage>OFF<last four digits of the millisecond timestamp>`
pub fn discount_code(prefix: &str, percentage: u8, timestamp_ms: i64) -> String {
    format!("{}{}OFF{:04}", prefix, percentage, timestamp_ms.rem_euclid(10_000))
}

pub async fn claim_discount(
    state: &AppState,
    request: SendDiscountRequest,
) -> Result<SendDiscountResponse, Error> {
    if !request.has_required_fields() {
        return Err(Error::BadRequest(MISSING_FIELDS_ERROR));
    }
    if validate_name(&request.name).is_err() {
        return Err(Error::BadRequest(INVALID_NAME_ERROR));
    }
    if validate_email(&request.email).is_err() {
        return Err(Error::BadRequest(INVALID_EMAIL_ERROR));
    }

    let prize = state
        .catalog
        .get(request.prize_id.trim())
        .ok_or(Error::BadRequest(UNKNOWN_PRIZE_ERROR))?;
    if request.percentage.is_some_and(|p| p != prize.percentage) {
        debug!(
            "Client sent percentage {:?} for prize {}, using catalog value {}",
            request.percentage, prize.id, prize.percentage
        );
    }

    let email = normalize_email(&request.email);
    if !state.claims.try_claim(&email) {
        warn!("Duplicate discount claim for {}", email);
        return Err(Error::Conflict(DUPLICATE_EMAIL_ERROR));
    }

    let code = discount_code(
        &state.config.code_prefix,
        prize.percentage,
        chrono::Utc::now().timestamp_millis(),
    );

    let message = DiscountEmail {
        to: request.email.trim().to_string(),
        name: request.name.trim().to_string(),
        dob: request.dob.filter(|dob| !dob.trim().is_empty()),
        prize: prize.label.clone(),
        discount_code: code.clone(),
    };
    if let Err(e) = state.mailer.send(&message) {
        state.claims.release(&email);
        return Err(e.into());
    }

    info!("🎁 DISCOUNT CLAIM: {} won {} (code {})", email, prize.label, code);

    tokio::time::sleep(state.config.claim_delay).await;

    Ok(SendDiscountResponse {
        success: true,
        message: DISCOUNT_SENT_MESSAGE.to_string(),
        discount_code: code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::mail_service::{DiscountMailer, MailError};
    use shared::prize_catalog::PrizeCatalog;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<DiscountEmail>>,
    }

    impl DiscountMailer for RecordingMailer {
        fn send(&self, email: &DiscountEmail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    impl DiscountMailer for FailingMailer {
        fn send(&self, _email: &DiscountEmail) -> Result<(), MailError> {
            Err(MailError::Delivery("smtp unavailable".to_string()))
        }
    }

    fn state_with(mailer: Arc<dyn DiscountMailer>) -> (AppState, Arc<MemoryClaimStore>) {
        let claims = Arc::new(MemoryClaimStore::new());
        let state = AppState {
            catalog: Arc::new(PrizeCatalog::default()),
            claims: claims.clone(),
            mailer,
            config: Arc::new(Config {
                prizes_delay: Duration::ZERO,
                claim_delay: Duration::ZERO,
                ..Config::default()
            }),
        };
        (state, claims)
    }

    fn request(email: &str, prize_id: &str) -> SendDiscountRequest {
        SendDiscountRequest {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            dob: Some("1990-04-01".to_string()),
            prize_id: prize_id.to_string(),
            discount: "ignored".to_string(),
            percentage: Some(99),
        }
    }

    #[test]
    fn test_discount_code_format() {
        assert_eq!(discount_code("NAILS", 25, 1_700_000_001_234), "NAILS25OFF1234");
        assert_eq!(discount_code("NAILS", 0, 1_700_000_000_042), "NAILS0OFF0042");
        assert_eq!(discount_code("SPA", 50, 7), "SPA50OFF0007");
    }

    #[test]
    fn test_memory_store_normalizes_emails() {
        let store = MemoryClaimStore::new();
        assert!(!store.has_claimed("jane@example.com"));
        store.mark_claimed("  Jane@Example.com ");
        assert!(store.has_claimed("jane@example.com"));
        assert!(!store.try_claim("JANE@EXAMPLE.COM"));

        store.release("jane@example.com");
        assert!(!store.has_claimed("Jane@Example.com"));
        assert!(store.try_claim("jane@example.com"));
    }

    #[tokio::test]
    async fn test_claim_uses_catalog_values_and_sends_mail() {
        let mailer = Arc::new(RecordingMailer::default());
        let (state, claims) = state_with(mailer.clone());

        let response = claim_discount(&state, request(" Jane@Example.com ", "9"))
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.message, DISCOUNT_SENT_MESSAGE);
        assert!(response.discount_code.starts_with("NAILS12OFF"));
        assert_eq!(response.discount_code.len(), "NAILS12OFF".len() + 4);
        assert!(claims.has_claimed("jane@example.com"));

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "Jane@Example.com");
        assert_eq!(sent[0].prize, "12% OFF");
        assert_eq!(sent[0].discount_code, response.discount_code);
    }

    #[tokio::test]
    async fn test_claim_validation_errors() {
        let (state, claims) = state_with(Arc::new(RecordingMailer::default()));

        let mut missing_name = request("jane@example.com", "1");
        missing_name.name.clear();
        assert!(matches!(
            claim_discount(&state, missing_name).await,
            Err(Error::BadRequest(MISSING_FIELDS_ERROR))
        ));
        assert!(matches!(
            claim_discount(&state, request("not-an-email", "1")).await,
            Err(Error::BadRequest(INVALID_EMAIL_ERROR))
        ));
        let mut long_name = request("jane@example.com", "1");
        long_name.name = "J".repeat(500);
        assert!(matches!(
            claim_discount(&state, long_name).await,
            Err(Error::BadRequest(INVALID_NAME_ERROR))
        ));
        assert!(matches!(
            claim_discount(&state, request("jane@example.com", "404")).await,
            Err(Error::BadRequest(UNKNOWN_PRIZE_ERROR))
        ));
        assert!(!claims.has_claimed("jane@example.com"));
    }

    #[tokio::test]
    async fn test_second_claim_for_same_email_conflicts() {
        let (state, _) = state_with(Arc::new(RecordingMailer::default()));

        assert!(claim_discount(&state, request("jane@example.com", "1")).await.is_ok());
        assert!(matches!(
            claim_discount(&state, request("JANE@example.com  ", "2")).await,
            Err(Error::Conflict(DUPLICATE_EMAIL_ERROR))
        ));
        assert!(claim_discount(&state, request("john@example.com", "2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_delivery_releases_claim() {
        let (state, claims) = state_with(Arc::new(FailingMailer));

        assert!(matches!(
            claim_discount(&state, request("jane@example.com", "1")).await,
            Err(Error::Mail(_))
        ));
        assert!(!claims.has_claimed("jane@example.com"));
    }

    #[tokio::test]
    async fn test_concurrent_claims_for_one_email_succeed_once() {
        let (state, claims) = state_with(Arc::new(RecordingMailer::default()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let state = state.clone();
                let email = if i % 2 == 0 { "race@example.com" } else { "RACE@example.com" };
                tokio::spawn(async move { claim_discount(&state, request(email, "3")).await })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(Error::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error {:?}", e),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 15);
        assert!(claims.has_claimed("race@example.com"));
    }
}

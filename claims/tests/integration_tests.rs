//! Integration tests exercising the full claim workflow:
//! request → proof → (resend) → moderation → ownership.
//!
//! The services run against the nullable collaborators, except for the last
//! section which swaps in the LMDB store and the store-backed notifier.

use std::sync::Arc;
use std::time::Duration;

use listwise_claims::{
    ClaimDeps, ClaimError, ClaimPolicy, ClaimService, MailError, MethodData, StoreNotifier,
};
use listwise_nullables::{
    NullClock, NullCodeGenerator, NullMailer, NullNotifier, NullResolver, NullStore,
};
use listwise_store::{BusinessStore, ClaimStore, ClaimsStore};
use listwise_store_lmdb::LmdbEnvironment;
use listwise_types::{
    BusinessClaimStatus, BusinessId, ClaimId, ClaimProof, ClaimStatus, Decision,
    NotificationKind, UserId, VerificationStatus,
};
use listwise_verification::ResolveError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const START: u64 = 1_700_000_000;
const OTP: &str = "482931";
const TOKEN: &str = "verify=abc123";

struct Harness {
    store: Arc<NullStore>,
    clock: Arc<NullClock>,
    mailer: Arc<NullMailer>,
    notifier: Arc<NullNotifier>,
    resolver: Arc<NullResolver>,
    service: ClaimService,
}

fn user(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

fn harness() -> Harness {
    harness_with(ClaimPolicy::default())
}

fn harness_with(policy: ClaimPolicy) -> Harness {
    let store = Arc::new(NullStore::new());
    let clock = Arc::new(NullClock::new(START));
    let codes = Arc::new(
        NullCodeGenerator::new()
            .with_otps([OTP, "111111", "222222"])
            .with_dns_tokens([TOKEN]),
    );
    let mailer = Arc::new(NullMailer::new());
    let notifier = Arc::new(NullNotifier::new());
    let resolver = Arc::new(NullResolver::new());
    let deps = ClaimDeps {
        store: store.clone(),
        clock: clock.clone(),
        codes,
        mailer: mailer.clone(),
        notifier: notifier.clone(),
        resolver: resolver.clone(),
    };
    let service = ClaimService::new(deps, policy, vec![user("mod-1")]);
    Harness {
        store,
        clock,
        mailer,
        notifier,
        resolver,
        service,
    }
}

impl Harness {
    fn listing(&self) -> BusinessId {
        self.service.register_business("Corner Bakery").unwrap().id
    }

    async fn email_claim(&self, business: BusinessId, claimant: &str) -> ClaimId {
        self.service
            .initiate(
                business,
                &user(claimant),
                MethodData::Email {
                    email_address: "owner@cornerbakery.example".into(),
                },
            )
            .await
            .unwrap()
            .claim
            .id
    }

    async fn dns_claim(&self, business: BusinessId, claimant: &str) -> ClaimId {
        self.service
            .initiate(
                business,
                &user(claimant),
                MethodData::Dns {
                    domain: "cornerbakery.example".into(),
                },
            )
            .await
            .unwrap()
            .claim
            .id
    }

    async fn document_claim(&self, business: BusinessId, claimant: &str) -> ClaimId {
        self.service
            .initiate(
                business,
                &user(claimant),
                MethodData::Document {
                    proof_url: "https://files.example/licence.pdf".into(),
                },
            )
            .await
            .unwrap()
            .claim
            .id
    }
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn email_claim_end_to_end() {
    let h = harness();
    let business = h.listing();
    let claimant = user("u1");

    let initiated = h
        .service
        .initiate(
            business,
            &claimant,
            MethodData::Email {
                email_address: "owner@cornerbakery.example".into(),
            },
        )
        .await
        .unwrap();
    assert!(initiated.dns_instructions.is_none());
    let claim_id = initiated.claim.id;

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@cornerbakery.example");
    assert_eq!(sent[0].code, OTP);
    assert_eq!(
        h.service.get_business(business).unwrap().claim_status,
        BusinessClaimStatus::Pending
    );

    h.clock.advance(10 * 60);
    let verified = h.service.verify(business, &claimant, OTP).await.unwrap();
    assert_eq!(verified.verification_status, VerificationStatus::Verified);
    assert_eq!(verified.status, ClaimStatus::Pending);
    match &h.store.get_claim(claim_id).unwrap().proof {
        ClaimProof::Email { otp_code, .. } => assert!(otp_code.is_none()),
        other => panic!("unexpected proof {other:?}"),
    }

    let business_after = h
        .service
        .decide(claim_id, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();
    assert_eq!(business_after.owner_id, Some(claimant.clone()));
    assert_eq!(business_after.claim_status, BusinessClaimStatus::Approved);

    let delivered = h.notifier.delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].kind, NotificationKind::ClaimSubmitted);
    assert_eq!(delivered[0].user_id, user("mod-1"));
    assert_eq!(delivered[1].kind, NotificationKind::ClaimApproved);
    assert_eq!(delivered[1].user_id, claimant);
}

#[tokio::test]
async fn document_claim_is_judged_by_moderator() {
    let h = harness();
    let business = h.listing();
    let claim = h.document_claim(business, "u1").await;

    let err = h.service.verify(business, &user("u1"), "").await.unwrap_err();
    assert!(matches!(err, ClaimError::MethodNotVerifiable));

    let after = h
        .service
        .decide(claim, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();
    assert_eq!(after.owner_id, Some(user("u1")));
}

// ---------------------------------------------------------------------------
// Request preconditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_business_is_reported_first() {
    let h = harness();
    let err = h
        .service
        .initiate(
            BusinessId::new(404),
            &user("u1"),
            MethodData::Document {
                proof_url: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::BusinessNotFound(_)));
}

#[tokio::test]
async fn ownership_is_checked_before_input() {
    let h = harness();
    let business = h.listing();
    let claim = h.document_claim(business, "owner").await;
    h.service
        .decide(claim, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();

    let err = h
        .service
        .initiate(
            business,
            &user("u2"),
            MethodData::Dns {
                domain: "not a domain".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::AlreadyOwned(_)));
}

#[tokio::test]
async fn duplicate_is_checked_before_input() {
    let h = harness();
    let business = h.listing();
    h.document_claim(business, "u1").await;

    let err = h
        .service
        .initiate(
            business,
            &user("u1"),
            MethodData::Email {
                email_address: "nope".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::DuplicatePendingClaim(_)));
}

#[tokio::test]
async fn malformed_method_data_is_invalid_input() {
    let h = harness();
    let business = h.listing();
    for data in [
        MethodData::Document {
            proof_url: "  ".into(),
        },
        MethodData::Dns {
            domain: "localhost".into(),
        },
        MethodData::Email {
            email_address: "owner-at-bakery".into(),
        },
    ] {
        let err = h.service.initiate(business, &user("u1"), data).await.unwrap_err();
        assert!(matches!(err, ClaimError::InvalidInput(_)));
    }
    assert_eq!(h.store.claim_count(), 0);
}

#[tokio::test]
async fn dns_claim_returns_record_to_publish() {
    let h = harness();
    let business = h.listing();
    let initiated = h
        .service
        .initiate(
            business,
            &user("u1"),
            MethodData::Dns {
                domain: "CornerBakery.Example.".into(),
            },
        )
        .await
        .unwrap();
    let instructions = initiated.dns_instructions.unwrap();
    assert_eq!(instructions.record_name, "cornerbakery.example");
    assert_eq!(instructions.record_type, "TXT");
    assert_eq!(instructions.value, TOKEN);
}

#[tokio::test]
async fn mail_failure_persists_nothing() {
    let h = harness();
    let business = h.listing();
    h.mailer.fail_with(MailError::Rejected(503));

    let err = h
        .service
        .initiate(
            business,
            &user("u1"),
            MethodData::Email {
                email_address: "owner@cornerbakery.example".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::NotificationDeliveryFailed(_)));
    assert!(err.is_retryable());
    assert_eq!(h.store.claim_count(), 0);
    assert_eq!(
        h.service.get_business(business).unwrap().claim_status,
        BusinessClaimStatus::Unclaimed
    );
}

#[tokio::test(start_paused = true)]
async fn slow_mail_transport_times_out() {
    let h = harness();
    let business = h.listing();
    h.mailer.delay(Duration::from_secs(30));

    let err = h
        .service
        .initiate(
            business,
            &user("u1"),
            MethodData::Email {
                email_address: "owner@cornerbakery.example".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::NotificationDeliveryFailed(_)));
    assert_eq!(h.store.claim_count(), 0);
}

#[tokio::test]
async fn moderator_alert_failure_does_not_fail_request() {
    let h = harness();
    let business = h.listing();
    h.notifier.fail();
    h.document_claim(business, "u1").await;
    assert_eq!(h.store.claim_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_initiations_admit_one() {
    let h = harness();
    let business = h.listing();
    // Both requests pass the pre-checks while their emails are in flight;
    // the store decides the race.
    h.mailer.delay(Duration::from_millis(100));
    let data = || MethodData::Email {
        email_address: "owner@cornerbakery.example".into(),
    };
    let claimant = user("u1");

    let (a, b) = tokio::join!(
        h.service.initiate(business, &claimant, data()),
        h.service.initiate(business, &claimant, data()),
    );
    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, ClaimError::DuplicatePendingClaim(_))));
    assert_eq!(h.store.claim_count(), 1);
}

// ---------------------------------------------------------------------------
// Email proof
// ---------------------------------------------------------------------------

#[tokio::test]
async fn code_is_valid_at_fifteen_minutes() {
    let h = harness();
    let business = h.listing();
    h.email_claim(business, "u1").await;

    h.clock.advance(15 * 60);
    let claim = h.service.verify(business, &user("u1"), OTP).await.unwrap();
    assert!(claim.is_verified());
}

#[tokio::test]
async fn code_expires_one_second_later() {
    let h = harness();
    let business = h.listing();
    let id = h.email_claim(business, "u1").await;

    h.clock.advance(15 * 60 + 1);
    let err = h
        .service
        .verify(business, &user("u1"), OTP)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::CodeExpired));

    let stored = h.store.get_claim(id).unwrap();
    assert_eq!(stored.verification_status, VerificationStatus::Failed);
    assert_eq!(stored.last_failure.as_deref(), Some("code_expired"));
    assert_eq!(stored.status, ClaimStatus::Pending);
}

#[tokio::test]
async fn wrong_code_can_be_retried() {
    let h = harness();
    let business = h.listing();
    h.email_claim(business, "u1").await;

    let err = h
        .service
        .verify(business, &user("u1"), "000000")
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::InvalidCode));

    let claim = h
        .service
        .verify(business, &user("u1"), &format!("  {OTP}  "))
        .await
        .unwrap();
    assert!(claim.is_verified());
    assert_eq!(claim.last_failure, None);

    let err = h
        .service
        .verify(business, &user("u1"), OTP)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::AlreadyVerified(_)));
}

#[tokio::test]
async fn verify_without_claim_is_no_pending_claim() {
    let h = harness();
    let business = h.listing();
    let err = h
        .service
        .verify(business, &user("u1"), OTP)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::NoPendingClaim(_)));
}

// ---------------------------------------------------------------------------
// Resend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resend_honours_cooldown() {
    let h = harness();
    let business = h.listing();
    h.email_claim(business, "u1").await;

    h.clock.advance(20);
    let err = h.service.resend(business, &user("u1")).await.unwrap_err();
    assert!(matches!(
        err,
        ClaimError::ResendCooldown {
            retry_after_secs: 40
        }
    ));
    assert_eq!(h.mailer.sent().len(), 1);
}

#[tokio::test]
async fn resend_replaces_code_and_restarts_expiry() {
    let h = harness();
    let business = h.listing();
    h.email_claim(business, "u1").await;

    h.clock.advance(14 * 60);
    let receipt = h.service.resend(business, &user("u1")).await.unwrap();
    assert_eq!(receipt.sent_at.as_secs(), START + 14 * 60);
    assert_eq!(receipt.next_resend_at.as_secs(), START + 15 * 60);
    assert_eq!(h.mailer.last_code().as_deref(), Some("111111"));

    // The old code is gone; the new one is valid past the original deadline.
    h.clock.advance(10 * 60);
    let err = h
        .service
        .verify(business, &user("u1"), OTP)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::InvalidCode));
    let claim = h
        .service
        .verify(business, &user("u1"), "111111")
        .await
        .unwrap();
    assert!(claim.is_verified());
}

#[tokio::test]
async fn failed_resend_keeps_previous_code() {
    let h = harness();
    let business = h.listing();
    h.email_claim(business, "u1").await;

    h.clock.advance(120);
    h.mailer.fail_with(MailError::Transport("connection reset".into()));
    let err = h.service.resend(business, &user("u1")).await.unwrap_err();
    assert!(matches!(err, ClaimError::NotificationDeliveryFailed(_)));

    h.mailer.recover();
    let claim = h.service.verify(business, &user("u1"), OTP).await.unwrap();
    assert!(claim.is_verified());
}

#[tokio::test]
async fn resend_rejects_other_methods_and_verified_claims() {
    let h = harness();
    let business = h.listing();
    h.dns_claim(business, "u1").await;
    let err = h.service.resend(business, &user("u1")).await.unwrap_err();
    assert!(matches!(err, ClaimError::ResendUnsupported(_)));

    let other = h.service.register_business("Harbor Books").unwrap().id;
    h.email_claim(other, "u2").await;
    h.service.verify(other, &user("u2"), OTP).await.unwrap();
    h.clock.advance(300);
    let err = h.service.resend(other, &user("u2")).await.unwrap_err();
    assert!(matches!(err, ClaimError::AlreadyVerified(_)));
}

#[tokio::test(start_paused = true)]
async fn resend_in_flight_does_not_undo_verification() {
    let h = harness();
    let business = h.listing();
    let id = h.email_claim(business, "u1").await;
    h.clock.advance(120);
    h.mailer.delay(Duration::from_secs(3));

    let claimant = user("u1");
    let (resent, verified) = tokio::join!(
        h.service.resend(business, &claimant),
        h.service.verify(business, &claimant, OTP),
    );

    let verified = verified.unwrap();
    assert!(verified.is_verified());
    let err = resent.unwrap_err();
    assert!(matches!(err, ClaimError::ConcurrentUpdate(_)));
    assert!(err.is_retryable());

    let stored = h.store.get_claim(id).unwrap();
    assert_eq!(stored.verification_status, VerificationStatus::Verified);
    assert!(stored.verified_at.is_some());
    assert_eq!(stored, verified);
}

// ---------------------------------------------------------------------------
// DNS proof
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dns_token_among_other_records_verifies() {
    let h = harness();
    let business = h.listing();
    h.dns_claim(business, "u1").await;
    h.resolver
        .set_txt("cornerbakery.example", &[TOKEN, "unrelated"]);

    let claim = h.service.verify(business, &user("u1"), "").await.unwrap();
    assert!(claim.is_verified());
    assert_eq!(h.resolver.lookups(), vec!["cornerbakery.example".to_string()]);
}

#[tokio::test]
async fn wrong_dns_token_is_token_not_found() {
    let h = harness();
    let business = h.listing();
    let id = h.dns_claim(business, "u1").await;
    h.resolver.set_txt("cornerbakery.example", &["verify=wrong"]);

    let err = h.service.verify(business, &user("u1"), "").await.unwrap_err();
    assert!(matches!(err, ClaimError::TokenNotFound { .. }));
    assert_eq!(
        h.store.get_claim(id).unwrap().verification_status,
        VerificationStatus::Failed
    );

    // Publishing the right record afterwards succeeds.
    h.resolver.set_txt("cornerbakery.example", &[TOKEN]);
    assert!(h.service.verify(business, &user("u1"), "").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn dns_timeout_is_transient_and_leaves_claim_untouched() {
    let h = harness();
    let business = h.listing();
    let id = h.dns_claim(business, "u1").await;
    h.resolver.set_txt("cornerbakery.example", &[TOKEN]);
    h.resolver.delay(Duration::from_secs(30));

    let err = h.service.verify(business, &user("u1"), "").await.unwrap_err();
    assert!(matches!(err, ClaimError::DnsLookupFailed { .. }));
    assert!(err.is_retryable());
    let stored = h.store.get_claim(id).unwrap();
    assert_eq!(stored.verification_status, VerificationStatus::Pending);
    assert_eq!(stored.last_failure, None);
}

#[tokio::test]
async fn resolver_failure_is_dns_lookup_failed() {
    let h = harness();
    let business = h.listing();
    h.dns_claim(business, "u1").await;
    h.resolver
        .fail("cornerbakery.example", ResolveError::ServerFailure(2));

    let err = h.service.verify(business, &user("u1"), "").await.unwrap_err();
    assert!(matches!(err, ClaimError::DnsLookupFailed { .. }));
}

#[tokio::test]
async fn nxdomain_is_dns_lookup_failed_and_leaves_claim_untouched() {
    let h = harness();
    let business = h.listing();
    let id = h.dns_claim(business, "u1").await;
    h.resolver
        .fail("cornerbakery.example", ResolveError::NxDomain);

    let err = h.service.verify(business, &user("u1"), "").await.unwrap_err();
    assert!(matches!(err, ClaimError::DnsLookupFailed { .. }));
    let stored = h.store.get_claim(id).unwrap();
    assert_eq!(stored.verification_status, VerificationStatus::Pending);
    assert_eq!(stored.last_failure, None);
    assert_eq!(stored.revision, 0);
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unverified_dns_claim_cannot_be_approved() {
    let h = harness();
    let business = h.listing();
    let id = h.dns_claim(business, "u1").await;

    let err = h
        .service
        .decide(id, Decision::Approve, &user("mod-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::NotVerified(_)));
    assert!(!h.service.get_business(business).unwrap().is_owned());
}

#[tokio::test]
async fn second_approval_for_same_business_is_already_owned() {
    let h = harness();
    let business = h.listing();
    let first = h.document_claim(business, "u1").await;
    let second = h.document_claim(business, "u2").await;

    h.service
        .decide(first, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();
    let err = h
        .service
        .decide(second, Decision::Approve, &user("mod-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::AlreadyOwned(_)));
    assert_eq!(
        h.service.get_business(business).unwrap().owner_id,
        Some(user("u1"))
    );
    assert_eq!(h.store.get_claim(second).unwrap().status, ClaimStatus::Pending);
}

#[tokio::test]
async fn reject_reopens_listing_for_new_claimant() {
    let h = harness();
    let business = h.listing();
    let id = h.document_claim(business, "u1").await;

    let after = h
        .service
        .decide(id, Decision::Reject, &user("mod-1"))
        .await
        .unwrap();
    assert_eq!(after.claim_status, BusinessClaimStatus::Unclaimed);
    assert_eq!(after.owner_id, None);
    assert_eq!(
        h.notifier.delivered().last().map(|n| n.kind),
        Some(NotificationKind::ClaimRejected)
    );

    let fresh = h.document_claim(business, "u2").await;
    assert_eq!(
        h.service.get_business(business).unwrap().claim_status,
        BusinessClaimStatus::Pending
    );
    h.service
        .decide(fresh, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();
    // The rejected claimant may file again, but the listing is now owned.
    let err = h
        .service
        .initiate(
            business,
            &user("u1"),
            MethodData::Document {
                proof_url: "https://files.example/other.pdf".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::AlreadyOwned(_)));
}

#[tokio::test]
async fn terminal_claims_stay_terminal() {
    let h = harness();
    let business = h.listing();
    let id = h.email_claim(business, "u1").await;
    h.service
        .decide(id, Decision::Reject, &user("mod-1"))
        .await
        .unwrap();

    let err = h
        .service
        .decide(id, Decision::Approve, &user("mod-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::AlreadyDecided(_)));

    // With no pending claim left, proof submissions have nothing to act on.
    let err = h
        .service
        .verify(business, &user("u1"), OTP)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::NoPendingClaim(_)));
}

#[tokio::test]
async fn deciding_unknown_claim_is_claim_not_found() {
    let h = harness();
    let err = h
        .service
        .decide(ClaimId::new(999), Decision::Reject, &user("mod-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::ClaimNotFound(_)));
}

#[tokio::test]
async fn vacate_allows_a_new_owner() {
    let h = harness();
    let business = h.listing();
    let id = h.document_claim(business, "u1").await;
    h.service
        .decide(id, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();

    let vacated = h.service.vacate(business, &user("mod-1")).unwrap();
    assert!(!vacated.is_owned());
    let next = h.document_claim(business, "u2").await;
    let after = h
        .service
        .decide(next, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();
    assert_eq!(after.owner_id, Some(user("u2")));
}

// ---------------------------------------------------------------------------
// Status views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn claim_status_shows_latest_claim_without_secrets() {
    let h = harness();
    let business = h.listing();
    h.email_claim(business, "u1").await;

    let view = h.service.claim_status(business, &user("u1")).unwrap();
    assert_eq!(view.verification_status, VerificationStatus::Pending);
    assert_eq!(
        view.resend_available_at.map(|t| t.as_secs()),
        Some(START + 60)
    );
    let json = serde_json::to_string(&view).unwrap();
    assert!(!json.contains(OTP));

    let err = h.service.claim_status(business, &user("u2")).unwrap_err();
    assert!(matches!(err, ClaimError::NoPendingClaim(_)));
}

#[tokio::test]
async fn list_claims_filters_by_status() {
    let h = harness();
    let business = h.listing();
    let a = h.document_claim(business, "u1").await;
    h.document_claim(business, "u2").await;
    h.service
        .decide(a, Decision::Reject, &user("mod-1"))
        .await
        .unwrap();

    let pending = h
        .service
        .list_claims(Some(ClaimStatus::Pending), 0, 100)
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(h.service.list_claims(None, 0, 100).unwrap().len(), 2);
    assert_eq!(h.service.list_claims(None, 1, 100).unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// LMDB-backed workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn workflow_on_lmdb_with_store_notifier() {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = Arc::new(LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("open env"));
    let store: Arc<dyn ClaimsStore> = env.clone();
    let clock = Arc::new(NullClock::new(START));
    let mailer = Arc::new(NullMailer::new());
    let deps = ClaimDeps {
        store: store.clone(),
        clock: clock.clone(),
        codes: Arc::new(NullCodeGenerator::new().with_otps([OTP])),
        mailer: mailer.clone(),
        notifier: Arc::new(StoreNotifier::new(env.clone(), clock.clone())),
        resolver: Arc::new(NullResolver::new()),
    };
    let service = ClaimService::new(deps, ClaimPolicy::default(), vec![user("mod-1")]);

    let business = service.register_business("Harbor Books").unwrap().id;
    let claim = service
        .initiate(
            business,
            &user("u1"),
            MethodData::Email {
                email_address: "books@harbor.example".into(),
            },
        )
        .await
        .unwrap()
        .claim;
    clock.advance(60);
    service.verify(business, &user("u1"), OTP).await.unwrap();
    service
        .decide(claim.id, Decision::Approve, &user("mod-1"))
        .await
        .unwrap();

    assert_eq!(env.get_business(business).unwrap().owner_id, Some(user("u1")));
    assert_eq!(env.business_count().unwrap(), 1);

    let mod_inbox = service.notifications(&user("mod-1"), true).unwrap();
    assert_eq!(mod_inbox.len(), 1);
    assert_eq!(mod_inbox[0].kind, NotificationKind::ClaimSubmitted);

    let inbox = service.notifications(&user("u1"), false).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::ClaimApproved);
    let read = service
        .mark_notification_read(&user("u1"), inbox[0].id)
        .unwrap();
    assert!(read.read);
    assert!(service.notifications(&user("u1"), true).unwrap().is_empty());

    let err = service
        .mark_notification_read(&user("mod-1"), inbox[0].id)
        .unwrap_err();
    assert!(matches!(err, ClaimError::NotificationNotFound(_)));
}

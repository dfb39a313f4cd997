//! LMDB implementation of ClaimStore.
//!
//! `create_claim` and `decide_claim` are the two conditional writes of the
//! claim workflow. Each reads the current state and writes the result inside
//! one `RwTxn`, so concurrent callers serialize on the LMDB writer lock.

use heed::RoTxn;
use listwise_store::rules::{admit_claim, apply_decision, prepare_update};
use listwise_store::{ClaimStore, DecisionRecord, StoreError};
use listwise_types::{
    Business, BusinessClaim, BusinessId, ClaimDraft, ClaimId, ClaimStatus, Decision, Timestamp,
    UserId,
};

use crate::environment::{encode, read, LmdbEnvironment};
use crate::keys::pair_key;
use crate::meta::Counter;
use crate::LmdbError;

impl LmdbEnvironment {
    fn indexed_claim(
        &self,
        txn: &RoTxn,
        index: heed::Database<heed::types::Bytes, heed::types::Bytes>,
        business: BusinessId,
        claimant: &UserId,
    ) -> Result<Option<BusinessClaim>, StoreError> {
        let id = match index
            .get(txn, &pair_key(business, claimant))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => ClaimId::from_key(bytes)
                .ok_or_else(|| StoreError::Corruption("malformed claim index entry".into()))?,
            None => return Ok(None),
        };
        let claim = read(self.claims_db, txn, &id.to_key())?
            .ok_or_else(|| StoreError::Corruption(format!("index points at missing {id}")))?;
        Ok(Some(claim))
    }
}

impl ClaimStore for LmdbEnvironment {
    fn create_claim(&self, draft: ClaimDraft) -> Result<BusinessClaim, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let mut business: Business = read(self.businesses_db, &wtxn, &draft.business_id.to_key())?
            .ok_or_else(|| StoreError::NotFound(draft.business_id.to_string()))?;
        let pair = pair_key(draft.business_id, &draft.claimant_id);
        let pending = match self
            .pending_claims_db
            .get(&wtxn, &pair)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(
                ClaimId::from_key(bytes)
                    .ok_or_else(|| StoreError::Corruption("malformed claim index entry".into()))?,
            ),
            None => None,
        };
        admit_claim(&business, pending, &draft)?;

        let id = ClaimId::new(self.next_id(&mut wtxn, Counter::Claim)?);
        let claim = draft.into_claim(id);
        business.mark_claim_pending();

        self.claims_db
            .put(&mut wtxn, &id.to_key(), &encode(&claim)?)
            .map_err(LmdbError::from)?;
        self.pending_claims_db
            .put(&mut wtxn, &pair, &id.to_key())
            .map_err(LmdbError::from)?;
        self.latest_claims_db
            .put(&mut wtxn, &pair, &id.to_key())
            .map_err(LmdbError::from)?;
        self.businesses_db
            .put(&mut wtxn, &business.id.to_key(), &encode(&business)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(claim = %claim.id, business = %claim.business_id, "stored pending claim");
        Ok(claim)
    }

    fn get_claim(&self, id: ClaimId) -> Result<BusinessClaim, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        read(self.claims_db, &rtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn pending_claim(
        &self,
        business: BusinessId,
        claimant: &UserId,
    ) -> Result<Option<BusinessClaim>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.indexed_claim(&rtxn, self.pending_claims_db, business, claimant)
    }

    fn latest_claim(
        &self,
        business: BusinessId,
        claimant: &UserId,
    ) -> Result<Option<BusinessClaim>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.indexed_claim(&rtxn, self.latest_claims_db, business, claimant)
    }

    fn update_pending_claim(&self, claim: &BusinessClaim) -> Result<BusinessClaim, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let stored: BusinessClaim = read(self.claims_db, &wtxn, &claim.id.to_key())?
            .ok_or_else(|| StoreError::NotFound(claim.id.to_string()))?;
        let next = prepare_update(&stored, claim)?;
        self.claims_db
            .put(&mut wtxn, &claim.id.to_key(), &encode(&next)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(next)
    }

    fn decide_claim(
        &self,
        id: ClaimId,
        decision: Decision,
        moderator: &UserId,
        now: Timestamp,
    ) -> Result<DecisionRecord, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let mut claim: BusinessClaim = read(self.claims_db, &wtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut business: Business = read(self.businesses_db, &wtxn, &claim.business_id.to_key())?
            .ok_or_else(|| StoreError::NotFound(claim.business_id.to_string()))?;

        apply_decision(&mut claim, &mut business, decision, moderator, now)?;

        self.claims_db
            .put(&mut wtxn, &id.to_key(), &encode(&claim)?)
            .map_err(LmdbError::from)?;
        self.businesses_db
            .put(&mut wtxn, &business.id.to_key(), &encode(&business)?)
            .map_err(LmdbError::from)?;
        self.pending_claims_db
            .delete(&mut wtxn, &pair_key(claim.business_id, &claim.claimant_id))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(DecisionRecord { claim, business })
    }

    fn list_claims(
        &self,
        status: Option<ClaimStatus>,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<BusinessClaim>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        let mut skipped = 0u64;
        for entry in self.claims_db.iter(&rtxn).map_err(LmdbError::from)? {
            if out.len() >= limit {
                break;
            }
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            let claim: BusinessClaim = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            if status.is_some_and(|s| s != claim.status) {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            out.push(claim);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listwise_store::BusinessStore;
    use listwise_types::{BusinessClaimStatus, ClaimProof, VerificationStatus};

    fn open() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        (dir, env)
    }

    fn user(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn dns_draft(business: BusinessId, claimant: &str) -> ClaimDraft {
        ClaimDraft {
            business_id: business,
            claimant_id: user(claimant),
            proof: ClaimProof::Dns {
                domain: "harborbooks.example".into(),
                verification_token: "verify=00ff".into(),
            },
            created_at: Timestamp::new(100),
        }
    }

    #[test]
    fn create_claim_marks_listing_pending() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
        let claim = env.create_claim(dns_draft(b.id, "alice")).unwrap();

        assert_eq!(claim.id, ClaimId::new(1));
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(
            env.get_business(b.id).unwrap().claim_status,
            BusinessClaimStatus::Pending
        );
        assert_eq!(
            env.pending_claim(b.id, &user("alice")).unwrap(),
            Some(claim.clone())
        );
        assert_eq!(env.latest_claim(b.id, &user("alice")).unwrap(), Some(claim));
    }

    #[test]
    fn second_pending_claim_is_duplicate() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
        env.create_claim(dns_draft(b.id, "alice")).unwrap();
        let err = env.create_claim(dns_draft(b.id, "alice")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        // A different claimant may still file.
        env.create_claim(dns_draft(b.id, "bob")).unwrap();
    }

    #[test]
    fn claim_on_unknown_business_is_not_found() {
        let (_dir, env) = open();
        let err = env
            .create_claim(dns_draft(BusinessId::new(77), "alice"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn concurrent_creates_admit_exactly_one() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| env.create_claim(dns_draft(b.id, "alice"))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StoreError::Duplicate(_))));
    }

    #[test]
    fn concurrent_approvals_grant_one_owner() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
        let mut ids = Vec::new();
        for name in ["alice", "bob", "carol"] {
            let mut claim = env.create_claim(dns_draft(b.id, name)).unwrap();
            claim.mark_verified(Timestamp::new(200));
            env.update_pending_claim(&claim).unwrap();
            ids.push(claim.id);
        }

        let moderator = user("mod");
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = ids
                .iter()
                .map(|id| {
                    let env = &env;
                    let moderator = &moderator;
                    s.spawn(move || {
                        env.decide_claim(*id, Decision::Approve, moderator, Timestamp::new(300))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StoreError::AlreadyOwned(_))));
        assert!(env.get_business(b.id).unwrap().is_owned());
    }

    #[test]
    fn decision_clears_pending_index_and_allows_refile() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
        let claim = env.create_claim(dns_draft(b.id, "alice")).unwrap();

        let record = env
            .decide_claim(claim.id, Decision::Reject, &user("mod"), Timestamp::new(400))
            .unwrap();
        assert_eq!(record.claim.status, ClaimStatus::Rejected);
        assert_eq!(record.business.claim_status, BusinessClaimStatus::Unclaimed);
        assert_eq!(env.pending_claim(b.id, &user("alice")).unwrap(), None);

        let again = env.create_claim(dns_draft(b.id, "alice")).unwrap();
        assert_eq!(
            env.latest_claim(b.id, &user("alice")).unwrap().map(|c| c.id),
            Some(again.id)
        );
    }

    #[test]
    fn update_after_decision_is_rejected() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
        let mut claim = env.create_claim(dns_draft(b.id, "alice")).unwrap();
        env.decide_claim(claim.id, Decision::Reject, &user("mod"), Timestamp::new(400))
            .unwrap();

        claim.mark_verified(Timestamp::new(500));
        let err = env.update_pending_claim(&claim).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyDecided(_)));
        assert_eq!(
            env.get_claim(claim.id).unwrap().verification_status,
            VerificationStatus::Pending
        );
    }

    #[test]
    fn concurrent_updates_from_one_read_commit_once() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
        let read_once = env.create_claim(dns_draft(b.id, "alice")).unwrap();

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let env = &env;
                    let mut claim = read_once.clone();
                    s.spawn(move || {
                        if i == 0 {
                            claim.mark_verified(Timestamp::new(200));
                        } else {
                            claim.mark_failed("token_not_found");
                        }
                        env.update_pending_claim(&claim)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, StoreError::Stale(_))));
        assert_eq!(env.get_claim(read_once.id).unwrap().revision, 1);
    }

    #[test]
    fn list_claims_filters_and_pages() {
        let (_dir, env) = open();
        let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
        for name in ["a", "b", "c", "d"] {
            env.create_claim(dns_draft(b.id, name)).unwrap();
        }
        env.decide_claim(ClaimId::new(2), Decision::Reject, &user("mod"), Timestamp::new(5))
            .unwrap();

        let pending = env.list_claims(Some(ClaimStatus::Pending), 0, 10).unwrap();
        let ids: Vec<u64> = pending.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        let page = env.list_claims(None, 1, 2).unwrap();
        let ids: Vec<u64> = page.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn claims_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
            let b = env.create_business("Harbor Books", Timestamp::new(1)).unwrap();
            env.create_claim(dns_draft(b.id, "alice")).unwrap().id
        };
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        assert_eq!(env.get_claim(id).unwrap().claimant_id, user("alice"));
        // Counters persist too.
        let b = env.create_business("Corner Bakery", Timestamp::new(2)).unwrap();
        assert_eq!(b.id, BusinessId::new(2));
    }
}

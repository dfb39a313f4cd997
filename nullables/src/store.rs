//! Nullable store — thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use listwise_store::rules::{admit_claim, apply_decision, prepare_update};
use listwise_store::{BusinessStore, ClaimStore, DecisionRecord, NotificationStore, StoreError};
use listwise_types::{
    Business, BusinessClaim, BusinessId, ClaimDraft, ClaimId, ClaimStatus, Decision,
    NewNotification, Notification, NotificationId, Timestamp, UserId,
};

use crate::lock;

#[derive(Default)]
struct State {
    businesses: BTreeMap<BusinessId, Business>,
    claims: BTreeMap<ClaimId, BusinessClaim>,
    pending: HashMap<(BusinessId, UserId), ClaimId>,
    latest: HashMap<(BusinessId, UserId), ClaimId>,
    notifications: BTreeMap<NotificationId, Notification>,
    next_business: u64,
    next_claim: u64,
    next_notification: u64,
    fail_writes: Option<String>,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// An in-memory implementation of every store trait.
///
/// All state sits behind one mutex, so each operation is atomic the same
/// way an LMDB write transaction is. Thread-safe for use with tokio's
/// multi-threaded runtime.
#[derive(Default)]
pub struct NullStore {
    state: Mutex<State>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, reason: impl Into<String>) {
        lock(&self.state).fail_writes = Some(reason.into());
    }

    pub fn claim_count(&self) -> usize {
        lock(&self.state).claims.len()
    }
}

impl State {
    fn check_writable(&self) -> Result<(), StoreError> {
        match &self.fail_writes {
            Some(reason) => Err(StoreError::Backend(reason.clone())),
            None => Ok(()),
        }
    }
}

impl BusinessStore for NullStore {
    fn create_business(&self, name: &str, now: Timestamp) -> Result<Business, StoreError> {
        let mut state = lock(&self.state);
        state.check_writable()?;
        let id = BusinessId::new(next(&mut state.next_business));
        let business = Business::new(id, name, now);
        state.businesses.insert(id, business.clone());
        Ok(business)
    }

    fn get_business(&self, id: BusinessId) -> Result<Business, StoreError> {
        lock(&self.state)
            .businesses
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn vacate_ownership(&self, id: BusinessId) -> Result<Business, StoreError> {
        let mut state = lock(&self.state);
        state.check_writable()?;
        let business = state
            .businesses
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        business.vacate();
        Ok(business.clone())
    }

    fn business_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.state).businesses.len() as u64)
    }
}

impl ClaimStore for NullStore {
    fn create_claim(&self, draft: ClaimDraft) -> Result<BusinessClaim, StoreError> {
        let mut state = lock(&self.state);
        state.check_writable()?;
        let pair = (draft.business_id, draft.claimant_id.clone());
        let mut business = state
            .businesses
            .get(&draft.business_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(draft.business_id.to_string()))?;
        admit_claim(&business, state.pending.get(&pair).copied(), &draft)?;

        let id = ClaimId::new(next(&mut state.next_claim));
        let claim = draft.into_claim(id);
        business.mark_claim_pending();
        state.businesses.insert(business.id, business);
        state.claims.insert(id, claim.clone());
        state.pending.insert(pair.clone(), id);
        state.latest.insert(pair, id);
        Ok(claim)
    }

    fn get_claim(&self, id: ClaimId) -> Result<BusinessClaim, StoreError> {
        lock(&self.state)
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn pending_claim(
        &self,
        business: BusinessId,
        claimant: &UserId,
    ) -> Result<Option<BusinessClaim>, StoreError> {
        let state = lock(&self.state);
        Ok(state
            .pending
            .get(&(business, claimant.clone()))
            .and_then(|id| state.claims.get(id))
            .cloned())
    }

    fn latest_claim(
        &self,
        business: BusinessId,
        claimant: &UserId,
    ) -> Result<Option<BusinessClaim>, StoreError> {
        let state = lock(&self.state);
        Ok(state
            .latest
            .get(&(business, claimant.clone()))
            .and_then(|id| state.claims.get(id))
            .cloned())
    }

    fn update_pending_claim(&self, claim: &BusinessClaim) -> Result<BusinessClaim, StoreError> {
        let mut state = lock(&self.state);
        state.check_writable()?;
        let stored = state
            .claims
            .get(&claim.id)
            .ok_or_else(|| StoreError::NotFound(claim.id.to_string()))?;
        let next = prepare_update(stored, claim)?;
        state.claims.insert(claim.id, next.clone());
        Ok(next)
    }

    fn decide_claim(
        &self,
        id: ClaimId,
        decision: Decision,
        moderator: &UserId,
        now: Timestamp,
    ) -> Result<DecisionRecord, StoreError> {
        let mut state = lock(&self.state);
        state.check_writable()?;
        let mut claim = state
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut business = state
            .businesses
            .get(&claim.business_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(claim.business_id.to_string()))?;

        apply_decision(&mut claim, &mut business, decision, moderator, now)?;

        state
            .pending
            .remove(&(claim.business_id, claim.claimant_id.clone()));
        state.claims.insert(id, claim.clone());
        state.businesses.insert(business.id, business.clone());
        Ok(DecisionRecord { claim, business })
    }

    fn list_claims(
        &self,
        status: Option<ClaimStatus>,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<BusinessClaim>, StoreError> {
        Ok(lock(&self.state)
            .claims
            .values()
            .filter(|c| status.map_or(true, |s| s == c.status))
            .skip(offset as usize)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl NotificationStore for NullStore {
    fn put_notification(
        &self,
        notification: NewNotification,
        now: Timestamp,
    ) -> Result<Notification, StoreError> {
        let mut state = lock(&self.state);
        state.check_writable()?;
        let id = NotificationId::new(next(&mut state.next_notification));
        let stored = Notification::from_new(id, notification, now);
        state.notifications.insert(id, stored.clone());
        Ok(stored)
    }

    fn notifications_for(
        &self,
        user: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, StoreError> {
        Ok(lock(&self.state)
            .notifications
            .values()
            .rev()
            .filter(|n| &n.user_id == user && !(unread_only && n.read))
            .cloned()
            .collect())
    }

    fn mark_read(&self, user: &UserId, id: NotificationId) -> Result<Notification, StoreError> {
        let mut state = lock(&self.state);
        state.check_writable()?;
        match state.notifications.get_mut(&id) {
            Some(n) if &n.user_id == user => {
                n.read = true;
                Ok(n.clone())
            }
            _ => Err(StoreError::NotFound(format!("{id} for {user}"))),
        }
    }
}

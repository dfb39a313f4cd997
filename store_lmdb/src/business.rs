//! LMDB implementation of BusinessStore.

use listwise_store::{BusinessStore, StoreError};
use listwise_types::{Business, BusinessId, Timestamp};

use crate::environment::{encode, read, LmdbEnvironment};
use crate::meta::Counter;
use crate::LmdbError;

impl BusinessStore for LmdbEnvironment {
    fn create_business(&self, name: &str, now: Timestamp) -> Result<Business, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = BusinessId::new(self.next_id(&mut wtxn, Counter::Business)?);
        let business = Business::new(id, name, now);
        self.businesses_db
            .put(&mut wtxn, &id.to_key(), &encode(&business)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(business)
    }

    fn get_business(&self, id: BusinessId) -> Result<Business, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        read(self.businesses_db, &rtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn vacate_ownership(&self, id: BusinessId) -> Result<Business, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut business: Business = read(self.businesses_db, &wtxn, &id.to_key())?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        business.vacate();
        self.businesses_db
            .put(&mut wtxn, &id.to_key(), &encode(&business)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(business)
    }

    fn business_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.businesses_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

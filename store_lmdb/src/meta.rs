//! Schema version and id counters.

use heed::RwTxn;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Counter keys in the meta database.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Counter {
    Business,
    Claim,
    Notification,
}

impl Counter {
    fn key(self) -> &'static [u8] {
        match self {
            Counter::Business => b"next_business_id",
            Counter::Claim => b"next_claim_id",
            Counter::Notification => b"next_notification_id",
        }
    }
}

impl LmdbEnvironment {
    /// Take the next id from `counter` inside the caller's write transaction.
    /// Ids start at 1 and are never reused, even if the transaction aborts
    /// later (the increment aborts with it).
    pub(crate) fn next_id(&self, wtxn: &mut RwTxn, counter: Counter) -> Result<u64, LmdbError> {
        let current = match self.meta_db.get(wtxn, counter.key())? {
            Some(bytes) => decode_u64(bytes)?,
            None => 1,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| LmdbError::Serialization("id counter overflow".to_string()))?;
        self.meta_db
            .put(wtxn, counter.key(), &next.to_be_bytes())?;
        Ok(current)
    }

    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization(
                        "schema_version has unexpected byte length".to_string(),
                    )
                })?;
                Ok(u32::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// Stamp a fresh database with the current schema, or refuse one written
    /// by a newer build.
    pub(crate) fn ensure_schema(&self) -> Result<(), LmdbError> {
        let found = self.schema_version()?;
        if found > SCHEMA_VERSION {
            return Err(LmdbError::Serialization(format!(
                "database schema {found} is newer than supported {SCHEMA_VERSION}"
            )));
        }
        if found < SCHEMA_VERSION {
            let mut wtxn = self.env.write_txn()?;
            self.meta_db
                .put(&mut wtxn, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_le_bytes())?;
            wtxn.commit()?;
            tracing::info!(from = found, to = SCHEMA_VERSION, "stamped schema version");
        }
        Ok(())
    }
}

fn decode_u64(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("counter has unexpected byte length".to_string()))?;
    Ok(u64::from_be_bytes(arr))
}

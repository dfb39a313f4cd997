//! LMDB environment setup.

use std::fs;
use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LmdbError;

/// Default map size: 1 GiB. LMDB reserves address space, not disk.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
///
/// Cloning is cheap: `Env` is reference counted and database handles are
/// plain identifiers.
#[derive(Clone)]
pub struct LmdbEnvironment {
    pub(crate) env: Env,
    path: PathBuf,
    /// `business_id` -> `Business`
    pub(crate) businesses_db: Database<Bytes, Bytes>,
    /// `claim_id` -> `BusinessClaim`
    pub(crate) claims_db: Database<Bytes, Bytes>,
    /// `(business_id, claimant)` -> `claim_id` of the open claim
    pub(crate) pending_claims_db: Database<Bytes, Bytes>,
    /// `(business_id, claimant)` -> `claim_id` of the most recent claim
    pub(crate) latest_claims_db: Database<Bytes, Bytes>,
    /// `(recipient, notification_id)` -> `Notification`
    pub(crate) notifications_db: Database<Bytes, Bytes>,
    /// id counters and schema version
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        fs::create_dir_all(path).map_err(|e| LmdbError::Io(e.to_string()))?;

        // SAFETY: the environment is opened once per process per path; the
        // daemon never maps the same directory twice.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let businesses_db = env.create_database(&mut wtxn, Some("businesses"))?;
        let claims_db = env.create_database(&mut wtxn, Some("claims"))?;
        let pending_claims_db = env.create_database(&mut wtxn, Some("pending_claims"))?;
        let latest_claims_db = env.create_database(&mut wtxn, Some("latest_claims"))?;
        let notifications_db = env.create_database(&mut wtxn, Some("notifications"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        let this = Self {
            env,
            path: path.to_path_buf(),
            businesses_db,
            claims_db,
            pending_claims_db,
            latest_claims_db,
            notifications_db,
            meta_db,
        };
        this.ensure_schema()?;
        Ok(this)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

/// Read and decode one value. The returned value owns its data, so the
/// transaction may be written to afterwards.
pub(crate) fn read<T: DeserializeOwned>(
    db: Database<Bytes, Bytes>,
    txn: &RoTxn,
    key: &[u8],
) -> Result<Option<T>, LmdbError> {
    match db.get(txn, key)? {
        Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
        None => Ok(None),
    }
}

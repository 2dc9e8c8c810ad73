use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{company_key, CompanyClassification, CompanyType};

/// Durable row for one company. `company` is the normalized key, unique per store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub company: String,
    pub classification: CompanyClassification,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassificationRecord {
    fn fresh(company: String, classification: CompanyClassification) -> Self {
        let now = Utc::now();
        Self {
            company,
            classification,
            created_at: now,
            updated_at: now,
        }
    }

    fn replace(&mut self, classification: CompanyClassification) {
        self.classification = classification;
        self.updated_at = Utc::now();
    }
}

/// What an automatic upsert did.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// A manual record already exists and was left untouched.
    ManualPreserved(ClassificationRecord),
}

/// Persistence seam for company classifications. Keys are normalized with [`company_key`]
/// by the implementations, so callers may pass raw company names.
pub trait ClassificationStore: Send + Sync {
    fn fetch(&self, company: &str) -> Result<Option<ClassificationRecord>, StoreError>;

    /// Insert or refresh an automatic classification. Never overwrites a manual record.
    fn upsert_auto(
        &self,
        company: &str,
        classification: &CompanyClassification,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Operator override; replaces whatever is stored for the company.
    fn put_manual(
        &self,
        company: &str,
        company_type: CompanyType,
    ) -> Result<ClassificationRecord, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("classification store is busy")]
    Busy,
    #[error("company name is empty")]
    EmptyCompany,
    #[error("conflicting classification write for {0}")]
    Conflict(String),
    #[error("classification store unavailable: {0}")]
    Unavailable(String),
    #[error("classification store io failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("classification store is not valid json: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Only a busy store is worth another attempt; everything else goes back to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy)
    }
}

/// Bounded retry with exponential backoff around store calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(25),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            ..Self::default()
        }
    }

    pub fn run<T, F>(&self, operation: &str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Result<T, StoreError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            match call() {
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "retrying classification store call"
                    );
                    thread::sleep(backoff);
                    backoff = backoff.saturating_mul(self.multiplier.max(1));
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Process-local store; state is lost on restart.
#[derive(Default)]
pub struct InMemoryClassificationStore {
    records: Mutex<BTreeMap<String, ClassificationRecord>>,
}

impl InMemoryClassificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, ClassificationRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl ClassificationStore for InMemoryClassificationStore {
    fn fetch(&self, company: &str) -> Result<Option<ClassificationRecord>, StoreError> {
        Ok(self.lock()?.get(&company_key(company)).cloned())
    }

    fn upsert_auto(
        &self,
        company: &str,
        classification: &CompanyClassification,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut records = self.lock()?;
        Ok(apply_auto(&mut records, company_key(company), classification))
    }

    fn put_manual(
        &self,
        company: &str,
        company_type: CompanyType,
    ) -> Result<ClassificationRecord, StoreError> {
        let mut records = self.lock()?;
        Ok(apply_manual(&mut records, company_key(company), company_type))
    }
}

/// Write-through JSON file store. Each write lands in a sibling temp file that is renamed
/// over the target, so the file always holds a complete snapshot.
pub struct JsonFileClassificationStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, ClassificationRecord>>,
}

impl JsonFileClassificationStore {
    /// Opens the store, loading existing records; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => {
                let rows: Vec<ClassificationRecord> = serde_json::from_slice(&bytes)?;
                rows.into_iter()
                    .map(|record| (company_key(&record.company), record))
                    .collect()
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, ClassificationRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))
    }

    fn persist(&self, records: &BTreeMap<String, ClassificationRecord>) -> Result<(), StoreError> {
        let rows: Vec<&ClassificationRecord> = records.values().collect();
        let payload = serde_json::to_vec_pretty(&rows)?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&staging, payload).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Applies `change` to a copy and only commits it in memory once the file write succeeds.
    fn write_through<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, ClassificationRecord>) -> T,
    ) -> Result<T, StoreError> {
        let mut records = self.lock()?;
        let mut staged = records.clone();
        let outcome = change(&mut staged);
        self.persist(&staged)?;
        *records = staged;
        Ok(outcome)
    }
}

impl ClassificationStore for JsonFileClassificationStore {
    fn fetch(&self, company: &str) -> Result<Option<ClassificationRecord>, StoreError> {
        Ok(self.lock()?.get(&company_key(company)).cloned())
    }

    fn upsert_auto(
        &self,
        company: &str,
        classification: &CompanyClassification,
    ) -> Result<UpsertOutcome, StoreError> {
        let key = company_key(company);
        {
            let records = self.lock()?;
            if let Some(existing) = records.get(&key).filter(|r| r.classification.is_manual()) {
                return Ok(UpsertOutcome::ManualPreserved(existing.clone()));
            }
        }
        self.write_through(|records| apply_auto(records, key, classification))
    }

    fn put_manual(
        &self,
        company: &str,
        company_type: CompanyType,
    ) -> Result<ClassificationRecord, StoreError> {
        let key = company_key(company);
        self.write_through(|records| apply_manual(records, key, company_type))
    }
}

fn apply_auto(
    records: &mut BTreeMap<String, ClassificationRecord>,
    key: String,
    classification: &CompanyClassification,
) -> UpsertOutcome {
    match records.get_mut(&key) {
        Some(existing) if existing.classification.is_manual() => {
            UpsertOutcome::ManualPreserved(existing.clone())
        }
        Some(existing) => {
            existing.replace(classification.clone());
            UpsertOutcome::Updated
        }
        None => {
            records.insert(
                key.clone(),
                ClassificationRecord::fresh(key, classification.clone()),
            );
            UpsertOutcome::Inserted
        }
    }
}

fn apply_manual(
    records: &mut BTreeMap<String, ClassificationRecord>,
    key: String,
    company_type: CompanyType,
) -> ClassificationRecord {
    let classification = CompanyClassification::manual(company_type);
    let record = records
        .entry(key.clone())
        .and_modify(|existing| existing.replace(classification.clone()))
        .or_insert_with(|| ClassificationRecord::fresh(key, classification));
    record.clone()
}

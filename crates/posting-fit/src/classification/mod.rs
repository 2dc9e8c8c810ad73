//! Hardware/software company classification backed by a durable override store.
//!
//! Four weighted signals vote on a company type. Results are cached per classifier
//! instance and upserted into a [`ClassificationStore`]; operator overrides recorded as
//! manual entries always win over the signals.

mod domain;
mod repository;
mod signals;
mod tables;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

pub use domain::{
    company_key, ClassificationInput, ClassificationSource, CompanyClassification, CompanyType,
    InvalidConfidence, SignalKind, SignalResult,
};
pub use repository::{
    ClassificationRecord, ClassificationStore, InMemoryClassificationStore,
    JsonFileClassificationStore, RetryPolicy, StoreError, UpsertOutcome,
};
pub use tables::{ClassifierTables, ClassifierTablesConfig, CuratedMatch, TABLES_VERSION};

/// Below this agreement the winning type is not trusted and the company is reported unknown.
pub const MIN_CONFIDENCE: f64 = 0.3;

pub struct CompanyClassifier<S: ?Sized> {
    tables: Arc<ClassifierTables>,
    store: Arc<S>,
    retry: RetryPolicy,
    cache: Mutex<HashMap<String, CompanyClassification>>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S> CompanyClassifier<S>
where
    S: ClassificationStore + ?Sized,
{
    pub fn new(tables: Arc<ClassifierTables>, store: Arc<S>) -> Self {
        Self {
            tables,
            store,
            retry: RetryPolicy::default(),
            cache: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn tables(&self) -> &ClassifierTables {
        &self.tables
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Classifies a company, consulting the cache, then the store, then the signals.
    ///
    /// Calls for the same company are serialized so only one of them computes and upserts.
    pub fn classify(
        &self,
        input: &ClassificationInput,
    ) -> Result<CompanyClassification, StoreError> {
        let key = company_key(&input.company);
        if key.is_empty() {
            return Ok(CompanyClassification::unknown());
        }

        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let company_lock = self.company_lock(&key);
        let result = {
            let _serialized = company_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.classify_serialized(key.clone(), input)
        };
        self.release_lock(&key, company_lock);
        result
    }

    fn classify_serialized(
        &self,
        key: String,
        input: &ClassificationInput,
    ) -> Result<CompanyClassification, StoreError> {
        // Another caller may have finished while we waited for the lock.
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let stored = self.retry.run("fetch", || self.store.fetch(&key))?;
        if let Some(record) = stored.filter(|record| record.classification.is_manual()) {
            debug!(company = %key, company_type = %record.classification.company_type, "manual classification applied");
            return Ok(self.remember(key, record.classification));
        }

        let classification = self.compute(input);
        let outcome = self
            .retry
            .run("upsert", || self.store.upsert_auto(&key, &classification))?;

        let classification = match outcome {
            UpsertOutcome::ManualPreserved(record) => record.classification,
            UpsertOutcome::Inserted | UpsertOutcome::Updated => classification,
        };

        debug!(
            company = %key,
            company_type = %classification.company_type,
            confidence = classification.confidence(),
            "company classified"
        );
        Ok(self.remember(key, classification))
    }

    /// Records an operator override and makes it visible to this classifier immediately.
    pub fn record_manual(
        &self,
        company: &str,
        company_type: CompanyType,
    ) -> Result<ClassificationRecord, StoreError> {
        let key = company_key(company);
        if key.is_empty() {
            return Err(StoreError::EmptyCompany);
        }

        let company_lock = self.company_lock(&key);
        let result = {
            let _serialized = company_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.retry
                .run("put_manual", || self.store.put_manual(&key, company_type))
                .map(|record| {
                    self.remember(key.clone(), record.classification.clone());
                    record
                })
        };
        self.release_lock(&key, company_lock);

        let record = result?;
        info!(company = %key, company_type = %company_type, "manual classification recorded");
        Ok(record)
    }

    /// Stored record for a company, bypassing the cache.
    pub fn stored(&self, company: &str) -> Result<Option<ClassificationRecord>, StoreError> {
        let key = company_key(company);
        self.retry.run("fetch", || self.store.fetch(&key))
    }

    pub fn cached(&self, company: &str) -> Option<CompanyClassification> {
        self.cache_guard().get(&company_key(company)).cloned()
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache_guard();
        let dropped = cache.len();
        cache.clear();
        debug!(dropped, "classification cache cleared");
    }

    fn compute(&self, input: &ClassificationInput) -> CompanyClassification {
        let signals = signals::collect_signals(&self.tables, input);
        let (winner, confidence) = signals::combine(&signals);
        let company_type = if confidence < MIN_CONFIDENCE {
            CompanyType::Unknown
        } else {
            winner
        };

        CompanyClassification::new(company_type, confidence, signals, ClassificationSource::Auto)
            .unwrap_or_else(|err| {
                warn!(company = %input.company, error = %err, "discarding classification");
                CompanyClassification::unknown()
            })
    }

    fn remember(&self, key: String, classification: CompanyClassification) -> CompanyClassification {
        self.cache_guard().insert(key, classification.clone());
        classification
    }

    fn cache_guard(&self) -> MutexGuard<'_, HashMap<String, CompanyClassification>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn company_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Drops the per-company lock once no other caller holds or waits on it.
    fn release_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference is the map's, the other is ours.
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn classifier<S: ClassificationStore>(store: Arc<S>) -> CompanyClassifier<S> {
        let tables = Arc::new(ClassifierTables::standard().expect("tables compile"));
        CompanyClassifier::new(tables, store)
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(1)))
    }

    /// Counts calls and fails the first `busy_calls` of each kind with `Busy`.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryClassificationStore,
        busy_calls: usize,
        fetches: AtomicUsize,
        upserts: AtomicUsize,
    }

    impl CountingStore {
        fn busy_for(busy_calls: usize) -> Self {
            Self {
                busy_calls,
                ..Self::default()
            }
        }
    }

    impl ClassificationStore for CountingStore {
        fn fetch(&self, company: &str) -> Result<Option<ClassificationRecord>, StoreError> {
            if self.fetches.fetch_add(1, Ordering::SeqCst) < self.busy_calls {
                return Err(StoreError::Busy);
            }
            self.inner.fetch(company)
        }

        fn upsert_auto(
            &self,
            company: &str,
            classification: &CompanyClassification,
        ) -> Result<UpsertOutcome, StoreError> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            self.inner.upsert_auto(company, classification)
        }

        fn put_manual(
            &self,
            company: &str,
            company_type: CompanyType,
        ) -> Result<ClassificationRecord, StoreError> {
            self.inner.put_manual(company, company_type)
        }
    }

    struct BrokenStore;

    impl ClassificationStore for BrokenStore {
        fn fetch(&self, _company: &str) -> Result<Option<ClassificationRecord>, StoreError> {
            Err(StoreError::Unavailable("database offline".to_string()))
        }

        fn upsert_auto(
            &self,
            _company: &str,
            _classification: &CompanyClassification,
        ) -> Result<UpsertOutcome, StoreError> {
            Err(StoreError::Unavailable("database offline".to_string()))
        }

        fn put_manual(
            &self,
            _company: &str,
            _company_type: CompanyType,
        ) -> Result<ClassificationRecord, StoreError> {
            Err(StoreError::Unavailable("database offline".to_string()))
        }
    }

    #[test]
    fn hardware_company_name_and_domain_agree() {
        let classifier = classifier(Arc::new(InMemoryClassificationStore::new()));
        let input = ClassificationInput {
            company: "Hardware Automation Co".to_string(),
            domain_keywords: vec!["hardware".to_string(), "automation".to_string()],
            job_title: Some("VP of Engineering".to_string()),
            job_description: None,
        };

        let result = classifier.classify(&input).expect("classification");
        assert_eq!(result.company_type, CompanyType::Hardware);
        assert_eq!(result.confidence(), 0.5);
        assert_eq!(result.source, ClassificationSource::Auto);
        assert_eq!(result.signals.len(), SignalKind::ALL.len());

        let stored = classifier.stored("hardware automation co").expect("fetch").expect("row");
        assert_eq!(stored.classification, result);
    }

    #[test]
    fn weak_agreement_is_reported_unknown_with_its_confidence() {
        let classifier = classifier(Arc::new(InMemoryClassificationStore::new()));
        let input = ClassificationInput {
            company: "Acme".to_string(),
            domain_keywords: vec!["robotics".to_string()],
            ..ClassificationInput::default()
        };

        let result = classifier.classify(&input).expect("classification");
        assert_eq!(result.company_type, CompanyType::Unknown);
        assert_eq!(result.confidence(), 0.2);
    }

    #[test]
    fn curated_list_outweighs_name_keywords() {
        let classifier = classifier(Arc::new(InMemoryClassificationStore::new()));
        let result = classifier
            .classify(&ClassificationInput::for_company("Salesforce"))
            .expect("classification");
        assert_eq!(result.company_type, CompanyType::Software);
        assert_eq!(result.confidence(), 0.4);
    }

    #[test]
    fn manual_override_round_trips_through_automatic_classification() {
        let store = Arc::new(InMemoryClassificationStore::new());
        let classifier = classifier(Arc::clone(&store));

        classifier
            .record_manual("Acme Software", CompanyType::Hardware)
            .expect("manual write");
        classifier.clear_cache();

        let result = classifier
            .classify(&ClassificationInput::for_company("Acme Software"))
            .expect("classification");
        assert_eq!(result, CompanyClassification::manual(CompanyType::Hardware));

        store
            .upsert_auto("Acme Software", &CompanyClassification::unknown())
            .expect("auto write attempt");
        let stored = store.fetch("acme software").expect("fetch").expect("row");
        assert_eq!(stored.classification, CompanyClassification::manual(CompanyType::Hardware));
    }

    #[test]
    fn cache_serves_repeat_calls_until_cleared() {
        let store = Arc::new(CountingStore::default());
        let classifier = classifier(Arc::clone(&store));
        let input = ClassificationInput::for_company("Robotics Cloud Inc");

        let first = classifier.classify(&input).expect("first");
        let second = classifier.classify(&input).expect("second");
        assert_eq!(first, second);
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
        assert!(classifier.cached("robotics cloud inc").is_some());

        classifier.clear_cache();
        assert!(classifier.cached("Robotics Cloud Inc").is_none());
        classifier.classify(&input).expect("third");
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn busy_store_is_retried_before_succeeding() {
        let store = Arc::new(CountingStore::busy_for(2));
        let classifier = classifier(Arc::clone(&store));

        let result = classifier
            .classify(&ClassificationInput::for_company("NVIDIA"))
            .expect("third fetch succeeds");
        assert_eq!(result.company_type, CompanyType::Hardware);
        assert_eq!(store.fetches.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn busy_store_surfaces_after_retry_budget() {
        let store = Arc::new(CountingStore::busy_for(10));
        let classifier = classifier(Arc::clone(&store));

        let err = classifier
            .classify(&ClassificationInput::for_company("NVIDIA"))
            .expect_err("retry budget exhausted");
        assert!(matches!(err, StoreError::Busy));
        assert_eq!(store.fetches.load(Ordering::SeqCst), 3);
        assert!(classifier.cached("NVIDIA").is_none());
    }

    #[test]
    fn non_retryable_store_errors_surface_immediately() {
        let classifier = classifier(Arc::new(BrokenStore));
        let err = classifier
            .classify(&ClassificationInput::for_company("Teradyne"))
            .expect_err("store offline");
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn blank_company_is_unknown_without_touching_the_store() {
        let classifier = classifier(Arc::new(BrokenStore));
        let result = classifier
            .classify(&ClassificationInput::for_company("   "))
            .expect("no store access");
        assert_eq!(result, CompanyClassification::unknown());
    }

    #[test]
    fn concurrent_calls_for_one_company_upsert_once() {
        let store = Arc::new(CountingStore::default());
        let classifier = Arc::new(classifier(Arc::clone(&store)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let classifier = Arc::clone(&classifier);
                thread::spawn(move || {
                    classifier
                        .classify(&ClassificationInput::for_company("Skydio"))
                        .expect("classification")
                })
            })
            .collect();

        for handle in handles {
            let result = handle.join().expect("worker thread");
            assert_eq!(result.company_type, CompanyType::Hardware);
        }
        assert_eq!(store.upserts.load(Ordering::SeqCst), 1);
        assert_eq!(classifier.in_flight_len(), 0);
    }

    #[test]
    fn per_company_locks_are_dropped_after_use() {
        let classifier = classifier(Arc::new(InMemoryClassificationStore::new()));
        for company in ["Skydio", "Teradyne", "Acme Software"] {
            classifier
                .classify(&ClassificationInput::for_company(company))
                .expect("classification");
        }
        classifier
            .record_manual("Pineapple Labs", CompanyType::Hardware)
            .expect("manual write");
        assert_eq!(classifier.in_flight_len(), 0);
    }

    #[test]
    fn failed_classification_still_drops_its_lock() {
        let broken = classifier(Arc::new(BrokenStore));
        broken
            .classify(&ClassificationInput::for_company("Teradyne"))
            .expect_err("store offline");
        assert_eq!(broken.in_flight_len(), 0);
    }

    #[test]
    fn manual_override_needs_a_company_name() {
        let classifier = classifier(Arc::new(InMemoryClassificationStore::new()));
        let err = classifier
            .record_manual("  ", CompanyType::Hardware)
            .expect_err("blank name");
        assert!(matches!(err, StoreError::EmptyCompany));
        assert_eq!(classifier.in_flight_len(), 0);
    }
}

//! # Mock Data Service & Testing Guide
//!
//! [`MockDataService<R>`] implements the same [`DataService<R>`] contract as a real store
//! but answers from a queue of expectations. It lets you script exactly what the store
//! returns, and then check how many times and in what order the controllers called it.
//!
//! ## When to use the Mock vs the In-Memory Store
//!
//! | Feature | MockDataService | InMemoryDataService |
//! |---------|-----------------|---------------------|
//! | **Determinism** | Scripted answers | Real state |
//! | **Call counting** | Every call must be expected | Not tracked |
//! | **Error Injection** | Easy (`return_err`) | Not possible |
//! | **Use Case** | Controller logic in isolation | Full-system flows |
//!
//! ## Example
//!
//! ```rust,ignore
//! let mock = Arc::new(MockDataService::<WeatherStation>::new());
//! mock.expect_get_record(5).return_ok(Some(station));
//!
//! let mut controller = RecordController::new(mock.clone(), EventBus::default());
//! controller.load(5, false).await?;
//! controller.load(5, false).await?; // cached, no second fetch
//!
//! mock.verify(); // panics if an expectation was not consumed
//! ```
//!
//! Calls are matched strictly in order. A call with no matching expectation at the head
//! of the queue panics, which fails the test that made it.

use crate::controller::FilterList;
use crate::framework::entity::DbRecord;
use crate::framework::error::DataError;
use crate::framework::service::{DataService, TaskResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

type Queue<R> = Arc<Mutex<VecDeque<Expectation<R>>>>;

/// One scripted call and its answer.
enum Expectation<R> {
    GetRecord {
        id: i64,
        response: Result<Option<R>, DataError>,
    },
    GetRecordByGuid {
        guid: Uuid,
        response: Result<Option<R>, DataError>,
    },
    GetRecordList {
        response: Result<Vec<R>, DataError>,
    },
    GetFilteredList {
        response: Result<Vec<R>, DataError>,
    },
    GetRecordCount {
        response: Result<usize, DataError>,
    },
    Create {
        response: Result<TaskResult, DataError>,
    },
    Update {
        response: Result<TaskResult, DataError>,
    },
    Delete {
        response: Result<TaskResult, DataError>,
    },
    LookupList {
        response: Result<BTreeMap<i64, String>, DataError>,
    },
    DistinctValues {
        field: String,
        response: Result<Vec<String>, DataError>,
    },
}

impl<R> Expectation<R> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::GetRecord { .. } => "get_record",
            Expectation::GetRecordByGuid { .. } => "get_record_by_guid",
            Expectation::GetRecordList { .. } => "get_record_list",
            Expectation::GetFilteredList { .. } => "get_filtered_record_list",
            Expectation::GetRecordCount { .. } => "get_record_count",
            Expectation::Create { .. } => "create_record",
            Expectation::Update { .. } => "update_record",
            Expectation::Delete { .. } => "delete_record",
            Expectation::LookupList { .. } => "get_lookup_list",
            Expectation::DistinctValues { .. } => "get_distinct_values",
        }
    }
}

/// A data service with expectation tracking for fluent testing.
pub struct MockDataService<R> {
    expectations: Queue<R>,
    filters: Mutex<Vec<FilterList>>,
    written: Mutex<Vec<R>>,
}

impl<R: DbRecord> Default for MockDataService<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: DbRecord> MockDataService<R> {
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            filters: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
        }
    }

    fn builder<T>(
        &self,
        make: impl FnOnce(Result<T, DataError>) -> Expectation<R> + Send + 'static,
    ) -> ExpectationBuilder<R, T> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            make: Box::new(make),
        }
    }

    pub fn expect_get_record(&self, id: i64) -> ExpectationBuilder<R, Option<R>> {
        self.builder(move |response| Expectation::GetRecord { id, response })
    }

    pub fn expect_get_record_by_guid(&self, guid: Uuid) -> ExpectationBuilder<R, Option<R>> {
        self.builder(move |response| Expectation::GetRecordByGuid { guid, response })
    }

    pub fn expect_get_record_list(&self) -> ExpectationBuilder<R, Vec<R>> {
        self.builder(|response| Expectation::GetRecordList { response })
    }

    pub fn expect_get_filtered_list(&self) -> ExpectationBuilder<R, Vec<R>> {
        self.builder(|response| Expectation::GetFilteredList { response })
    }

    pub fn expect_get_record_count(&self) -> ExpectationBuilder<R, usize> {
        self.builder(|response| Expectation::GetRecordCount { response })
    }

    pub fn expect_create(&self) -> ExpectationBuilder<R, TaskResult> {
        self.builder(|response| Expectation::Create { response })
    }

    pub fn expect_update(&self) -> ExpectationBuilder<R, TaskResult> {
        self.builder(|response| Expectation::Update { response })
    }

    pub fn expect_delete(&self) -> ExpectationBuilder<R, TaskResult> {
        self.builder(|response| Expectation::Delete { response })
    }

    pub fn expect_lookup_list(&self) -> ExpectationBuilder<R, BTreeMap<i64, String>> {
        self.builder(|response| Expectation::LookupList { response })
    }

    pub fn expect_distinct_values(&self, field: &str) -> ExpectationBuilder<R, Vec<String>> {
        let field = field.to_string();
        self.builder(move |response| Expectation::DistinctValues { field, response })
    }

    /// Filter lists received by `get_filtered_record_list`, in call order.
    pub fn received_filters(&self) -> Vec<FilterList> {
        lock(&self.filters).clone()
    }

    /// Records passed to create, update and delete, in call order.
    pub fn written_records(&self) -> Vec<R> {
        lock(&self.written).clone()
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let exps = lock(&self.expectations);
        if !exps.is_empty() {
            let pending: Vec<_> = exps.iter().map(Expectation::name).collect();
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                exps.len(),
                pending
            );
        }
    }

    fn next(&self, call: &str) -> Expectation<R> {
        match lock(&self.expectations).pop_front() {
            Some(expectation) => expectation,
            None => panic!("Unexpected call to {}: no expectations left", call),
        }
    }
}

fn mismatch<R>(call: &str, expected: &Expectation<R>) -> ! {
    panic!(
        "Unexpected call to {}: next expectation is {}",
        call,
        expected.name()
    )
}

#[async_trait]
impl<R: DbRecord> DataService<R> for MockDataService<R> {
    async fn get_record(&self, id: i64) -> Result<Option<R>, DataError> {
        match self.next("get_record") {
            Expectation::GetRecord {
                id: expected,
                response,
            } => {
                assert_eq!(expected, id, "get_record called with unexpected id");
                response
            }
            other => mismatch("get_record", &other),
        }
    }

    async fn get_record_by_guid(&self, guid: Uuid) -> Result<Option<R>, DataError> {
        match self.next("get_record_by_guid") {
            Expectation::GetRecordByGuid {
                guid: expected,
                response,
            } => {
                assert_eq!(expected, guid, "get_record_by_guid called with unexpected guid");
                response
            }
            other => mismatch("get_record_by_guid", &other),
        }
    }

    async fn get_record_list(&self) -> Result<Vec<R>, DataError> {
        match self.next("get_record_list") {
            Expectation::GetRecordList { response } => response,
            other => mismatch("get_record_list", &other),
        }
    }

    async fn get_filtered_record_list(&self, filters: &FilterList) -> Result<Vec<R>, DataError> {
        lock(&self.filters).push(filters.clone());
        match self.next("get_filtered_record_list") {
            Expectation::GetFilteredList { response } => response,
            other => mismatch("get_filtered_record_list", &other),
        }
    }

    async fn get_record_count(&self) -> Result<usize, DataError> {
        match self.next("get_record_count") {
            Expectation::GetRecordCount { response } => response,
            other => mismatch("get_record_count", &other),
        }
    }

    async fn create_record(&self, record: &R) -> Result<TaskResult, DataError> {
        lock(&self.written).push(record.clone());
        match self.next("create_record") {
            Expectation::Create { response } => response,
            other => mismatch("create_record", &other),
        }
    }

    async fn update_record(&self, record: &R) -> Result<TaskResult, DataError> {
        lock(&self.written).push(record.clone());
        match self.next("update_record") {
            Expectation::Update { response } => response,
            other => mismatch("update_record", &other),
        }
    }

    async fn delete_record(&self, record: &R) -> Result<TaskResult, DataError> {
        lock(&self.written).push(record.clone());
        match self.next("delete_record") {
            Expectation::Delete { response } => response,
            other => mismatch("delete_record", &other),
        }
    }

    async fn get_lookup_list(&self) -> Result<BTreeMap<i64, String>, DataError> {
        match self.next("get_lookup_list") {
            Expectation::LookupList { response } => response,
            other => mismatch("get_lookup_list", &other),
        }
    }

    async fn get_distinct_values(&self, field: &str) -> Result<Vec<String>, DataError> {
        match self.next("get_distinct_values") {
            Expectation::DistinctValues {
                field: expected,
                response,
            } => {
                assert_eq!(expected, field, "get_distinct_values called with unexpected field");
                response
            }
            other => mismatch("get_distinct_values", &other),
        }
    }
}

/// Builder returned by the `expect_*` methods; queues the expectation on `return_*`.
pub struct ExpectationBuilder<R, T> {
    expectations: Queue<R>,
    make: Box<dyn FnOnce(Result<T, DataError>) -> Expectation<R> + Send>,
}

impl<R, T> ExpectationBuilder<R, T> {
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: DataError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, DataError>) {
        let expectation = (self.make)(response);
        lock(&self.expectations).push_back(expectation);
    }
}

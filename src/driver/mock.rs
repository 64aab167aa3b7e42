//! Scripted in-memory client.
//!
//! This is the reference implementation of [`GraphClient`], for testing and
//! embedding. It answers `run`/`commit` from queues of canned records and
//! keeps a full log of every query, push and transaction call so tests can
//! assert exactly what hit the wire.

use std::collections::VecDeque;
use std::fmt;

use super::{DriverError, GraphClient, Record};
use crate::cypher::BindTable;
use crate::db::DbConfig;

/// The error the mock raises when told to fail.
#[derive(Debug)]
pub struct MockFailure(pub String);

impl fmt::Display for MockFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock driver failure: {}", self.0)
    }
}

impl std::error::Error for MockFailure {}

/// Scripted [`GraphClient`].
#[derive(Debug, Default)]
pub struct MockClient {
    config: DbConfig,
    run_responses: VecDeque<Vec<Record>>,
    commit_responses: VecDeque<Vec<Record>>,
    fail_next: Option<String>,

    /// Every `run` call, in order.
    pub queries: Vec<(String, BindTable)>,
    /// Every `push` call, in order.
    pub pushed: Vec<(String, BindTable)>,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub resets: usize,
}

impl MockClient {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Queue the records the next unanswered `run` returns.
    pub fn enqueue_run(&mut self, records: Vec<Record>) -> &mut Self {
        self.run_responses.push_back(records);
        self
    }

    /// Queue the records the next real `commit` returns.
    pub fn enqueue_commit(&mut self, records: Vec<Record>) -> &mut Self {
        self.commit_responses.push_back(records);
        self
    }

    /// Make the next `run` or `commit` fail with the given message.
    pub fn fail_next(&mut self, message: impl Into<String>) -> &mut Self {
        self.fail_next = Some(message.into());
        self
    }

    fn take_failure(&mut self) -> Result<(), DriverError> {
        match self.fail_next.take() {
            Some(message) => Err(Box::new(MockFailure(message))),
            None => Ok(()),
        }
    }
}

impl GraphClient for MockClient {
    fn run(&mut self, query: &str, bind: &BindTable) -> Result<Vec<Record>, DriverError> {
        self.queries.push((query.to_owned(), bind.clone()));
        self.take_failure()?;
        Ok(self.run_responses.pop_front().unwrap_or_default())
    }

    fn begin(&mut self) -> Result<(), DriverError> {
        self.begins += 1;
        Ok(())
    }

    fn push(&mut self, query: &str, bind: &BindTable) -> Result<(), DriverError> {
        self.pushed.push((query.to_owned(), bind.clone()));
        Ok(())
    }

    fn commit(&mut self) -> Result<Option<Vec<Record>>, DriverError> {
        self.commits += 1;
        self.take_failure()?;
        Ok(self.commit_responses.pop_front().map(Some).unwrap_or(Some(Vec::new())))
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.rollbacks += 1;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), DriverError> {
        self.resets += 1;
        Ok(())
    }
}

use crate::mock_driver::State;

use std::sync::{Arc, Mutex};

/// The SQL a [`MockDriver`](crate::MockDriver) executed, oldest first.
pub struct ExecLog {
    state: Arc<Mutex<State>>,
}

impl ExecLog {
    pub(crate) fn new(state: Arc<Mutex<State>>) -> Self {
        Self { state }
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().log.is_empty()
    }

    /// Every statement executed so far.
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn last(&self) -> Option<String> {
        self.state.lock().unwrap().log.last().cloned()
    }

    /// Check if any statement contains `needle`
    pub fn any(&self, needle: &str) -> bool {
        self.count(needle) > 0
    }

    /// Count statements containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .filter(|sql| sql.contains(needle))
            .count()
    }

    /// Statements starting with `keyword` (`SELECT`, `INSERT`, ...).
    pub fn with_keyword(&self, keyword: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .filter(|sql| {
                sql.split_whitespace()
                    .next()
                    .is_some_and(|first| first.eq_ignore_ascii_case(keyword))
            })
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.state.lock().unwrap().log.clear();
    }

    /// Remove and return the oldest statement.
    pub fn pop(&mut self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        if state.log.is_empty() {
            None
        } else {
            Some(state.log.remove(0))
        }
    }
}

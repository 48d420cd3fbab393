use std::sync::atomic::{AtomicBool, Ordering};

use serde::de;

use crate::error::ConfigError;

/// A single directive value together with whether anything has read it.
#[derive(Debug)]
pub struct Configurable<T> {
    tag: &'static str,
    scope: String,
    value: Option<T>,
    consumed: AtomicBool,
}

impl<T: Clone> Configurable<T> {
    pub fn new(tag: &'static str, scope: impl Into<String>) -> Self {
        Self { tag, scope: scope.into(), value: None, consumed: AtomicBool::new(false) }
    }

    pub fn tag(&self) -> &'static str { self.tag }
    pub fn is_set(&self) -> bool { self.value.is_some() }

    /// Stores the decoded value; a directive given twice (in any letter case) is rejected.
    pub(crate) fn set<E: de::Error>(&mut self, value: T) -> Result<(), E> {
        if self.value.is_some() {
            return Err(E::custom(format!("duplicate {} for {}", self.tag, self.scope)));
        }
        self.value = Some(value);
        Ok(())
    }

    /// Reads the value, marking it consumed whether or not it was set.
    pub fn lookup(&self) -> Result<T, ConfigError> {
        self.consumed.store(true, Ordering::Relaxed);
        self.value
            .clone()
            .ok_or_else(|| ConfigError::not_configured(format!("{} not specified for {}", self.tag, self.scope)))
    }

    pub fn is_unconsumed(&self) -> bool { self.value.is_some() && !self.consumed.load(Ordering::Relaxed) }

    pub(crate) fn unused_message(&self) -> Option<String> {
        self.is_unconsumed().then(|| format!("{}: {} specified but never consumed", self.scope, self.tag))
    }
}

//! Delayed (lazy, memoized) values.

use std::fmt;

use parking_lot::Mutex;

use crate::evaluator::EvalError;

use super::value::EdmValue;

type Producer = Box<dyn Fn() -> Result<EdmValue, EvalError> + Send + Sync>;

enum DelayedState {
    Pending,
    Evaluating,
    Ready(EdmValue),
}

/// A value computed on first access and cached afterwards.
///
/// The producer is fixed at construction. A successful result is cached for
/// the lifetime of the delayed value; a failed evaluation is not cached, so
/// the next access retries. Forcing a value from inside its own producer
/// fails with [`EvalError::CyclicDelayedValue`].
///
/// Not intended for concurrent forcing: a second thread that observes the
/// value mid-evaluation gets the cyclic error rather than blocking.
pub struct DelayedValue {
    producer: Producer,
    state: Mutex<DelayedState>,
}

impl DelayedValue {
    /// Creates a delayed value over a producer callback.
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn() -> Result<EdmValue, EvalError> + Send + Sync + 'static,
    {
        DelayedValue {
            producer: Box::new(producer),
            state: Mutex::new(DelayedState::Pending),
        }
    }

    /// Returns the value, evaluating it on first access.
    ///
    /// # Errors
    ///
    /// Returns the producer's error, or [`EvalError::CyclicDelayedValue`] on
    /// re-entrant access.
    pub fn value(&self) -> Result<EdmValue, EvalError> {
        {
            let mut state = self.state.lock();
            match &*state {
                DelayedState::Ready(value) => return Ok(value.clone()),
                DelayedState::Evaluating => return Err(EvalError::CyclicDelayedValue),
                DelayedState::Pending => *state = DelayedState::Evaluating,
            }
        }

        // The lock is released while producing so nested delayed values can be forced.
        let result = (self.producer)();

        let mut state = self.state.lock();
        match result {
            Ok(value) => {
                *state = DelayedState::Ready(value.clone());
                Ok(value)
            }
            Err(err) => {
                *state = DelayedState::Pending;
                Err(err)
            }
        }
    }

    /// Returns true once the value has been computed.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        matches!(*self.state.lock(), DelayedState::Ready(_))
    }
}

impl fmt::Debug for DelayedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.lock() {
            DelayedState::Pending => f.write_str("DelayedValue(<pending>)"),
            DelayedState::Evaluating => f.write_str("DelayedValue(<evaluating>)"),
            DelayedState::Ready(value) => f.debug_tuple("DelayedValue").field(value).finish(),
        }
    }
}

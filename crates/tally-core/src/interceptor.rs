//! Transparent start/finish reporting around test bodies.
//!
//! A test body is wrapped so that its start, its normal completion and its
//! failure reach a [`TestHooks`] implementation without the body knowing.
//! The body's return value is handed back unchanged, and a panic is reported
//! and then resumed with its original payload, so the calling harness still
//! sees the test fail exactly as it would have.

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tally_proto::{TestClass, TestDescriptor};
use thiserror::Error;
use tracing::{debug, warn};

/// Message recorded when a panic payload is neither `&str` nor `String`.
pub const UNKNOWN_PANIC_MESSAGE: &str = "test panicked";

/// Lifecycle events emitted by instrumented tests.
pub trait TestHooks: Send + Sync {
    fn test_started(&self, descriptor: &TestDescriptor);

    fn test_finished(&self, id: &str, success: bool, error: Option<&str>);

    fn step_finished(&self, id: &str, order: i32, success: bool, error: Option<&str>);

    /// A step discovered while the test runs rather than declared up front.
    fn step_registered(&self, _id: &str, _order: i32, _description: &str) {}
}

/// Interprets a test body's return value as success or failure.
pub trait TestOutcome {
    /// The failure message, or `None` on success.
    fn failure(&self) -> Option<String>;
}

impl TestOutcome for () {
    fn failure(&self) -> Option<String> {
        None
    }
}

impl<T, E: fmt::Display> TestOutcome for Result<T, E> {
    fn failure(&self) -> Option<String> {
        self.as_ref().err().map(ToString::to_string)
    }
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        UNKNOWN_PANIC_MESSAGE.to_string()
    }
}

fn report_outcome<H, R>(hooks: &H, id: &str, value: &R)
where
    H: TestHooks + ?Sized,
    R: TestOutcome,
{
    let failure = value.failure();
    hooks.test_finished(id, failure.is_none(), failure.as_deref());
}

/// Runs a synchronous test body between `test_started` and `test_finished`.
///
/// An `Err` return is reported as a failure and returned as is. A panic is
/// reported with its message and then resumed.
pub fn instrument<H, F, R>(hooks: &H, descriptor: &TestDescriptor, body: F) -> R
where
    H: TestHooks + ?Sized,
    F: FnOnce() -> R,
    R: TestOutcome,
{
    let id = descriptor.id();
    hooks.test_started(descriptor);

    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => {
            report_outcome(hooks, &id, &value);
            value
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            hooks.test_finished(&id, false, Some(&message));
            panic::resume_unwind(payload)
        }
    }
}

/// Async counterpart of [`instrument`].
pub async fn instrument_async<H, Fut>(hooks: &H, descriptor: &TestDescriptor, body: Fut) -> Fut::Output
where
    H: TestHooks + ?Sized,
    Fut: Future,
    Fut::Output: TestOutcome,
{
    let id = descriptor.id();
    hooks.test_started(descriptor);

    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(value) => {
            report_outcome(hooks, &id, &value);
            value
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            hooks.test_finished(&id, false, Some(&message));
            panic::resume_unwind(payload)
        }
    }
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A registered test body.
pub type TestFn = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;

/// Why a test could not be wrapped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstrumentError {
    #[error("test descriptor has an empty {0} name")]
    EmptyName(&'static str),

    #[error("{kind} name '{name}' contains whitespace or '#'")]
    InvalidName { kind: &'static str, name: String },

    #[error("{0} is not a test method")]
    NotTestMethod(String),
}

fn check_name(kind: &'static str, name: &str) -> Result<(), InstrumentError> {
    if name.is_empty() {
        return Err(InstrumentError::EmptyName(kind));
    }
    if name.contains('#') || name.chars().any(char::is_whitespace) {
        return Err(InstrumentError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// A test body ready to run, with or without reporting.
pub struct InstrumentedTest {
    descriptor: TestDescriptor,
    hooks: Option<Arc<dyn TestHooks>>,
    body: TestFn,
}

impl fmt::Debug for InstrumentedTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentedTest")
            .field("descriptor", &self.descriptor)
            .field("instrumented", &self.is_instrumented())
            .finish_non_exhaustive()
    }
}

impl InstrumentedTest {
    pub fn id(&self) -> String {
        self.descriptor.id()
    }

    pub fn descriptor(&self) -> &TestDescriptor {
        &self.descriptor
    }

    /// Returns false if wrapping failed and the body runs untracked.
    pub fn is_instrumented(&self) -> bool {
        self.hooks.is_some()
    }

    /// Runs the body, reporting to the hooks when instrumented.
    pub fn run(self) -> Result<(), BoxError> {
        match self.hooks {
            Some(hooks) => instrument(hooks.as_ref(), &self.descriptor, self.body),
            None => (self.body)(),
        }
    }
}

/// Wraps test bodies at registration time.
#[derive(Clone)]
pub struct Instrumenter {
    hooks: Arc<dyn TestHooks>,
}

impl fmt::Debug for Instrumenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumenter").finish_non_exhaustive()
    }
}

impl Instrumenter {
    pub fn new(hooks: Arc<dyn TestHooks>) -> Self {
        Self { hooks }
    }

    /// Checks that `descriptor` names a trackable test method.
    pub fn validate(&self, descriptor: &TestDescriptor) -> Result<(), InstrumentError> {
        check_name("class", &descriptor.class_name)?;
        check_name("method", &descriptor.method_name)?;
        if !descriptor.is_test_method() {
            return Err(InstrumentError::NotTestMethod(descriptor.id()));
        }
        Ok(())
    }

    /// Wraps `body` so that it reports to this instrumenter's hooks.
    pub fn wrap<F>(&self, descriptor: TestDescriptor, body: F) -> Result<InstrumentedTest, InstrumentError>
    where
        F: FnOnce() -> Result<(), BoxError> + Send + 'static,
    {
        self.validate(&descriptor)?;
        Ok(InstrumentedTest {
            descriptor,
            hooks: Some(Arc::clone(&self.hooks)),
            body: Box::new(body),
        })
    }

    /// Like [`Instrumenter::wrap`], but a descriptor that cannot be wrapped
    /// yields the bare body instead of an error.
    pub fn wrap_or_passthrough<F>(&self, descriptor: TestDescriptor, body: F) -> InstrumentedTest
    where
        F: FnOnce() -> Result<(), BoxError> + Send + 'static,
    {
        let hooks = match self.validate(&descriptor) {
            Ok(()) => Some(Arc::clone(&self.hooks)),
            Err(InstrumentError::NotTestMethod(id)) => {
                debug!("{} is not a test method, running it untracked", id);
                None
            }
            Err(e) => {
                warn!("Leaving {} uninstrumented: {}", descriptor.id(), e);
                None
            }
        };
        InstrumentedTest {
            descriptor,
            hooks,
            body: Box::new(body),
        }
    }

    /// Returns the test methods of `class`, or nothing if the class is a
    /// synthetic or nested helper type.
    pub fn scan_class(&self, class: &TestClass) -> Vec<TestDescriptor> {
        if !class.is_scannable() {
            debug!("Skipping helper type {}", class.name);
            return Vec::new();
        }
        class.test_methods().cloned().collect()
    }
}

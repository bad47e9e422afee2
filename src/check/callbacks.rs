// src/check/callbacks.rs
use super::error::CheckError;
use super::types::AdResult;

type Hook = Box<dyn Fn() + Send + Sync>;
type SuccessHook = Box<dyn Fn(&[AdResult]) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&CheckError) + Send + Sync>;

/// Lifecycle hooks for a [`CheckClient`](super::CheckClient). Every slot is
/// optional and an empty slot is a no-op.
#[derive(Default)]
pub struct CheckCallbacks {
    on_start: Option<Hook>,
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook>,
    on_complete: Option<Hook>,
}

impl CheckCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_success(mut self, f: impl Fn(&[AdResult]) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&CheckError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub(crate) fn started(&self) {
        if let Some(f) = &self.on_start {
            f();
        }
    }

    pub(crate) fn succeeded(&self, results: &[AdResult]) {
        if let Some(f) = &self.on_success {
            f(results);
        }
    }

    pub(crate) fn failed(&self, error: &CheckError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }

    pub(crate) fn completed(&self) {
        if let Some(f) = &self.on_complete {
            f();
        }
    }
}

impl std::fmt::Debug for CheckCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

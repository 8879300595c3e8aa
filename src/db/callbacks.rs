

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::record::Record;
use crate::core::Result;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookFlow {
    Continue,
    /// Abort the destroy chain; the wrapped step does not run.
    Halt,
}


pub type BeforeDestroyHook = Arc<dyn Fn(&Record) -> HookFlow + Send + Sync>;


pub type AfterDestroyHook = Arc<dyn Fn(&Record) + Send + Sync>;

/// Destroy lifecycle hooks of one entity type.
///
/// `run_destroy` wraps an arbitrary step (normally the delete) with the hooks:
/// before hooks run in registration order and may halt the chain, the step runs,
/// then after hooks run. A failing step propagates its error and skips the after hooks.
#[derive(Clone, Default)]
pub struct Callbacks {
    before_destroy: Vec<BeforeDestroyHook>,
    after_destroy: Vec<AfterDestroyHook>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Record) -> HookFlow + Send + Sync + 'static,
    {
        self.before_destroy.push(Arc::new(hook));
        self
    }

    pub fn after_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Record) + Send + Sync + 'static,
    {
        self.after_destroy.push(Arc::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before_destroy.is_empty() && self.after_destroy.is_empty()
    }

    /// Returns `Ok(None)` when a before hook halted the chain.
    pub async fn run_destroy<T, F, Fut>(&self, record: &Record, step: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for hook in &self.before_destroy {
            if hook(record) == HookFlow::Halt {
                debug!("before_destroy halted for {}#{}", record.entity, record.id);
                return Ok(None);
            }
        }

        let value = step().await?;

        for hook in &self.after_destroy {
            hook(record);
        }

        Ok(Some(value))
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Callbacks(before_destroy={}, after_destroy={})",
            self.before_destroy.len(),
            self.after_destroy.len()
        )
    }
}

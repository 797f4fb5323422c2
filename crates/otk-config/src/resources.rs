use std::fmt;
use std::sync::Arc;

use crate::CloseError;

/// A resource that must be released once the component owning it is retired.
///
/// `close` should be idempotent: a resource may be reachable both through the
/// component that uses it and through a [`ResourceRegistry`].
pub trait Closeable: Send + Sync {
    fn close(&self) -> Result<(), CloseError>;
}

/// Ordered list of resources allocated while building components.
///
/// The caller that passes the registry to a factory owns it: factories only
/// append, and nothing is released until the caller runs
/// [`ResourceRegistry::close_all`]. No internal locking; callers sharing one
/// registry across threads must serialize access.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: Vec<Arc<dyn Closeable>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: Arc<dyn Closeable>) {
        self.resources.push(resource);
    }

    /// Push `resource` and hand it back, for use in return position.
    pub fn add_and_return<T: Closeable + 'static>(&mut self, resource: Arc<T>) -> Arc<T> {
        self.resources.push(resource.clone());
        resource
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Closeable>> {
        self.resources.iter()
    }

    /// Close every resource in registration order, draining the registry.
    ///
    /// A failing resource does not stop the rest from being closed; all
    /// failures are returned together.
    pub fn close_all(&mut self) -> Result<(), Vec<CloseError>> {
        let mut failures = Vec::new();
        for resource in self.resources.drain(..) {
            if let Err(err) = resource.close() {
                tracing::warn!(%err, "resource failed to close");
                failures.push(err);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("len", &self.resources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        id: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl Closeable for Recorder {
        fn close(&self) -> Result<(), CloseError> {
            self.log.lock().unwrap().push(self.id);
            if self.fail {
                Err(CloseError::new(self.id, "boom"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn closes_in_order_and_collects_failures() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        for (id, fail) in [("channel", false), ("exporter", true), ("reader", false)] {
            registry.push(Arc::new(Recorder {
                id,
                log: log.clone(),
                fail,
            }));
        }
        assert_eq!(registry.len(), 3);

        let failures = registry.close_all().unwrap_err();
        assert_eq!(*log.lock().unwrap(), vec!["channel", "exporter", "reader"]);
        assert_eq!(failures, vec![CloseError::new("exporter", "boom")]);
        assert_eq!(failures[0].to_string(), "failed to close exporter: boom");
        assert!(registry.is_empty());
        assert!(registry.close_all().is_ok());
    }

    #[test]
    fn add_and_return_keeps_the_same_instance() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        let recorder = Arc::new(Recorder {
            id: "only",
            log,
            fail: false,
        });
        let returned = registry.add_and_return(recorder.clone());
        assert!(Arc::ptr_eq(&returned, &recorder));
        assert_eq!(registry.len(), 1);
    }
}

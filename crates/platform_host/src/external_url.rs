//! External URL host-service contracts.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

/// Object-safe boxed future used by [`ExternalUrlService`].
pub type ExternalUrlFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for opening shortcut targets outside the desktop shell.
pub trait ExternalUrlService {
    /// Opens a URL in a new browsing context.
    fn open_url<'a>(&'a self, url: &'a str) -> ExternalUrlFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op external URL service for unsupported targets.
pub struct NoopExternalUrlService;

impl ExternalUrlService for NoopExternalUrlService {
    fn open_url<'a>(&'a self, _url: &'a str) -> ExternalUrlFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Records opened URLs instead of navigating.
pub struct MemoryExternalUrlService {
    opened: Rc<RefCell<Vec<String>>>,
}

impl MemoryExternalUrlService {
    /// URLs opened so far, oldest first.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl ExternalUrlService for MemoryExternalUrlService {
    fn open_url<'a>(&'a self, url: &'a str) -> ExternalUrlFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        })
    }
}

//! Request dispatch.
//!
//! The dispatcher is an explicit `TypeId → handler` map.  It is assembled
//! once at startup by [`DispatcherBuilder`], which rejects a configuration
//! with a duplicate or missing handler, and is read-only afterwards.
//! Routing does no business logic: it looks the handler up, forwards the
//! request and the cancellation token, and hands back the typed response.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{AppError, DispatchError};

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// A typed request with its response type.
pub trait Request: Send + 'static {
    type Response: Send + 'static;

    /// Stable name used in logs and dispatch errors.
    const NAME: &'static str;
}

/// The single handler of request type `R`.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, cancel: &CancellationToken)
        -> Result<R::Response, AppError>;
}

// ---------------------------------------------------------------------------
// Type erasure
// ---------------------------------------------------------------------------

type AnyRequest = Box<dyn Any + Send>;
type AnyResponse = Box<dyn Any + Send>;

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn handle_any(
        &self,
        request: AnyRequest,
        cancel: &CancellationToken,
    ) -> Result<AnyResponse, AppError>;
}

struct Typed<R, H> {
    handler: H,
    _request: PhantomData<fn(R)>,
}

#[async_trait]
impl<R, H> ErasedHandler for Typed<R, H>
where
    R: Request,
    H: RequestHandler<R> + 'static,
{
    async fn handle_any(
        &self,
        request: AnyRequest,
        cancel: &CancellationToken,
    ) -> Result<AnyResponse, AppError> {
        // The map is keyed by `TypeId::of::<R>()`, so this only fails if the
        // map itself is inconsistent.
        let request = request
            .downcast::<R>()
            .map_err(|_| DispatchError::Unroutable(R::NAME))?;
        let response = self.handler.handle(*request, cancel).await?;
        Ok(Box::new(response))
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects handlers and validates the registry before any request runs.
#[derive(Default)]
pub struct DispatcherBuilder {
    handlers: HashMap<TypeId, Box<dyn ErasedHandler>>,
    expected: Vec<(TypeId, &'static str)>,
    duplicates: Vec<&'static str>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `R` must have a handler by the time [`Self::build`] runs.
    pub fn expect<R: Request>(mut self) -> Self {
        self.expected.push((TypeId::of::<R>(), R::NAME));
        self
    }

    /// Register `handler` as the handler of `R`.  A second registration for
    /// the same `R` is recorded and reported by [`Self::build`].
    pub fn register<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        match self.handlers.entry(TypeId::of::<R>()) {
            Entry::Occupied(_) => self.duplicates.push(R::NAME),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(Typed {
                    handler,
                    _request: PhantomData::<fn(R)>,
                }));
            }
        }
        self
    }

    /// Freeze the registry.
    ///
    /// # Errors
    /// - [`DispatchError::DuplicateHandler`] if a request type was
    ///   registered more than once.
    /// - [`DispatchError::MissingHandler`] if an expected request type has
    ///   no handler.
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        if let Some(name) = self.duplicates.first() {
            return Err(DispatchError::DuplicateHandler(*name));
        }
        for (type_id, name) in &self.expected {
            if !self.handlers.contains_key(type_id) {
                return Err(DispatchError::MissingHandler(*name));
            }
        }

        info!("dispatcher ready with {} handler(s)", self.handlers.len());
        Ok(Dispatcher {
            handlers: self.handlers,
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Immutable request router.  Share it behind an `Arc`.
pub struct Dispatcher {
    handlers: HashMap<TypeId, Box<dyn ErasedHandler>>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Whether a handler for `R` is registered.
    #[cfg(test)]
    pub(crate) fn handles<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    /// Route `request` to its handler and return the handler's result.
    pub async fn send<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, AppError> {
        let handler = self
            .handlers
            .get(&TypeId::of::<R>())
            .ok_or(DispatchError::Unroutable(R::NAME))?;

        debug!(request = R::NAME, "dispatching");
        let response = handler.handle_any(Box::new(request), cancel).await?;
        response
            .downcast::<R::Response>()
            .map(|response| *response)
            .map_err(|_| DispatchError::Unroutable(R::NAME).into())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

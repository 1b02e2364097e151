//! Typed request dispatch
//!
//! Every command and query is a plain struct implementing [`Request`]. A
//! service handles it through [`Handler`], and the [`Dispatcher`] built at
//! startup maps each request type to the one handler registered for it.

use async_trait::async_trait;
use nest_admin_core::{Failure, Outcome};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A command or query with its response type
pub trait Request: Send + 'static {
    type Output: Send + 'static;
}

/// Handles one request type
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> Outcome<R::Output>;
}

/// Collects handlers before the dispatcher is frozen
#[derive(Default)]
pub struct DispatcherBuilder {
    handlers: HashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for requests of type `R`, replacing any earlier one
    #[must_use]
    pub fn register<R, H>(mut self, handler: Arc<H>) -> Self
    where
        R: Request,
        H: Handler<R> + 'static,
    {
        let handler: Arc<dyn Handler<R>> = handler;
        let previous = self
            .handlers
            .insert(TypeId::of::<R>(), (type_name::<R>(), Box::new(handler)));
        if previous.is_some() {
            warn!("Replacing handler for {}", type_name::<R>());
        }
        self
    }

    pub fn build(self) -> Dispatcher {
        debug!("Dispatcher built with {} handlers", self.handlers.len());
        Dispatcher {
            handlers: self.handlers,
        }
    }
}

/// Routes requests to their registered handlers
pub struct Dispatcher {
    handlers: HashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub async fn send<R: Request>(&self, request: R) -> Outcome<R::Output> {
        let handler = self
            .handlers
            .get(&TypeId::of::<R>())
            .and_then(|(_, handler)| handler.downcast_ref::<Arc<dyn Handler<R>>>())
            .ok_or_else(|| {
                Failure::unexpected(
                    "Dispatcher.HandlerNotRegistered",
                    format!("No handler registered for {}", type_name::<R>()),
                )
            })?;
        handler.handle(request).await
    }

    pub fn handles<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    /// Names of the registered request types, sorted
    pub fn request_types(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.request_types())
            .finish()
    }
}

/// Wire a service's methods up as request handlers.
///
/// Generates the [`Request`] and [`Handler`] impls for each listed request
/// and a `register_all` method adding them to a [`DispatcherBuilder`].
/// Rejected requests are logged here, once for every operation.
macro_rules! handlers {
    ($service:ty { $($request:ty => $output:ty : $method:ident),+ $(,)? }) => {
        $(
            impl $crate::dispatcher::Request for $request {
                type Output = $output;
            }

            #[::async_trait::async_trait]
            impl $crate::dispatcher::Handler<$request> for $service {
                async fn handle(&self, request: $request) -> ::nest_admin_core::Outcome<$output> {
                    self.$method(request).await.inspect_err(|failure| {
                        ::tracing::warn!(
                            "{} rejected ({}): {}",
                            stringify!($request),
                            failure.kind(),
                            failure
                        )
                    })
                }
            }
        )+

        impl $service {
            pub fn register_all(
                self: &::std::sync::Arc<Self>,
                builder: $crate::dispatcher::DispatcherBuilder,
            ) -> $crate::dispatcher::DispatcherBuilder {
                builder$(.register::<$request, _>(::std::sync::Arc::clone(self)))+
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use nest_admin_core::ErrorKind;

    struct Ping(u32);
    struct Unhandled;

    impl Request for Unhandled {
        type Output = ();
    }

    struct Echo;

    impl Echo {
        async fn ping(&self, request: Ping) -> Outcome<u32> {
            if request.0 == 0 {
                return Err(Failure::validation("Ping.Zero", "Nothing to echo"));
            }
            Ok(request.0 + 1)
        }
    }

    handlers!(Echo {
        Ping => u32 : ping,
    });

    #[tokio::test]
    async fn test_send_routes_to_registered_handler() {
        let echo = Arc::new(Echo);
        let dispatcher = echo.register_all(Dispatcher::builder()).build();

        assert!(dispatcher.handles::<Ping>());
        assert_eq!(dispatcher.len(), 1);
        assert_eq!(dispatcher.send(Ping(41)).await.unwrap(), 42);

        let failure = dispatcher.send(Ping(0)).await.unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unregistered_request_is_unexpected() {
        let dispatcher = Dispatcher::builder().build();
        assert!(dispatcher.is_empty());

        let failure = dispatcher.send(Unhandled).await.unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Unexpected);
        assert!(failure.has_code("Dispatcher.HandlerNotRegistered"));
    }
}

//! Request dispatch: validation, routing, and last-resort failure isolation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error};

use super::DISPATCH_TARGET;
use super::envelope::{RequestEnvelope, ResponseEnvelope, Status};
use super::errors::DispatchError;
use super::registry::MethodRegistry;
use crate::network::NetworkService;

/// Routes decoded messages to handlers and always produces a reply.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    registry: MethodRegistry,
}

impl Dispatcher {
    /// Builds a dispatcher over the given registry.
    #[must_use]
    pub const fn new(registry: MethodRegistry) -> Self {
        Self { registry }
    }

    /// Dispatches one decoded message.
    ///
    /// Protocol violations become 400/404 replies before any handler runs. A
    /// handler panic is logged and converted to a 500 reply carrying the
    /// request identifier.
    pub fn dispatch(&self, service: &mut dyn NetworkService, message: Value) -> ResponseEnvelope {
        let request = match RequestEnvelope::from_value(message) {
            Ok(request) => request,
            Err(error) => return reject(&error),
        };

        let Some(handler) = self.registry.resolve(&request.method) else {
            return reject(&DispatchError::UnknownMethod {
                id: request.id,
                method: request.method,
            });
        };

        debug!(
            target: DISPATCH_TARGET,
            id = %request.id,
            method = %request.method,
            "dispatching request"
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(service, &request.params)));
        match outcome {
            Ok(reply) => ResponseEnvelope::success(request.id, reply),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    target: DISPATCH_TARGET,
                    id = %request.id,
                    method = %request.method,
                    panic = %message,
                    "handler panicked"
                );
                ResponseEnvelope::error(
                    Some(&request.id),
                    Status::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {message}"),
                )
            }
        }
    }
}

fn reject(error: &DispatchError) -> ResponseEnvelope {
    debug!(
        target: DISPATCH_TARGET,
        error = %error,
        status = %error.status(),
        "request rejected"
    );
    ResponseEnvelope::from_dispatch_error(error)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

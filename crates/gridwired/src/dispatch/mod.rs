//! Request envelope handling and method dispatch.
//!
//! A raw message is decoded by [`envelope::decode`], validated into a
//! [`RequestEnvelope`], routed through the [`MethodRegistry`] to a handler,
//! and answered with a [`ResponseEnvelope`]:
//!
//! ```json
//! {"type":"request","id":"1","method":"get_current_network_info","params":{}}
//! {"type":"response","id":"1","status":404,"result":{"status":"No network loaded"}}
//! ```

mod dispatcher;
pub mod envelope;
mod errors;
mod handlers;
mod registry;

pub use self::dispatcher::Dispatcher;
pub use self::envelope::{
    MessageKind, Params, Reply, RequestEnvelope, ResponseEnvelope, Status, decode,
};
pub use self::errors::DispatchError;
pub use self::registry::{MethodHandler, MethodRegistry};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

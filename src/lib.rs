/*!
 * model-method - remote computed values bound to host entity properties
 *
 * A `ComputedAttributeProxy` retrieves a server-computed value from a fixed
 * endpoint and writes it onto one named property of a host entity:
 * - Fetch once, then rely on the cached host value unless retrieval is forced
 * - Entity-shaped values receive the identity reported by the server
 * - Optional synthetic `change:<property>` events for cached or null values
 * - Pluggable transports (HTTP via reqwest, scripted mock)
 *
 * The host side lives in the `model-method-host` crate.
 */

pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod transport;
pub mod wire;

// Re-export commonly used types
pub use config::{LogConfig, LogLevel, ProxyConfig, Settings, TransportConfig};
pub use error::{ProxyError, Result, TransportError};
pub use proxy::{Activation, ComputedAttributeProxy, Projection};
pub use transport::{FetchOptions, HttpTransport, MockReply, MockTransport, Transport};
pub use wire::{ComputedObject, ComputedValue, Envelope};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! ComputedAttributeProxy: fetch-or-skip binding of a remote computed value
//! to one property of a host entity
//!
//! Activation either retrieves the resource and projects its first result onto
//! the host property, or, when the property already holds a value and
//! retrieval is not forced, leaves the host alone (optionally re-announcing the
//! existing value with a synthetic `change:<property>` event).
//!
//! ```text
//! Idle -> Gating -> Skipped
//!                -> Notified
//!                -> Fetching -> Parsing -> Projected | Fetched
//! ```
//!
//! Transport failures end the activation with `ProxyError::Transport`.

use model_method_host::{change_event, Attribute, HostEntity, Identity, ID_ATTRIBUTE};
use tracing::{debug, info, warn};

use crate::config::{ProxyConfig, Settings};
use crate::error::{ProxyError, Result};
use crate::transport::{FetchOptions, HttpTransport, Transport};
use crate::wire::{ComputedValue, Envelope};

/// Terminal state of one activation
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// Property already populated, nothing done
    Skipped,
    /// Property already populated, change event re-emitted without I/O
    Notified,
    /// Retrieved without a host binding; nothing projected
    Fetched,
    /// Retrieved and written to the host
    Projected(Projection),
}

/// What a successful projection wrote
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub property: String,
    pub value: ComputedValue,
    /// Identity assigned to the nested entity, for entity-shaped values
    pub identity: Option<Identity>,
    /// Whether the synthetic null-value change event fired
    pub notified: bool,
    /// Error message the server sent alongside the value
    pub remote_error: Option<String>,
}

/// One-shot proxy between a remote computed value and a host property.
///
/// The host is borrowed, not owned: it must outlive the activation, and the
/// application decides how other writers to it are serialized. `activate`
/// consumes the proxy, so one instance never has two retrievals in flight.
/// Separate proxies bound to the same property may still race; the last
/// projection to complete wins.
///
/// Without a host or a `host_property` the proxy degrades to a bare fetch:
/// the response is retrieved and decoded but never projected.
///
/// # Example
///
/// ```rust,no_run
/// use model_method::{ComputedAttributeProxy, FetchOptions, HttpTransport, ProxyConfig};
/// use model_method::config::TransportConfig;
/// use model_method_host::{HostEntity, MemoryEntity};
///
/// # async fn example() -> anyhow::Result<()> {
/// let host = MemoryEntity::new();
/// let config = ProxyConfig::new("http://localhost:8000/api/v1/invoice/?pk=3&method=total")
///     .with_property("total");
/// let transport = HttpTransport::new(&TransportConfig::default())?;
///
/// ComputedAttributeProxy::new(config, transport)?
///     .with_host(&host)
///     .activate(FetchOptions::new())
///     .await?;
///
/// println!("total = {:?}", host.get("total"));
/// # Ok(())
/// # }
/// ```
pub struct ComputedAttributeProxy<'h, T> {
    config: ProxyConfig,
    transport: T,
    host: Option<&'h dyn HostEntity>,
}

impl<'h> ComputedAttributeProxy<'h, HttpTransport> {
    /// Proxy over HTTP using loaded settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = HttpTransport::new(&settings.transport)?;
        Self::new(settings.proxy.clone(), transport)
    }
}

impl<'h, T: Transport> ComputedAttributeProxy<'h, T> {
    pub fn new(config: ProxyConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            host: None,
        })
    }

    /// Attach the host entity the value is projected onto
    pub fn with_host(mut self, host: &'h dyn HostEntity) -> Self {
        self.host = Some(host);
        self
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    fn binding(&self) -> Option<(&'h dyn HostEntity, &str)> {
        match (self.host, self.config.host_property.as_deref()) {
            (Some(host), Some(property)) => Some((host, property)),
            _ => None,
        }
    }

    /// Null counts as unset: a stored null is fetched again
    fn needs_retrieval(&self) -> bool {
        if self.config.force_retrieval {
            return true;
        }

        match self.binding() {
            Some((host, property)) => matches!(host.get(property), None | Some(Attribute::Null)),
            None => true,
        }
    }

    /// Run the activation gate, fetching and projecting when needed.
    ///
    /// `options` are handed to the transport untouched.
    pub async fn activate(self, options: FetchOptions) -> Result<Activation> {
        let endpoint = self.config.endpoint.as_str();

        if self.needs_retrieval() {
            if self.binding().is_none() {
                warn!(endpoint, "No host binding configured, fetching without projection");
            }

            debug!(endpoint, forced = self.config.force_retrieval, "Retrieving computed value");

            let body = self.transport.retrieve(endpoint, &options).await?;
            let envelope = Envelope::from_slice(&body)?;

            return Ok(match self.parse(&envelope)? {
                Some(projection) => Activation::Projected(projection),
                None => Activation::Fetched,
            });
        }

        // The gate only skips when a bound property holds a value
        match self.binding() {
            Some((host, property)) if self.config.force_change_notification => {
                debug!(endpoint, property, "Value cached, re-announcing change");
                host.trigger(&change_event(property));
                Ok(Activation::Notified)
            }
            _ => {
                debug!(endpoint, "Value cached, skipping retrieval");
                Ok(Activation::Skipped)
            }
        }
    }

    /// Project the first result of `envelope` onto the host property.
    ///
    /// Returns `Ok(None)` without inspecting the results when no host binding
    /// is configured. A server `error` message does not stop the projection:
    /// refused calls carry a null value, which is written (and re-announced
    /// when notification is forced) like any other null.
    ///
    /// The value is written before the nested entity is checked, so a
    /// `MalformedResponse` for a host that does not materialize entity-shaped
    /// values leaves the written value, and the events `set` fired, in place.
    pub fn parse(&self, envelope: &Envelope) -> Result<Option<Projection>> {
        let Some((host, property)) = self.binding() else {
            return Ok(None);
        };

        let returned = envelope.first()?;

        let remote_error = returned
            .error
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        if let Some(message) = &remote_error {
            warn!(
                endpoint = self.config.endpoint.as_str(),
                property,
                error = message.as_str(),
                "Server reported an error for the computed value"
            );
        }

        let value = returned.value();

        let identity = match (&value, returned.identity()) {
            (ComputedValue::Entity(_), Some(id)) => Some(id),
            (ComputedValue::Entity(_), None) => {
                return Err(ProxyError::malformed(format!(
                    "entity-shaped computed_value needs an integer or string id, got {}",
                    returned.id
                )))
            }
            _ => None,
        };

        host.set(property, value.to_attribute());

        if let Some(id) = &identity {
            let stored = host.get(property);
            let entity = stored.as_ref().and_then(Attribute::as_entity).ok_or_else(|| {
                ProxyError::malformed(format!(
                    "host did not store an entity under '{}' for an entity-shaped value",
                    property
                ))
            })?;

            // Identity slot and id attribute are both read by host lookups
            entity.assign_identity(id.clone());
            entity.set(ID_ATTRIBUTE, Attribute::Scalar(id.to_json()));
        }

        let notified = self.config.force_change_notification
            && matches!(host.get(property), Some(Attribute::Null));

        if notified {
            host.trigger(&change_event(property));
        }

        info!(
            endpoint = self.config.endpoint.as_str(),
            property,
            entity = identity.is_some(),
            notified,
            "Projected computed value"
        );

        Ok(Some(Projection {
            property: property.to_string(),
            value,
            identity,
            notified,
            remote_error,
        }))
    }
}

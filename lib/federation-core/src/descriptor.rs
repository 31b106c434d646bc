//! Extension descriptors and the registration handshake seam

use crate::selection::Selection;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

/// Compatibility block: marks a value as an extension and declares the
/// host version range it requires
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCompatibility {
    #[serde(default)]
    pub plugin: bool,

    /// Semver range, e.g. `0.x.x` or `^1.2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl HostCompatibility {
    /// Extension marker without a version requirement
    pub fn any() -> Self {
        Self {
            plugin: true,
            version: None,
        }
    }

    pub fn range(range: impl Into<String>) -> Self {
        Self {
            plugin: true,
            version: Some(range.into()),
        }
    }
}

/// Installation routine of an extension.
///
/// Resolving the future completes the handshake; an error aborts the
/// installation without recording it.
#[async_trait]
pub trait Extension: Send + Sync {
    async fn register(&self, ctx: PluginContext) -> anyhow::Result<()>;
}

/// [`Extension`] backed by an async closure
pub struct FnExtension<F>(F);

#[async_trait]
impl<F, Fut> Extension for FnExtension<F>
where
    F: Fn(PluginContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn register(&self, ctx: PluginContext) -> anyhow::Result<()> {
        (self.0)(ctx).await
    }
}

/// Wrap an async closure as an extension
pub fn extension<F, Fut>(f: F) -> Arc<dyn Extension>
where
    F: Fn(PluginContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnExtension(f))
}

/// Externally supplied extension descriptor.
///
/// Fields are optional or possibly empty so that malformed descriptors can
/// be represented and rejected by validation.
#[derive(Clone, Default)]
pub struct ExtensionDescriptor {
    pub name: String,
    pub version: String,
    pub host: Option<HostCompatibility>,
    pub register: Option<Arc<dyn Extension>>,
}

impl ExtensionDescriptor {
    /// Well-formed descriptor accepting any host version
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        register: Arc<dyn Extension>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            host: Some(HostCompatibility::any()),
            register: Some(register),
        }
    }

    /// Descriptor whose handshake is an async closure
    pub fn from_fn<F, Fut>(name: impl Into<String>, version: impl Into<String>, f: F) -> Self
    where
        F: Fn(PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(name, version, extension(f))
    }

    /// Require a host version range
    pub fn with_host_range(mut self, range: impl Into<String>) -> Self {
        let mut host = self.host.take().unwrap_or_else(HostCompatibility::any);
        host.version = Some(range.into());
        self.host = Some(host);
        self
    }
}

impl fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("host", &self.host)
            .field("register", &self.register.is_some())
            .finish()
    }
}

/// Context handed to an extension during registration.
///
/// Dereferences to the selection the extension is being installed onto, so
/// every federation operation made through it is scoped to that selection.
#[derive(Clone)]
pub struct PluginContext {
    selection: Selection,
    name: String,
    version: String,
}

impl PluginContext {
    pub(crate) fn new(selection: Selection, descriptor: &ExtensionDescriptor) -> Self {
        Self {
            selection,
            name: descriptor.name.clone(),
            version: descriptor.version.clone(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Name of the extension being installed
    pub fn plugin_name(&self) -> &str {
        &self.name
    }

    pub fn plugin_version(&self) -> &str {
        &self.version
    }
}

impl Deref for PluginContext {
    type Target = Selection;

    fn deref(&self) -> &Selection {
        &self.selection
    }
}

//! Descriptor sources

use crate::descriptor::ExtensionDescriptor;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Cannot find module '{0}'")]
    NotFound(String),

    #[error("Not a directory: '{0}'")]
    NotADirectory(String),

    #[error("No descriptor loader configured")]
    Unavailable,
}

/// Resolves extension descriptors from paths
#[async_trait]
pub trait DescriptorLoader: Send + Sync {
    /// Load the descriptor identified by `path`
    async fn load(&self, path: &str) -> Result<ExtensionDescriptor, LoadError>;

    /// Identifiers of the descriptor sources directly under `dir`, in enumeration order
    async fn list(&self, dir: &str) -> Result<Vec<String>, LoadError>;
}

pub type DescriptorFactory = Arc<dyn Fn() -> ExtensionDescriptor + Send + Sync>;

/// In-memory loader mapping paths to descriptor factories.
///
/// Paths are `/`-separated; a leading `./` and trailing `/` are ignored.
/// Directory listings are returned in lexical order.
#[derive(Clone, Default)]
pub struct CatalogLoader {
    entries: BTreeMap<String, DescriptorFactory>,
}

fn normalize(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    path.strip_prefix("./").unwrap_or(path)
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor source
    pub fn insert<F>(&mut self, path: &str, factory: F)
    where
        F: Fn() -> ExtensionDescriptor + Send + Sync + 'static,
    {
        self.entries.insert(normalize(path).to_string(), Arc::new(factory));
    }

    pub fn with<F>(mut self, path: &str, factory: F) -> Self
    where
        F: Fn() -> ExtensionDescriptor + Send + Sync + 'static,
    {
        self.insert(path, factory);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DescriptorLoader for CatalogLoader {
    async fn load(&self, path: &str) -> Result<ExtensionDescriptor, LoadError> {
        self.entries
            .get(normalize(path))
            .map(|factory| factory())
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>, LoadError> {
        let dir = normalize(dir);
        let prefix = format!("{}/", dir);

        let children: Vec<String> = self
            .entries
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .fold(Vec::new(), |mut acc, child| {
                if acc.last().map(String::as_str) != Some(child) {
                    acc.push(child.to_string());
                }
                acc
            });

        if children.is_empty() {
            if self.entries.contains_key(dir) {
                return Err(LoadError::NotADirectory(dir.to_string()));
            }
            return Err(LoadError::NotFound(dir.to_string()));
        }
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &'static str) -> impl Fn() -> ExtensionDescriptor + Send + Sync {
        move || ExtensionDescriptor::from_fn(name, "1.0.0", |_| async { Ok(()) })
    }

    fn catalog() -> CatalogLoader {
        CatalogLoader::new()
            .with("pack/test", descriptor("test"))
            .with("pack/skip", descriptor("skip"))
            .with("pack/nested/deep", descriptor("deep"))
            .with("other/one", descriptor("one"))
    }

    #[tokio::test]
    async fn test_load() {
        let loader = catalog();
        assert_eq!(loader.load("./pack/test").await.unwrap().name, "test");
        assert_eq!(loader.load("pack/skip/").await.unwrap().name, "skip");
    }

    #[tokio::test]
    async fn test_load_missing() {
        let err = loader_err(catalog().load("./pack/none").await);
        assert_eq!(err, LoadError::NotFound("./pack/none".to_string()));
        assert_eq!(err.to_string(), "Cannot find module './pack/none'");
    }

    #[tokio::test]
    async fn test_list_lexical_and_deduplicated() {
        let ids = catalog().list("./pack").await.unwrap();
        assert_eq!(ids, vec!["nested", "skip", "test"]);
    }

    #[tokio::test]
    async fn test_list_errors() {
        let loader = catalog();
        assert_eq!(
            loader.list("missing").await.unwrap_err(),
            LoadError::NotFound("missing".to_string())
        );
        assert_eq!(
            loader.list("pack/test").await.unwrap_err(),
            LoadError::NotADirectory("pack/test".to_string())
        );
    }

    fn loader_err(result: Result<ExtensionDescriptor, LoadError>) -> LoadError {
        match result {
            Ok(descriptor) => panic!("unexpected descriptor {descriptor:?}"),
            Err(e) => e,
        }
    }
}

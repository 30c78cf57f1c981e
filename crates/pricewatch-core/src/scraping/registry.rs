//! Startup-time binding of retailers to extractor implementations.
//!
//! Extractor variants register a factory under a normalized retailer key while
//! the registry is being built. The finished registry is immutable and is
//! shared behind an `Arc`; lookups need no locking.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::extractor::Extractor;
use crate::domain::Retailer;

/// Constructor for an extractor bound to a specific retailer.
pub type ExtractorFactory = Arc<dyn Fn(&Retailer) -> Arc<dyn Extractor> + Send + Sync>;

/// Canonical lookup key for a retailer display name.
///
/// Lower-cases the name and keeps only ASCII letters and digits, so
/// `"Super Mart"`, `"super-mart"` and `"SUPERMART"` share one key. Accented
/// letters are dropped, not folded: `"Día"` becomes `"da"`.
pub fn retailer_key(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A retailer paired with the extractor that serves it.
#[derive(Clone)]
pub struct BoundExtractor {
    pub retailer: Retailer,
    pub extractor: Arc<dyn Extractor>,
}

impl fmt::Debug for BoundExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundExtractor")
            .field("retailer", &self.retailer.name)
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

/// Builder for [`ExtractorRegistry`].
#[derive(Default)]
pub struct ExtractorRegistryBuilder {
    factories: BTreeMap<String, ExtractorFactory>,
}

impl fmt::Debug for ExtractorRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistryBuilder")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExtractorRegistryBuilder {
    /// Register a factory under the normalized form of `retailer_name`.
    ///
    /// A later registration under the same key replaces the earlier one.
    #[must_use]
    pub fn register(mut self, retailer_name: &str, factory: ExtractorFactory) -> Self {
        let key = retailer_key(retailer_name);
        if self.factories.insert(key.clone(), factory).is_some() {
            info!(key = %key, "Replacing previously registered extractor");
        }
        self
    }

    /// Register a shared extractor instance for `retailer_name`.
    #[must_use]
    pub fn register_instance(self, retailer_name: &str, extractor: Arc<dyn Extractor>) -> Self {
        self.register(retailer_name, Arc::new(move |_| Arc::clone(&extractor)))
    }

    pub fn build(self) -> ExtractorRegistry {
        ExtractorRegistry {
            factories: self.factories,
        }
    }
}

/// Read-only table mapping retailer keys to extractor factories.
#[derive(Default)]
pub struct ExtractorRegistry {
    factories: BTreeMap<String, ExtractorFactory>,
}

impl ExtractorRegistry {
    pub fn builder() -> ExtractorRegistryBuilder {
        ExtractorRegistryBuilder::default()
    }

    /// Bind each retailer to its extractor, preserving input order.
    ///
    /// Retailers without a registered extractor are skipped.
    pub fn resolve(&self, retailers: &[Retailer]) -> Vec<BoundExtractor> {
        retailers
            .iter()
            .filter_map(|retailer| {
                let key = retailer_key(&retailer.name);
                let Some(factory) = self.factories.get(&key) else {
                    debug!(retailer = %retailer.name, key = %key, "No extractor bound; skipping");
                    return None;
                };
                Some(BoundExtractor {
                    retailer: retailer.clone(),
                    extractor: factory(retailer),
                })
            })
            .collect()
    }

    pub fn contains(&self, retailer_name: &str) -> bool {
        self.factories.contains_key(&retailer_key(retailer_name))
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

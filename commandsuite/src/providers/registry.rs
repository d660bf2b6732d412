use super::RefactorProvider;
use crate::types::DocumentContext;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A provider offered for registration by a [`ProviderSource`].
pub struct ProviderCandidate {
    /// Scope the provider was declared in
    pub module: String,
    /// Whether the declaration is flagged as a refactor provider
    pub marked: bool,
    pub provider: Arc<dyn RefactorProvider>,
}

/// Enumerates providers a host has discovered, e.g. from loaded plugins.
pub trait ProviderSource {
    fn candidates(&self) -> Vec<ProviderCandidate>;
}

impl ProviderSource for Vec<ProviderCandidate> {
    fn candidates(&self) -> Vec<ProviderCandidate> {
        self.iter()
            .map(|candidate| ProviderCandidate {
                module: candidate.module.clone(),
                marked: candidate.marked,
                provider: Arc::clone(&candidate.provider),
            })
            .collect()
    }
}

/// Registered refactor providers, in registration order.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn RefactorProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Appends `provider`. Names are not required to be unique.
    pub fn register(&mut self, provider: Arc<dyn RefactorProvider>) {
        if self.providers.iter().any(|p| p.name() == provider.name()) {
            tracing::debug!("Provider '{}' registered more than once", provider.name());
        }
        tracing::debug!("Registered refactor provider '{}'", provider.name());
        self.providers.push(provider);
    }

    /// Registers every marked candidate from `source` declared in `scope`.
    /// Returns how many were registered.
    pub fn import_scope(&mut self, scope: &str, source: &dyn ProviderSource) -> usize {
        let mut registered = 0;
        for candidate in source.candidates() {
            if candidate.module != scope || !candidate.marked {
                continue;
            }
            if candidate.provider.name().trim().is_empty() {
                tracing::warn!("Skipping unnamed refactor provider from '{}'", scope);
                continue;
            }
            self.register(candidate.provider);
            registered += 1;
        }

        tracing::debug!("Imported {} provider(s) from '{}'", registered, scope);
        registered
    }

    /// Providers applicable to `ctx`, in registration order.
    ///
    /// A provider whose applicability check fails or panics is left out and
    /// the rest are still evaluated.
    pub fn query(&self, ctx: &DocumentContext) -> Vec<Arc<dyn RefactorProvider>> {
        self.providers
            .iter()
            .filter(|provider| Self::check(provider.as_ref(), ctx))
            .cloned()
            .collect()
    }

    fn check(provider: &dyn RefactorProvider, ctx: &DocumentContext) -> bool {
        match catch_unwind(AssertUnwindSafe(|| provider.is_applicable(ctx))) {
            Ok(Ok(applicable)) => applicable,
            Ok(Err(e)) => {
                tracing::warn!(
                    "Applicability check for '{}' failed: {:#}",
                    provider.name(),
                    e
                );
                false
            }
            Err(_) => {
                tracing::warn!("Applicability check for '{}' panicked", provider.name());
                false
            }
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

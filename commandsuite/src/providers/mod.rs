pub mod registry;

use crate::types::{DocumentContext, EditSet};
use crate::ui::RefactorUi;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

pub use registry::{ProviderCandidate, ProviderRegistry, ProviderSource};

/// A refactoring the user can pick from the refactor menu.
#[async_trait]
pub trait RefactorProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Shown under the highlighted entry in the selection menu
    fn description(&self) -> &str;

    /// Whether this refactor makes sense at the context's cursor or
    /// selection. Errors exclude the provider from the menu.
    fn is_applicable(&self, ctx: &DocumentContext) -> Result<bool>;

    /// Produces the edits to apply. May prompt through `ui` any number of
    /// times.
    async fn compute_edits(&self, ctx: &DocumentContext, ui: &dyn RefactorUi) -> Result<EditSet>;
}

type Applicability = dyn Fn(&DocumentContext) -> Result<bool> + Send + Sync;
type Computation = dyn for<'a> Fn(&'a DocumentContext, &'a dyn RefactorUi) -> BoxFuture<'a, Result<EditSet>>
    + Send
    + Sync;

/// Provider assembled from closures, for refactors defined at runtime
/// rather than as their own type.
pub struct FnProvider {
    name: String,
    description: String,
    applicable: Box<Applicability>,
    compute: Box<Computation>,
}

impl FnProvider {
    pub fn new<A, C>(
        name: impl Into<String>,
        description: impl Into<String>,
        applicable: A,
        compute: C,
    ) -> Self
    where
        A: Fn(&DocumentContext) -> Result<bool> + Send + Sync + 'static,
        C: for<'a> Fn(&'a DocumentContext, &'a dyn RefactorUi) -> BoxFuture<'a, Result<EditSet>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            applicable: Box::new(applicable),
            compute: Box::new(compute),
        }
    }

    pub fn into_shared(self) -> Arc<dyn RefactorProvider> {
        Arc::new(self)
    }
}

#[async_trait]
impl RefactorProvider for FnProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_applicable(&self, ctx: &DocumentContext) -> Result<bool> {
        (self.applicable)(ctx)
    }

    async fn compute_edits(&self, ctx: &DocumentContext, ui: &dyn RefactorUi) -> Result<EditSet> {
        (self.compute)(ctx, ui).await
    }
}

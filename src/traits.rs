//! Seams between the optimizer core and its collaborators.

use std::sync::Arc;

use crate::model::{RoutingModel, SearchParameters, SolveOutcome};

/// A constrained-routing search engine.
///
/// Given an encoded model and search parameters, an engine either returns an
/// assignment (one route per vehicle with resolved cumul values) or a failure
/// status. Implementations must not keep state between calls: each model is
/// built for a single request and dropped after `solve` returns.
pub trait RoutingEngine {
    fn solve(&self, model: &RoutingModel<'_>, parameters: &SearchParameters) -> SolveOutcome;
}

impl<E: RoutingEngine + ?Sized> RoutingEngine for &E {
    fn solve(&self, model: &RoutingModel<'_>, parameters: &SearchParameters) -> SolveOutcome {
        (**self).solve(model, parameters)
    }
}

impl<E: RoutingEngine + ?Sized> RoutingEngine for Arc<E> {
    fn solve(&self, model: &RoutingModel<'_>, parameters: &SearchParameters) -> SolveOutcome {
        (**self).solve(model, parameters)
    }
}

//! # nest-sampler
//!
//! Bayesian evidence estimation and posterior sampling via nested
//! sampling with multi-ellipsoidal constrained prior sampling.
//!
//! The driver ([`NestedSampler`]) evolves a live-point population under
//! a rising likelihood constraint. Replacement points are drawn
//! uniformly from a union of bounding ellipsoids built over k-means
//! clusters of the live set in unit coordinates
//! ([`MultiEllipsoidSampler`]). Evidence is accumulated in log space;
//! the run ends when the evidence still locked in the live set falls
//! below a configurable fraction of the accumulated total.
//!
//! ## Architecture
//!
//! Leaves first: [`Metric`] → [`Ellipsoid`] → [`KmeansClusterer`] →
//! [`MultiEllipsoidSampler`] → [`LivePointReducer`] → [`NestedSampler`].
//! The user supplies a [`nest_core::LogLikelihood`] and a separable
//! [`Prior`]; results land in a [`nest_core::PosteriorSample`]
//! consumed by the `nest-results` crate.

#![warn(clippy::all)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]

/// K-means clustering of the live set with BIC-like K selection.
pub mod cluster;
/// Bounding ellipsoids: covariance eigendecomposition, containment,
/// uniform sampling, volumes.
pub mod ellipsoid;
/// Live-point population bookkeeping.
pub mod live;
/// Log-space arithmetic helpers.
pub mod math;
/// Distance metrics for clustering.
pub mod metric;
/// Constrained sampling over the ellipsoid union.
pub mod multiellipsoid;
/// The nested-sampling driver and its configuration.
pub mod nested;
/// Separable priors and the unit-hypercube transform.
pub mod prior;
/// Live-point reduction schedules.
pub mod reducer;

pub use cluster::{ClusterAssignment, KmeansClusterer};
pub use ellipsoid::Ellipsoid;
pub use live::LivePoint;
pub use metric::Metric;
pub use multiellipsoid::{DrawOutcome, MultiEllipsoidSampler};
pub use nested::{NestedSampler, NestedSamplerConfig};
pub use prior::{MarginalPrior, Prior};
pub use reducer::LivePointReducer;

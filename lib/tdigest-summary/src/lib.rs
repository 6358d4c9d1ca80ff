//! Centroid storage for t-digest style quantile sketches.
//!
//! A t-digest summarizes a stream of observations as a set of centroids: weighted points whose mean stands in for a
//! cluster of nearby values. This crate provides the mutable core that a digest is built on top of, [`Summary`], which
//! keeps centroids ordered by mean, merges observations that land exactly on an existing mean, and exposes the lookups
//! (neighbors, cumulative weight, and so on) that compression and quantile estimation are driven by.
//!
//! The compression policy and the quantile math itself live with the caller. This crate only guarantees that, outside
//! of an explicit [`Summary::shuffle`]/[`Summary::unshuffle`] bracket, every query observes a strictly ascending,
//! duplicate-free sequence of centroids.
//!
//! # Example
//!
//! ```
//! use tdigest_summary::Summary;
//!
//! let mut summary = Summary::new();
//! summary.add(1.0, 1).unwrap();
//! summary.add(5.0, 2).unwrap();
//! summary.add(3.0, 1).unwrap();
//!
//! let (ceiling, floor) = summary.ceiling_and_floor(4.0);
//! assert_eq!(ceiling.mean(), 5.0);
//! assert_eq!(floor.mean(), 3.0);
//! assert_eq!(summary.sum_until_index(2), 2);
//! ```
#![deny(warnings)]
#![deny(missing_docs)]

mod centroid;
pub use self::centroid::Centroid;

mod common;

mod config;
pub use self::config::{SummaryBuilder, DEFAULT_LINEAR_SEARCH_THRESHOLD};

mod error;
pub use self::error::SummaryError;

mod summary;
pub use self::summary::Summary;

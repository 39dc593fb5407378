//! # feature-geometry
//!
//! Hierarchical phonological features and the primitive operations that rewrite
//! segments through them.
//!
//! ---
//!
//! ## Two halves
//!
//! **The feature graph.** Every feature has one of four types (privative,
//! binary, scalar, node). Node features have ordered children, and a feature
//! may sit under several nodes. Values move between a numeric internal form
//! and a text form (`+`, `-`, `*`) according to the feature's type.
//!
//! **Segment operations.** Assimilation, copying, dissimilation, symbol
//! change, metathesis, deletion, and insertion over anything implementing
//! [`Segment`]. Deep assimilation makes two segments share one storage cell;
//! copying does not. That distinction is carried by [`ValueCell`], not by
//! convention.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! definition text ──▶ FeatureGraph ◀── SharedGraph ──┐
//!                          │                         │
//!                   number_form/text_form        Segment (rule engine)
//!                          │                         │
//!                          └────────▶ ops::* ◀───────┘
//!                                       │
//!                              RuleContext (optional)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`feature`] | [`FeatureType`], [`FeatureSpec`] | Feature types and definition records |
//! | [`graph`] | [`FeatureGraph`], [`GraphConfig`] | Definitions, edges, hierarchy queries, batch reports |
//! | [`loader`] | [`BundledDefaults`] | Two-pass definition grammar loader and bundled defaults |
//! | [`value`] | [`Value`] | Feature values and truthiness |
//! | [`coerce`] | | Per-type number/text conversion |
//! | [`cell`] | [`ValueCell`] | Shared-ownership storage for aliasing |
//! | [`segment`] | [`Segment`], [`RuleContext`] | Collaborator interfaces |
//! | [`ops`] | | Assimilate, copy, dissimilate, change, metathesize, delete, insert |
//! | [`basic`] | [`basic::BasicSegment`], [`basic::SymbolTable`] | Reference segment and symbol set |
//! | [`error`] | [`FeatureError`] | Error taxonomy |
//!
//! ## `no_std`
//!
//! The crate is `#![no_std]` with `alloc` by default. Enable `std` for
//! [`FeatureGraph::load_file`] and [`FeatureGraph::load_reader`]; enable `serde`
//! for serialisation of specs, values, and configuration.
//!
//! Everything is single-threaded: graphs and cells are shared with `Rc`.
//!
//! ## License
//!
//! Business Source License 1.1.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod basic;
pub mod cell;
pub mod coerce;
pub mod error;
pub mod feature;
pub mod graph;
pub mod loader;
pub mod ops;
pub mod segment;
pub mod value;

pub use cell::ValueCell;
pub use error::{FeatureError, FeatureResult};
pub use feature::{FeatureDefinition, FeatureSpec, FeatureType};
pub use graph::{BatchReport, CyclePolicy, FeatureGraph, GraphConfig, SharedGraph};
pub use loader::{BundledDefaults, ResourceLoader};
pub use segment::{Direction, Prototype, RuleContext, Segment, SymbolSet};
pub use value::Value;

//! RCNN Config - configuration store for a region-based detection pipeline
//!
//! This crate holds the training, test and backbone settings of an RPN-based
//! object detector as a fixed-schema tree of defaults that can be overridden
//! from files and from command-line `KEY VALUE` pairs, plus the conventions
//! for where experiment artifacts are written.

pub mod config;

pub use config::{
    ConfigError, ConfigTree, ConfigValue, EffectiveConfig, ImageDatabase, Number, ValueKind,
};
pub use rcnn_literal::{parse_literal, Literal};

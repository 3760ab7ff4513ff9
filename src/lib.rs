//! Studykit - JavaScript source analyzer and library/web-page export engine
//!
//! This crate provides the analysis and export core of an educational
//! JavaScript environment: a fault-tolerant source structure analyzer
//! and an exporter that resolves `@use`/`@need`/`@import` comment
//! directives to bundle user scripts into reusable library modules or
//! self-contained web pages.

pub mod analyzer;
pub mod directive;
pub mod export;

//! Core library for the finsheet-tools command line application.
//!
//! The library normalizes spreadsheet-derived tables and reconciles financial
//! line items. Responsibilities are kept narrow: the in-memory table lives in
//! [`finsheet::tools::model`], single-field cleanup helpers in
//! [`finsheet::tools::normalize`], the financial reconciliation engine in
//! [`finsheet::tools::reconcile`] with its audit trail in
//! [`finsheet::tools::audit`], workbook adapters under [`finsheet::tools::io`],
//! and the end-to-end orchestration in [`finsheet::tools::pipeline`].

pub mod finsheet;

pub use finsheet::tools::{
    Result, ToolError, audit, error, io, model, normalize, pipeline, reconcile,
};

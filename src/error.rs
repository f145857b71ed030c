//! Error types.

use thiserror::Error;

use crate::FieldId;

/// Every way an operation of this crate can fail.
///
/// All of these are reported synchronously, at the offending call, and none of them leave a
/// partial result behind: an operation over a batch either succeeds for every element or returns
/// one of these.
#[derive(Error, Debug)]
pub enum Error {
  #[error("invalid fixed-point format: {0}")]
  InvalidFormat(String),

  #[error("unknown rounding/overflow mode name: {0}")]
  UnknownMode(String),

  /// A mode that is recognised, but not emulated.
  #[error("{0} is not implemented")]
  NotImplemented(&'static str),

  #[error("unsupported input shape: {0}")]
  UnsupportedInputShape(String),

  #[error("unsupported representation: {0}")]
  UnsupportedRepresentation(String),

  #[error("raw value {raw} is outside the range of {format}")]
  InvalidRaw { raw: i128, format: String },

  #[error("input is not a finite number ({0})")]
  NonFiniteInput(f64),

  #[error("scaler is already fitted")]
  AlreadyFitted,

  #[error("scaler is not fitted")]
  NotFitted,

  #[error("degenerate target interval: inf {inf} must be below sup {sup}")]
  DegenerateTarget { inf: f64, sup: f64 },

  #[error("invalid range for {field}: min {min} is above max {max}")]
  InvalidRange { field: FieldId, min: f64, max: f64 },

  #[error("cannot infer a range for {0}: no values")]
  EmptyField(FieldId),

  #[error("field {0} is not present in the data")]
  MissingField(FieldId),

  #[error("duplicate field name {0:?}")]
  DuplicateField(String),

  #[error("expected {expected} settings (one per column or value), got {got}")]
  FormatCountMismatch { expected: usize, got: usize },

  #[error("length mismatch: expected {expected}, got {got}")]
  LengthMismatch { expected: usize, got: usize },

  #[error("value {index} differs from the reference: expected {expected}, got {actual}")]
  ReferenceMismatch { index: usize, expected: String, actual: String },

  #[error("malformed scaler table: {0}")]
  MalformedTable(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

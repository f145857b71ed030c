//! This module contains [`RangeScaler`], which brings real-valued data into a target interval
//! before quantization.
//!
//! For each field, the scaler learns the range `[min, max]` of the data, and the smallest shift
//! `k` such that dividing that range by `2^k` makes it fit in the target interval `[inf, sup]`:
//!
//! ```text
//!   k = ceil(log2((max - min) / (sup - inf)))
//! ```
//!
//! Applying the scaler clips each value to `[min, max]` and maps it to
//!
//! ```text
//!   inf + (x - min) / 2^k
//! ```
//!
//! which is an addition and a shift in hardware, rather than the general multiplication a plain
//! min-max scaler needs. `k` can be negative, if the data range is narrower than the target.
//!
//! A scaler is fitted once, and can then be applied any number of times, shared between threads,
//! and saved to or loaded from a table file (see [`ScalerTable`]).

use crate::format::{ldexp, pow2};
use crate::{Batch, Error, FieldId, Result};

/// The interval `[inf, sup]` that a [`RangeScaler`] maps data into. Defaults to `[-1, 1]`.
#[derive(Clone, Copy, Debug)]
#[derive(PartialEq)]
pub struct Target {
  pub inf: f64,
  pub sup: f64,
}

impl Target {
  pub const fn new(inf: f64, sup: f64) -> Self {
    Self { inf, sup }
  }

  pub fn width(self) -> f64 {
    self.sup - self.inf
  }
}

impl Default for Target {
  fn default() -> Self {
    Self::new(-1., 1.)
  }
}

/// Options for [`RangeScaler::fit`], built up with chained calls.
///
/// ```
/// # use soft_fixed::*;
/// let options = FitOptions::new()
///   .fields(["a", "b"])
///   .saturate("b", -10.0, 10.0)
///   .target(0.0, 1.0)
///   .precision(8);
/// # let _ = options;
/// ```
#[derive(Clone, Debug, Default)]
pub struct FitOptions {
  fields: Option<Vec<FieldId>>,
  ranges: Option<Vec<(FieldId, f64, f64)>>,
  target: Target,
  saturate: Vec<(FieldId, f64, f64)>,
  precision: Option<i32>,
}

impl FitOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fit only these fields. By default, every field of the data is fitted.
  pub fn fields<F: Into<FieldId>>(mut self, fields: impl IntoIterator<Item = F>) -> Self {
    self.fields = Some(fields.into_iter().map(Into::into).collect());
    self
  }

  /// Use `[min, max]` as the range of `field`, instead of inferring ranges from the data. Once
  /// any range is given, the data is not looked at: exactly the fields given this way are fitted.
  pub fn range(mut self, field: impl Into<FieldId>, min: f64, max: f64) -> Self {
    self.ranges.get_or_insert_with(Vec::new).push((field.into(), min, max));
    self
  }

  /// Map into `[inf, sup]`.
  pub fn target(mut self, inf: f64, sup: f64) -> Self {
    self.target = Target::new(inf, sup);
    self
  }

  /// Clip the values of `field` to `[lo, hi]` before inferring its range, so that outliers don't
  /// drive the shift.
  pub fn saturate(mut self, field: impl Into<FieldId>, lo: f64, hi: f64) -> Self {
    self.saturate.push((field.into(), lo, hi));
    self
  }

  /// Reserve the last `2^-precision` of the target, so that values quantized with `precision`
  /// fractional bits cannot round up past `sup`. Saturation bounds shrink by the same factor.
  pub fn precision(mut self, precision: i32) -> Self {
    self.precision = Some(precision);
    self
  }
}

/// The learned mapping of a single field.
#[derive(Clone, Debug)]
#[derive(PartialEq)]
struct FieldScale {
  field: FieldId,
  min: f64,
  max: f64,
  bit_shift: i32,
}

#[derive(Clone, Debug)]
#[derive(PartialEq)]
enum State {
  Empty,
  Fitted { target: Target, fields: Vec<FieldScale> },
}

/// A per-field power-of-two range scaler.
///
/// ```
/// # use soft_fixed::*;
/// let data = Batch::Keyed(Keyed::from_columns([("a", vec![-4.0, 4.0])])?);
/// let mut scaler = RangeScaler::new();
/// scaler.fit(&data, &FitOptions::new())?;
/// assert_eq!(scaler.bit_shift(&FieldId::named("a")), Some(2));
///
/// let out = scaler.apply(&Batch::Keyed(Keyed::from_columns([("a", vec![0.0, 100.0])])?))?;
/// assert_eq!(out.get(&FieldId::named("a")), Some(&[0.0, 1.0][..]));
/// # Ok::<(), soft_fixed::Error>(())
/// ```
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub struct RangeScaler {
  state: State,
}

/// The exportable table and its file format
mod table;

pub use table::{ScalerRow, ScalerTable};

/// The smallest `k` with `span <= width × 2^k`, for a finite `span >= 0` and a finite
/// `width > 0`. Both products are exact in `f64` (bar over/underflow), so there is no rounding
/// error to land on the wrong side of a power of two.
fn bit_shift(span: f64, width: f64) -> i32 {
  debug_assert!(span > 0. && width > 0.);
  let fits = |k: i32| span <= ldexp(width, k);
  let mut k = (span.log2() - width.log2()).ceil() as i32;
  while !fits(k) {
    k += 1;
  }
  while fits(k - 1) {
    k -= 1;
  }
  k
}

fn finite(x: f64) -> Result<f64> {
  if x.is_finite() { Ok(x) } else { Err(Error::NonFiniteInput(x)) }
}

/// The range of each field to fit, from the data. Upper saturation bounds are scaled by
/// `shrink`.
fn infer_ranges(data: &Batch<f64>, options: &FitOptions, shrink: f64) -> Result<Vec<(FieldId, f64, f64)>> {
  let values = |field: &FieldId| data.get(field).ok_or_else(|| Error::MissingField(field.clone()));

  // Saturation bounds, validated up front whether or not their field is fitted.
  let mut clips = Vec::with_capacity(options.saturate.len());
  for (field, lo, hi) in &options.saturate {
    values(field)?;
    let (lo, hi) = (finite(*lo)?, finite(*hi * shrink)?);
    if lo > hi {
      return Err(Error::InvalidRange { field: field.clone(), min: lo, max: hi })
    }
    clips.push((field, lo, hi));
  }

  let fields = options.fields.clone().unwrap_or_else(|| data.fields());
  let mut ranges = Vec::with_capacity(fields.len());
  for field in fields {
    let clip = clips.iter().rev().find(|(f, _, _)| **f == field).map(|&(_, lo, hi)| (lo, hi));
    let mut range: Option<(f64, f64)> = None;
    for &x in values(&field)? {
      let x = finite(x)?;
      let x = match clip { Some((lo, hi)) => x.clamp(lo, hi), None => x };
      range = Some(match range {
        None => (x, x),
        Some((min, max)) => (min.min(x), max.max(x)),
      });
    }
    let (min, max) = range.ok_or_else(|| Error::EmptyField(field.clone()))?;
    ranges.push((field, min, max));
  }
  Ok(ranges)
}

impl RangeScaler {
  /// A scaler that is not fitted yet.
  pub const fn new() -> Self {
    Self { state: State::Empty }
  }

  pub fn is_fitted(&self) -> bool {
    matches!(self.state, State::Fitted { .. })
  }

  /// Go back to the empty, not-fitted state.
  pub fn clear(&mut self) {
    self.state = State::Empty;
  }

  fn fitted(&self) -> Result<(Target, &[FieldScale])> {
    match &self.state {
      State::Empty => Err(Error::NotFitted),
      State::Fitted { target, fields } => Ok((*target, fields.as_slice())),
    }
  }

  /// The target interval, once fitted.
  pub fn target(&self) -> Option<Target> {
    self.fitted().ok().map(|(target, _)| target)
  }

  /// The fitted fields, in order.
  pub fn fields(&self) -> Vec<FieldId> {
    self.fitted().map(|(_, f)| f.iter().map(|f| f.field.clone()).collect()).unwrap_or_default()
  }

  /// The range `(min, max)` of `field`, if it is fitted.
  pub fn range(&self, field: &FieldId) -> Option<(f64, f64)> {
    let (_, fields) = self.fitted().ok()?;
    fields.iter().find(|f| &f.field == field).map(|f| (f.min, f.max))
  }

  /// The shift of `field`, if it is fitted.
  pub fn bit_shift(&self, field: &FieldId) -> Option<i32> {
    let (_, fields) = self.fitted().ok()?;
    fields.iter().find(|f| &f.field == field).map(|f| f.bit_shift)
  }

  /// Learn the mapping of each field of `data` (or of the fields and ranges in `options`).
  ///
  /// Fails with [`Error::AlreadyFitted`] if the scaler is fitted already; with
  /// [`Error::DegenerateTarget`] if the target (after reserving `2^-precision`) is empty, or if
  /// `precision` is `i32::MIN`; with
  /// [`Error::MissingField`] if a requested or saturated field is not in `data`; with
  /// [`Error::EmptyField`] if a field whose range must be inferred has no values; with
  /// [`Error::InvalidRange`] for a given range (or saturation bound) with `min > max`; and with
  /// [`Error::NonFiniteInput`] for NaN or infinite data or bounds. On failure, the scaler is
  /// left as it was.
  pub fn fit(&mut self, data: &Batch<f64>, options: &FitOptions) -> Result<()> {
    if self.is_fitted() {
      return Err(Error::AlreadyFitted)
    }

    let mut target = options.target;
    let reserved = match options.precision {
      None => 0.,
      Some(p) => p.checked_neg().map(pow2)
        .ok_or(Error::DegenerateTarget { inf: target.inf, sup: target.sup })?,
    };
    target.sup -= reserved;
    finite(target.inf)?;
    finite(target.sup)?;
    if !(target.width() > 0.) || !target.width().is_finite() {
      return Err(Error::DegenerateTarget { inf: target.inf, sup: target.sup })
    }

    let ranges = match &options.ranges {
      Some(ranges) => ranges.clone(),
      None => infer_ranges(data, options, 1. - reserved)?,
    };

    let mut fields = Vec::with_capacity(ranges.len());
    for (field, min, max) in ranges {
      let (min, max) = (finite(min)?, finite(max)?);
      if min > max {
        return Err(Error::InvalidRange { field, min, max })
      }
      if fields.iter().any(|f: &FieldScale| f.field == field) {
        return Err(Error::DuplicateField(field.to_string()))
      }
      let span = finite(max - min)?;
      let bit_shift =
        if span == 0. {
          tracing::warn!(field = %field, min, "zero-width range, leaving the field unshifted");
          0
        } else {
          bit_shift(span, target.width())
        };
      tracing::trace!(field = %field, min, max, bit_shift, "fitted field");
      fields.push(FieldScale { field, min, max, bit_shift });
    }

    tracing::debug!(fields = fields.len(), inf = target.inf, sup = target.sup, "scaler fitted");
    self.state = State::Fitted { target, fields };
    Ok(())
  }

  /// Apply the mapping to a copy of `data`. Fields that are not fitted are copied unchanged.
  ///
  /// Fails with [`Error::NotFitted`] if the scaler is not fitted, with [`Error::MissingField`] if a
  /// fitted field is not in `data`, or with [`Error::NonFiniteInput`] if a fitted field holds a
  /// NaN. Infinities are clipped to the range like any other value.
  pub fn apply(&self, data: &Batch<f64>) -> Result<Batch<f64>> {
    let mut out = data.clone();
    self.apply_in_place(&mut out)?;
    Ok(out)
  }

  /// As [`Self::apply`], but overwrite `data`. Every field is checked before any is written, so
  /// on failure `data` is unchanged.
  pub fn apply_in_place(&self, data: &mut Batch<f64>) -> Result<()> {
    let (target, fields) = self.fitted()?;
    for f in fields {
      let values = data.get(&f.field).ok_or_else(|| Error::MissingField(f.field.clone()))?;
      if let Some(&nan) = values.iter().find(|x| x.is_nan()) {
        return Err(Error::NonFiniteInput(nan))
      }
    }
    for f in fields {
      if let Some(values) = data.get_mut(&f.field) {
        for x in values {
          *x = target.inf + ldexp(x.clamp(f.min, f.max) - f.min, -f.bit_shift);
        }
      }
    }
    tracing::trace!(values = data.len(), "scaler applied");
    Ok(())
  }

  /// The fitted mapping as a table, one row per field.
  pub fn table(&self) -> Result<ScalerTable> {
    let (target, fields) = self.fitted()?;
    Ok(ScalerTable::new(fields.iter().map(|f| ScalerRow {
      feature_name: f.field.clone(),
      inf: target.inf,
      sup: target.sup,
      min: f.min,
      max: f.max,
      bit_shift: f.bit_shift,
    }).collect()))
  }

  /// Rebuild a fitted scaler from its table. The target is taken from the first row.
  pub fn from_table(table: &ScalerTable) -> Result<Self> {
    let first = table.rows().first().ok_or_else(|| Error::MalformedTable("no rows".into()))?;
    let target = Target::new(first.inf, first.sup);
    let fields = table.rows().iter().map(|row| FieldScale {
      field: row.feature_name.clone(),
      min: row.min,
      max: row.max,
      bit_shift: row.bit_shift,
    }).collect();
    Ok(Self { state: State::Fitted { target, fields } })
  }

  /// Save the fitted mapping to `path` (see [`ScalerTable::save`]).
  pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
    self.table()?.save(path)
  }

  /// Load a fitted scaler from `path` (see [`ScalerTable::load`]).
  pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
    Self::from_table(&ScalerTable::load(path)?)
  }
}

impl Default for RangeScaler {
  fn default() -> Self {
    Self::new()
  }
}

impl core::fmt::Display for RangeScaler {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self.table() {
      Ok(table) => write!(f, "inf + (x - min) >> bit_shift\n{table}"),
      Err(_) => f.write_str("RangeScaler (not fitted)"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Keyed;

  fn keyed(columns: &[(&str, &[f64])]) -> Batch<f64> {
    Batch::Keyed(Keyed::from_columns(columns.iter().map(|(n, v)| (*n, v.to_vec()))).unwrap())
  }

  fn a() -> FieldId {
    FieldId::named("a")
  }

  #[test]
  fn symmetric_range() {
    let mut s = RangeScaler::new();
    s.fit(&keyed(&[("a", &[-4.0, 4.0])]), &FitOptions::new()).unwrap();
    assert_eq!(s.bit_shift(&a()), Some(2));
    assert_eq!(s.range(&a()), Some((-4.0, 4.0)));
    assert_eq!(s.target(), Some(Target::new(-1.0, 1.0)));
    let out = s.apply(&keyed(&[("a", &[0.0, -4.0, 4.0])])).unwrap();
    assert_eq!(out.get(&a()), Some(&[0.0, -1.0, 1.0][..]));
  }

  #[test]
  fn shifts() {
    // Exact powers of two stay put; anything above moves to the next one.
    assert_eq!(bit_shift(8.0, 2.0), 2);
    assert_eq!(bit_shift(8.000001, 2.0), 3);
    assert_eq!(bit_shift(7.9, 2.0), 2);
    assert_eq!(bit_shift(0.5, 2.0), -2);
    assert_eq!(bit_shift(0.3, 2.0), -2);
    assert_eq!(bit_shift(1e300, 1e-300), 1994);
    assert_eq!(bit_shift(3.0, 1.0 - 2f64.powi(-8)), 2);
  }

  #[test]
  fn state_machine() {
    let data = keyed(&[("a", &[1.0, 2.0])]);
    let mut s = RangeScaler::new();
    assert!(matches!(s.apply(&data), Err(Error::NotFitted)));
    assert!(matches!(s.table(), Err(Error::NotFitted)));
    assert_eq!(s.to_string(), "RangeScaler (not fitted)");
    s.fit(&data, &FitOptions::new()).unwrap();
    assert!(matches!(s.fit(&data, &FitOptions::new()), Err(Error::AlreadyFitted)));
    s.clear();
    assert!(!s.is_fitted());
    s.fit(&data, &FitOptions::new()).unwrap();
    assert!(s.is_fitted());
  }

  #[test]
  fn anonymous() {
    let mut s = RangeScaler::new();
    s.fit(&Batch::Sequence(vec![10.0, 14.0, 12.0]), &FitOptions::new().target(0.0, 1.0)).unwrap();
    assert_eq!(s.fields(), [FieldId::Anonymous]);
    assert_eq!(s.bit_shift(&FieldId::Anonymous), Some(2));
    assert_eq!(s.apply(&Batch::Scalar(13.0)).unwrap(), Batch::Scalar(0.75));
    assert!(matches!(s.apply(&keyed(&[("a", &[1.0])])), Err(Error::MissingField(FieldId::Anonymous))));
  }

  #[test]
  fn selected_fields_and_passthrough() {
    let data = keyed(&[("a", &[0.0, 3.0]), ("b", &[100.0, 200.0])]);
    let mut s = RangeScaler::new();
    s.fit(&data, &FitOptions::new().fields(["a"])).unwrap();
    assert_eq!(s.fields(), [a()]);
    let out = s.apply(&data).unwrap();
    assert_eq!(out.get(&a()), Some(&[-1.0, 0.5][..]));
    assert_eq!(out.get(&FieldId::named("b")), Some(&[100.0, 200.0][..]));

    let mut s = RangeScaler::new();
    let res = s.fit(&data, &FitOptions::new().fields(["c"]));
    assert!(matches!(res, Err(Error::MissingField(FieldId::Named(n))) if n == "c"));
    assert!(!s.is_fitted());
  }

  #[test]
  fn explicit_ranges() {
    let mut s = RangeScaler::new();
    s.fit(&Batch::Sequence(vec![]), &FitOptions::new().range("x", 0.0, 16.0)).unwrap();
    assert_eq!(s.bit_shift(&FieldId::named("x")), Some(3));

    let mut s = RangeScaler::new();
    let res = s.fit(&Batch::Sequence(vec![]), &FitOptions::new().range("x", 2.0, 1.0));
    assert!(matches!(res, Err(Error::InvalidRange { min, max, .. }) if min == 2.0 && max == 1.0));
  }

  #[test]
  fn precision_and_saturate() {
    let data = keyed(&[("a", &[-1000.0, 0.0, 1.0, 1000.0])]);
    let mut s = RangeScaler::new();
    s.fit(&data, &FitOptions::new().saturate("a", -2.0, 2.0).precision(2)).unwrap();
    // The target shrinks to [-1, 0.75], and the saturation bound to 2 × 0.75.
    assert_eq!(s.target(), Some(Target::new(-1.0, 0.75)));
    assert_eq!(s.range(&a()), Some((-2.0, 1.5)));
    assert_eq!(s.bit_shift(&a()), Some(1));
    let out = s.apply(&data).unwrap();
    assert_eq!(out.get(&a()), Some(&[-1.0, 0.0, 0.5, 0.75][..]));
  }

  #[test]
  fn degenerate() {
    let data = keyed(&[("a", &[1.0])]);
    let mut s = RangeScaler::new();
    assert!(matches!(s.fit(&data, &FitOptions::new().target(1.0, 1.0)), Err(Error::DegenerateTarget { .. })));
    assert!(matches!(s.fit(&data, &FitOptions::new().target(0.0, 0.5).precision(1)), Err(Error::DegenerateTarget { .. })));
    assert!(matches!(s.fit(&keyed(&[("a", &[])]), &FitOptions::new()), Err(Error::EmptyField(_))));
    assert!(matches!(s.fit(&keyed(&[("a", &[f64::NAN])]), &FitOptions::new()), Err(Error::NonFiniteInput(_))));
    assert!(matches!(
      s.fit(&data, &FitOptions::new().saturate("zz", 0.0, 1.0)),
      Err(Error::MissingField(_)),
    ));
    // A single value gives a zero-width range: no shift.
    s.fit(&data, &FitOptions::new()).unwrap();
    assert_eq!(s.bit_shift(&a()), Some(0));
    assert_eq!(s.apply(&keyed(&[("a", &[5.0])])).unwrap().get(&a()), Some(&[-1.0][..]));
  }

  #[test]
  fn extreme_precision() {
    let data = keyed(&[("a", &[0.0, 1.0])]);
    let mut s = RangeScaler::new();
    assert!(matches!(
      s.fit(&data, &FitOptions::new().precision(i32::MIN)),
      Err(Error::DegenerateTarget { .. }),
    ));
    assert!(matches!(s.fit(&data, &FitOptions::new().precision(-2000)), Err(Error::NonFiniteInput(_))));
    assert!(!s.is_fitted());
    // Nothing left to reserve.
    s.fit(&data, &FitOptions::new().precision(i32::MAX).saturate("a", 0.0, 1.0)).unwrap();
    assert_eq!(s.target(), Some(Target::new(-1.0, 1.0)));
    assert_eq!(s.range(&a()), Some((0.0, 1.0)));
  }

  #[test]
  fn apply_rejects_nan() {
    let mut s = RangeScaler::new();
    s.fit(&keyed(&[("a", &[-4.0, 4.0])]), &FitOptions::new().fields(["a"])).unwrap();
    let mut data = keyed(&[("a", &[1.0, f64::NAN]), ("b", &[f64::NAN])]);
    let before = data.clone();
    assert!(matches!(s.apply_in_place(&mut data), Err(Error::NonFiniteInput(x)) if x.is_nan()));
    assert_eq!(data.get(&a()).map(|v| v[0]), before.get(&a()).map(|v| v[0]));

    // Unfitted fields are passed through as they are; infinities clip.
    let out = s.apply(&keyed(&[("a", &[f64::INFINITY, f64::NEG_INFINITY]), ("b", &[f64::NAN])])).unwrap();
    assert_eq!(out.get(&a()), Some(&[1.0, -1.0][..]));
    assert!(out.get(&FieldId::named("b")).is_some_and(|b| b[0].is_nan()));
  }

  #[test]
  fn apply_does_not_mutate() {
    let data = keyed(&[("a", &[-4.0, 0.0, 4.0])]);
    let mut s = RangeScaler::new();
    s.fit(&data, &FitOptions::new()).unwrap();
    let before = data.clone();
    let once = s.apply(&data).unwrap();
    let twice = s.apply(&data).unwrap();
    assert_eq!(once, twice);
    assert_eq!(data, before);
  }

  #[test]
  fn apply_in_place_all_or_nothing() {
    let mut s = RangeScaler::new();
    s.fit(&keyed(&[("a", &[0.0, 2.0]), ("b", &[0.0, 2.0])]), &FitOptions::new()).unwrap();
    let mut partial = keyed(&[("a", &[1.0])]);
    assert!(matches!(s.apply_in_place(&mut partial), Err(Error::MissingField(_))));
    assert_eq!(partial, keyed(&[("a", &[1.0])]));

    let mut full = keyed(&[("a", &[1.0]), ("b", &[2.0])]);
    s.apply_in_place(&mut full).unwrap();
    assert_eq!(full, keyed(&[("a", &[0.0]), ("b", &[1.0])]));
  }

  #[test]
  fn display() {
    let mut s = RangeScaler::new();
    s.fit(&keyed(&[("a", &[-4.0, 4.0])]), &FitOptions::new()).unwrap();
    let text = s.to_string();
    assert!(text.starts_with("inf + (x - min) >> bit_shift\n"));
    assert!(text.contains("feature_name"));
  }
}

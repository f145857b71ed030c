//! Data-parallel quantization of many columns at once.
//!
//! Each column of a [`Keyed`] collection is an independent task on the rayon global pool, with
//! its own [`FixedFormat`] (and, when rendering, its own [`Repr`]). Results come back under the same names, in the same order, with the
//! same row index as the input. If any value fails, the error of the first failing column (in
//! input order) is returned, and nothing else.

use rayon::prelude::*;

use crate::{Error, FixedFormat, Keyed, QuantizedValue, Rendered, Repr, Result, quantize};

/// A setting for every column (or every value): one shared by all, or one each, in order.
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub enum PerColumn<T> {
  Single(T),
  Each(Vec<T>),
}

/// The formats for [`quantize_columns`] and [`convert_columns`].
pub type ColumnFormats = PerColumn<FixedFormat>;

/// The representations for [`convert_columns`] and [`convert_many`].
pub type ColumnReprs = PerColumn<Repr>;

impl<T: Copy> PerColumn<T> {
  /// One setting per column, or [`Error::FormatCountMismatch`].
  fn resolve(&self, columns: usize) -> Result<Vec<T>> {
    match self {
      Self::Single(x) => Ok(vec![*x; columns]),
      Self::Each(v) if v.len() == columns => Ok(v.clone()),
      Self::Each(v) => Err(Error::FormatCountMismatch { expected: columns, got: v.len() }),
    }
  }
}

impl From<FixedFormat> for ColumnFormats {
  fn from(format: FixedFormat) -> Self {
    Self::Single(format)
  }
}

impl From<Vec<FixedFormat>> for ColumnFormats {
  fn from(formats: Vec<FixedFormat>) -> Self {
    Self::Each(formats)
  }
}

impl From<Repr> for ColumnReprs {
  fn from(repr: Repr) -> Self {
    Self::Single(repr)
  }
}

impl From<Vec<Repr>> for ColumnReprs {
  fn from(reprs: Vec<Repr>) -> Self {
    Self::Each(reprs)
  }
}

/// Formats and representations, paired up and checked.
fn pairs(formats: &ColumnFormats, reprs: &ColumnReprs, n: usize) -> Result<Vec<(FixedFormat, Repr)>> {
  let formats = formats.resolve(n)?;
  let reprs = reprs.resolve(n)?.into_iter().map(Repr::check).collect::<Result<Vec<_>>>()?;
  Ok(formats.into_iter().zip(reprs).collect())
}

fn quantize_column(values: &[f64], format: FixedFormat) -> Result<Vec<QuantizedValue>> {
  values.iter().map(|&x| quantize(x, format)).collect()
}

fn convert_column(values: &[f64], (format, repr): (FixedFormat, Repr)) -> Result<Vec<Rendered>> {
  values.iter().map(|&x| quantize(x, format)?.render(repr)).collect()
}

/// Run `f` on every column in parallel, with that column's `settings`, then merge in input
/// order. Errors are collected per column first, so the one reported is always that of the
/// first failing column.
fn fan_out<P: Copy + Send + Sync + core::fmt::Debug, U: Send>(
  data: &Keyed<f64>,
  settings: Vec<P>,
  f: impl Fn(&[f64], P) -> Result<Vec<U>> + Sync,
) -> Result<Keyed<U>> {
  let columns: Vec<(&str, &[f64])> = data.iter().collect();
  let results: Vec<Result<Vec<U>>> = columns
    .par_iter()
    .zip(settings.par_iter())
    .map(|((name, values), &setting)| {
      tracing::trace!(column = name, values = values.len(), ?setting, "quantizing column");
      f(*values, setting)
    })
    .collect();
  let columns = results.into_iter().collect::<Result<Vec<_>>>()?;
  tracing::debug!(columns = columns.len(), "quantized columns in parallel");
  Ok(data.with_columns(columns))
}

/// Quantize every column of `data` in parallel, column `i` into the `i`-th format of `formats`.
///
/// ```
/// # use soft_fixed::*;
/// let data = Keyed::from_columns([("a", vec![0.3, 0.7]), ("b", vec![5.0])])?;
/// let formats: Vec<FixedFormat> = vec!["ap_fixed<4,2,AP_RND>".parse()?, "ap_uint<2>".parse()?];
/// let q = par::quantize_columns(&data, &formats.into())?;
/// assert_eq!(q.map(|q| q.raw()).get("a"), Some(&[1_i128, 3][..]));
/// assert_eq!(q.map(|q| q.raw()).get("b"), Some(&[1_i128][..]));
/// # Ok::<(), soft_fixed::Error>(())
/// ```
pub fn quantize_columns(data: &Keyed<f64>, formats: &ColumnFormats) -> Result<Keyed<QuantizedValue>> {
  fan_out(data, formats.resolve(data.len())?, quantize_column)
}

/// As [`quantize_columns`], then render column `i` in the `i`-th representation of `reprs`,
/// within the same task.
///
/// ```
/// # use soft_fixed::*;
/// let data = Keyed::from_columns([("a", vec![-2.25]), ("b", vec![-2.25])])?;
/// let fmt: FixedFormat = "ap_fixed<8,5>".parse()?;
/// let out = par::convert_columns(&data, &fmt.into(), &vec![Repr::Binary, Repr::Int].into())?;
/// assert_eq!(out.get("a"), Some(&[Rendered::Text("11101.110".into())][..]));
/// assert_eq!(out.get("b"), Some(&[Rendered::Int(-18)][..]));
/// # Ok::<(), soft_fixed::Error>(())
/// ```
pub fn convert_columns(data: &Keyed<f64>, formats: &ColumnFormats, reprs: &ColumnReprs) -> Result<Keyed<Rendered>> {
  fan_out(data, pairs(formats, reprs, data.len())?, convert_column)
}

/// Quantize `values[i]` into `formats[i]`, for every `i`, in parallel.
///
/// Fails with [`Error::LengthMismatch`] if the slices differ in length, or with the error of the
/// first failing value.
pub fn quantize_many(values: &[f64], formats: &[FixedFormat]) -> Result<Vec<QuantizedValue>> {
  if values.len() != formats.len() {
    return Err(Error::LengthMismatch { expected: values.len(), got: formats.len() })
  }
  let results: Vec<Result<QuantizedValue>> = values
    .par_iter()
    .zip(formats.par_iter())
    .map(|(&x, &format)| quantize(x, format))
    .collect();
  results.into_iter().collect()
}

/// As [`quantize_many`], then render `values[i]` in the `i`-th representation of `reprs`.
///
/// Fails with [`Error::LengthMismatch`] if `values` and `formats` differ in length, and with
/// [`Error::FormatCountMismatch`] if `reprs` has one per value but not as many as `values`.
pub fn convert_many(values: &[f64], formats: &[FixedFormat], reprs: &ColumnReprs) -> Result<Vec<Rendered>> {
  if values.len() != formats.len() {
    return Err(Error::LengthMismatch { expected: values.len(), got: formats.len() })
  }
  let reprs = pairs(&ColumnFormats::Each(formats.to_vec()), reprs, values.len())?;
  let results: Vec<Result<Rendered>> = values
    .par_iter()
    .zip(reprs.par_iter())
    .map(|(&x, &(format, repr))| quantize(x, format)?.render(repr))
    .collect();
  results.into_iter().collect()
}

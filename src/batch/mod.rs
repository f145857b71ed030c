//! This module contains [`Batch`], the shape that values travel in between the caller and the
//! quantizer or the scaler.
//!
//! Inputs come as a single number, as a sequence of numbers, or as a collection of named
//! sequences (a *field* each). The named collection ([`Keyed`]) is either a plain mapping from
//! names to sequences, or a column-oriented table whose rows carry index labels; it remembers
//! which, so that outputs can be given back in the same shape as the inputs.
//!
//! Every operation on a batch preserves its shape: the same variant, the same lengths, and for
//! [`Keyed`] batches the same field names in the same order.

use crate::{Error, Result};

/// The name of a field in a [`Batch`]. Scalars and sequences consist of a single field with no
/// name ([`FieldId::Anonymous`]); the fields of a [`Keyed`] batch are named.
///
/// Serialized as a string, or as `null` for the anonymous field.
#[derive(Clone, Debug)]
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum FieldId {
  Anonymous,
  Named(String),
}

impl FieldId {
  pub fn named(name: impl Into<String>) -> Self {
    Self::Named(name.into())
  }

  /// The name of the field, if it has one.
  pub fn name(&self) -> Option<&str> {
    match self {
      Self::Anonymous => None,
      Self::Named(name) => Some(name),
    }
  }
}

impl From<&str> for FieldId {
  fn from(value: &str) -> Self {
    Self::named(value)
  }
}

impl From<String> for FieldId {
  fn from(value: String) -> Self {
    Self::Named(value)
  }
}

impl From<Option<String>> for FieldId {
  fn from(value: Option<String>) -> Self {
    value.map_or(Self::Anonymous, Self::Named)
  }
}

impl From<FieldId> for Option<String> {
  fn from(value: FieldId) -> Self {
    match value {
      FieldId::Anonymous => None,
      FieldId::Named(name) => Some(name),
    }
  }
}

impl core::fmt::Display for FieldId {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::Anonymous => f.write_str("<anonymous>"),
      Self::Named(name) => write!(f, "{name:?}"),
    }
  }
}

/// An ordered collection of uniquely named columns, plus, if it was read from a table, the
/// labels of its rows.
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub struct Keyed<T> {
  columns: Vec<(String, Vec<T>)>,
  index: Option<Vec<String>>,
}

/// A batch of values: one value, a sequence of values, or a collection of named sequences.
///
/// ```
/// # use soft_fixed::*;
/// let data = Batch::Keyed(Keyed::from_columns([("a", vec![1.0, 2.0]), ("b", vec![3.0])])?);
/// assert_eq!(data.len(), 3);
/// assert_eq!(data.fields(), [FieldId::named("a"), FieldId::named("b")]);
///
/// let doubled = data.map(|x| x * 2.0);
/// assert_eq!(doubled.get(&FieldId::named("a")), Some(&[2.0, 4.0][..]));
/// # Ok::<(), soft_fixed::Error>(())
/// ```
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub enum Batch<T> {
  Scalar(T),
  Sequence(Vec<T>),
  Keyed(Keyed<T>),
}

/// Reading and writing batches as JSON
mod json;

impl<T> Keyed<T> {
  /// An empty collection, with no columns and no row index.
  pub fn new() -> Self {
    Self { columns: Vec::new(), index: None }
  }

  /// Collect `columns` in order. Fails with [`Error::DuplicateField`] if a name repeats.
  pub fn from_columns<S: Into<String>>(columns: impl IntoIterator<Item = (S, Vec<T>)>) -> Result<Self> {
    let mut keyed = Self::new();
    for (name, values) in columns {
      keyed.insert(name, values)?;
    }
    Ok(keyed)
  }

  /// Append a column at the end. Fails with [`Error::DuplicateField`] if `name` is taken, or with
  /// [`Error::LengthMismatch`] if there is a row index and `values` does not have one value per
  /// row.
  pub fn insert(&mut self, name: impl Into<String>, values: Vec<T>) -> Result<()> {
    let name = name.into();
    if self.get(&name).is_some() {
      return Err(Error::DuplicateField(name))
    }
    if let Some(index) = &self.index && index.len() != values.len() {
      return Err(Error::LengthMismatch { expected: index.len(), got: values.len() })
    }
    self.columns.push((name, values));
    Ok(())
  }

  /// Attach row labels, turning a mapping into a table. Every column must have one value per
  /// label, or this fails with [`Error::LengthMismatch`].
  pub fn with_index(mut self, index: Vec<String>) -> Result<Self> {
    if let Some((_, values)) = self.columns.iter().find(|(_, v)| v.len() != index.len()) {
      return Err(Error::LengthMismatch { expected: index.len(), got: values.len() })
    }
    self.index = Some(index);
    Ok(self)
  }

  /// The row labels, if this collection is a table.
  pub fn index(&self) -> Option<&[String]> {
    self.index.as_deref()
  }

  pub fn get(&self, name: &str) -> Option<&[T]> {
    self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
  }

  pub fn get_mut(&mut self, name: &str) -> Option<&mut [T]> {
    self.columns.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v.as_mut_slice())
  }

  /// The column names, in order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|(n, _)| n.as_str())
  }

  /// The columns, in order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
    self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
  }

  /// The number of columns.
  pub fn len(&self) -> usize {
    self.columns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.columns.is_empty()
  }

  /// Apply `f` to every value, keeping names, order, and row index.
  pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Keyed<U> {
    Keyed {
      columns: self.columns.iter().map(|(n, v)| (n.clone(), v.iter().map(&mut f).collect())).collect(),
      index: self.index.clone(),
    }
  }

  /// As [`Self::map`], but stop at the first error and return it.
  pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> core::result::Result<U, E>) -> core::result::Result<Keyed<U>, E> {
    let mut columns = Vec::with_capacity(self.columns.len());
    for (name, values) in &self.columns {
      columns.push((name.clone(), values.iter().map(&mut f).collect::<core::result::Result<_, E>>()?));
    }
    Ok(Keyed { columns, index: self.index.clone() })
  }

  /// Rebuild a collection with the names and row index of `self` from new columns in the same
  /// order, as produced by a computation over [`Self::iter`].
  pub(crate) fn with_columns<U>(&self, columns: Vec<Vec<U>>) -> Keyed<U> {
    debug_assert_eq!(columns.len(), self.columns.len());
    Keyed {
      columns: self.columns.iter().map(|(n, _)| n.clone()).zip(columns).collect(),
      index: self.index.clone(),
    }
  }
}

impl<T> Default for Keyed<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Batch<T> {
  /// The total number of values, over all fields.
  pub fn len(&self) -> usize {
    match self {
      Self::Scalar(_) => 1,
      Self::Sequence(v) => v.len(),
      Self::Keyed(k) => k.columns.iter().map(|(_, v)| v.len()).sum(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The fields of the batch, in order: the anonymous field for scalars and sequences, or the
  /// names of a keyed batch.
  pub fn fields(&self) -> Vec<FieldId> {
    match self {
      Self::Scalar(_) | Self::Sequence(_) => vec![FieldId::Anonymous],
      Self::Keyed(k) => k.names().map(FieldId::named).collect(),
    }
  }

  /// The values of field `field`, if the batch has it.
  pub fn get(&self, field: &FieldId) -> Option<&[T]> {
    match (self, field) {
      (Self::Scalar(x), FieldId::Anonymous) => Some(core::slice::from_ref(x)),
      (Self::Sequence(v), FieldId::Anonymous) => Some(v),
      (Self::Keyed(k), FieldId::Named(name)) => k.get(name),
      _ => None,
    }
  }

  pub fn get_mut(&mut self, field: &FieldId) -> Option<&mut [T]> {
    match (self, field) {
      (Self::Scalar(x), FieldId::Anonymous) => Some(core::slice::from_mut(x)),
      (Self::Sequence(v), FieldId::Anonymous) => Some(v),
      (Self::Keyed(k), FieldId::Named(name)) => k.get_mut(name),
      _ => None,
    }
  }

  /// Apply `f` to every value, keeping the shape.
  pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Batch<U> {
    match self {
      Self::Scalar(x) => Batch::Scalar(f(x)),
      Self::Sequence(v) => Batch::Sequence(v.iter().map(f).collect()),
      Self::Keyed(k) => Batch::Keyed(k.map(f)),
    }
  }

  /// As [`Self::map`], but stop at the first error and return it; no partial result is built.
  pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> core::result::Result<U, E>) -> core::result::Result<Batch<U>, E> {
    Ok(match self {
      Self::Scalar(x) => Batch::Scalar(f(x)?),
      Self::Sequence(v) => Batch::Sequence(v.iter().map(f).collect::<core::result::Result<_, E>>()?),
      Self::Keyed(k) => Batch::Keyed(k.try_map(f)?),
    })
  }
}

impl<T> From<Vec<T>> for Batch<T> {
  fn from(value: Vec<T>) -> Self {
    Self::Sequence(value)
  }
}

impl<T> From<Keyed<T>> for Batch<T> {
  fn from(value: Keyed<T>) -> Self {
    Self::Keyed(value)
  }
}

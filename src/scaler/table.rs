use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, FieldId, Result};

/// One fitted field: its name, the target interval, its range, and its shift.
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub struct ScalerRow {
  pub feature_name: FieldId,
  pub inf: f64,
  pub sup: f64,
  pub min: f64,
  pub max: f64,
  pub bit_shift: i32,
}

/// The exportable form of a fitted [`RangeScaler`](crate::RangeScaler): one row per field.
///
/// On disk, a table is the column-oriented JSON that pandas writes with `DataFrame.to_json()`:
/// one object per column, each mapping row labels `"0"`, `"1"`, ... to values. The anonymous
/// field is written with a `null` name.
///
/// ```text
/// {"feature_name":{"0":"a"},"inf":{"0":-1.0},"sup":{"0":1.0},"min":{"0":-4.0},"max":{"0":4.0},"bit_shift":{"0":2}}
/// ```
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub struct ScalerTable {
  rows: Vec<ScalerRow>,
}

/// The on-disk layout. Row labels are integers, so that rows come back in numeric order.
#[derive(Serialize, Deserialize)]
struct Columns {
  feature_name: BTreeMap<usize, FieldId>,
  inf: BTreeMap<usize, f64>,
  sup: BTreeMap<usize, f64>,
  min: BTreeMap<usize, f64>,
  max: BTreeMap<usize, f64>,
  bit_shift: BTreeMap<usize, i32>,
}

impl From<&ScalerTable> for Columns {
  fn from(table: &ScalerTable) -> Self {
    let column = |f: fn(&ScalerRow) -> f64| table.rows.iter().map(f).enumerate().collect();
    Self {
      feature_name: table.rows.iter().map(|r| r.feature_name.clone()).enumerate().collect(),
      inf: column(|r| r.inf),
      sup: column(|r| r.sup),
      min: column(|r| r.min),
      max: column(|r| r.max),
      bit_shift: table.rows.iter().map(|r| r.bit_shift).enumerate().collect(),
    }
  }
}

impl TryFrom<Columns> for ScalerTable {
  type Error = Error;

  fn try_from(mut columns: Columns) -> Result<Self> {
    let labels: Vec<usize> = columns.feature_name.keys().copied().collect();
    if labels.is_empty() {
      return Err(Error::MalformedTable("no rows".into()))
    }
    let same_rows = |keys: Vec<usize>| keys == labels;
    if !(
      same_rows(columns.inf.keys().copied().collect()) &&
      same_rows(columns.sup.keys().copied().collect()) &&
      same_rows(columns.min.keys().copied().collect()) &&
      same_rows(columns.max.keys().copied().collect()) &&
      same_rows(columns.bit_shift.keys().copied().collect())
    ) {
      return Err(Error::MalformedTable("columns do not have the same rows".into()))
    }

    let mut rows = Vec::with_capacity(labels.len());
    for label in &labels {
      let take = |c: &mut BTreeMap<usize, f64>| c.remove(label).unwrap_or(f64::NAN);
      let row = ScalerRow {
        inf: take(&mut columns.inf),
        sup: take(&mut columns.sup),
        min: take(&mut columns.min),
        max: take(&mut columns.max),
        feature_name: columns.feature_name.remove(label).unwrap_or(FieldId::Anonymous),
        bit_shift: columns.bit_shift.remove(label).unwrap_or_default(),
      };
      rows.push(row);
    }
    ScalerTable::validate(rows)
  }
}

impl ScalerTable {
  pub(crate) fn new(rows: Vec<ScalerRow>) -> Self {
    Self { rows }
  }

  /// Check that `rows` describe a fitted scaler.
  fn validate(rows: Vec<ScalerRow>) -> Result<Self> {
    for (i, row) in rows.iter().enumerate() {
      if ![row.inf, row.sup, row.min, row.max].iter().all(|x| x.is_finite()) {
        return Err(Error::MalformedTable(format!("row {i} has a non-finite value")))
      }
      if row.min > row.max || row.inf >= row.sup {
        return Err(Error::MalformedTable(format!("row {i} has an empty range or target")))
      }
      if row.bit_shift == i32::MIN {
        return Err(Error::MalformedTable(format!("row {i} has an out of range bit_shift")))
      }
      if rows[.. i].iter().any(|r| r.feature_name == row.feature_name) {
        return Err(Error::MalformedTable(format!("field {} appears twice", row.feature_name)))
      }
    }
    Ok(Self { rows })
  }

  pub fn rows(&self) -> &[ScalerRow] {
    &self.rows
  }

  /// Write the table as JSON to `writer`.
  pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
    serde_json::to_writer(&mut writer, &Columns::from(self))?;
    writer.flush()?;
    Ok(())
  }

  /// Read a table written by [`Self::to_writer`] (or by pandas) from `reader`.
  ///
  /// Fails with [`Error::Json`] if the input is not a table of the right columns, and with
  /// [`Error::MalformedTable`] if the table is empty, its columns have different rows, or its
  /// rows don't describe a fitted field (non-finite values, `min > max`, `inf >= sup`, a
  /// repeated name, or a `bit_shift` of `i32::MIN`, which has no opposite).
  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    let columns: Columns = serde_json::from_reader(reader)?;
    Self::try_from(columns)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    self.to_writer(BufWriter::new(File::create(path)?))?;
    tracing::debug!(path = %path.display(), rows = self.rows.len(), "saved scaler table");
    Ok(())
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let table = Self::from_reader(BufReader::new(File::open(path)?))?;
    tracing::debug!(path = %path.display(), rows = table.rows.len(), "loaded scaler table");
    Ok(table)
  }
}

/// An aligned text table, one line per row, labelled like the rows on disk.
impl core::fmt::Display for ScalerTable {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let header = ["", "feature_name", "inf", "sup", "min", "max", "bit_shift"];
    let cells: Vec<[String; 7]> = self.rows.iter().enumerate().map(|(i, r)| [
      i.to_string(),
      r.feature_name.name().unwrap_or("None").to_owned(),
      r.inf.to_string(),
      r.sup.to_string(),
      r.min.to_string(),
      r.max.to_string(),
      r.bit_shift.to_string(),
    ]).collect();

    let mut widths = header.map(str::len);
    for row in &cells {
      for (w, c) in widths.iter_mut().zip(row) {
        *w = (*w).max(c.len());
      }
    }

    for (col, (h, w)) in header.iter().zip(widths).enumerate() {
      if col > 0 { f.write_str("  ")? }
      write!(f, "{h:>w$}")?;
    }
    for row in &cells {
      f.write_str("\n")?;
      for (col, (c, w)) in row.iter().zip(widths).enumerate() {
        if col > 0 { f.write_str("  ")? }
        write!(f, "{c:>w$}")?;
      }
    }
    Ok(())
  }
}

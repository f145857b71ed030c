use super::*;

use serde::Serialize;
use serde_json::{Map, Value};

fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

fn number(value: &Value, at: impl FnOnce() -> String) -> Result<f64> {
  match value {
    Value::Number(n) => n.as_f64().ok_or_else(|| Error::UnsupportedInputShape(format!("{n} at {} is out of range", at()))),
    other => Err(Error::UnsupportedInputShape(format!("expected a number at {}, found {}", at(), kind(other)))),
  }
}

fn numbers(values: &[Value], name: &str) -> Result<Vec<f64>> {
  values.iter().enumerate().map(|(i, v)| number(v, || format!("{name}[{i}]"))).collect()
}

/// A column-oriented table: `{column: {row_label: value}}`. Every column must have exactly the
/// row labels of the first one; values are taken in the order of those labels.
fn table(object: &Map<String, Value>) -> Result<Keyed<f64>> {
  let mut index: Option<Vec<String>> = None;
  let mut keyed = Keyed::new();
  for (name, column) in object {
    let Value::Object(rows) = column else {
      return Err(Error::UnsupportedInputShape(format!("column {name:?} is {}, not an object of rows", kind(column))))
    };
    let labels = index.get_or_insert_with(|| rows.keys().cloned().collect());
    if rows.len() != labels.len() || labels.iter().any(|l| !rows.contains_key(l)) {
      return Err(Error::UnsupportedInputShape(format!("column {name:?} does not have the same rows as the others")))
    }
    let values = labels.iter()
      .map(|l| number(&rows[l], || format!("{name}[{l:?}]")))
      .collect::<Result<Vec<_>>>()?;
    keyed.insert(name.clone(), values)?;
  }
  keyed.with_index(index.unwrap_or_default())
}

impl Batch<f64> {
  /// Read a batch from untyped JSON, deciding its shape from the value:
  ///
  ///   - a number gives a [`Batch::Scalar`];
  ///   - an array of numbers gives a [`Batch::Sequence`];
  ///   - an object of arrays of numbers gives a [`Batch::Keyed`] mapping;
  ///   - an object of objects of numbers (a column-oriented table, as written by pandas'
  ///     `DataFrame.to_json()`) gives a [`Batch::Keyed`] table, with the row labels as its index.
  ///
  /// Anything else fails with [`Error::UnsupportedInputShape`].
  ///
  /// ```
  /// # use soft_fixed::*;
  /// let b = Batch::from_json(&serde_json::json!({"a": {"0": 1.5, "1": -2}}))?;
  /// assert_eq!(b.get(&FieldId::named("a")), Some(&[1.5, -2.0][..]));
  /// assert!(Batch::from_json(&serde_json::json!("1.5")).is_err());
  /// # Ok::<(), soft_fixed::Error>(())
  /// ```
  pub fn from_json(value: &Value) -> Result<Self> {
    match value {
      Value::Number(_) => Ok(Self::Scalar(number(value, || "top level".into())?)),
      Value::Array(values) => Ok(Self::Sequence(numbers(values, "")?)),
      Value::Object(object) => match object.values().next() {
        None => Ok(Self::Keyed(Keyed::new())),
        Some(Value::Object(_)) => Ok(Self::Keyed(table(object)?)),
        Some(_) => {
          let mut keyed = Keyed::new();
          for (name, column) in object {
            let Value::Array(values) = column else {
              return Err(Error::UnsupportedInputShape(format!("field {name:?} is {}, not an array", kind(column))))
            };
            keyed.insert(name.clone(), numbers(values, name)?)?;
          }
          Ok(Self::Keyed(keyed))
        },
      },
      other => Err(Error::UnsupportedInputShape(format!("cannot read a batch from {}", kind(other)))),
    }
  }

  /// Parse `text` as JSON, then read it with [`Self::from_json`].
  pub fn from_json_str(text: &str) -> Result<Self> {
    Self::from_json(&serde_json::from_str(text)?)
  }
}

impl<T: Serialize> Batch<T> {
  /// Write the batch as JSON, in the same shape [`Batch::from_json`] reads: a mapping is written
  /// back as a mapping, and a table as a table with the same row labels.
  ///
  /// ```
  /// # use soft_fixed::*;
  /// let input = serde_json::json!({"b": {"r0": 0.25, "r1": 3.8}, "a": {"r0": 1, "r1": -1}});
  /// let q = quantize_batch(&Batch::from_json(&input)?, "ap_fixed<6,3,AP_TRN,AP_SAT>".parse()?)?;
  /// assert_eq!(
  ///   convert(&q, Repr::Float)?.to_json()?,
  ///   serde_json::json!({"b": {"r0": 0.25, "r1": 3.75}, "a": {"r0": 1.0, "r1": -1.0}}),
  /// );
  /// # Ok::<(), soft_fixed::Error>(())
  /// ```
  pub fn to_json(&self) -> Result<Value> {
    Ok(match self {
      Self::Scalar(x) => serde_json::to_value(x)?,
      Self::Sequence(v) => serde_json::to_value(v)?,
      Self::Keyed(k) => {
        let mut object = Map::with_capacity(k.len());
        for (name, values) in k.iter() {
          let column = match k.index() {
            None => serde_json::to_value(values)?,
            Some(index) => Value::Object(
              index.iter().zip(values)
                .map(|(label, v)| -> Result<(String, Value)> { Ok((label.clone(), serde_json::to_value(v)?)) })
                .collect::<Result<Map<_, _>>>()?,
            ),
          };
          object.insert(name.to_owned(), column);
        }
        Value::Object(object)
      },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn shapes() {
    assert_eq!(Batch::from_json(&json!(2.5)).unwrap(), Batch::Scalar(2.5));
    assert_eq!(Batch::from_json(&json!([1, 2.5])).unwrap(), Batch::Sequence(vec![1.0, 2.5]));

    let b = Batch::from_json(&json!({"y": [1], "x": [2, 3]})).unwrap();
    let Batch::Keyed(k) = &b else { panic!("expected keyed") };
    assert_eq!(k.names().collect::<Vec<_>>(), ["y", "x"]);
    assert_eq!(k.index(), None);

    let b = Batch::from_json(&json!({"y": {"1": 1, "0": 2}, "x": {"0": 3, "1": 4}})).unwrap();
    let Batch::Keyed(k) = &b else { panic!("expected keyed") };
    assert_eq!(k.index(), Some(&["1".to_string(), "0".to_string()][..]));
    assert_eq!(k.get("x"), Some(&[4.0, 3.0][..]));
  }

  #[test]
  fn unsupported() {
    for bad in [
      json!(null),
      json!("1"),
      json!(true),
      json!([1, "2"]),
      json!([[1]]),
      json!({"a": 1}),
      json!({"a": [1], "b": {"0": 1}}),
      json!({"a": {"0": 1}, "b": [1]}),
      json!({"a": {"0": 1}, "b": {"1": 1}}),
      json!({"a": {"0": 1}, "b": {"0": 1, "1": 2}}),
      json!({"a": {"0": null}}),
    ] {
      assert!(matches!(Batch::from_json(&bad), Err(Error::UnsupportedInputShape(_))), "{bad}");
    }
  }

  #[test]
  fn round_trip_shapes() {
    for input in [
      json!(1.5),
      json!([1.5, -2.0]),
      json!({"b": [1.0], "a": [2.0, 3.0]}),
      json!({"b": {"x": 1.0, "y": 2.0}, "a": {"x": 3.0, "y": 4.0}}),
      json!({}),
    ] {
      assert_eq!(Batch::from_json(&input).unwrap().to_json().unwrap(), input);
    }
  }

  #[test]
  fn from_str() {
    assert_eq!(Batch::from_json_str("[0.1, 0.2]").unwrap(), Batch::Sequence(vec![0.1, 0.2]));
    assert!(matches!(Batch::from_json_str("[0.1,"), Err(Error::Json(_))));
  }
}

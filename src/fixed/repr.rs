use super::*;

use core::fmt::Write;
use core::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{Batch, Error, Result};

/// The representations a [`QuantizedValue`] can be rendered in. Parses from the names `binary`
/// (or `bin`, `str`, `string`), `hex`, `base_N` for `2 <= N <= 36`, `float` (or `double`), and
/// `int`, in any case.
#[derive(Clone, Copy, Debug)]
#[derive(Eq, PartialEq, Hash)]
pub enum Repr {
  /// The `W`-bit two's complement pattern, with a `.` before the last `F` bits.
  Binary,
  /// The `W`-bit two's complement pattern in uppercase hex, prefixed with `0x`.
  Hex,
  /// The raw integer, signed, in base `N`.
  Base(u32),
  /// The represented value as an `f64`.
  Float,
  /// The raw integer.
  Int,
}

/// A rendered [`QuantizedValue`]: text for the textual representations, a number otherwise.
#[derive(Clone, Debug)]
#[derive(PartialEq)]
pub enum Rendered {
  Text(String),
  Float(f64),
  Int(i128),
}

impl Repr {
  const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

  /// The most fractional bits a [`Repr::Binary`] rendering is written with. Formats with more
  /// (only possible with `I` far below 0) fail with [`Error::UnsupportedRepresentation`].
  pub const MAX_BINARY_DIGITS: i32 = 4096;

  pub(crate) fn check(self) -> Result<Self> {
    match self {
      Self::Base(n) if !(2 ..= 36).contains(&n) =>
        Err(Error::UnsupportedRepresentation(format!("base_{n}"))),
      _ => Ok(self),
    }
  }
}

impl FromStr for Repr {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let lower = s.trim().to_ascii_lowercase();
    let repr = match lower.as_str() {
      "binary" | "bin" | "str" | "string" => Self::Binary,
      "hex" => Self::Hex,
      "float" | "double" => Self::Float,
      "int" => Self::Int,
      other => match other.strip_prefix("base_").map(str::parse::<u32>) {
        Some(Ok(n)) => Self::Base(n),
        _ => return Err(Error::UnsupportedRepresentation(s.into())),
      },
    };
    repr.check().map_err(|_| Error::UnsupportedRepresentation(s.into()))
  }
}

impl core::fmt::Display for Repr {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::Binary => f.write_str("binary"),
      Self::Hex => f.write_str("hex"),
      Self::Base(n) => write!(f, "base_{n}"),
      Self::Float => f.write_str("float"),
      Self::Int => f.write_str("int"),
    }
  }
}

impl Serialize for Rendered {
  /// Text as a string, floats as numbers. Integers are numbers when they fit in 64 bits and
  /// decimal strings otherwise, so that they survive JSON readers without big-integer support.
  fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
    match self {
      Self::Text(s) => serializer.serialize_str(s),
      Self::Float(x) => serializer.serialize_f64(*x),
      Self::Int(n) =>
        if let Ok(n) = i64::try_from(*n) {
          serializer.serialize_i64(n)
        } else if let Ok(n) = u64::try_from(*n) {
          serializer.serialize_u64(n)
        } else {
          serializer.collect_str(n)
        },
    }
  }
}

impl QuantizedValue {
  /// Render `self` in the representation `repr`.
  ///
  /// ```
  /// # use soft_fixed::*;
  /// let q = quantize(-2.25, "ap_fixed<8,5>".parse()?)?;
  /// assert_eq!(q.render(Repr::Binary)?, Rendered::Text("11101.110".into()));
  /// assert_eq!(q.render(Repr::Hex)?, Rendered::Text("0xEE".into()));
  /// assert_eq!(q.render(Repr::Base(10))?, Rendered::Text("-18".into()));
  /// assert_eq!(q.render(Repr::Float)?, Rendered::Float(-2.25));
  /// assert_eq!(q.render(Repr::Int)?, Rendered::Int(-18));
  /// # Ok::<(), soft_fixed::Error>(())
  /// ```
  pub fn render(self, repr: Repr) -> Result<Rendered> {
    Ok(match repr.check()? {
      Repr::Binary if self.format.frac_bits() > Repr::MAX_BINARY_DIGITS =>
        return Err(Error::UnsupportedRepresentation(format!(
          "binary of {}, with {} fractional bits", self.format, self.format.frac_bits(),
        ))),
      Repr::Binary => Rendered::Text(self.to_binary()),
      Repr::Hex => Rendered::Text(self.to_hex()),
      Repr::Base(n) => Rendered::Text(self.to_base(n)),
      Repr::Float => Rendered::Float(self.to_f64()),
      Repr::Int => Rendered::Int(self.raw),
    })
  }

  /// The bit pattern, most significant bit first, with the radix point marked.
  ///
  ///   - `F <= 0`: the radix point is at or past the right end; no `.` is written.
  ///   - `0 < F < W`: `.` between bit `F` and bit `F-1`.
  ///   - `F >= W`: the pattern is extended (with copies of the sign bit if signed, with zeros if
  ///     not) to `F` bits, all of them after the `.`.
  fn to_binary(self) -> String {
    let w = self.format.total_bits();
    let f = self.format.frac_bits();
    let bit = |i: u32| -> bool {
      if i < w {
        self.bits() >> i & 1 == 1
      } else {
        self.format.signed() && self.raw < 0
      }
    };

    let digits = if f > w as i32 { f as u32 } else { w };
    let mut out = String::with_capacity(digits as usize + 1);
    if f >= w as i32 {
      out.push('.');
    }
    for i in (0 .. digits).rev() {
      out.push(if bit(i) {'1'} else {'0'});
      if f > 0 && f < w as i32 && i == f as u32 {
        out.push('.');
      }
    }
    out
  }

  fn to_hex(self) -> String {
    let digits = self.format.total_bits().div_ceil(4) as usize;
    let mut out = String::with_capacity(digits + 2);
    let _ = write!(out, "0x{:0digits$X}", self.bits());
    out
  }

  fn to_base(self, n: u32) -> String {
    let mut mag = self.raw.unsigned_abs();
    if mag == 0 {
      return "0".into()
    }
    let mut digits = Vec::new();
    while mag != 0 {
      digits.push(Repr::DIGITS[(mag % u128::from(n)) as usize]);
      mag /= u128::from(n);
    }
    if self.raw < 0 {
      digits.push(b'-');
    }
    digits.iter().rev().map(|&d| d as char).collect()
  }
}

/// Render every value of `batch` in the representation `repr`, keeping its shape.
///
/// ```
/// # use soft_fixed::*;
/// let fmt: FixedFormat = "ap_ufixed<4,2>".parse()?;
/// let q = quantize_batch(&Batch::Sequence(vec![0.25, 3.75]), fmt)?;
/// assert_eq!(
///   convert(&q, "bin".parse()?)?,
///   Batch::Sequence(vec![Rendered::Text("00.01".into()), Rendered::Text("11.11".into())]),
/// );
/// # Ok::<(), soft_fixed::Error>(())
/// ```
pub fn convert(batch: &Batch<QuantizedValue>, repr: Repr) -> Result<Batch<Rendered>> {
  let repr = repr.check()?;
  batch.try_map(|q| q.render(repr))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(raw: i128, fmt: &str) -> QuantizedValue {
    QuantizedValue::from_raw(raw, fmt.parse().unwrap()).unwrap()
  }

  fn text(r: Result<Rendered>) -> String {
    match r.unwrap() {
      Rendered::Text(s) => s,
      other => panic!("expected text, got {other:?}"),
    }
  }

  #[test]
  fn parse() {
    assert_eq!("binary".parse::<Repr>().unwrap(), Repr::Binary);
    assert_eq!("STR".parse::<Repr>().unwrap(), Repr::Binary);
    assert_eq!("Hex".parse::<Repr>().unwrap(), Repr::Hex);
    assert_eq!("base_7".parse::<Repr>().unwrap(), Repr::Base(7));
    assert_eq!("double".parse::<Repr>().unwrap(), Repr::Float);
    assert_eq!("int".parse::<Repr>().unwrap(), Repr::Int);
    for bad in ["base_1", "base_37", "base_", "base_x", "octal", ""] {
      assert!(matches!(bad.parse::<Repr>(), Err(Error::UnsupportedRepresentation(_))), "{bad}");
    }
    for repr in [Repr::Binary, Repr::Hex, Repr::Base(36), Repr::Float, Repr::Int] {
      assert_eq!(repr.to_string().parse::<Repr>().unwrap(), repr);
    }
  }

  #[test]
  fn binary() {
    assert_eq!(text(q(32, "ap_fixed<8,5>").render(Repr::Binary)), "00100.000");
    assert_eq!(text(q(-1, "ap_fixed<8,5>").render(Repr::Binary)), "11111.111");
    assert_eq!(text(q(5, "ap_uint<4>").render(Repr::Binary)), "0101");
    // F < 0: no radix point
    assert_eq!(text(q(-3, "ap_fixed<4,8>").render(Repr::Binary)), "1101");
    // F == W: radix point in front
    assert_eq!(text(q(3, "ap_ufixed<4,0>").render(Repr::Binary)), ".0011");
    // F > W: sign extension
    assert_eq!(text(q(-3, "ap_fixed<4,-2>").render(Repr::Binary)), ".111101");
    assert_eq!(text(q(13, "ap_ufixed<4,-2>").render(Repr::Binary)), ".001101");
  }

  #[test]
  fn binary_length_limit() {
    let widest = q(1, "ap_ufixed<1,-4095>").render(Repr::Binary).unwrap();
    assert_eq!(text(Ok(widest.clone())).len(), 4097);
    assert!(text(Ok(widest)).ends_with("01"));
    for fmt in ["ap_ufixed<1,-4096>", "ap_ufixed<1,-2000000000>"] {
      assert!(matches!(q(1, fmt).render(Repr::Binary), Err(Error::UnsupportedRepresentation(_))), "{fmt}");
      assert_eq!(q(1, fmt).render(Repr::Hex).unwrap(), Rendered::Text("0x1".into()));
    }
  }

  #[test]
  fn hex() {
    assert_eq!(text(q(32, "ap_fixed<8,5>").render(Repr::Hex)), "0x20");
    assert_eq!(text(q(-1, "ap_fixed<5,5>").render(Repr::Hex)), "0x1F");
    assert_eq!(text(q(-2, "ap_int<12>").render(Repr::Hex)), "0xFFE");
    assert_eq!(text(q(0, "ap_int<1>").render(Repr::Hex)), "0x0");
  }

  #[test]
  fn base() {
    assert_eq!(text(q(255, "ap_uint<8>").render(Repr::Base(16))), "FF");
    assert_eq!(text(q(-18, "ap_fixed<8,5>").render(Repr::Base(2))), "-10010");
    assert_eq!(text(q(35, "ap_int<8>").render(Repr::Base(36))), "Z");
    assert_eq!(text(q(0, "ap_int<8>").render(Repr::Base(3))), "0");
    assert!(matches!(
      q(0, "ap_int<8>").render(Repr::Base(40)),
      Err(Error::UnsupportedRepresentation(_)),
    ));
  }

  #[test]
  fn numbers() {
    assert_eq!(q(-18, "ap_fixed<8,5>").render(Repr::Float).unwrap(), Rendered::Float(-2.25));
    assert_eq!(q(-18, "ap_fixed<8,5>").render(Repr::Int).unwrap(), Rendered::Int(-18));
  }

  #[test]
  fn serialize() {
    let json = serde_json::to_value([
      Rendered::Text("0x20".into()),
      Rendered::Float(0.5),
      Rendered::Int(-3),
      Rendered::Int(1 << 100),
    ]).unwrap();
    assert_eq!(json, serde_json::json!(["0x20", 0.5, -3, "1267650600228229401496703205376"]));
  }
}

use super::*;

use core::fmt::{Debug, Display};

impl Debug for QuantizedValue {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let bits = self.bits();
    f.debug_tuple("QuantizedValue")
      .field(&format_args!("0b{bits:0w$b}", w=self.format.total_bits() as usize))
      .field(&format_args!("{}", self.format))
      .finish()
  }
}

/// Shows the represented value.
impl Display for QuantizedValue {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    Display::fmt(&self.to_f64(), f)
  }
}

use std::fmt;

/// Stable numeric identifier for a piece of dialog text.
///
/// The value is the magnitude of a 32-bit rolling hash, so it always fits in
/// a `u32` (including `2147483648`, the magnitude of `i32::MIN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// Computes the fingerprint of `text`.
    ///
    /// Folds every UTF-16 code unit into an `i32` accumulator with
    /// `acc = acc * 31 + unit`, wrapping at every step. Characters outside the
    /// BMP contribute both surrogate halves. Existing audio file names depend
    /// on this exact arithmetic, so it must not be "improved".
    pub fn of(text: &str) -> Self {
        let acc = text.encode_utf16().fold(0i32, |acc, unit| {
            acc.wrapping_mul(31).wrapping_add(i32::from(unit))
        });
        Self(acc.unsigned_abs())
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decimal fingerprint of `text`. Never negative; `""` yields `"0"`.
pub fn fingerprint(text: &str) -> String {
    Fingerprint::of(text).to_string()
}

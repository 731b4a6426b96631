// borderly/src/core/dimension.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The parsed meaning of a size specifier: pixels, a percentage of some base
/// dimension, or nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeValue {
    Pixels(u32),
    Percent(u32),
    #[default]
    Unset,
}

/// A size specifier as typed into a profile.
///
/// The text is kept as written so a settings document round-trips unchanged,
/// even when the text does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SizeSpec {
    text: String,
    value: SizeValue,
}

impl SizeSpec {
    /// Parses free-form text. Malformed or negative input is `Unset`, never an error.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let value = parse_value(&text);
        Self { text, value }
    }

    pub fn value(&self) -> SizeValue {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Absolute pixel count against `base`. Zero means "no constraint".
    pub fn resolve(&self, base: u32) -> u32 {
        match self.value {
            SizeValue::Pixels(n) => n,
            SizeValue::Percent(p) => {
                let scaled = u64::from(base) * u64::from(p) / 100;
                u32::try_from(scaled).unwrap_or(u32::MAX)
            }
            SizeValue::Unset => 0,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.value == SizeValue::Unset
    }
}

fn parse_value(text: &str) -> SizeValue {
    let value = text.trim().to_lowercase();

    if let Some(percent) = value.strip_suffix('%') {
        return match parse_integer(percent) {
            Some(p) => SizeValue::Percent(p),
            None => SizeValue::Unset,
        };
    }

    let pixels = value.strip_suffix("px").unwrap_or(&value);
    match parse_integer(pixels) {
        Some(n) => SizeValue::Pixels(n),
        None => SizeValue::Unset,
    }
}

/// Resolves a textual size specifier against `base`.
///
/// `"50%"` against 200 is 100, `"50px"` or `"50"` is 50, and anything that
/// does not parse is 0.
pub fn resolve(spec: &str, base: u32) -> u32 {
    SizeSpec::parse(spec).resolve(base)
}

// Negative values count as malformed: there is no such thing as a negative size.
fn parse_integer(text: &str) -> Option<u32> {
    let value: i64 = text.trim().parse().ok()?;
    if value < 0 {
        return None;
    }
    Some(u32::try_from(value).unwrap_or(u32::MAX))
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for SizeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for SizeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(SizeSpec::parse(text))
    }
}

//! Lenient numeric decoding
//!
//! Some services return numbers as strings (`"MaxSpeedMHz": "4000"`) or as
//! empty strings. Fields decoded through these helpers accept both; anything
//! unparseable becomes the zero value instead of failing the whole resource.
//!
//! ```ignore
//! #[serde(default, deserialize_with = "number::lenient")]
//! pub max_speed_mhz: u32,
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// A numeric type that can be recovered from a JSON number or string.
pub trait LenientNumber: Sized + Default + std::str::FromStr {
    fn from_number(n: &Number) -> Option<Self>;
    fn from_f64(f: f64) -> Option<Self>;
}

macro_rules! lenient_int {
    ($($t:ty),*) => {$(
        impl LenientNumber for $t {
            fn from_number(n: &Number) -> Option<Self> {
                n.as_i64()
                    .and_then(|v| <$t>::try_from(v).ok())
                    .or_else(|| n.as_u64().and_then(|v| <$t>::try_from(v).ok()))
                    .or_else(|| n.as_f64().and_then(Self::from_f64))
            }

            fn from_f64(f: f64) -> Option<Self> {
                if f.is_finite() && f >= <$t>::MIN as f64 && f <= <$t>::MAX as f64 {
                    Some(f.trunc() as $t)
                } else {
                    None
                }
            }
        }
    )*};
}

macro_rules! lenient_float {
    ($($t:ty),*) => {$(
        impl LenientNumber for $t {
            fn from_number(n: &Number) -> Option<Self> {
                n.as_f64().map(|v| v as $t)
            }

            fn from_f64(f: f64) -> Option<Self> {
                Some(f as $t)
            }
        }
    )*};
}

lenient_int!(i32, i64, u8, u16, u32, u64);
lenient_float!(f32, f64);

/// Parse a JSON value into `T`, or `None` if it holds no usable number.
pub fn parse<T: LenientNumber>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => T::from_number(n),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<T>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(T::from_f64))
        }
        _ => None,
    }
}

/// `deserialize_with` helper for required numbers.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: LenientNumber,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse(&value).unwrap_or_default())
}

/// `deserialize_with` helper for optional numbers; null or garbage is `None`.
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: LenientNumber,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse(&value))
}

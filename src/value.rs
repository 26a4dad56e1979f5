use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::driver::RawValue;

/// A decoded, typed cell value or statement parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    UInt64(u64),
    UInt32(u32),
    UInt16(u16),
    UInt8(u8),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Int8(i8),
    Float32(f32),
    Float64(f64),
    Text(String),
    Char(char),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
    Guid(Uuid),
    TimeSpan(TimeDelta),
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::UInt64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::UInt32(value)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Self::UInt16(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::UInt8(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::Int16(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Self::Int8(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl From<TimeDelta> for Value {
    fn from(value: TimeDelta) -> Self {
        Self::TimeSpan(value)
    }
}

/// Declared value kind of a result column.
///
/// The set is closed; every tag carries exactly one decode strategy.
/// [`TypeTag::Native`] is the total fallback that accepts whatever the
/// driver produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeTag {
    Unsigned64,
    Text,
    Int32,
    Unsigned16,
    Unsigned32,
    DateTime,
    Decimal,
    Float32,
    Byte,
    SignedByte,
    Int64,
    Int16,
    Char,
    Guid,
    TimeSpan,
    Native,
}

impl TypeTag {
    /// Decodes one driver value according to this tag.
    ///
    /// Every tag except [`TypeTag::Native`] rejects values whose shape
    /// does not match the declaration; the error text becomes the cast
    /// failure detail.
    pub fn decode(self, raw: &RawValue) -> Result<Value, String> {
        match self {
            Self::Unsigned64 => match raw {
                RawValue::UInt(value) => Ok(Value::UInt64(*value)),
                RawValue::Int(value) if *value >= 0 => Ok(Value::UInt64(*value as u64)),
                other => Err(mismatch("unsigned64", other)),
            },
            Self::Text => match raw {
                RawValue::Text(value) => Ok(Value::Text(value.clone())),
                other => Err(mismatch("string", other)),
            },
            Self::Int32 => signed(raw, "int32", |v| i32::try_from(v).map(Value::Int32)),
            Self::Unsigned16 => unsigned(raw, "unsigned16", |v| u16::try_from(v).map(Value::UInt16)),
            Self::Unsigned32 => unsigned(raw, "unsigned32", |v| u32::try_from(v).map(Value::UInt32)),
            Self::DateTime => match raw {
                RawValue::DateTime(value) => Ok(Value::DateTime(*value)),
                RawValue::Text(value) => {
                    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
                        .map(Value::DateTime)
                        .map_err(|err| format!("invalid datetime text '{value}': {err}"))
                }
                other => Err(mismatch("datetime", other)),
            },
            Self::Decimal => match raw {
                RawValue::Text(value) => value
                    .parse::<Decimal>()
                    .map(Value::Decimal)
                    .map_err(|err| format!("invalid decimal text '{value}': {err}")),
                RawValue::Int(value) => Ok(Value::Decimal(Decimal::from(*value))),
                RawValue::UInt(value) => Ok(Value::Decimal(Decimal::from(*value))),
                RawValue::Float(value) => Decimal::from_f64_retain(*value)
                    .map(Value::Decimal)
                    .ok_or_else(|| format!("float {value} is not representable as decimal")),
                other => Err(mismatch("decimal", other)),
            },
            Self::Float32 => match raw {
                RawValue::Float(value) => Ok(Value::Float32(*value as f32)),
                other => Err(mismatch("float32", other)),
            },
            Self::Byte => unsigned(raw, "byte", |v| u8::try_from(v).map(Value::UInt8)),
            Self::SignedByte => signed(raw, "signedbyte", |v| i8::try_from(v).map(Value::Int8)),
            Self::Int64 => match raw {
                RawValue::Int(value) => Ok(Value::Int64(*value)),
                RawValue::UInt(value) => i64::try_from(*value)
                    .map(Value::Int64)
                    .map_err(|_| format!("unsigned value {value} overflows int64")),
                other => Err(mismatch("int64", other)),
            },
            Self::Int16 => signed(raw, "int16", |v| i16::try_from(v).map(Value::Int16)),
            Self::Char => match raw {
                RawValue::Text(value) => {
                    let mut chars = value.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) => Ok(Value::Char(ch)),
                        _ => Err(format!("text '{value}' is not a single character")),
                    }
                }
                other => Err(mismatch("char", other)),
            },
            Self::Guid => match raw {
                RawValue::Text(value) => Uuid::parse_str(value)
                    .map(Value::Guid)
                    .map_err(|err| format!("invalid guid text '{value}': {err}")),
                RawValue::Bytes(value) => Uuid::from_slice(value)
                    .map(Value::Guid)
                    .map_err(|err| format!("invalid guid bytes: {err}")),
                other => Err(mismatch("guid", other)),
            },
            Self::TimeSpan => match raw {
                RawValue::Text(value) => parse_time_delta(value).map(Value::TimeSpan),
                other => Err(mismatch("timespan", other)),
            },
            Self::Native => Ok(match raw {
                RawValue::Null => Value::Null,
                RawValue::Int(value) => Value::Int64(*value),
                RawValue::UInt(value) => Value::UInt64(*value),
                RawValue::Float(value) => Value::Float64(*value),
                RawValue::Text(value) => Value::Text(value.clone()),
                RawValue::Bytes(value) => Value::Bytes(value.clone()),
                RawValue::DateTime(value) => Value::DateTime(*value),
            }),
        }
    }

    /// Zero value of this tag, returned for out-of-range column reads.
    pub fn zero(self) -> Value {
        match self {
            Self::Unsigned64 => Value::UInt64(0),
            Self::Text => Value::Text(String::new()),
            Self::Int32 => Value::Int32(0),
            Self::Unsigned16 => Value::UInt16(0),
            Self::Unsigned32 => Value::UInt32(0),
            Self::DateTime => Value::DateTime(NaiveDateTime::default()),
            Self::Decimal => Value::Decimal(Decimal::ZERO),
            Self::Float32 => Value::Float32(0.0),
            Self::Byte => Value::UInt8(0),
            Self::SignedByte => Value::Int8(0),
            Self::Int64 => Value::Int64(0),
            Self::Int16 => Value::Int16(0),
            Self::Char => Value::Char('\0'),
            Self::Guid => Value::Guid(Uuid::nil()),
            Self::TimeSpan => Value::TimeSpan(TimeDelta::zero()),
            Self::Native => Value::Null,
        }
    }
}

fn mismatch(expected: &str, raw: &RawValue) -> String {
    format!("cannot read {raw:?} as {expected}")
}

fn signed<F>(raw: &RawValue, expected: &str, convert: F) -> Result<Value, String>
where
    F: Fn(i64) -> Result<Value, std::num::TryFromIntError>,
{
    let wide = match raw {
        RawValue::Int(value) => *value,
        RawValue::UInt(value) => {
            i64::try_from(*value).map_err(|_| format!("unsigned value {value} overflows {expected}"))?
        }
        other => return Err(mismatch(expected, other)),
    };
    convert(wide).map_err(|_| format!("value {wide} is out of range for {expected}"))
}

fn unsigned<F>(raw: &RawValue, expected: &str, convert: F) -> Result<Value, String>
where
    F: Fn(u64) -> Result<Value, std::num::TryFromIntError>,
{
    let wide = match raw {
        RawValue::UInt(value) => *value,
        RawValue::Int(value) => {
            u64::try_from(*value).map_err(|_| format!("negative value {value} is invalid for {expected}"))?
        }
        other => return Err(mismatch(expected, other)),
    };
    convert(wide).map_err(|_| format!("value {wide} is out of range for {expected}"))
}

/// Parses MySQL `TIME` text (`[-]H:MM:SS[.fraction]`) into a delta.
fn parse_time_delta(text: &str) -> Result<TimeDelta, String> {
    let invalid = || format!("invalid timespan text '{text}'");
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut fields = body.splitn(3, ':');
    let hours: i64 = fields.next().and_then(|f| f.parse().ok()).ok_or_else(invalid)?;
    let minutes: i64 = fields.next().and_then(|f| f.parse().ok()).ok_or_else(invalid)?;
    let seconds_field = fields.next().ok_or_else(invalid)?;

    let (seconds, nanos) = match seconds_field.split_once('.') {
        Some((whole, fraction)) => {
            let whole: i64 = whole.parse().map_err(|_| invalid())?;
            if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let scale = 10u32.pow(9 - fraction.len() as u32);
            let fraction: u32 = fraction.parse().map_err(|_| invalid())?;
            (whole, fraction * scale)
        }
        None => (seconds_field.parse().map_err(|_| invalid())?, 0),
    };

    let total_seconds = hours * 3600 + minutes * 60 + seconds;
    let delta = TimeDelta::new(total_seconds, nanos).ok_or_else(invalid)?;
    Ok(if negative { -delta } else { delta })
}

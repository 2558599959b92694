use crate::foundation::error::{RevealError, RevealResult};

pub use kurbo::{Point, Rect, Vec2};

/// A point in time or a span of time, in whole milliseconds.
///
/// Host clocks hand the scheduler `Millis` timestamps; delays and durations use the
/// same unit so that stagger arithmetic stays exact.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// Zero milliseconds.
    pub const ZERO: Self = Self(0);

    /// Convert a seconds value (as written in variant declarations) to milliseconds.
    pub fn from_secs_f64(secs: f64) -> RevealResult<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(RevealError::validation(format!(
                "time value must be a finite, non-negative number of seconds (got {secs})"
            )));
        }
        Ok(Self((secs * 1000.0).round() as u64))
    }

    /// Value in seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Saturating addition.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Saturating multiplication by a sibling index.
    pub fn saturating_mul(self, n: u64) -> Self {
        Self(self.0.saturating_mul(n))
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Serde adapter that reads and writes [`Millis`] as fractional seconds.
pub mod secs {
    use super::Millis;

    /// Serialize as seconds.
    pub fn serialize<S>(value: &Millis, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ser.serialize_f64(value.as_secs_f64())
    }

    /// Deserialize from seconds.
    pub fn deserialize<'de, D>(de: D) -> Result<Millis, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let secs = <f64 as serde::Deserialize>::deserialize(de)?;
        Millis::from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Identifier of one node in an animation tree. Unique within its tree.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Build an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque, stable reference to a rendered element owned by the host.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementRef(pub u64);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

//! Animatable properties and their typed values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Bool,
}

/// Closed set of animatable object properties.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Property {
    PositionX,
    PositionY,
    Width,
    Height,
    Rotation,
    Scale,
    ScaleX,
    ScaleY,
    Opacity,
    Visibility,
}

impl Property {
    /// Every property, in lane order.
    pub const ALL: [Property; 10] = [
        Property::PositionX,
        Property::PositionY,
        Property::Width,
        Property::Height,
        Property::Rotation,
        Property::Scale,
        Property::ScaleX,
        Property::ScaleY,
        Property::Opacity,
        Property::Visibility,
    ];

    #[inline]
    pub fn kind(self) -> ValueKind {
        match self {
            Property::Visibility => ValueKind::Bool,
            _ => ValueKind::Number,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::PositionX => "position-x",
            Property::PositionY => "position-y",
            Property::Width => "width",
            Property::Height => "height",
            Property::Rotation => "rotation",
            Property::Scale => "scale",
            Property::ScaleX => "scale-x",
            Property::ScaleY => "scale-y",
            Property::Opacity => "opacity",
            Property::Visibility => "visibility",
        }
    }

    /// Parse a property name; unknown names fail with `InvalidProperty`.
    pub fn parse(name: &str) -> Result<Self, TimelineError> {
        Property::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or_else(|| TimelineError::InvalidProperty {
                name: name.to_string(),
            })
    }
}

impl FromStr for Property {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::parse(s)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyframe value, keyed by the property's declared kind.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Number(f32),
    /// Step-only boolean value (never interpolated)
    Bool(bool),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(_) => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Number(_) => None,
        }
    }

    /// Reject a value whose kind does not match `property`.
    pub fn check_for(&self, property: Property) -> Result<(), TimelineError> {
        if self.kind() != property.kind() {
            return Err(TimelineError::ValueTypeMismatch {
                property: property.name().to_string(),
                expected: property.kind(),
                actual: self.kind(),
            });
        }
        match *self {
            Value::Number(n) if !n.is_finite() => Err(TimelineError::InvalidValue {
                property: property.name().to_string(),
                value: n,
            }),
            _ => Ok(()),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_names_round_trip_through_parse() {
        for p in Property::ALL {
            assert_eq!(Property::parse(p.name()).unwrap(), p);
        }
        assert!(matches!(
            Property::parse("skew"),
            Err(TimelineError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn serde_uses_kebab_case_names() {
        let json = serde_json::to_string(&Property::ScaleX).unwrap();
        assert_eq!(json, "\"scale-x\"");
    }

    #[test]
    fn visibility_is_the_only_bool_property() {
        let bools: Vec<_> = Property::ALL
            .iter()
            .filter(|p| p.kind() == ValueKind::Bool)
            .collect();
        assert_eq!(bools, vec![&Property::Visibility]);
    }

    #[test]
    fn check_for_rejects_mismatched_kinds() {
        assert!(Value::Number(1.0).check_for(Property::Opacity).is_ok());
        assert!(Value::Bool(true).check_for(Property::Visibility).is_ok());
        let err = Value::Bool(true).check_for(Property::Width).unwrap_err();
        assert!(matches!(err, TimelineError::ValueTypeMismatch { .. }));
    }

    #[test]
    fn check_for_rejects_non_finite_numbers() {
        for n in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let err = Value::Number(n).check_for(Property::Opacity).unwrap_err();
            assert!(matches!(err, TimelineError::InvalidValue { .. }));
            assert_eq!(err.category(), "validation");
        }
    }
}

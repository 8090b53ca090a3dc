//! Named easing curves.
//!
//! Names follow the `family.direction` convention (`power2.out`, `back.inOut`,
//! `bounce.in`). A bare family name means `.out`. `linear`/`power0` is the
//! identity and `none` is a hold. Unknown names fall back to linear.

use std::f32::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Overshoot used by `back` when the name carries no parameter.
pub const DEFAULT_BACK_OVERSHOOT: f32 = 1.70158;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    /// Step: hold the left value until the next keyframe.
    Hold,
    /// Polynomial curve of degree `power + 1` (power1 = quad ... power4 = quint).
    Power { power: u8, direction: EaseDirection },
    Sine(EaseDirection),
    Expo(EaseDirection),
    Circ(EaseDirection),
    Back { direction: EaseDirection, overshoot: f32 },
    Elastic(EaseDirection),
    Bounce(EaseDirection),
}

impl Default for Ease {
    fn default() -> Self {
        Ease::Power {
            power: 2,
            direction: EaseDirection::Out,
        }
    }
}

impl Ease {
    /// Parse a known ease name. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Ease> {
        let name = name.trim();
        let (body, param) = match name.find('(') {
            Some(open) => {
                let close = name.rfind(')').unwrap_or(name.len());
                let raw = name.get(open + 1..close).unwrap_or("");
                (&name[..open], raw.trim().parse::<f32>().ok())
            }
            None => (name, None),
        };
        let lower = body.to_ascii_lowercase();
        let (family, direction) = match lower.split_once('.') {
            Some((family, dir)) => (family, Some(dir)),
            None => (lower.as_str(), None),
        };
        let direction = match direction {
            None | Some("out") => EaseDirection::Out,
            Some("in") => EaseDirection::In,
            Some("inout") => EaseDirection::InOut,
            Some(_) => return None,
        };
        let ease = match family {
            "linear" | "power0" => Ease::Linear,
            "none" => Ease::Hold,
            "power1" | "quad" => Ease::Power { power: 1, direction },
            "power2" | "cubic" => Ease::Power { power: 2, direction },
            "power3" | "quart" => Ease::Power { power: 3, direction },
            "power4" | "quint" | "strong" => Ease::Power { power: 4, direction },
            "sine" => Ease::Sine(direction),
            "expo" => Ease::Expo(direction),
            "circ" => Ease::Circ(direction),
            "back" => Ease::Back {
                direction,
                overshoot: param.unwrap_or(DEFAULT_BACK_OVERSHOOT),
            },
            "elastic" => Ease::Elastic(direction),
            "bounce" => Ease::Bounce(direction),
            _ => return None,
        };
        Some(ease)
    }

    /// Parse a name, falling back to linear for unknown or legacy names.
    pub fn from_name(name: &str) -> Ease {
        Ease::parse(name).unwrap_or(Ease::Linear)
    }

    #[inline]
    pub fn is_hold(&self) -> bool {
        matches!(self, Ease::Hold)
    }

    /// Map segment-local progress `u` to eased progress. `u` is clamped to [0,1];
    /// endpoints map to themselves (back/elastic may overshoot in between).
    pub fn apply(&self, u: f32) -> f32 {
        let u = u.clamp(0.0, 1.0);
        match *self {
            Ease::Linear => u,
            Ease::Hold => {
                if u < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Ease::Power { power, direction } => {
                let exp = i32::from(power) + 1;
                directed(direction, u, |t| t.powi(exp))
            }
            Ease::Sine(direction) => directed(direction, u, |t| 1.0 - (t * PI / 2.0).cos()),
            Ease::Expo(direction) => directed(direction, u, |t| {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * t - 10.0)
                }
            }),
            Ease::Circ(direction) => directed(direction, u, |t| 1.0 - (1.0 - t * t).max(0.0).sqrt()),
            Ease::Back {
                direction,
                overshoot,
            } => directed(direction, u, |t| {
                let c3 = overshoot + 1.0;
                c3 * t * t * t - overshoot * t * t
            }),
            Ease::Elastic(direction) => directed(direction, u, elastic_in),
            Ease::Bounce(direction) => directed(direction, u, |t| 1.0 - bounce_out(1.0 - t)),
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn dir(d: EaseDirection) -> &'static str {
            match d {
                EaseDirection::In => "in",
                EaseDirection::Out => "out",
                EaseDirection::InOut => "inOut",
            }
        }
        match self {
            Ease::Linear => f.write_str("linear"),
            Ease::Hold => f.write_str("none"),
            Ease::Power { power, direction } => write!(f, "power{}.{}", power, dir(*direction)),
            Ease::Sine(d) => write!(f, "sine.{}", dir(*d)),
            Ease::Expo(d) => write!(f, "expo.{}", dir(*d)),
            Ease::Circ(d) => write!(f, "circ.{}", dir(*d)),
            Ease::Back {
                direction,
                overshoot,
            } => {
                if (*overshoot - DEFAULT_BACK_OVERSHOOT).abs() < f32::EPSILON {
                    write!(f, "back.{}", dir(*direction))
                } else {
                    write!(f, "back.{}({})", dir(*direction), overshoot)
                }
            }
            Ease::Elastic(d) => write!(f, "elastic.{}", dir(*d)),
            Ease::Bounce(d) => write!(f, "bounce.{}", dir(*d)),
        }
    }
}

/// Derive out/inOut variants from an ease-in curve.
#[inline]
fn directed(direction: EaseDirection, u: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    match direction {
        EaseDirection::In => ease_in(u),
        EaseDirection::Out => 1.0 - ease_in(1.0 - u),
        EaseDirection::InOut => {
            if u < 0.5 {
                ease_in(2.0 * u) / 2.0
            } else {
                1.0 - ease_in(2.0 - 2.0 * u) / 2.0
            }
        }
    }
}

fn elastic_in(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else {
        let c4 = (2.0 * PI) / 3.0;
        -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
    }
}

fn bounce_out(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

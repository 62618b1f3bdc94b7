//! Pan-size scaling
//!
//! Moving a recipe to a different pan scales every quantity by the ratio of
//! pan areas. Dimensions only need to share a length unit.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum PanSize {
    Round { diameter: f64 },
    Square { side: f64 },
    Rectangle { width: f64, length: f64 },
}

impl PanSize {
    pub fn area(&self) -> f64 {
        match *self {
            PanSize::Round { diameter } => PI * (diameter / 2.0).powi(2),
            PanSize::Square { side } => side * side,
            PanSize::Rectangle { width, length } => width * length,
        }
    }
}

impl fmt::Display for PanSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanSize::Round { diameter } => write!(f, "{} round", diameter),
            PanSize::Square { side } => write!(f, "{} square", side),
            PanSize::Rectangle { width, length } => write!(f, "{}x{}", width, length),
        }
    }
}

/// Parses `9`/`9r` (round), `8sq` (square) or `9x13` (rectangle)
impl FromStr for PanSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        let number = |t: &str| {
            t.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid pan size '{}'", s))
        };

        if let Some((width, length)) = text.split_once('x') {
            return Ok(PanSize::Rectangle {
                width: number(width)?,
                length: number(length)?,
            });
        }
        if let Some(side) = text.strip_suffix("sq") {
            return Ok(PanSize::Square { side: number(side)? });
        }
        let diameter = text.strip_suffix('r').unwrap_or(&text);
        Ok(PanSize::Round {
            diameter: number(diameter)?,
        })
    }
}

/// Area ratio for moving a recipe from one pan to another
pub fn pan_multiplier(from: PanSize, to: PanSize) -> Option<f64> {
    let (from_area, to_area) = (from.area(), to.area());
    if !(from_area.is_finite() && to_area.is_finite()) || from_area <= 0.0 || to_area <= 0.0 {
        return None;
    }
    Some(to_area / from_area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_round_scales_by_area() {
        let ratio = pan_multiplier(
            PanSize::Round { diameter: 8.0 },
            PanSize::Round { diameter: 16.0 },
        )
        .unwrap();
        assert!((ratio - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rectangle_from_square() {
        let ratio =
            pan_multiplier("8sq".parse().unwrap(), "9x13".parse().unwrap()).unwrap();
        assert!((ratio - 117.0 / 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_pans_have_no_ratio() {
        let empty = PanSize::Square { side: 0.0 };
        let square = PanSize::Square { side: 8.0 };
        let broken = PanSize::Round { diameter: f64::NAN };
        assert!(pan_multiplier(empty, square).is_none());
        assert!(pan_multiplier(square, broken).is_none());
    }

    #[test]
    fn test_parse_pan_sizes() {
        assert_eq!("9".parse::<PanSize>(), Ok(PanSize::Round { diameter: 9.0 }));
        assert_eq!("10r".parse::<PanSize>(), Ok(PanSize::Round { diameter: 10.0 }));
        assert!("big".parse::<PanSize>().is_err());
    }
}

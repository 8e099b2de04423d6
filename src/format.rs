use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::layout::LayoutError;

static SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+)?(,)?(?:\.(\d+))?([sfe%dr])?$").expect("format specifier pattern compiles")
});

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

const DEFAULT_PRECISION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Significant digits with an SI prefix (`1.2k`).
    Si,
    Fixed,
    Exponent,
    Percent,
    Integer,
    /// Significant digits in plain decimal notation.
    Rounded,
    /// Shortest round-trip representation.
    Plain,
}

/// A d3-style number format such as `.2s`, `,.0f` or `+.1%`.
///
/// The grammar is `[+][,][.precision][type]` with types `s f e % d r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    kind: FormatKind,
    precision: Option<usize>,
    grouping: bool,
    explicit_sign: bool,
}

impl Default for NumberFormat {
    /// Compact two-significant-digit SI notation, `.2s`.
    fn default() -> Self {
        Self {
            kind: FormatKind::Si,
            precision: Some(2),
            grouping: false,
            explicit_sign: false,
        }
    }
}

impl NumberFormat {
    pub fn parse(specifier: &str) -> Result<Self, LayoutError> {
        let caps = SPECIFIER
            .captures(specifier.trim())
            .ok_or_else(|| LayoutError::InvalidFormat(specifier.to_string()))?;
        let precision = match caps.get(3) {
            Some(m) => Some(
                m.as_str()
                    .parse::<usize>()
                    .map_err(|_| LayoutError::InvalidFormat(specifier.to_string()))?,
            ),
            None => None,
        };
        let kind = match caps.get(4).map(|m| m.as_str()) {
            Some("s") => FormatKind::Si,
            Some("f") => FormatKind::Fixed,
            Some("e") => FormatKind::Exponent,
            Some("%") => FormatKind::Percent,
            Some("d") => FormatKind::Integer,
            Some("r") => FormatKind::Rounded,
            _ => FormatKind::Plain,
        };
        Ok(Self {
            kind,
            precision,
            grouping: caps.get(2).is_some(),
            explicit_sign: caps.get(1).is_some(),
        })
    }

    pub fn kind(&self) -> FormatKind {
        self.kind
    }

    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let negative = value < 0.0;
        let magnitude = value.abs();
        let (mut body, suffix) = match self.kind {
            FormatKind::Si => format_si(magnitude, self.significant_digits()),
            FormatKind::Fixed => (
                format!("{:.*}", self.precision.unwrap_or(DEFAULT_PRECISION), magnitude),
                String::new(),
            ),
            FormatKind::Exponent => (
                format_exponent(magnitude, self.precision.unwrap_or(DEFAULT_PRECISION)),
                String::new(),
            ),
            FormatKind::Percent => (
                format!(
                    "{:.*}",
                    self.precision.unwrap_or(DEFAULT_PRECISION),
                    magnitude * 100.0
                ),
                "%".to_string(),
            ),
            FormatKind::Integer => (format!("{:.0}", magnitude.round()), String::new()),
            FormatKind::Rounded => (
                format_significant(magnitude, self.significant_digits()),
                String::new(),
            ),
            FormatKind::Plain => (format!("{magnitude}"), String::new()),
        };
        if self.grouping {
            body = group_thousands(&body);
        }
        let negative = negative && body.chars().any(|c| c.is_ascii_digit() && c != '0');
        let sign = if negative {
            "-"
        } else if self.explicit_sign {
            "+"
        } else {
            ""
        };
        format!("{sign}{body}{suffix}")
    }

    fn significant_digits(&self) -> usize {
        self.precision.unwrap_or(DEFAULT_PRECISION).max(1)
    }
}

impl FromStr for NumberFormat {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explicit_sign {
            f.write_str("+")?;
        }
        if self.grouping {
            f.write_str(",")?;
        }
        if let Some(precision) = self.precision {
            write!(f, ".{precision}")?;
        }
        let kind = match self.kind {
            FormatKind::Si => "s",
            FormatKind::Fixed => "f",
            FormatKind::Exponent => "e",
            FormatKind::Percent => "%",
            FormatKind::Integer => "d",
            FormatKind::Rounded => "r",
            FormatKind::Plain => "",
        };
        f.write_str(kind)
    }
}

/// Round `value` to `digits` significant digits, returning the digit string
/// (no decimal point) and the decimal exponent of its first digit.
fn significant_parts(value: f64, digits: usize) -> (String, i32) {
    let rendered = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let coefficient: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    (coefficient, exponent.parse::<i32>().unwrap_or(0))
}

/// Place a decimal point `point` digits into `coefficient`, padding with zeros
/// on either side as needed.
fn place_point(coefficient: &str, point: i32) -> String {
    let n = coefficient.len() as i32;
    if point >= n {
        format!("{coefficient}{}", "0".repeat((point - n) as usize))
    } else if point > 0 {
        let (int, frac) = coefficient.split_at(point as usize);
        format!("{int}.{frac}")
    } else {
        format!("0.{}{coefficient}", "0".repeat((-point) as usize))
    }
}

fn format_si(value: f64, digits: usize) -> (String, String) {
    let (coefficient, exponent) = significant_parts(value, digits);
    let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8) * 3;
    let body = place_point(&coefficient, exponent - prefix_exponent + 1);
    let prefix = SI_PREFIXES[(prefix_exponent / 3 + 8) as usize];
    (body, prefix.to_string())
}

fn format_significant(value: f64, digits: usize) -> String {
    let (coefficient, exponent) = significant_parts(value, digits);
    place_point(&coefficient, exponent + 1)
}

fn format_exponent(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*e}", decimals, value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => rendered,
    }
}

fn group_thousands(body: &str) -> String {
    let (int, rest) = match body.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => body.split_at(idx),
        None => (body, ""),
    };
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (idx, ch) in int.chars().enumerate() {
        if idx > 0 && (int.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(rest);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, value: f64) -> String {
        NumberFormat::parse(spec).unwrap().format(value)
    }

    #[test]
    fn si_uses_two_significant_digits_by_default() {
        let format = NumberFormat::default();
        assert_eq!(format.format(5.0), "5.0");
        assert_eq!(format.format(35.0), "35");
        assert_eq!(format.format(150.0), "150");
        assert_eq!(format.format(1234.0), "1.2k");
        assert_eq!(format.format(2_500_000.0), "2.5M");
        assert_eq!(format.format(0.05), "50m");
        assert_eq!(format.format(0.0), "0.0");
        assert_eq!(format.format(-1234.0), "-1.2k");
    }

    #[test]
    fn fixed_percent_and_grouping() {
        assert_eq!(fmt(".1f", 3.14159), "3.1");
        assert_eq!(fmt(",.0f", 1234567.0), "1,234,567");
        assert_eq!(fmt(".0%", 0.256), "26%");
        assert_eq!(fmt("+.1f", 2.0), "+2.0");
        assert_eq!(fmt("d", 41.6), "42");
        assert_eq!(fmt(".2e", 12345.0), "1.23e+4");
        assert_eq!(fmt(".3r", 0.012345), "0.0123");
    }

    #[test]
    fn negative_zero_after_rounding_has_no_sign() {
        assert_eq!(fmt(".0f", -0.2), "0");
    }

    #[test]
    fn round_trips_specifier() {
        for spec in [".2s", ",.0f", "+.1%", "d", ""] {
            assert_eq!(NumberFormat::parse(spec).unwrap().to_string(), spec);
        }
    }

    #[test]
    fn rejects_unknown_specifier() {
        assert!(matches!(
            NumberFormat::parse("~x"),
            Err(LayoutError::InvalidFormat(_))
        ));
    }
}

//! Conversion of Kubernetes resource quantities
//!
//! Quantities such as `"500m"`, `"2Ki"` or `"4Gi"` are split into a numeric
//! magnitude and a unit suffix. Parsing is total: a malformed magnitude reads
//! as zero and an unrecognised suffix falls back to the plain byte / core
//! interpretation.

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Unit suffix of a resource quantity
#[derive(Debug, Clone, PartialEq)]
pub enum Suffix {
    Nano,
    Micro,
    Milli,
    Kibi,
    Mebi,
    Gibi,
    Tebi,
    Pebi,
    Exbi,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    /// No suffix at all
    None,
    /// Trailing characters that are not a known suffix
    Unknown(String),
}

impl Suffix {
    fn parse(raw: &str) -> Self {
        match raw {
            "" => Suffix::None,
            "n" => Suffix::Nano,
            "u" => Suffix::Micro,
            "m" => Suffix::Milli,
            "Ki" => Suffix::Kibi,
            "Mi" => Suffix::Mebi,
            "Gi" => Suffix::Gibi,
            "Ti" => Suffix::Tebi,
            "Pi" => Suffix::Pebi,
            "Ei" => Suffix::Exbi,
            "k" | "K" => Suffix::Kilo,
            "M" => Suffix::Mega,
            "G" => Suffix::Giga,
            "T" => Suffix::Tera,
            "P" => Suffix::Peta,
            "E" => Suffix::Exa,
            other => Suffix::Unknown(other.to_string()),
        }
    }

    /// Scale a magnitude to the base unit. Sub-unit suffixes divide so that
    /// values such as `500m` come out exact.
    fn scale(&self, value: f64) -> f64 {
        match self {
            Suffix::Nano => value / 1e9,
            Suffix::Micro => value / 1e6,
            Suffix::Milli => value / 1e3,
            Suffix::Kibi => value * 1024f64,
            Suffix::Mebi => value * 1024f64.powi(2),
            Suffix::Gibi => value * 1024f64.powi(3),
            Suffix::Tebi => value * 1024f64.powi(4),
            Suffix::Pebi => value * 1024f64.powi(5),
            Suffix::Exbi => value * 1024f64.powi(6),
            Suffix::Kilo => value * 1e3,
            Suffix::Mega => value * 1e6,
            Suffix::Giga => value * 1e9,
            Suffix::Tera => value * 1e12,
            Suffix::Peta => value * 1e15,
            Suffix::Exa => value * 1e18,
            Suffix::None | Suffix::Unknown(_) => value,
        }
    }
}

/// A parsed quantity: numeric magnitude plus unit suffix
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceQuantity {
    pub value: f64,
    pub suffix: Suffix,
}

impl ResourceQuantity {
    /// Parse a quantity string. Never fails.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let split = numeric_prefix_len(raw);
        let (number, rest) = raw.split_at(split);

        Self {
            value: number.parse::<f64>().unwrap_or(0.0),
            suffix: Suffix::parse(rest),
        }
    }

    /// Value in the base unit (cores for CPU, bytes for memory and storage)
    pub fn to_base(&self) -> f64 {
        self.suffix.scale(self.value)
    }

    /// Value in bytes; the milli/micro/nano suffixes are not meaningful for
    /// byte quantities and scale down like any other suffix
    pub fn to_bytes(&self) -> f64 {
        self.to_base()
    }
}

/// Length of the leading numeric portion: sign, digits, decimal point and an
/// optional `e<digits>` exponent
fn numeric_prefix_len(raw: &str) -> usize {
    let bytes = raw.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }

    // A lowercase `e` followed by digits is an exponent, an uppercase `E` is the exa suffix
    if end < bytes.len() && bytes[end] == b'e' {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    end
}

/// Convert a CPU quantity to cores
pub fn to_cores(quantity: &str) -> f64 {
    ResourceQuantity::parse(quantity).to_base()
}

/// Convert a memory or storage quantity to gigabytes (1024³ bytes)
pub fn to_gigabytes(quantity: &str) -> f64 {
    ResourceQuantity::parse(quantity).to_bytes() / BYTES_PER_GB
}

/// Round to a fixed number of decimals for display
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Share of `used` in `total` as a percentage, 0 when `total` is 0
pub fn percent(used: f64, total: f64) -> f64 {
    if total > 0.0 {
        round_to(used / total * 100.0, 1)
    } else {
        0.0
    }
}

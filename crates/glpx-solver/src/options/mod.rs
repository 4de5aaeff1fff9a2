//! Per-mode solver options.
//!
//! Every option is optional; unset options keep the engine's defaults from
//! the init entry point. Options can be set with `with_*` builders, from
//! `key = value` strings, or deserialized from JSON.

mod interior;
mod intopt;
mod simplex;

pub use interior::InteriorOptions;
pub use intopt::IntoptOptions;
pub use simplex::SimplexOptions;

use std::str::FromStr;

use crate::error::ConfigError;

pub(crate) fn parse_tag<T>(value: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = ConfigError>,
{
    value.trim().parse()
}

pub(crate) fn parse_int(option: &'static str, value: &str) -> Result<i32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            option,
            value: value.to_string(),
            expected: "an integer",
        })
}

pub(crate) fn parse_double(option: &'static str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if !parsed.is_nan() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            option,
            value: value.to_string(),
            expected: "a number",
        }),
    }
}

pub(crate) fn parse_flag(option: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            option,
            value: value.to_string(),
            expected: "on or off",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("presolve", "ON"), Ok(true));
        assert_eq!(parse_flag("presolve", "0"), Ok(false));
        assert!(parse_flag("presolve", "maybe").is_err());
    }

    #[test]
    fn test_parse_double_rejects_nan() {
        assert!(parse_double("mip_gap", "NaN").is_err());
        assert_eq!(parse_double("mip_gap", " 0.01 "), Ok(0.01));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("time_limit", "1000"), Ok(1000));
        let err = parse_int("time_limit", "1.5").unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID_VALUE");
    }
}

//! Marketplace region definitions.
//!
//! This module provides the [`Region`] enum for selecting which regional MWS
//! endpoint requests are sent to.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Marketplace region, each served by its own MWS endpoint.
///
/// # Example
///
/// ```rust
/// use mws_api::Region;
///
/// let region: Region = "eu".parse().unwrap();
/// assert_eq!(region, Region::Europe);
/// assert_eq!(region.endpoint_host(), "mws-eu.amazonservices.com");
/// assert_eq!(region.to_string(), "eu");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Region {
    /// United States, Canada and Mexico.
    #[default]
    NorthAmerica,
    /// Brazil.
    Brazil,
    /// Europe (UK, Germany, France, Italy, Spain, Turkey, UAE).
    Europe,
    /// India.
    India,
    /// Far East (Singapore).
    FarEast,
    /// Japan.
    Japan,
    /// Australia.
    Australia,
    /// China.
    China,
}

impl Region {
    /// Returns the host name of the regional endpoint.
    #[must_use]
    pub const fn endpoint_host(&self) -> &'static str {
        match self {
            Self::NorthAmerica => "mws.amazonservices.com",
            Self::Brazil => "mws.amazonservices.com",
            Self::Europe => "mws-eu.amazonservices.com",
            Self::India => "mws.amazonservices.in",
            Self::FarEast => "mws-fe.amazonservices.com",
            Self::Japan => "mws.amazonservices.jp",
            Self::Australia => "mws.amazonservices.com.au",
            Self::China => "mws.amazonservices.com.cn",
        }
    }

    /// Returns every region.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![
            Self::NorthAmerica,
            Self::Brazil,
            Self::Europe,
            Self::India,
            Self::FarEast,
            Self::Japan,
            Self::Australia,
            Self::China,
        ]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::NorthAmerica => "na",
            Self::Brazil => "br",
            Self::Europe => "eu",
            Self::India => "in",
            Self::FarEast => "fe",
            Self::Japan => "jp",
            Self::Australia => "au",
            Self::China => "cn",
        };
        f.write_str(code)
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "na" | "us" | "ca" | "mx" => Ok(Self::NorthAmerica),
            "br" => Ok(Self::Brazil),
            "eu" | "uk" | "gb" | "de" | "fr" | "it" | "es" => Ok(Self::Europe),
            "in" => Ok(Self::India),
            "fe" | "sg" => Ok(Self::FarEast),
            "jp" => Ok(Self::Japan),
            "au" => Ok(Self::Australia),
            "cn" => Ok(Self::China),
            _ => Err(ConfigError::InvalidRegion { region: s }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parses_codes_and_country_aliases() {
        assert_eq!("na".parse::<Region>().unwrap(), Region::NorthAmerica);
        assert_eq!("US".parse::<Region>().unwrap(), Region::NorthAmerica);
        assert_eq!(" de ".parse::<Region>().unwrap(), Region::Europe);
        assert_eq!("jp".parse::<Region>().unwrap(), Region::Japan);
    }

    #[test]
    fn test_region_rejects_unknown() {
        assert!(matches!(
            "mars".parse::<Region>(),
            Err(ConfigError::InvalidRegion { region }) if region == "mars"
        ));
    }

    #[test]
    fn test_region_display_round_trips() {
        for region in Region::all() {
            assert_eq!(region.to_string().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn test_default_region_is_north_america() {
        assert_eq!(Region::default(), Region::NorthAmerica);
        assert_eq!(
            Region::default().endpoint_host(),
            "mws.amazonservices.com"
        );
    }
}

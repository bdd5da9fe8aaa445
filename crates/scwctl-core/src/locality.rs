//! Zones, regions and the "for every locality" fan-out
//!
//! Zoned APIs (block, instance) address resources as
//! `/zones/{zone}/...`, regioned APIs (containers) as `/regions/{region}/...`.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ErrorList, Result, ScwError};

/// Every zone the SDK knows about
pub const ALL_ZONES: &[&str] = &[
    "fr-par-1", "fr-par-2", "fr-par-3", "nl-ams-1", "nl-ams-2", "nl-ams-3", "pl-waw-1",
    "pl-waw-2", "pl-waw-3",
];

/// Every region the SDK knows about
pub const ALL_REGIONS: &[&str] = &["fr-par", "nl-ams", "pl-waw"];

/// Shared behaviour of zones and regions
pub trait Locality: fmt::Display + Clone + Send + Sync {
    /// Kind of locality for log and error messages ("zone" / "region")
    const KIND: &'static str;

    fn as_str(&self) -> &str;

    /// Every known locality of this kind
    fn all() -> Vec<Self>;
}

/// An availability zone, e.g. `fr-par-1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zone(String);

/// A region, e.g. `fr-par`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Zone {
    pub const FR_PAR_1: &'static str = "fr-par-1";

    /// Region this zone belongs to (`fr-par-2` -> `fr-par`)
    pub fn region(&self) -> Region {
        match self.0.rsplit_once('-') {
            Some((region, _)) => Region(region.to_string()),
            None => Region(self.0.clone()),
        }
    }

    pub fn is_known(&self) -> bool {
        ALL_ZONES.contains(&self.0.as_str())
    }
}

impl Region {
    pub const FR_PAR: &'static str = "fr-par";

    /// Known zones located in this region
    pub fn zones(&self) -> Vec<Zone> {
        ALL_ZONES
            .iter()
            .map(|z| Zone(z.to_string()))
            .filter(|z| z.region() == *self)
            .collect()
    }

    pub fn is_known(&self) -> bool {
        ALL_REGIONS.contains(&self.0.as_str())
    }
}

impl Locality for Zone {
    const KIND: &'static str = "zone";

    fn as_str(&self) -> &str {
        &self.0
    }

    fn all() -> Vec<Self> {
        ALL_ZONES.iter().map(|z| Zone(z.to_string())).collect()
    }
}

impl Locality for Region {
    const KIND: &'static str = "region";

    fn as_str(&self) -> &str {
        &self.0
    }

    fn all() -> Vec<Self> {
        ALL_REGIONS.iter().map(|r| Region(r.to_string())).collect()
    }
}

fn is_lower_alpha(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_lowercase())
}

fn looks_like_region(s: &str) -> bool {
    match s.split_once('-') {
        Some((country, city)) => is_lower_alpha(country, 2) && is_lower_alpha(city, 3),
        None => false,
    }
}

fn looks_like_zone(s: &str) -> bool {
    match s.rsplit_once('-') {
        Some((region, n)) => {
            looks_like_region(region) && !n.is_empty() && n.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

impl FromStr for Zone {
    type Err = ScwError;

    fn from_str(s: &str) -> Result<Self> {
        if ALL_ZONES.contains(&s) || looks_like_zone(s) {
            Ok(Zone(s.to_string()))
        } else {
            Err(ScwError::InvalidLocality(format!("invalid zone '{s}'")))
        }
    }
}

impl FromStr for Region {
    type Err = ScwError;

    fn from_str(s: &str) -> Result<Self> {
        if ALL_REGIONS.contains(&s) || looks_like_region(s) {
            Ok(Region(s.to_string()))
        } else {
            Err(ScwError::InvalidLocality(format!("invalid region '{s}'")))
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run `op` for every locality, in order, and combine the failures
///
/// A failing locality never stops the remaining ones from being attempted.
pub async fn fan_out<L, F, Fut>(localities: impl IntoIterator<Item = L>, mut op: F) -> Result<()>
where
    L: Locality,
    F: FnMut(L) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut errs = ErrorList::new();
    for locality in localities {
        debug!(locality = %locality, kind = L::KIND, "fan-out step");
        errs.record(op(locality).await);
    }
    errs.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_zone_parsing() {
        assert!("fr-par-1".parse::<Zone>().is_ok());
        assert!("xx-abc-9".parse::<Zone>().is_ok());
        assert!("fr-par".parse::<Zone>().is_err());
        assert!("FR-PAR-1".parse::<Zone>().is_err());
        assert!("".parse::<Zone>().is_err());
    }

    #[test]
    fn test_region_parsing() {
        assert!("nl-ams".parse::<Region>().is_ok());
        assert!("nl-ams-1".parse::<Region>().is_err());
        assert!("nlams".parse::<Region>().is_err());
    }

    #[test]
    fn test_zone_region() {
        let zone: Zone = "pl-waw-3".parse().unwrap();
        assert_eq!(zone.region().as_str(), "pl-waw");
        assert!(zone.is_known());
    }

    #[test]
    fn test_region_zones() {
        let region: Region = "fr-par".parse().unwrap();
        let zones: Vec<String> = region.zones().iter().map(|z| z.to_string()).collect();
        assert_eq!(zones, vec!["fr-par-1", "fr-par-2", "fr-par-3"]);
    }

    #[test]
    fn test_serde_is_transparent() {
        let zone: Zone = serde_json::from_str("\"fr-par-2\"").unwrap();
        assert_eq!(zone.as_str(), "fr-par-2");
        assert_eq!(serde_json::to_string(&zone).unwrap(), "\"fr-par-2\"");
    }

    #[tokio::test]
    async fn test_fan_out_visits_every_locality_after_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let result = fan_out(Region::all(), |region| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(region.to_string());
                if region.as_str() == "fr-par" {
                    Err(ScwError::InvalidArgument(format!("boom in {region}")))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(*seen.lock().unwrap(), vec!["fr-par", "nl-ams", "pl-waw"]);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: boom in fr-par");
    }

    #[tokio::test]
    async fn test_fan_out_collects_every_error() {
        let result = fan_out(Zone::all(), |zone| async move {
            Err::<(), _>(ScwError::InvalidArgument(zone.to_string()))
        })
        .await;

        match result {
            Err(ScwError::Multiple(list)) => assert_eq!(list.len(), ALL_ZONES.len()),
            other => panic!("expected combined error, got {other:?}"),
        }
    }
}

use crate::shared::entity::{Entity, ID};
use chrono_tz::{Tz, UTC};
use serde::{Deserialize, Serialize};
use url::Url;

/// A `Unit` ("ward") is the organizational scope that owns a set of
/// `FeedSource`s and the `UnitEvent`s reconciled from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: ID,
    pub name: String,
    pub settings: UnitSettings,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            name: name.into(),
            settings: Default::default(),
        }
    }
}

impl Entity for Unit {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// What happens to stored events whose `FeedSource` has been removed
/// from the `Unit` configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrphanedEventsPolicy {
    /// Keep them around until an operator cleans them up
    Retain,
    /// Cancel them on the next refresh of the `Unit`
    Purge,
}

impl Default for OrphanedEventsPolicy {
    fn default() -> Self {
        Self::Retain
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSettings {
    /// Timezone used for floating date-times in the feeds of this `Unit`
    pub timezone: Tz,
    pub orphaned_events: OrphanedEventsPolicy,
}

impl UnitSettings {
    pub fn set_timezone(&mut self, timezone: &str) -> bool {
        match timezone.parse::<Tz>() {
            Ok(tzid) => {
                self.timezone = tzid;
                true
            }
            Err(_) => false,
        }
    }
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            timezone: UTC,
            orphaned_events: Default::default(),
        }
    }
}

/// One externally published calendar feed configured for a `Unit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSource {
    pub id: ID,
    pub unit_id: ID,
    pub url: Url,
}

const WEBCAL_PREFIX: &str = "webcal://";

impl FeedSource {
    pub fn new(unit_id: &ID, url: Url) -> Self {
        Self {
            id: Default::default(),
            unit_id: *unit_id,
            url,
        }
    }

    /// Parses a feed url. The `webcal` scheme used by most calendar
    /// publishers is plain https underneath.
    pub fn parse_url(raw: &str) -> Option<Url> {
        let raw = raw.trim();
        let webcal = raw
            .get(..WEBCAL_PREFIX.len())
            .filter(|scheme| scheme.eq_ignore_ascii_case(WEBCAL_PREFIX));
        let normalized = match webcal {
            Some(_) => format!("https://{}", &raw[WEBCAL_PREFIX.len()..]),
            None => raw.to_string(),
        };
        let url = Url::parse(&normalized).ok()?;
        match url.scheme() {
            "http" | "https" => Some(url),
            _ => None,
        }
    }
}

impl Entity for FeedSource {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webcal_urls_are_fetched_over_https() {
        let url = FeedSource::parse_url("webcal://example.org/ward.ics").unwrap();
        assert_eq!(url.as_str(), "https://example.org/ward.ics");

        let url = FeedSource::parse_url("WEBCAL://example.org/ward.ics").unwrap();
        assert_eq!(url.as_str(), "https://example.org/ward.ics");
        let url = FeedSource::parse_url(" Webcal://example.org/ward.ics ").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn feed_source_url_serializes_as_string() {
        let url = FeedSource::parse_url("https://example.org/ward.ics").unwrap();
        let source = FeedSource::new(&ID::default(), url);
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["url"], "https://example.org/ward.ics");

        let back: FeedSource = serde_json::from_value(json).unwrap();
        assert_eq!(back.url, source.url);
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(FeedSource::parse_url("ftp://example.org/ward.ics").is_none());
        assert!(FeedSource::parse_url("not a url").is_none());
    }

    #[test]
    fn it_rejects_invalid_timezone() {
        let mut settings = UnitSettings::default();
        assert!(!settings.set_timezone("Not/AZone"));
        assert!(settings.set_timezone("America/Denver"));
        assert_eq!(settings.timezone, chrono_tz::America::Denver);
    }
}

//! Parser for published iCalendar feeds.
//!
//! Only `VEVENT` components are extracted, everything else in the feed is
//! ignored. Each event block is read on its own so that one broken entry
//! never blanks out the rest of the calendar.

mod content_line;

use crate::event::{Event, EventTime, Tags};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{Tz, UTC};
use content_line::{split_text_list, RawLine};
use icalendar::parser::{read_calendar, unfold, Component, Property};
use thiserror::Error;
use tracing::warn;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventParseError {
    #[error("Missing required property: {0}")]
    MissingProperty(&'static str),
    #[error("Unable to parse line: `{0}`")]
    MalformedLine(String),
    #[error("Unable to read event: {0}")]
    Unreadable(String),
    #[error("Invalid date value `{value}` for {property}")]
    InvalidDate { property: String, value: String },
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("DTSTART and DTEND must both be dates or both be date-times")]
    MismatchedDateKinds,
    #[error("Event block was never closed")]
    Unterminated,
}

/// Parses a feed, treating floating date-times as UTC
pub fn parse(raw: &str) -> Vec<Event> {
    parse_with_timezone(raw, UTC)
}

/// Parses a feed into its events in source order. Floating date-times
/// (no `Z` suffix and no `TZID`) are interpreted in `timezone`.
pub fn parse_with_timezone(raw: &str, timezone: Tz) -> Vec<Event> {
    let unfolded = unfold(raw);
    let mut events = Vec::new();
    let mut pending: Option<EventBlock> = None;

    for line in unfolded.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let raw_line = RawLine::split(line);
        let delimiter = raw_line.as_ref().and_then(Delimiter::of);

        let block = match pending.as_mut() {
            Some(block) => block,
            None => {
                if matches!(&delimiter, Some(Delimiter::Begin(c)) if c == "VEVENT") {
                    pending = Some(EventBlock::default());
                }
                continue;
            }
        };

        let raw_line = match raw_line {
            Some(l) => l,
            None => {
                block.fail(EventParseError::MalformedLine(line.to_string()));
                continue;
            }
        };

        match delimiter {
            Some(Delimiter::Begin(component)) if block.depth == 0 && component == "VEVENT" => {
                if let Some(unterminated) = pending.replace(EventBlock::default()) {
                    log_skipped(&unterminated, &EventParseError::Unterminated);
                }
            }
            Some(Delimiter::End(component)) if block.depth == 0 && component == "VEVENT" => {
                if let Some(finished) = pending.take() {
                    match finished.read(timezone) {
                        Ok(e) => events.push(e),
                        Err(err) => log_skipped(&finished, &err),
                    }
                }
            }
            Some(Delimiter::Begin(component)) => {
                block.depth += 1;
                block.lines.push(format!("BEGIN:{}", component));
            }
            Some(Delimiter::End(component)) => {
                if block.depth == 0 {
                    block.fail(EventParseError::MalformedLine(line.to_string()));
                } else {
                    block.depth -= 1;
                    block.lines.push(format!("END:{}", component));
                }
            }
            None => block.push(&raw_line),
        }
    }

    if let Some(unterminated) = pending {
        log_skipped(&unterminated, &EventParseError::Unterminated);
    }

    events
}

fn log_skipped(block: &EventBlock, err: &EventParseError) {
    warn!(
        uid = block.uid.as_deref().unwrap_or("<unknown>"),
        "Skipping malformed event in feed: {}",
        err
    );
}

enum Delimiter {
    Begin(String),
    End(String),
}

impl Delimiter {
    fn of(line: &RawLine) -> Option<Self> {
        match line.name.as_str() {
            "BEGIN" => line.component().map(Self::Begin),
            "END" => line.component().map(Self::End),
            _ => None,
        }
    }
}

/// Lines collected between `BEGIN:VEVENT` and `END:VEVENT`
#[derive(Debug, Default)]
struct EventBlock {
    /// Content lines with normalized property names
    lines: Vec<String>,
    /// Depth inside components nested in the event, e.g. `VALARM`
    depth: usize,
    uid: Option<String>,
    /// Still escaped `CATEGORIES` values of the event itself
    categories: Vec<String>,
    error: Option<EventParseError>,
}

impl EventBlock {
    fn fail(&mut self, err: EventParseError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn push(&mut self, line: &RawLine) {
        if self.depth == 0 {
            match line.name.as_str() {
                "UID" if self.uid.is_none() => {
                    self.uid = line.raw_value().map(|v| v.trim().to_string());
                }
                // icalendar unescapes the whole value, which loses the
                // difference between separating and escaped commas
                "CATEGORIES" => self.categories.extend(line.raw_value().map(String::from)),
                _ => (),
            }
        }
        self.lines.push(line.normalized());
    }

    fn read(&self, timezone: Tz) -> Result<Event, EventParseError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let mut text = String::from("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\n");
        for line in &self.lines {
            text.push_str(line);
            text.push_str("\r\n");
        }
        text.push_str("END:VEVENT\r\nEND:VCALENDAR\r\n");

        let calendar = read_calendar(&text).map_err(|e| {
            EventParseError::Unreadable(e.lines().next().unwrap_or_default().to_string())
        })?;
        let vevent = calendar
            .components
            .iter()
            .find(|c| c.name == "VEVENT")
            .ok_or_else(|| EventParseError::Unreadable("no event component".into()))?;

        self.build(vevent, timezone)
    }

    fn build(&self, vevent: &Component, timezone: Tz) -> Result<Event, EventParseError> {
        let uid = text_of(vevent, "UID").ok_or(EventParseError::MissingProperty("UID"))?;
        let start = vevent
            .find_prop("DTSTART")
            .ok_or(EventParseError::MissingProperty("DTSTART"))
            .and_then(|p| parse_event_time(p, timezone))?;
        let end = match vevent.find_prop("DTEND") {
            Some(p) => Some(parse_event_time(p, timezone)?),
            None => None,
        };
        if let Some(end) = &end {
            if end.is_date() != start.is_date() {
                return Err(EventParseError::MismatchedDateKinds);
            }
        }

        let tags: Tags = self
            .categories
            .iter()
            .flat_map(|value| split_text_list(value))
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        Ok(Event {
            uid,
            title: text_of(vevent, "SUMMARY").unwrap_or_default(),
            description: text_of(vevent, "DESCRIPTION"),
            start,
            end,
            tags,
        })
    }
}

/// Trimmed, already unescaped value of a property, `None` when blank
fn text_of(component: &Component, name: &str) -> Option<String> {
    component
        .find_prop(name)
        .map(|p| p.val.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

fn param<'a>(prop: &'a Property, key: &str) -> Option<&'a str> {
    prop.params
        .iter()
        .find(|p| p.key.as_str().eq_ignore_ascii_case(key))
        .and_then(|p| p.val.as_ref())
        .map(|v| v.as_str())
}

fn parse_event_time(prop: &Property, timezone: Tz) -> Result<EventTime, EventParseError> {
    let value = prop.val.as_str().trim();
    let invalid = || EventParseError::InvalidDate {
        property: prop.name.as_str().to_string(),
        value: value.to_string(),
    };

    let date_only = match param(prop, "VALUE") {
        Some(value_type) => value_type.eq_ignore_ascii_case("DATE"),
        None => value.len() == 8 && !value.contains('T'),
    };
    if date_only {
        return NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(EventTime::Date)
            .map_err(|_| invalid());
    }

    if let Some(utc) = value.strip_suffix(['Z', 'z']) {
        return NaiveDateTime::parse_from_str(utc, DATE_TIME_FORMAT)
            .map(|dt| EventTime::DateTime(Utc.from_utc_datetime(&dt)))
            .map_err(|_| invalid());
    }

    let local = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(|_| invalid())?;
    let zone = match param(prop, "TZID") {
        Some(tzid) => tzid
            .trim()
            .trim_start_matches('/')
            .parse::<Tz>()
            .map_err(|_| EventParseError::UnknownTimezone(tzid.to_string()))?,
        None => timezone,
    };
    zone.from_local_datetime(&local)
        .earliest()
        .map(|dt| EventTime::DateTime(dt.with_timezone(&Utc)))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn feed(body: &str) -> String {
        let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//ward//EN\r\n");
        out.push_str(body);
        out.push_str("END:VCALENDAR\r\n");
        out
    }

    const TWO_EVENTS: &str = "BEGIN:VEVENT\r\n\
UID:evt-1@ward\r\n\
SUMMARY:Ward council\r\n\
DESCRIPTION:Bring the agenda\r\n\
DTSTART:20260701T180000Z\r\n\
DTEND:20260701T190000Z\r\n\
CATEGORIES:ward,leadership\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:evt-2@ward\r\n\
SUMMARY:Youth camp\r\n\
DTSTART;VALUE=DATE:20260710\r\n\
DTEND;VALUE=DATE:20260713\r\n\
END:VEVENT\r\n";

    #[test]
    fn parses_events_in_source_order() {
        let events = parse(&feed(TWO_EVENTS));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].uid, "evt-1@ward");
        assert_eq!(events[0].title, "Ward council");
        assert_eq!(events[0].description.as_deref(), Some("Bring the agenda"));
        assert_eq!(events[1].uid, "evt-2@ward");
        assert_eq!(events[1].description, None);
    }

    #[test]
    fn parsing_is_deterministic() {
        let raw = feed(TWO_EVENTS);
        assert_eq!(parse(&raw), parse(&raw));
    }

    #[test]
    fn feed_without_events_is_empty() {
        assert!(parse(&feed("")).is_empty());
        assert!(parse("").is_empty());
        let only_todo = "BEGIN:VTODO\r\nUID:todo-1\r\nSUMMARY:Not an event\r\nEND:VTODO\r\n";
        assert!(parse(&feed(only_todo)).is_empty());
    }

    #[test]
    fn date_value_is_all_day() {
        let events = parse(&feed(TWO_EVENTS));
        let camp = &events[1];
        assert!(camp.all_day());
        assert_eq!(
            camp.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2026, 7, 10).unwrap())
        );
        assert_eq!(
            camp.end,
            Some(EventTime::Date(NaiveDate::from_ymd_opt(2026, 7, 13).unwrap()))
        );
    }

    #[test]
    fn utc_date_time_is_an_instant() {
        let events = parse(&feed(TWO_EVENTS));
        let council = &events[0];
        assert!(!council.all_day());
        assert_eq!(
            council.start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2026, 7, 1, 18, 0, 0).unwrap())
        );
    }

    #[test]
    fn categories_keep_order() {
        let events = parse(&feed(TWO_EVENTS));
        assert_eq!(
            events[0].tags.as_slice(),
            &["ward".to_string(), "leadership".to_string()]
        );
    }

    #[test]
    fn categories_collapse_duplicates_across_lines() {
        let body = "BEGIN:VEVENT\r\nUID:a\r\nDTSTART:20260701T180000Z\r\n\
CATEGORIES:ward,ward,youth\r\nCATEGORIES:youth,primary\r\nEND:VEVENT\r\n";
        let events = parse(&feed(body));
        assert_eq!(
            events[0].tags.as_slice(),
            &["ward".to_string(), "youth".to_string(), "primary".to_string()]
        );
    }

    #[test]
    fn malformed_event_is_skipped_without_aborting_feed() {
        let body = "BEGIN:VEVENT\r\nUID:bad-date\r\nDTSTART:2026-07-01\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nSUMMARY:No uid\r\nDTSTART:20260701T180000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:no-start\r\nSUMMARY:No start\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:garbage\r\nDTSTART:20260701T180000Z\r\nthis is not a property\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:good\r\nSUMMARY:Sacrament meeting\r\nDTSTART:20260705T160000Z\r\nEND:VEVENT\r\n";
        let events = parse(&feed(body));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "good");
    }

    #[test]
    fn mismatched_start_and_end_kinds_are_skipped() {
        let body = "BEGIN:VEVENT\r\nUID:mixed\r\nDTSTART;VALUE=DATE:20260710\r\n\
DTEND:20260710T180000Z\r\nEND:VEVENT\r\n";
        assert!(parse(&feed(body)).is_empty());
    }

    #[test]
    fn unterminated_event_is_dropped() {
        let body = "BEGIN:VEVENT\r\nUID:open\r\nDTSTART:20260701T180000Z\r\n\
BEGIN:VEVENT\r\nUID:closed\r\nDTSTART:20260702T180000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:trailing\r\nDTSTART:20260703T180000Z\r\n";
        let events = parse(body);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "closed");
    }

    #[test]
    fn nested_alarm_does_not_leak_into_event() {
        let body = "BEGIN:VEVENT\r\nUID:alarm\r\nSUMMARY:Temple trip\r\nDTSTART:20260701T180000Z\r\n\
BEGIN:VALARM\r\nACTION:DISPLAY\r\nDESCRIPTION:Reminder\r\nTRIGGER:-PT15M\r\nEND:VALARM\r\n\
END:VEVENT\r\n";
        let events = parse(&feed(body));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, None);
    }

    #[test]
    fn folded_lines_and_escapes_are_resolved() {
        let body = "BEGIN:VEVENT\r\nUID:folded\r\nDTSTART:20260701T180000Z\r\n\
DESCRIPTION:Bring scriptures\\, notebooks\r\n  and a friend\\nSee you there\r\nEND:VEVENT\r\n";
        let events = parse(&feed(body));
        assert_eq!(
            events[0].description.as_deref(),
            Some("Bring scriptures, notebooks and a friend\nSee you there")
        );
    }

    #[test]
    fn tzid_and_floating_times_are_normalized_to_utc() {
        let body = "BEGIN:VEVENT\r\nUID:tz\r\nDTSTART;TZID=America/Denver:20260701T180000\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:floating\r\nDTSTART:20260701T180000\r\nEND:VEVENT\r\n";
        let events = parse_with_timezone(&feed(body), chrono_tz::Europe::Oslo);
        // MDT is UTC-6 in July
        assert_eq!(
            events[0].start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2026, 7, 2, 0, 0, 0).unwrap())
        );
        // CEST is UTC+2 in July
        assert_eq!(
            events[1].start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2026, 7, 1, 16, 0, 0).unwrap())
        );
    }

    #[test]
    fn unknown_tzid_skips_event() {
        let body = "BEGIN:VEVENT\r\nUID:tz\r\nDTSTART;TZID=Mars/Olympus:20260701T180000\r\nEND:VEVENT\r\n";
        assert!(parse(&feed(body)).is_empty());
    }

    #[test]
    fn tolerates_bare_line_feeds() {
        let raw = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:lf\nSUMMARY:Activity\nDTSTART:20260701T180000Z\nEND:VEVENT\nEND:VCALENDAR\n";
        let events = parse(raw);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Activity");
    }

    #[test]
    fn multi_valued_parameters_do_not_drop_event() {
        let body = "BEGIN:VEVENT\r\nUID:delegated\r\nSUMMARY:Bishopric meeting\r\n\
DTSTART:20260701T180000Z\r\n\
ATTENDEE;DELEGATED-TO=\"mailto:a@x.org\",\"mailto:b@x.org\":mailto:c@x.org\r\n\
END:VEVENT\r\n";
        let events = parse(&feed(body));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "delegated");
        assert_eq!(events[0].title, "Bishopric meeting");
    }

    #[test]
    fn explicit_date_time_value_is_never_read_as_a_date() {
        let body = "BEGIN:VEVENT\r\nUID:short\r\nDTSTART;VALUE=DATE-TIME:20260701\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:date\r\nDTSTART;value=date:20260702\r\nEND:VEVENT\r\n";
        let events = parse(&feed(body));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "date");
        assert!(events[0].all_day());
    }

    #[test]
    fn lowercase_property_names_are_accepted() {
        let body = "begin:vevent\r\nuid:lower\r\nsummary:Primary program\\, practice\r\n\
dtstart:20260701T180000Z\r\nend:vevent\r\n";
        let events = parse(&feed(body));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Primary program, practice");
    }

    #[test]
    fn escaped_commas_stay_inside_a_category() {
        let body = "BEGIN:VEVENT\r\nUID:youth\r\nDTSTART:20260701T180000Z\r\n\
CATEGORIES:ward,youth\\, young women\r\nEND:VEVENT\r\n";
        let events = parse(&feed(body));
        assert_eq!(
            events[0].tags.as_slice(),
            &["ward".to_string(), "youth, young women".to_string()]
        );
    }
}

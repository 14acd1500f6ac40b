//! iCalendar generation.
//!
//! One VCALENDAR wraps one VEVENT per class session. The `icalendar` crate
//! writes the content lines (CRLF endings, folding at 75 octets, TEXT
//! escaping). Start and end are floating local times; the calendar-level
//! `X-WR-TIMEZONE` tells clients which zone they belong to.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use icalendar::{Calendar, Component, EventLike, EventStatus, Property};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::entry::ScheduleEntry;

/// Floating local date-time, `YYYYMMDDTHHMMSS`
const ICS_DATETIME: &str = "%Y%m%dT%H%M%S";

/// End-of-day times some schedules use for sessions ending at midnight
const END_OF_DAY: [&str; 2] = ["24:00", "24:00:00"];

/// Calendar-level properties written into the VCALENDAR header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarMetadata {
    /// X-WR-CALNAME
    pub name: String,
    /// X-WR-CALDESC
    pub description: String,
    /// X-WR-TIMEZONE
    pub timezone: String,
    /// PRODID
    pub product_id: String,
}

impl Default for CalendarMetadata {
    fn default() -> Self {
        CalendarMetadata {
            name: "Horário Acadêmico CMMG".to_string(),
            description: "Horário das aulas da faculdade CMMG".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            product_id: "-//CMMG Calendar//Schedule Converter//PT".to_string(),
        }
    }
}

/// Generate the iCalendar document.
///
/// Every entry with a name, a start date and both times becomes one VEVENT,
/// all stamped with the same `dtstamp`.
pub fn generate_ics(
    entries: &[ScheduleEntry],
    metadata: &CalendarMetadata,
    dtstamp: DateTime<Utc>,
) -> String {
    // Calendar::new() would prefill its own PRODID
    let mut cal = Calendar::empty();
    cal.append_property(Property::new("VERSION", "2.0"))
        .append_property(Property::new("PRODID", &metadata.product_id))
        .append_property(Property::new("CALSCALE", "GREGORIAN"))
        .append_property(Property::new("METHOD", "PUBLISH"))
        .append_property(Property::new("X-WR-CALNAME", &metadata.name))
        .append_property(Property::new("X-WR-CALDESC", &metadata.description))
        .append_property(Property::new("X-WR-TIMEZONE", &metadata.timezone));

    for entry in entries.iter().filter(|e| e.is_exportable() && e.has_times()) {
        cal.push(build_event(entry, dtstamp));
    }

    cal.done().to_string()
}

fn build_event(entry: &ScheduleEntry, dtstamp: DateTime<Utc>) -> icalendar::Event {
    let fields = entry.fields();

    icalendar::Event::new()
        .uid(&Uuid::new_v4().to_string())
        .timestamp(dtstamp)
        .add_property("DTSTART", format_ics_datetime(&fields.start_date, &fields.start_time))
        .add_property("DTEND", format_ics_datetime(&fields.end_date, &fields.end_time))
        .summary(&fields.name)
        .description(&fields.description)
        .location(&fields.location)
        .status(EventStatus::Confirmed)
        .add_property("TRANSP", "OPAQUE")
        .done()
}

/// Combine a normalized date (YYYY-MM-DD) and a time of day into
/// `YYYYMMDDTHHMMSS`.
///
/// Seconds default to 00, and `24:00` becomes midnight of the following
/// day. A date or time chrono cannot read is written as given, its groups
/// joined without separators.
pub fn format_ics_datetime(date: &str, time: &str) -> String {
    let (date, time) = (date.trim(), time.trim());

    match (parse_date(date), parse_time(time)) {
        (Some(day), Some((clock, next_day))) => {
            let day = if next_day {
                day.succ_opt().unwrap_or(day)
            } else {
                day
            };
            NaiveDateTime::new(day, clock).format(ICS_DATETIME).to_string()
        }
        _ => {
            warn!(date, time, "Unrecognized date or time, writing it as given");
            join_datetime(date, time)
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .ok()
}

/// Parse a time of day; the flag is set when it rolls over to the next day.
fn parse_time(s: &str) -> Option<(NaiveTime, bool)> {
    if END_OF_DAY.contains(&s) {
        return NaiveTime::from_hms_opt(0, 0, 0).map(|midnight| (midnight, true));
    }

    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
        .map(|t| (t, false))
}

/// `2024-03-04` and `08:00` give `20240304T080000`.
fn join_datetime(date: &str, time: &str) -> String {
    let mut clock: Vec<&str> = time.split(':').take(3).collect();
    while clock.len() < 3 {
        clock.push("00");
    }

    format!("{}T{}", date.replace('-', ""), clock.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use icalendar::parser::unfold;
    use serde_json::json;
    use std::collections::HashSet;

    fn entries(value: serde_json::Value) -> Vec<ScheduleEntry> {
        serde_json::from_value(value).unwrap()
    }

    fn fixed_stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 20, 12, 30, 5).unwrap()
    }

    fn generate(list: &[ScheduleEntry]) -> String {
        generate_ics(list, &CalendarMetadata::default(), fixed_stamp())
    }

    fn calculus() -> Vec<ScheduleEntry> {
        entries(json!([{
            "NOME": "Calculus I",
            "DATAINICIAL": "2024-03-04T00:00:00",
            "HORAINICIAL": "08:00:00",
            "HORAFINAL": "09:40:00",
            "PREDIO": "Block A",
            "SALA": "101",
        }]))
    }

    /// Values of `name` after unfolding, still escaped
    fn property_values(ics: &str, name: &str) -> Vec<String> {
        let prefix = format!("{}:", name);
        unfold(ics)
            .lines()
            .filter_map(|l| l.strip_prefix(prefix.as_str()))
            .map(String::from)
            .collect()
    }

    /// Inverse of RFC 5545 TEXT escaping
    fn unescape(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some(&next) if matches!(next, ',' | ';' | '\\') => {
                    result.push(next);
                    chars.next();
                }
                Some('n') | Some('N') => {
                    result.push('\n');
                    chars.next();
                }
                _ => result.push(c),
            }
        }

        result
    }

    #[test]
    fn test_calendar_header() {
        assert_eq!(
            generate(&[]),
            "BEGIN:VCALENDAR\r\n\
             VERSION:2.0\r\n\
             PRODID:-//CMMG Calendar//Schedule Converter//PT\r\n\
             CALSCALE:GREGORIAN\r\n\
             METHOD:PUBLISH\r\n\
             X-WR-CALNAME:Horário Acadêmico CMMG\r\n\
             X-WR-CALDESC:Horário das aulas da faculdade CMMG\r\n\
             X-WR-TIMEZONE:America/Sao_Paulo\r\n\
             END:VCALENDAR\r\n"
        );
    }

    #[test]
    fn test_calculus_event() {
        let ics = generate(&calculus());
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);

        assert_eq!(property_values(&ics, "DTSTART"), vec!["20240304T080000"]);
        assert_eq!(property_values(&ics, "DTEND"), vec!["20240304T094000"]);
        assert_eq!(property_values(&ics, "LOCATION"), vec!["Block A - Sala: 101"]);
        assert_eq!(property_values(&ics, "SUMMARY"), vec!["Calculus I"]);
        assert_eq!(property_values(&ics, "DESCRIPTION"), vec![""]);
        assert_eq!(property_values(&ics, "DTSTAMP"), vec!["20240220T123005Z"]);
        assert_eq!(property_values(&ics, "STATUS"), vec!["CONFIRMED"]);
        assert_eq!(property_values(&ics, "TRANSP"), vec!["OPAQUE"]);
    }

    #[test]
    fn test_event_properties() {
        let ics = generate(&calculus());
        let names: Vec<&str> = ics
            .split("BEGIN:VEVENT\r\n")
            .nth(1)
            .unwrap()
            .lines()
            .map(|l| l.split(':').next().unwrap())
            .collect();

        assert_eq!(
            names,
            vec![
                "DESCRIPTION", "DTEND", "DTSTAMP", "DTSTART", "LOCATION", "STATUS", "SUMMARY",
                "TRANSP", "UID", "END", "END"
            ]
        );
    }

    #[test]
    fn test_lines_end_with_crlf() {
        let ics = generate(&calculus());
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(ics.matches('\n').count(), ics.matches("\r\n").count());
    }

    #[test]
    fn test_long_lines_are_folded() {
        let list = entries(json!([{
            "NOME": "Anatomia",
            "DATAINICIAL": "2024-03-04",
            "HORAINICIAL": "08:00",
            "HORAFINAL": "09:40",
            "CODTURMA": "MED-2024-1A",
            "NOMEREDUZIDO": "ANAT1",
            "URLAULAONLINE": "https://meet.google.com/abc-defg-hij?authuser=0&hs=179",
        }]));

        let ics = generate(&list);
        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "line of {} octets: {}", line.len(), line);
        }
        assert_eq!(
            property_values(&ics, "DESCRIPTION"),
            vec![
                "Turma: MED-2024-1A | Código: ANAT1 | \
                 Aula Online: https://meet.google.com/abc-defg-hij?authuser=0&hs=179"
            ]
        );
    }

    #[test]
    fn test_skips_entries_missing_required_fields() {
        let list = entries(json!([
            { "NOME": "Sem horário", "DATAINICIAL": "2024-03-04" },
            { "NOME": "Sem fim", "DATAINICIAL": "2024-03-04", "HORAINICIAL": "08:00" },
            { "DATAINICIAL": "2024-03-04", "HORAINICIAL": "08:00", "HORAFINAL": "09:00" },
            { "NOME": "Sem data", "HORAINICIAL": "08:00", "HORAFINAL": "09:00" },
            { "NOME": "Completa", "DATAINICIAL": "2024-03-04",
              "HORAINICIAL": "08:00", "HORAFINAL": "09:00" },
        ]));

        let ics = generate(&list);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert_eq!(property_values(&ics, "SUMMARY"), vec!["Completa"]);
    }

    #[test]
    fn test_seconds_default_to_zero() {
        assert_eq!(format_ics_datetime("2024-03-04", "08:15"), "20240304T081500");
        assert_eq!(format_ics_datetime("2024-03-04", "8:05:30"), "20240304T080530");
    }

    #[test]
    fn test_midnight_end_rolls_over_to_next_day() {
        assert_eq!(format_ics_datetime("2024-03-04", "24:00:00"), "20240305T000000");
        assert_eq!(format_ics_datetime("2024-12-31", "24:00"), "20250101T000000");

        let list = entries(json!([{
            "NOME": "Plantão",
            "DATAINICIAL": "2024-03-04",
            "HORAINICIAL": "18:00:00",
            "HORAFINAL": "24:00:00",
        }]));

        let ics = generate(&list);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert_eq!(property_values(&ics, "DTSTART"), vec!["20240304T180000"]);
        assert_eq!(property_values(&ics, "DTEND"), vec!["20240305T000000"]);
    }

    #[test]
    fn test_unrecognized_date_or_time_is_written_as_given() {
        assert_eq!(format_ics_datetime("2024-03-04", "8h"), "20240304T8h0000");

        let list = entries(json!([
            { "NOME": "Fim estranho", "DATAINICIAL": "2024-03-04", "DATAFINAL": "2024/03/05",
              "HORAINICIAL": "08:00", "HORAFINAL": "09:00" },
            { "NOME": "Boa", "DATAINICIAL": "2024-03-04",
              "HORAINICIAL": "10:00", "HORAFINAL": "11:00" },
        ]));

        let ics = generate(&list);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(
            property_values(&ics, "DTSTART"),
            vec!["20240304T080000", "20240304T100000"]
        );
        assert_eq!(
            property_values(&ics, "DTEND"),
            vec!["2024/03/05T090000", "20240304T110000"]
        );
    }

    #[test]
    fn test_end_date_defaults_to_start_date() {
        let list = entries(json!([{
            "NOME": "Plantão",
            "DATAINICIAL": "2024-03-04T00:00:00",
            "HORAINICIAL": "19:00:00",
            "HORAFINAL": "23:00:00",
        }]));

        let ics = generate(&list);
        assert_eq!(property_values(&ics, "DTEND"), vec!["20240304T230000"]);
    }

    #[test]
    fn test_explicit_end_date_is_used() {
        let list = entries(json!([{
            "NOME": "Plantão",
            "DATAINICIAL": "2024-03-04T00:00:00",
            "DATAFINAL": "2024-03-05T00:00:00",
            "HORAINICIAL": "19:00:00",
            "HORAFINAL": "07:00:00",
        }]));

        let ics = generate(&list);
        assert_eq!(property_values(&ics, "DTEND"), vec!["20240305T070000"]);
    }

    #[test]
    fn test_identical_entries_get_distinct_uids() {
        let mut list = calculus();
        list.push(list[0].clone());
        list.push(list[0].clone());

        let ics = generate(&list);
        let uids: HashSet<String> = property_values(&ics, "UID").into_iter().collect();
        assert_eq!(uids.len(), 3);
    }

    #[test]
    fn test_event_text_fields_are_escaped() {
        let list = entries(json!([{
            "NOME": "Ética; Bioética, Deontologia",
            "DATAINICIAL": "2024-03-04",
            "HORAINICIAL": "08:00",
            "HORAFINAL": "09:00",
            "PREDIO": "Prédio 1\nAnexo",
            "CODTURMA": "T\\1",
        }]));

        let ics = generate(&list);
        let summary = property_values(&ics, "SUMMARY").remove(0);
        let location = property_values(&ics, "LOCATION").remove(0);
        let description = property_values(&ics, "DESCRIPTION").remove(0);

        assert_eq!(summary, "Ética\\; Bioética\\, Deontologia");
        assert_eq!(location, "Prédio 1\\nAnexo");
        assert_eq!(description, "Turma: T\\\\1");
        assert_eq!(unescape(&summary), "Ética; Bioética, Deontologia");
        assert_eq!(unescape(&location), "Prédio 1\nAnexo");
        assert_eq!(unescape(&description), "Turma: T\\1");
    }

    #[test]
    fn test_escaped_summary_reads_back_unchanged() {
        let samples = [
            "Turma: T1 | Código: ANAT; Aula Online: https://x.test/a,b",
            "C:\\Users\\aluno",
            "linha 1\nlinha 2",
            "\\n is not a newline",
            "\\,",
        ];

        for sample in samples {
            let list = vec![ScheduleEntry {
                name: Some(sample.to_string()),
                start_date: Some("2024-03-04".to_string()),
                start_time: Some("08:00".to_string()),
                end_time: Some("09:00".to_string()),
                ..Default::default()
            }];

            let ics = generate(&list);
            assert_eq!(unescape(&property_values(&ics, "SUMMARY")[0]), sample);
        }
    }

    #[test]
    fn test_custom_metadata() {
        let metadata = CalendarMetadata {
            name: "Semestre 2024/1".to_string(),
            description: "Aulas, provas".to_string(),
            timezone: "America/Manaus".to_string(),
            product_id: "-//Test//EN".to_string(),
        };

        let ics = generate_ics(&[], &metadata, fixed_stamp());
        assert!(ics.contains("PRODID:-//Test//EN\r\n"));
        assert!(ics.contains("X-WR-CALNAME:Semestre 2024/1\r\n"));
        assert!(ics.contains("X-WR-CALDESC:Aulas\\, provas\r\n"));
        assert!(ics.contains("X-WR-TIMEZONE:America/Manaus\r\n"));
    }

    #[test]
    fn test_generated_calendar_parses() {
        use icalendar::parser::read_calendar;

        let mut list = calculus();
        list.push(list[0].clone());
        let ics = generate_ics(&list, &CalendarMetadata::default(), Utc::now());

        let unfolded = unfold(&ics);
        let calendar = match read_calendar(&unfolded) {
            Ok(calendar) => calendar,
            Err(_) => panic!("Generated ICS should parse:\n{}", ics),
        };

        let events: Vec<_> = calendar
            .components
            .iter()
            .filter(|c| c.name == "VEVENT")
            .collect();
        assert_eq!(events.len(), 2);

        for event in events {
            assert!(event.find_prop("UID").is_some());
            assert_eq!(
                event.find_prop("DTSTART").map(|p| p.val.to_string()).as_deref(),
                Some("20240304T080000")
            );
        }
    }
}

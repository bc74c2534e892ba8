use anyhow::{format_err, Error};
use chrono::{Datelike, TimeZone, Utc};
use ics_codec::{parse, Moment, Value};

#[test]
fn test_google_export() -> Result<(), Error> {
    let vcal_raw = r#"BEGIN:VCALENDAR
PRODID:-//Google Inc//Google Calendar 70.9054//EN
VERSION:2.0
BEGIN:VTIMEZONE
TZID:Europe/London
X-LIC-LOCATION:Europe/London
BEGIN:DAYLIGHT
TZOFFSETFROM:+0000
TZOFFSETTO:+0100
TZNAME:BST
DTSTART:19700329T010000
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU
END:DAYLIGHT
END:VTIMEZONE
BEGIN:VEVENT
DTSTART;TZID=Europe/London:20220208T153000
DTEND;TZID=Europe/London:20220208T162000
RRULE:FREQ=WEEKLY;INTERVAL=2
DTSTAMP:20220712T145025Z
ORGANIZER;CN=Foo:mailto:foo@example.org
UID:26a0c5d5-50e8-4ae0-a2fd-80968f6db384
DESCRIPTION:Fortnightly catch up\, bring
  notes\nand coffee
LOCATION:Meeting room 3
SEQUENCE:2
SUMMARY:Test
CLASS:PRIVATE
TRANSP:OPAQUE
END:VEVENT
END:VCALENDAR
"#;

    let collection = parse(vcal_raw);

    // The timezone has no UID, so it ends up under a generated key.
    assert_eq!(collection.len(), 2);

    let event = collection
        .get("26a0c5d5-50e8-4ae0-a2fd-80968f6db384")
        .ok_or_else(|| format_err!("missing event"))?;

    assert_eq!(event.kind.as_deref(), Some("VEVENT"));
    assert_eq!(event.get("summary"), Some(&Value::from("Test")));
    assert_eq!(
        event.get("description"),
        Some(&Value::from("Fortnightly catch up, bring notes\nand coffee"))
    );
    assert_eq!(event.get("location"), Some(&Value::from("Meeting room 3")));
    assert_eq!(event.get("class"), Some(&Value::from("PRIVATE")));
    assert_eq!(event.get("transparency"), Some(&Value::from("OPAQUE")));

    let start = event
        .get("start")
        .and_then(Value::as_date)
        .ok_or_else(|| format_err!("start is not a date"))?;
    assert_eq!(start.tzid.as_deref(), Some("Europe/London"));
    assert_eq!(start.format_value(), "20220208T153000");

    // Properties we don't know about are dropped.
    assert_eq!(event.properties.len(), 8);

    let timezone = collection
        .iter()
        .map(|(_, c)| c)
        .find(|c| c.kind.as_deref() == Some("VTIMEZONE"))
        .ok_or_else(|| format_err!("missing timezone"))?;
    assert!(timezone.properties.is_empty());

    Ok(())
}

#[test]
fn test_date_only() -> Result<(), Error> {
    let collection = parse("BEGIN:VEVENT\r\nUID:d\r\nDTSTART;VALUE=DATE:20240115\r\nEND:VEVENT\r\n");

    let start = collection
        .get("d")
        .and_then(|c| c.get("start"))
        .and_then(Value::as_date)
        .ok_or_else(|| format_err!("missing start"))?;

    match start.moment {
        Moment::Date(date) => {
            assert_eq!(date.year(), 2024);
            assert_eq!(date.month0(), 0);
            assert_eq!(date.day(), 15);
        }
        other => panic!("Expected a date, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_utc_instant() -> Result<(), Error> {
    let collection = parse("BEGIN:VEVENT\nUID:u\nDTSTART:20240115T093000Z\nEND:VEVENT\n");

    let start = collection
        .get("u")
        .and_then(|c| c.get("start"))
        .and_then(Value::as_date)
        .ok_or_else(|| format_err!("missing start"))?;

    assert_eq!(
        start.moment,
        Moment::Utc(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap())
    );
    assert_eq!(start.tzid, None);

    Ok(())
}

#[test]
fn test_unparseable_values() -> Result<(), Error> {
    let collection = parse(
        "BEGIN:VEVENT\nUID:bad\nDTSTART:next tuesday\nDTEND;VALUE=DATE:2024011\nGEO:here;there\nEND:VEVENT\n",
    );

    let event = collection
        .get("bad")
        .ok_or_else(|| format_err!("missing event"))?;

    assert_eq!(event.get("start"), Some(&Value::from("next tuesday")));
    assert_eq!(event.get("end"), Some(&Value::from("2024011")));

    let geo = event
        .get("geo")
        .and_then(Value::as_geo)
        .ok_or_else(|| format_err!("missing geo"))?;
    assert!(geo.latitude.is_nan());
    assert!(geo.longitude.is_nan());

    Ok(())
}

#[test]
fn test_garbage_input() {
    assert!(parse("").is_empty());
    assert!(parse("GARBAGE\nMORE GARBAGE\n").is_empty());
    assert!(parse("END:VEVENT\nEND:VCALENDAR\n").is_empty());
}

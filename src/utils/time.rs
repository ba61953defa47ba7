use chrono::{DateTime, Utc};

/// Describe how long ago an RFC 3339 timestamp was, e.g. "3 minutes ago".
///
/// Unparseable timestamps are returned unchanged. Times slightly in the
/// future (clock skew) read as "just now".
pub fn format_relative(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let seconds = now
        .signed_duration_since(then.with_timezone(&Utc))
        .num_seconds();

    if seconds < 30 {
        return "less than a minute ago".to_string();
    }
    let minutes = (seconds + 30) / 60;
    if minutes < 45 {
        return plural(minutes, "minute");
    }
    let hours = (minutes + 30) / 60;
    if minutes < 24 * 60 {
        return format!("about {}", plural(hours, "hour"));
    }
    let days = (hours + 12) / 24;
    if days < 30 {
        return plural(days, "day");
    }
    let months = (days + 15) / 30;
    if months < 12 {
        return plural(months, "month");
    }
    format!("about {}", plural(months / 12, "year"))
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(now: DateTime<Utc>, ago: Duration) -> String {
        format_relative(&(now - ago).to_rfc3339(), now)
    }

    #[test]
    fn buckets_follow_elapsed_time() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(at(now, Duration::seconds(5)), "less than a minute ago");
        assert_eq!(at(now, Duration::seconds(-20)), "less than a minute ago");
        assert_eq!(at(now, Duration::seconds(60)), "1 minute ago");
        assert_eq!(at(now, Duration::minutes(12)), "12 minutes ago");
        assert_eq!(at(now, Duration::minutes(50)), "about 1 hour ago");
        assert_eq!(at(now, Duration::hours(5)), "about 5 hours ago");
        assert_eq!(at(now, Duration::days(1)), "1 day ago");
        assert_eq!(at(now, Duration::days(3)), "3 days ago");
        assert_eq!(at(now, Duration::days(60)), "2 months ago");
        assert_eq!(at(now, Duration::days(800)), "about 2 years ago");
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format_relative("yesterday-ish", now), "yesterday-ish");
    }
}

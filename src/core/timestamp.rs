//! Naive export timestamps to absolute instants.
//!
//! Telegram Desktop writes `date` as local wall-clock time with no offset and
//! no DST flag. Every timestamp of a run is read in the one configured
//! timezone; there is no per-message offset inference.
//!
//! Wall-clock times that a DST switch makes ambiguous resolve to the earlier
//! instant. Times that fall into a DST gap are read with the offset in effect
//! before the gap.
//!
//! Newer exports also carry `date_unixtime`. It is only compared against the
//! normalized instant to spot a misconfigured timezone; it never replaces it.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::RawMessage;

/// Converts naive local timestamps using one fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimestampNormalizer {
    tz: Tz,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl TimestampNormalizer {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The timezone naive timestamps are read in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Interprets `local` as wall-clock time in the configured timezone.
    pub fn normalize(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                let before_gap = self
                    .tz
                    .offset_from_utc_datetime(&(local - Duration::days(1)))
                    .fix();
                (local - Duration::seconds(i64::from(before_gap.local_minus_utc()))).and_utc()
            }
        }
    }

    /// Epoch milliseconds of `local`, as the bulk-import format expects.
    pub fn epoch_millis(&self, local: NaiveDateTime) -> i64 {
        self.normalize(local).timestamp_millis()
    }

    /// Returns `true` if the message carries `date_unixtime` and it disagrees
    /// with the normalized `date`.
    pub fn disagrees_with_unixtime(&self, msg: &RawMessage) -> bool {
        msg.date_unixtime
            .is_some_and(|unix| unix != self.normalize(msg.date).timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::telegram::parse_naive_date;

    fn at(raw: &str) -> NaiveDateTime {
        parse_naive_date(raw).unwrap()
    }

    #[test]
    fn test_utc_default() {
        let normalizer = TimestampNormalizer::default();
        assert_eq!(normalizer.epoch_millis(at("2022-03-25T17:30:36")), 1648229436000);
        assert_eq!(normalizer.epoch_millis(at("2022-03-15T06:06:11")), 1647324371000);
    }

    #[test]
    fn test_configured_timezone() {
        let normalizer = TimestampNormalizer::new(chrono_tz::Europe::Busingen);
        assert_eq!(normalizer.epoch_millis(at("2022-03-25T17:30:36")), 1648225836000);
        assert_eq!(normalizer.epoch_millis(at("2022-03-15T06:06:11")), 1647320771000);
    }

    #[test]
    fn test_summer_time() {
        let normalizer = TimestampNormalizer::new(chrono_tz::America::New_York);
        assert_eq!(normalizer.epoch_millis(at("2022-07-01T12:00:00")), 1656691200000);
    }

    #[test]
    fn test_dst_gap_uses_offset_before_gap() {
        let normalizer = TimestampNormalizer::new(chrono_tz::Europe::Berlin);
        assert_eq!(normalizer.epoch_millis(at("2022-03-27T02:30:00")), 1648344600000);
    }

    #[test]
    fn test_dst_overlap_uses_earlier_instant() {
        let normalizer = TimestampNormalizer::new(chrono_tz::Europe::Berlin);
        assert_eq!(normalizer.epoch_millis(at("2022-10-30T02:30:00")), 1667089800000);
    }

    #[test]
    fn test_five_seconds_apart() {
        let normalizer = TimestampNormalizer::default();
        let a = normalizer.epoch_millis(at("2021-01-01T10:00:00"));
        let b = normalizer.epoch_millis(at("2021-01-01T10:00:05"));
        assert_eq!(b - a, 5000);
    }

    #[test]
    fn test_unixtime_disagreement() {
        let mut msg = RawMessage::new(1, at("2022-03-15T06:06:11"));
        let utc = TimestampNormalizer::default();
        let zurich = TimestampNormalizer::new(chrono_tz::Europe::Zurich);

        assert!(!utc.disagrees_with_unixtime(&msg));

        msg.date_unixtime = Some(1647320771);
        assert!(utc.disagrees_with_unixtime(&msg));
        assert!(!zurich.disagrees_with_unixtime(&msg));
    }
}

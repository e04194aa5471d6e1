// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Date/time helpers for `to_date`

use chrono::{NaiveDate, NaiveDateTime};

/// Translate a `to_date` pattern into a chrono format string
///
/// Supported tokens: `yyyy MM dd HH mm ss SSS`. Any other letter makes the
/// pattern invalid; other characters are copied literally.
pub fn translate_pattern(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let token = match (c, run) {
            ('y', 4) => "%Y",
            ('M', 2) => "%m",
            ('d', 2) => "%d",
            ('H', 2) => "%H",
            ('m', 2) => "%M",
            ('s', 2) => "%S",
            ('S', 3) => "%.3f",
            ('%', _) => {
                out.push_str("%%");
                i += 1;
                continue;
            }
            (c, _) if c.is_ascii_alphabetic() => return None,
            (c, _) => {
                out.push(c);
                i += 1;
                continue;
            }
        };
        // %.3f consumes its own dot
        if token == "%.3f" && out.ends_with('.') {
            out.pop();
        }
        out.push_str(token);
        i += run;
    }

    Some(out)
}

/// True when the pattern carries a time-of-day component
fn has_time(format: &str) -> bool {
    format.contains("%H")
}

/// Parse `value` with a `to_date` pattern into epoch microseconds
pub fn parse_with_pattern(value: &str, pattern: &str) -> Option<i64> {
    let format = translate_pattern(pattern)?;
    let dt = if has_time(&format) {
        NaiveDateTime::parse_from_str(value, &format).ok()?
    } else {
        NaiveDate::parse_from_str(value, &format)
            .ok()?
            .and_hms_opt(0, 0, 0)?
    };
    Some(dt.and_utc().timestamp_micros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_partial_timestamp;

    fn ts(s: &str) -> i64 {
        parse_partial_timestamp(s).unwrap().floor
    }

    #[test]
    fn test_translate_pattern() {
        assert_eq!(translate_pattern("yyyy-MM-dd").as_deref(), Some("%Y-%m-%d"));
        assert_eq!(
            translate_pattern("yyyy-MM-dd HH:mm:ss.SSS").as_deref(),
            Some("%Y-%m-%d %H:%M:%S%.3f")
        );
        assert_eq!(translate_pattern("yyyy-MM-ddTHH"), None);
        assert_eq!(translate_pattern("yy-MM-dd"), None);
    }

    #[test]
    fn test_parse_with_pattern() {
        assert_eq!(
            parse_with_pattern("2015-02-23", "yyyy-MM-dd"),
            Some(ts("2015-02-23"))
        );
        assert_eq!(
            parse_with_pattern("23/02/2015 10:15:30", "dd/MM/yyyy HH:mm:ss"),
            Some(ts("2015-02-23T10:15:30"))
        );
        assert_eq!(
            parse_with_pattern("2015-02-23 10:15:30.250", "yyyy-MM-dd HH:mm:ss.SSS"),
            Some(ts("2015-02-23T10:15:30.250"))
        );
        assert_eq!(parse_with_pattern("2015-13-01", "yyyy-MM-dd"), None);
        assert_eq!(parse_with_pattern("garbage", "yyyy-MM-dd"), None);
    }
}

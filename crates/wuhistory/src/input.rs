//! Interactive acquisition of the URL template and date range. Validation
//! failures re-prompt locally and never propagate.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the usable prefix of a history URL, up to the literal `date`
/// path segment; anything after it is discarded.
static TEMPLATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https://www\.wunderground\.com/history/daily/.+?/date)")
        .expect("template pattern must compile")
});

pub fn strip_after_date(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    match TEMPLATE_PATTERN.captures(trimmed) {
        Some(captures) => captures[1].to_string(),
        None => trimmed.to_string(),
    }
}

pub fn validate_url(url: &str) -> bool {
    url.starts_with("https://www.wunderground.com/")
        && ["history", "daily", "date"].iter().all(|part| url.contains(part))
}

pub fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
}

pub fn prompt_url(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<String> {
    loop {
        write!(
            output,
            "Enter the Weather Underground URL (e.g. https://www.wunderground.com/history/daily/country/state/city/station/date/): "
        )?;
        output.flush()?;

        let template = strip_after_date(&read_line(input)?);
        if validate_url(&template) {
            return Ok(template);
        }
        writeln!(
            output,
            "The URL provided does not match the expected format. Please check and try again."
        )?;
    }
}

pub fn prompt_date(
    label: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<NaiveDate> {
    loop {
        write!(output, "Enter the {label} date (YYYY-MM-DD): ")?;
        output.flush()?;

        match parse_date(&read_line(input)?) {
            Ok(date) => return Ok(date),
            Err(_) => writeln!(
                output,
                "Invalid date format. Please enter the date as YYYY-MM-DD."
            )?,
        }
    }
}

fn read_line(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before a valid value was entered",
        ));
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn strips_everything_after_the_date_segment() {
        let url = "https://www.wunderground.com/history/daily/us/ny/new-york/KLGA/date/2024-1-2";
        assert_eq!(
            strip_after_date(url),
            "https://www.wunderground.com/history/daily/us/ny/new-york/KLGA/date"
        );
    }

    #[test]
    fn trims_whitespace_and_trailing_slashes() {
        let url = " https://www.wunderground.com/history/daily/us/ny/new-york/KLGA/date/ \n";
        assert_eq!(
            strip_after_date(url),
            "https://www.wunderground.com/history/daily/us/ny/new-york/KLGA/date"
        );
    }

    #[test]
    fn leaves_unmatched_urls_untouched() {
        assert_eq!(strip_after_date("https://example.com/"), "https://example.com");
    }

    #[test]
    fn rejects_urls_from_other_origins() {
        assert!(!validate_url("https://example.com/history/daily/x/date"));
    }

    #[test]
    fn rejects_urls_missing_required_segments() {
        assert!(!validate_url("https://www.wunderground.com/hourly/daily/x/date"));
        assert!(!validate_url("https://www.wunderground.com/history/daily/x"));
    }

    #[test]
    fn accepts_well_formed_templates() {
        assert!(validate_url(
            "https://www.wunderground.com/history/daily/us/ny/new-york/KLGA/date"
        ));
    }

    #[test]
    fn parses_iso_dates_and_rejects_garbage() {
        assert_eq!(
            parse_date("2024-01-02").expect("date should parse"),
            NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date")
        );
        assert!(parse_date("01/02/2024").is_err());
    }

    #[test]
    fn url_prompt_retries_until_valid() {
        let mut input = Cursor::new(
            "https://example.com/nope\nhttps://www.wunderground.com/history/daily/us/ny/new-york/KLGA/date/\n",
        );
        let mut output = Vec::new();
        let template = prompt_url(&mut input, &mut output).expect("prompt failed");
        assert_eq!(
            template,
            "https://www.wunderground.com/history/daily/us/ny/new-york/KLGA/date"
        );
        let transcript = String::from_utf8(output).expect("prompt output not utf8");
        assert!(transcript.contains("does not match the expected format"));
    }

    #[test]
    fn date_prompt_retries_until_valid() {
        let mut input = Cursor::new("yesterday\n2024-01-02\n");
        let mut output = Vec::new();
        let date = prompt_date("start", &mut input, &mut output).expect("prompt failed");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"));
    }

    #[test]
    fn exhausted_input_surfaces_an_error() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(prompt_date("start", &mut input, &mut output).is_err());
    }
}

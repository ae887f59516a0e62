use chrono::NaiveDate;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

pub const PHONE_COUNTRY_CODE: &str = "+91";
const PHONE_DIGITS: usize = 10;

const MONTH_NAME_FORMATS: [&str; 8] = [
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

fn numeric_date_re() -> &'static Regex {
    static NUMERIC_DATE_RE: OnceLock<Regex> = OnceLock::new();
    NUMERIC_DATE_RE.get_or_init(|| {
        // Optional trailing time portion is ignored
        Regex::new(r"^(\d{1,4})[-/.](\d{1,2})[-/.](\d{1,4})(?:[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?$")
            .expect("valid numeric date regex")
    })
}

/// Trimmed text, or `None` when the value is absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Keep the trailing ten subscriber digits and prefix the country code.
/// Fewer than ten digits cannot be recovered.
pub fn standardize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < PHONE_DIGITS {
        return None;
    }

    let subscriber = &digits[digits.len() - PHONE_DIGITS..];
    Some(format!("{}-{}", PHONE_COUNTRY_CODE, subscriber))
}

pub fn standardize_category(raw: Option<&str>) -> Option<String> {
    let folded = raw?.trim().to_lowercase();
    if folded.is_empty() {
        return None;
    }

    let canonical = match folded.as_str() {
        "electronics" => "Electronics".to_string(),
        "fashion" => "Fashion".to_string(),
        "groceries" => "Groceries".to_string(),
        _ => title_case(&folded),
    };

    Some(canonical)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;

    for c in input.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

/// Trim, lower-case, then upper-case only the first character.
pub fn standardize_status(raw: Option<&str>) -> Option<String> {
    let lowered = raw?.trim().to_lowercase();
    let mut chars = lowered.chars();
    let first = chars.next()?;

    let mut out: String = first.to_uppercase().collect();
    out.push_str(chars.as_str());
    Some(out)
}

/// Parse mixed-format dates. Ambiguous numeric dates are read day-first;
/// month-first is only used when day-first cannot form a valid date.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(captures) = numeric_date_re().captures(trimmed) {
        let first = captures.get(1)?.as_str();
        let second: u32 = captures.get(2)?.as_str().parse().ok()?;
        let third = captures.get(3)?.as_str();

        if first.len() == 4 {
            let year: i32 = first.parse().ok()?;
            let last: u32 = third.parse().ok()?;
            return NaiveDate::from_ymd_opt(year, second, last)
                .or_else(|| NaiveDate::from_ymd_opt(year, last, second));
        }

        let year = expand_year(third)?;
        let leading: u32 = first.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, second, leading)
            .or_else(|| NaiveDate::from_ymd_opt(year, leading, second));
    }

    MONTH_NAME_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn expand_year(text: &str) -> Option<i32> {
    let value: i32 = text.parse().ok()?;
    match text.len() {
        4 => Some(value),
        1 | 2 if value < 69 => Some(2000 + value),
        1 | 2 => Some(1900 + value),
        _ => None,
    }
}

/// Coerce money text such as "$1,299.50" to a number.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('$', "").replace(',', "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }

    f64::from_str(trimmed).ok().filter(|v| v.is_finite())
}

/// Integer text, or a float with no fractional part ("3.0").
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = i64::from_str(trimmed) {
        return Some(value);
    }

    let value = f64::from_str(trimmed).ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_phone_standardization() {
        assert_eq!(standardize_phone("9876543210"), Some("+91-9876543210".to_string()));
        assert_eq!(standardize_phone("+91 98765-43210"), Some("+91-9876543210".to_string()));
        assert_eq!(standardize_phone("(0)91-98765 43210"), Some("+91-9876543210".to_string()));
        assert_eq!(standardize_phone("098765432101"), Some("+91-8765432101".to_string()));

        assert_eq!(standardize_phone("12345"), None);
        assert_eq!(standardize_phone("987-654-321"), None);
        assert_eq!(standardize_phone(""), None);
        assert_eq!(standardize_phone("not a phone"), None);
    }

    #[test]
    fn test_category_synonyms() {
        assert_eq!(standardize_category(Some("electronics")), Some("Electronics".to_string()));
        assert_eq!(standardize_category(Some("  ELECTRONICS ")), Some("Electronics".to_string()));
        assert_eq!(standardize_category(Some("Fashion")), Some("Fashion".to_string()));
        assert_eq!(standardize_category(Some("GROCERIES")), Some("Groceries".to_string()));
    }

    #[test]
    fn test_category_fallback_and_nulls() {
        assert_eq!(standardize_category(Some("home decor")), Some("Home Decor".to_string()));
        assert_eq!(standardize_category(Some(" SPORTS ")), Some("Sports".to_string()));
        assert_eq!(standardize_category(Some("home & kitchen")), Some("Home & Kitchen".to_string()));
        assert_eq!(standardize_category(None), None);
        assert_eq!(standardize_category(Some("   ")), None);
    }

    #[test]
    fn test_status_capitalization() {
        assert_eq!(standardize_status(Some(" COMPLETED ")), Some("Completed".to_string()));
        assert_eq!(standardize_status(Some("pending")), Some("Pending".to_string()));
        assert_eq!(standardize_status(Some("on HOLD")), Some("On hold".to_string()));
        assert_eq!(standardize_status(Some("")), None);
        assert_eq!(standardize_status(None), None);
    }

    #[test]
    fn test_iso_and_day_first_dates() {
        assert_eq!(normalize_date("2024-01-15"), date(2024, 1, 15));
        assert_eq!(normalize_date("2024/01/15"), date(2024, 1, 15));
        assert_eq!(normalize_date("2024-01-15 10:30:00"), date(2024, 1, 15));
        assert_eq!(normalize_date("15/01/2024"), date(2024, 1, 15));
        assert_eq!(normalize_date("05-02-2024"), date(2024, 2, 5));
        assert_eq!(normalize_date("15/01/24"), date(2024, 1, 15));
    }

    #[test]
    fn test_month_first_fallback() {
        assert_eq!(normalize_date("01-22-2024"), date(2024, 1, 22));
        assert_eq!(normalize_date("03-25-2024"), date(2024, 3, 25));
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(normalize_date("15 Jan 2024"), date(2024, 1, 15));
        assert_eq!(normalize_date("Jan 15, 2024"), date(2024, 1, 15));
        assert_eq!(normalize_date("January 15 2024"), date(2024, 1, 15));
        assert_eq!(normalize_date("15-Jan-2024"), date(2024, 1, 15));
    }

    #[test]
    fn test_unparsable_dates() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("not a date"), None);
        assert_eq!(normalize_date("32/13/2024"), None);
        assert_eq!(normalize_date("2024-02-30"), None);
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(parse_decimal("$1,299.50"), Some(1299.5));
        assert_eq!(parse_decimal(" 100 "), Some(100.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);

        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity("3.0"), Some(3));
        assert_eq!(parse_quantity("2.5"), None);
        assert_eq!(parse_quantity("two"), None);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(2.0 * 100.0), 200.0);
        assert_eq!(round2(3.0 * 19.999), 60.0);
        assert_eq!(round2(1.0 / 3.0), 0.33);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}

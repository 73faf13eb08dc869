use chrono::NaiveDate;

// Bill dates travel as plain ISO dates, e.g. "2023-10-10"
const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, WIRE_DATE_FORMAT)
}

pub fn display_date(date: &NaiveDate) -> String {
    date.format("%b. %-d, %Y").to_string()
}

pub fn format_date(value: &str) -> Result<String, chrono::ParseError> {
    Ok(display_date(&parse_date(value)?))
}

pub fn format_status(status: &str) -> String {
    match status {
        "pending" => "Pending",
        "accepted" => "Accepted",
        "refused" => "Cancelled",
        _ => "Unknown Status",
    }
    .to_string()
}

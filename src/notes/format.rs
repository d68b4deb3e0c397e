//! Display helpers.

use chrono::NaiveDate;

use super::lifecycle::EMPTY_LABEL;

/// Default width of truncated columns.
pub const DEFAULT_WIDTH: usize = 40;
const ELLIPSIS: char = '…';

/// Cut `text` to `max` characters followed by an ellipsis.
///
/// Text that already fits is returned unchanged; empty text stays empty.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_owned(),
        Some((end, _)) => {
            let mut truncated = String::with_capacity(end + ELLIPSIS.len_utf8());
            truncated.push_str(&text[..end]);
            truncated.push(ELLIPSIS);
            truncated
        },
    }
}

/// Short `dd/mm/yyyy` date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => EMPTY_LABEL.to_owned(),
    }
}

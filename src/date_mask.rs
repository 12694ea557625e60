//! Progressive `YYYY-MM-DD` masking for date fields.
//!
//! Every keystroke hands the field's entire current content to [`mask_date`],
//! which replays it from scratch: non-digits are dropped, at most eight digits
//! are kept, and separators are placed in front of the fifth and seventh
//! digits. A separator is only written once a digit follows it, so the mask
//! never ends in `-` and a backspace always removes something visible.
//!
//! Incomplete input is never an error. Only a complete date that does not
//! exist on the calendar is flagged.

use chrono::NaiveDate;
use thiserror::Error;

/// Length of a complete `YYYY-MM-DD` value.
pub const FULL_LEN: usize = 10;

const SEPARATOR: char = '-';

/// Why a complete date was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateMaskError {
    #[error("Month must be between 01 and 12")]
    InvalidMonth,
    #[error("That day does not exist in this month")]
    InvalidDay,
}

/// Result of masking one edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaskedDate {
    pub value: String,
    pub error: Option<DateMaskError>,
}

/// Position of the masker within `YYYY-MM-DD`, counted in digits consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Year(u8),
    MonthStart,
    MonthSecond,
    DayStart,
    DaySecond,
    Complete,
}

impl State {
    /// Accept one digit: the next state, plus the separator that has to be
    /// written before the digit. `None` once the date is full.
    fn step(self) -> Option<(State, Option<char>)> {
        match self {
            State::Year(3) => Some((State::MonthStart, None)),
            State::Year(n) => Some((State::Year(n + 1), None)),
            State::MonthStart => Some((State::MonthSecond, Some(SEPARATOR))),
            State::MonthSecond => Some((State::DayStart, None)),
            State::DayStart => Some((State::DaySecond, Some(SEPARATOR))),
            State::DaySecond => Some((State::Complete, None)),
            State::Complete => None,
        }
    }
}

/// Re-mask the full raw content of a date field.
pub fn mask_date(raw: &str) -> MaskedDate {
    let mut value = String::with_capacity(FULL_LEN);
    let mut state = State::Year(0);

    for digit in raw.chars().filter(char::is_ascii_digit) {
        let Some((next, separator)) = state.step() else {
            break;
        };
        if let Some(separator) = separator {
            value.push(separator);
        }
        value.push(digit);
        state = next;
    }

    let error = match state {
        State::Complete => calendar_error(&value),
        _ => None,
    };
    MaskedDate { value, error }
}

/// True only for a complete `YYYY-MM-DD` string naming a real day. This is the
/// final gate before a date field is persisted.
pub fn is_full_valid(value: &str) -> bool {
    value.len() == FULL_LEN
        && value.bytes().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => byte == SEPARATOR as u8,
            _ => byte.is_ascii_digit(),
        })
        && calendar_error(value).is_none()
}

/// The digits of a (possibly masked) value.
pub fn strip_mask(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Calendar check for a value already in `YYYY-MM-DD` shape.
fn calendar_error(value: &str) -> Option<DateMaskError> {
    let field = |range: std::ops::Range<usize>| {
        value
            .get(range)
            .and_then(|digits| digits.parse::<u32>().ok())
    };
    let (Some(year), Some(month), Some(day)) = (field(0..4), field(5..7), field(8..10)) else {
        return Some(DateMaskError::InvalidDay);
    };

    if !(1..=12).contains(&month) {
        return Some(DateMaskError::InvalidMonth);
    }
    // Four digits at most.
    match NaiveDate::from_ymd_opt(year as i32, month, day) {
        Some(_) => None,
        None => Some(DateMaskError::InvalidDay),
    }
}

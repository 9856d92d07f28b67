//! Вспомогательные функции разбора банковских сумм и дат.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Разбирает сумму со знаком по индикатору дебет/кредит.
///
/// Индикатор состоит из 1-2 символов: `D`/`C` или `RD`/`RC`, где префикс `R`
/// означает сторнирование (знак меняется ещё раз). Дебет даёт отрицательную
/// сумму. Разделителем дробной части служит запятая. Результат округляется
/// до 2 знаков (половина - от нуля).
pub fn parse_amount(sign_mark: &str, raw: &str) -> Result<Decimal> {
    let mut chars = sign_mark.chars();
    let (reversal, dc) = match sign_mark.len() {
        1 => (None, chars.next()),
        2 => (chars.next(), chars.next()),
        _ => return Err(Error::InvalidSignMark(sign_mark.to_string())),
    };

    if let Some(rev) = reversal {
        if rev != 'R' {
            return Err(Error::InvalidSignMark(sign_mark.to_string()));
        }
    }
    let dc = match dc {
        Some(c @ ('D' | 'C')) => c,
        _ => return Err(Error::InvalidSignMark(sign_mark.to_string())),
    };

    let mut amount = parse_decimal(raw)?;
    if amount.is_sign_negative() {
        return Err(Error::InvalidAmount(raw.to_string()));
    }

    if dc == 'D' {
        amount = -amount;
    }
    if reversal.is_some() {
        amount = -amount;
    }

    Ok(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Разбирает десятичную сумму без знака: запятая заменяется точкой.
pub fn parse_decimal(raw: &str) -> Result<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    let normalized = normalized.strip_suffix('.').unwrap_or(&normalized);
    Decimal::from_str(normalized).map_err(|_| Error::InvalidAmount(raw.to_string()))
}

/// Разбирает календарную дату с 2-значным годом (20xx подразумевается).
pub fn parse_date(year: u32, month: u32, day: u32) -> Result<NaiveDate> {
    let full_year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(full_year as i32, month, day)
        .ok_or_else(|| Error::InvalidDate(format!("{:02}-{:02}-{:02}", year, month, day)))
}

/// Разбирает дату из 6 цифр формата ГГММДД.
pub fn parse_compact_date(raw: &str) -> Result<NaiveDate> {
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(raw.to_string()));
    }
    let year = parse_digits(&raw[0..2])?;
    let month = parse_digits(&raw[2..4])?;
    let day = parse_digits(&raw[4..6])?;
    parse_date(year, month, day)
}

/// Собирает абсолютную временную метку из даты ГГММДД, времени ЧЧММ
/// и смещения UTC вида `+ЧЧММ`/`-ЧЧММ`.
pub fn parse_offset_datetime(date6: &str, time4: &str, offset: &str) -> Result<DateTime<FixedOffset>> {
    let date = parse_compact_date(date6)?;

    if time4.len() != 4 {
        return Err(Error::InvalidDate(time4.to_string()));
    }
    let hour = parse_digits(&time4[0..2])?;
    let minute = parse_digits(&time4[2..4])?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| Error::InvalidDate(time4.to_string()))?;

    let sign = match offset.chars().next() {
        Some('+') => 1i32,
        Some('-') => -1i32,
        _ => return Err(Error::InvalidDate(offset.to_string())),
    };
    let digits = &offset[1..];
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(offset.to_string()));
    }
    let offset_hours = parse_digits(&digits[0..2])? as i32;
    let offset_minutes = parse_digits(&digits[2..4])? as i32;
    let seconds = sign * (offset_hours * 3600 + offset_minutes * 60);
    let tz = FixedOffset::east_opt(seconds)
        .ok_or_else(|| Error::InvalidDate(offset.to_string()))?;

    date.and_time(time)
        .and_local_timezone(tz)
        .single()
        .ok_or_else(|| Error::InvalidDate(format!("{}{}{}", date6, time4, offset)))
}

fn parse_digits(raw: &str) -> Result<u32> {
    raw.parse()
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}

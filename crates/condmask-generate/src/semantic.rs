use chrono::{NaiveDate, TimeDelta, Utc};
use rand::Rng;

use crate::errors::GenerationError;

/// US social security number `AAA-GG-SSSS`. Area 000, 666 and 900-999 are
/// never issued, nor are group 00 and serial 0000.
pub fn ssn_us<R: Rng + ?Sized>(rng: &mut R) -> String {
    let area = loop {
        let candidate = rng.random_range(1..=899);
        if candidate != 666 {
            break candidate;
        }
    };
    let group = rng.random_range(1..=99);
    let serial = rng.random_range(1..=9999);
    format!("{area:03}-{group:02}-{serial:04}")
}

/// Brazilian CPF `000.000.000-00` with valid check digits.
pub fn cpf<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = [0_u8; 11];
    for digit in digits.iter_mut().take(9) {
        *digit = rng.random_range(0..=9);
    }
    digits[9] = cpf_check_digit(&digits[..9]);
    digits[10] = cpf_check_digit(&digits[..10]);

    let text: String = digits.iter().map(|d| char::from(b'0' + *d)).collect();
    format!(
        "{}.{}.{}-{}",
        &text[0..3],
        &text[3..6],
        &text[6..9],
        &text[9..11]
    )
}

pub(crate) fn cpf_check_digit(digits: &[u8]) -> u8 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(idx, digit)| u32::from(*digit) * (weight_start - idx as u32))
        .sum();
    let rem = sum % 11;
    if rem < 2 { 0 } else { (11 - rem) as u8 }
}

/// Calendar date `YYYY-MM-DD` between 1970-01-01 and today.
pub fn date<R: Rng + ?Sized>(rng: &mut R) -> Result<String, GenerationError> {
    let failed = |message: &str| GenerationError::Failed {
        category: "date".to_string(),
        message: message.to_string(),
    };
    let start = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| failed("invalid start date"))?;
    let today = Utc::now().date_naive();
    let span = (today - start).num_days().max(0);
    let offset = rng.random_range(0..=span);
    let value = start
        .checked_add_signed(TimeDelta::days(offset))
        .ok_or_else(|| failed("date out of range"))?;
    Ok(value.format("%Y-%m-%d").to_string())
}

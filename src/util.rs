use chrono::NaiveDate;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{map_res, opt, recognize},
    error::{Error, ErrorKind},
    sequence::{pair, preceded, tuple},
    IResult,
};
use rust_decimal::Decimal;

/// Unsigned decimal without exponent or separators: `42`, `42.5`, `1800.00`
pub fn plain_decimal(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(preceded(char('.'), digit1))))(input)
}

/// Calendar date as `year-month-day`, with `-` or `/` and optional zero padding
pub fn date(input: &str) -> IResult<&str, NaiveDate> {
    let (rest, (year, _, month, _, day)) = tuple((
        map_res(digit1, str::parse),
        alt((tag("-"), tag("/"))),
        map_res(digit1, str::parse),
        alt((tag("-"), tag("/"))),
        map_res(digit1, str::parse),
    ))(input)?;
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Ok((rest, date)),
        None => Err(nom::Err::Error(Error::new(input, ErrorKind::Verify))),
    }
}

/// Two-decimal rendering with comma thousands separators, e.g. `1,869.99`
pub fn group_thousands(value: Decimal) -> String {
    let fixed = format!("{:.2}", value.abs().round_dp(2));
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(fixed.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac}")
}

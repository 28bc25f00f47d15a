use std::borrow::Cow;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::constants::{
    EMPTY_NAME_ERROR, INVALID_COLOR_ERROR, INVALID_PRICE_ERROR, MAX_PRICE, PRICE_TOO_LARGE_ERROR,
};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex color pattern is valid"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_item_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error("empty_name", EMPTY_NAME_ERROR));
    }
    Ok(())
}

pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(error("invalid_price", INVALID_PRICE_ERROR));
    }
    if *price > Decimal::from(MAX_PRICE) {
        return Err(error("price_too_large", PRICE_TOO_LARGE_ERROR));
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if !HEX_COLOR.is_match(color) {
        return Err(error("invalid_color", INVALID_COLOR_ERROR));
    }
    Ok(())
}

/// Parses user-typed price text. Non-numeric and non-positive input is rejected.
pub fn parse_price(input: &str) -> Result<Decimal, ValidationError> {
    let price = Decimal::from_str(input.trim())
        .map_err(|_| error("invalid_price", INVALID_PRICE_ERROR))?;
    validate_price(&price)?;
    Ok(price.normalize())
}

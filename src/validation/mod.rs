use bigdecimal::BigDecimal;
use std::fmt;
use std::str::FromStr;

pub const NAME_MAX_LEN: usize = 120;
pub const CODE_MAX_LEN: usize = 16;
pub const SKU_MAX_LEN: usize = 40;
pub const PHONE_MAX_LEN: usize = 20;
pub const EMAIL_MAX_LEN: usize = 254;
pub const NOTES_MAX_LEN: usize = 500;
pub const REASON_MAX_LEN: usize = 255;
pub const REFERENCE_MAX_LEN: usize = 64;
pub const AMOUNT_INPUT_MAX_LEN: usize = 64;

pub const ALLOWED_ORDER_TYPES: &[&str] = &[
    "QUOTATION",
    "IMMEDIATE_SALE",
    "FUTURE_COLLECTION",
    "LAYAWAY",
];
pub const ALLOWED_PAYMENT_METHODS: &[&str] =
    &["CASH", "CARD", "BANK_TRANSFER", "MOBILE_MONEY", "MIXED"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

/// Parses a form-submitted amount string into a decimal. Amounts cross the
/// boundary as strings so no float rounding ever touches money.
pub fn parse_amount(field: &'static str, value: &str) -> Result<BigDecimal, ValidationError> {
    let value = sanitize_string(value);
    validate_required(field, &value)?;
    validate_max_len(field, &value, AMOUNT_INPUT_MAX_LEN)?;

    BigDecimal::from_str(&value)
        .map_err(|_| ValidationError::new(field, "must be a decimal number"))
}

pub fn validate_positive_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_within_balance(
    field: &'static str,
    amount: &BigDecimal,
    balance: &BigDecimal,
) -> ValidationResult {
    if amount > balance {
        return Err(ValidationError::new(
            field,
            "must not exceed the outstanding balance",
        ));
    }

    Ok(())
}

pub fn validate_phone(field: &'static str, value: &str) -> ValidationResult {
    let value = sanitize_string(value);
    validate_required(field, &value)?;
    validate_max_len(field, &value, PHONE_MAX_LEN)?;

    if !value
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | ' ' | '(' | ')'))
    {
        return Err(ValidationError::new(
            field,
            "must contain only digits, spaces and + - ( )",
        ));
    }

    if value.chars().filter(|ch| ch.is_ascii_digit()).count() < 7 {
        return Err(ValidationError::new(field, "must contain at least 7 digits"));
    }

    Ok(())
}

pub fn validate_email(field: &'static str, value: &str) -> ValidationResult {
    let value = sanitize_string(value);
    validate_required(field, &value)?;
    validate_max_len(field, &value, EMAIL_MAX_LEN)?;

    let Some((local, domain)) = value.split_once('@') else {
        return Err(ValidationError::new(field, "must be a valid email address"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::new(field, "must be a valid email address"));
    }

    Ok(())
}

pub fn validate_positive_quantity(field: &'static str, quantity: i64) -> ValidationResult {
    if quantity <= 0 {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_nonzero_quantity(field: &'static str, quantity: i64) -> ValidationResult {
    if quantity == 0 {
        return Err(ValidationError::new(field, "must not be zero"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn validates_enum_values() {
        assert!(validate_enum("orderType", "LAYAWAY", ALLOWED_ORDER_TYPES).is_ok());
        assert!(validate_enum("orderType", "SUBSCRIPTION", ALLOWED_ORDER_TYPES).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn parses_amount_input() {
        assert_eq!(
            parse_amount("amount", " 12.50 ").expect("valid decimal"),
            BigDecimal::from_str("12.50").expect("valid decimal")
        );
        assert!(parse_amount("amount", "").is_err());
        assert!(parse_amount("amount", "12,50").is_err());
        assert!(parse_amount("amount", "abc").is_err());
    }

    #[test]
    fn validates_positive_amount() {
        let positive = BigDecimal::from_str("1.23").expect("valid decimal");
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-1);

        assert!(validate_positive_amount("amount", &positive).is_ok());
        assert!(validate_positive_amount("amount", &zero).is_err());
        assert!(validate_positive_amount("amount", &negative).is_err());
    }

    #[test]
    fn validates_within_balance() {
        let balance = BigDecimal::from_str("100.00").expect("valid decimal");
        let under = BigDecimal::from_str("99.99").expect("valid decimal");
        let exact = BigDecimal::from_str("100.00").expect("valid decimal");
        let over = BigDecimal::from_str("100.01").expect("valid decimal");

        assert!(validate_within_balance("amount", &under, &balance).is_ok());
        assert!(validate_within_balance("amount", &exact, &balance).is_ok());
        assert!(validate_within_balance("amount", &over, &balance).is_err());
    }

    #[test]
    fn validates_phone() {
        assert!(validate_phone("phone", "+254 712 345 678").is_ok());
        assert!(validate_phone("phone", "(020) 123-4567").is_ok());
        assert!(validate_phone("phone", "12345").is_err());
        assert!(validate_phone("phone", "call me").is_err());
        assert!(validate_phone("phone", "").is_err());
    }

    #[test]
    fn validates_email() {
        assert!(validate_email("email", "jane@example.com").is_ok());
        assert!(validate_email("email", "jane@@").is_err());
        assert!(validate_email("email", "jane@localhost").is_err());
        assert!(validate_email("email", "no-at-sign").is_err());
    }

    #[test]
    fn validates_quantities() {
        assert!(validate_positive_quantity("quantity", 3).is_ok());
        assert!(validate_positive_quantity("quantity", 0).is_err());
        assert!(validate_nonzero_quantity("quantityDelta", -3).is_ok());
        assert!(validate_nonzero_quantity("quantityDelta", 0).is_err());
    }
}

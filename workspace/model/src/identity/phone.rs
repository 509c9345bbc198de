use std::fmt;
use std::str::FromStr;

use crate::error::AcademyError;

/// A phone number in the `+998XXXXXXXXX` form used as the login identifier.
///
/// # Example
///
/// ```
/// use model::identity::PhoneNumber;
///
/// let phone: PhoneNumber = "+998901234567".parse().unwrap();
/// assert_eq!(phone.as_str(), "+998901234567");
///
/// assert!("998901234567".parse::<PhoneNumber>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Country prefix every number must start with.
    pub const PREFIX: &'static str = "+998";
    /// Number of digits after the prefix.
    pub const SUBSCRIBER_DIGITS: usize = 9;

    /// Validates `phone` against `^\+998\d{9}$`.
    ///
    /// No normalisation is applied: spaces, dashes and a missing `+` are
    /// all rejected, so the stored value always equals the input.
    pub fn parse(phone: &str) -> Result<Self, AcademyError> {
        if phone.is_empty() {
            return Err(AcademyError::MissingPhone);
        }

        let valid = phone
            .strip_prefix(Self::PREFIX)
            .is_some_and(|rest| {
                rest.len() == Self::SUBSCRIBER_DIGITS && rest.bytes().all(|b| b.is_ascii_digit())
            });

        if !valid {
            return Err(AcademyError::InvalidPhone(phone.to_string()));
        }

        Ok(Self(phone.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for PhoneNumber {
    type Err = AcademyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_numbers() {
        for raw in ["+998901234567", "+998000000000", "+998999999999"] {
            let phone = PhoneNumber::parse(raw).unwrap();
            assert_eq!(phone.as_str(), raw);
        }
    }

    #[test]
    fn test_rejects_missing_plus() {
        let err = PhoneNumber::parse("998901234567").unwrap_err();
        assert!(matches!(err, AcademyError::InvalidPhone(ref p) if p == "998901234567"));
    }

    #[test]
    fn test_rejects_wrong_digit_count() {
        assert!(PhoneNumber::parse("+99890123456").is_err());
        assert!(PhoneNumber::parse("+9989012345678").is_err());
    }

    #[test]
    fn test_rejects_other_country_codes_and_formatting() {
        for raw in [
            "+79012345678",
            "+997901234567",
            "+998 90 123 45 67",
            "+998-90-1234567",
            "+99890123456a",
            "+998９01234567",
        ] {
            assert!(PhoneNumber::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_empty_is_missing_not_invalid() {
        assert!(matches!(PhoneNumber::parse(""), Err(AcademyError::MissingPhone)));
    }
}

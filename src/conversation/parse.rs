//! Message parsing for the scripted stages
//!
//! Every parser returns an explicit result; the caller decides whether
//! to re-prompt.

use thiserror::Error;

const RESET_PHRASES: &[&str] = &["reset", "start again"];
const NAME_PHRASE: &str = "my name is";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("not a loan amount: {0:?}")]
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycCredentials {
    pub pan: String,
    pub phone: String,
}

pub fn is_reset(message: &str) -> bool {
    let lower = message.to_lowercase();
    RESET_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Name given after "my name is", with surrounding punctuation dropped.
pub fn extract_name(message: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with the original text.
    let lower = message.to_ascii_lowercase();
    let start = lower.find(NAME_PHRASE)? + NAME_PHRASE.len();

    let name = message[start..]
        .trim()
        .trim_matches(|c: char| matches!(c, '.' | '!' | ',' | ':' | ';'))
        .trim();

    (!name.is_empty()).then(|| name.to_string())
}

/// Whether the message looks like an attempt to share KYC details.
pub fn mentions_kyc(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("pan") && lower.contains("phone")
}

/// Parse `PAN: <value>, Phone: <value>`.
pub fn parse_kyc_details(message: &str) -> Result<KycCredentials, ParseError> {
    let mut pan = None;
    let mut phone = None;

    for segment in message.split(',') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if key.contains("pan") {
            pan.get_or_insert_with(|| value.to_string());
        } else if key.contains("phone") {
            phone.get_or_insert_with(|| value.to_string());
        }
    }

    Ok(KycCredentials {
        pan: pan.ok_or(ParseError::MissingField("PAN"))?,
        phone: phone.ok_or(ParseError::MissingField("phone"))?,
    })
}

/// Whole-unit amount; thousands separators are ignored.
pub fn parse_amount(message: &str) -> Result<u64, ParseError> {
    let cleaned: String = message.trim().chars().filter(|c| *c != ',').collect();

    match cleaned.parse::<u64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(ParseError::InvalidAmount(message.trim().to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

pub fn parse_confirmation(message: &str) -> Option<Confirmation> {
    let word = message
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    match word.as_str() {
        "yes" => Some(Confirmation::Yes),
        "no" => Some(Confirmation::No),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_phrases() {
        assert!(is_reset("Reset"));
        assert!(is_reset("can we START AGAIN please"));
        assert!(!is_reset("my name is Asha"));
    }

    #[test]
    fn test_extract_name_takes_text_after_phrase() {
        assert_eq!(extract_name("Hi, my name is Krishna Iyer."), Some("Krishna Iyer".into()));
        assert_eq!(extract_name("MY NAME IS Asha"), Some("Asha".into()));
        assert_eq!(extract_name("my name is   "), None);
        assert_eq!(extract_name("hello there"), None);
    }

    #[test]
    fn test_extract_name_handles_non_ascii_names() {
        assert_eq!(extract_name("my name is Zoë Müller"), Some("Zoë Müller".into()));
    }

    #[test]
    fn test_kyc_details_parse() {
        let creds = parse_kyc_details("PAN: ABCDE1234F, Phone: 9876543210").unwrap();
        assert_eq!(creds.pan, "ABCDE1234F");
        assert_eq!(creds.phone, "9876543210");

        let creds = parse_kyc_details("phone:9876543210 , pan : abcde1234f").unwrap();
        assert_eq!(creds.pan, "abcde1234f");
    }

    #[test]
    fn test_kyc_details_missing_values() {
        assert_eq!(
            parse_kyc_details("my pan is ABCDE1234F and phone 98765"),
            Err(ParseError::MissingField("PAN"))
        );
        assert_eq!(
            parse_kyc_details("PAN: ABCDE1234F, Phone:"),
            Err(ParseError::MissingField("phone"))
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("300000"), Ok(300_000));
        assert_eq!(parse_amount(" 3,00,000 "), Ok(300_000));
        assert_eq!(parse_amount("1,500,000"), Ok(1_500_000));
        assert!(parse_amount("three lakh").is_err());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5000").is_err());
    }

    #[test]
    fn test_confirmation() {
        assert_eq!(parse_confirmation("yes"), Some(Confirmation::Yes));
        assert_eq!(parse_confirmation(" Yes! "), Some(Confirmation::Yes));
        assert_eq!(parse_confirmation("NO"), Some(Confirmation::No));
        assert_eq!(parse_confirmation("yes please"), None);
        assert_eq!(parse_confirmation("maybe"), None);
    }
}

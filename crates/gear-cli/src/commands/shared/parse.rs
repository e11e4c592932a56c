use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an optional enum argument.
pub fn parse_opt_enum<T>(raw: Option<&str>, field: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    raw.map(|value| parse_enum(value, field)).transpose()
}

/// Parse a decimal amount argument into cents.
pub fn parse_amount(raw: &str, field: &str) -> anyhow::Result<i64> {
    gear_core::money::parse_cents(raw).map_err(|error| anyhow::anyhow!("invalid {field}: {error}"))
}

#[cfg(test)]
mod tests {
    use gear_core::enums::{DocumentType, LeadStatus};

    use super::{parse_amount, parse_enum, parse_opt_enum};

    #[test]
    fn parses_snake_case_enum() {
        let status: LeadStatus = parse_enum("qualified", "status").expect("status should parse");
        assert_eq!(status, LeadStatus::Qualified);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let kind: DocumentType =
            parse_enum("proof-of-address", "document type").expect("type should parse");
        assert_eq!(kind, DocumentType::ProofOfAddress);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<LeadStatus>("done", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'done'"));
    }

    #[test]
    fn optional_enum_passes_none_through() {
        let none: Option<LeadStatus> = parse_opt_enum(None, "status").expect("none is fine");
        assert!(none.is_none());
    }

    #[test]
    fn amount_errors_name_the_field() {
        assert_eq!(parse_amount("1299.00", "total").expect("amount"), 129_900);
        let err = parse_amount("12,99", "total").expect_err("should fail");
        assert!(err.to_string().starts_with("invalid total"));
    }
}

//! Key-name conversions between the gateway's wire spelling (`first-name`,
//! `first_name`) and the camelCase spelling used in attribute trees.

/// Convert `alpha-beta_gamma` to `alphaBetaGamma`.
///
/// A `-` or `_` followed by a word character is dropped and that character
/// upper-cased. A trailing delimiter is kept.
pub fn delimiter_to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' || c == '_' {
            match chars.peek() {
                Some(&next) if next.is_alphanumeric() || next == '_' => {
                    out.extend(next.to_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert `alpha-beta-gamma` to `alpha_beta_gamma`.
pub fn delimiter_to_underscore(s: &str) -> String {
    s.replace('-', "_")
}

/// Convert `alphaBetaGamma` to `alpha-beta-gamma` using `delimiter`.
pub fn camel_case_to_delimiter(s: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push(delimiter);
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Join `key{separator}value` pairs with `glue`.
///
/// Returns `None` when there are no pairs.
pub fn implode_associative<I, K, V>(pairs: I, separator: &str, glue: &str) -> Option<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: std::fmt::Display,
    V: std::fmt::Display,
{
    let parts: Vec<String> = pairs
        .into_iter()
        .map(|(k, v)| format!("{k}{separator}{v}"))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(glue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_from_dashes_and_underscores() {
        assert_eq!(delimiter_to_camel_case("first-name"), "firstName");
        assert_eq!(delimiter_to_camel_case("first_name"), "firstName");
        assert_eq!(
            delimiter_to_camel_case("api-error-response"),
            "apiErrorResponse"
        );
        assert_eq!(delimiter_to_camel_case("last4"), "last4");
        assert_eq!(delimiter_to_camel_case("trailing-"), "trailing-");
    }

    #[test]
    fn underscore_from_dashes() {
        assert_eq!(delimiter_to_underscore("store-me"), "store_me");
        assert_eq!(delimiter_to_underscore("plain"), "plain");
    }

    #[test]
    fn delimiter_from_camel_case() {
        assert_eq!(camel_case_to_delimiter("firstName", '-'), "first-name");
        assert_eq!(
            camel_case_to_delimiter("verificationMerchantAccountId", '_'),
            "verification_merchant_account_id"
        );
        assert_eq!(camel_case_to_delimiter("store_me", '-'), "store_me");
    }

    #[test]
    fn implode_joins_pairs() {
        let joined = implode_associative([("id", "1"), ("firstName", "Mike")], "=", ", ");
        assert_eq!(joined.as_deref(), Some("id=1, firstName=Mike"));
    }

    #[test]
    fn implode_empty_is_none() {
        let empty: Vec<(&str, &str)> = Vec::new();
        assert_eq!(implode_associative(empty, "=", ", "), None);
    }
}

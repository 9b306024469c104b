use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use validator::ValidationErrors;

lazy_static! {
    /// Regex for validating entry ids derived from names
    /// Must be lowercase alphanumeric with single hyphens between words
    /// - Valid: "hoppscotch", "postman-clone", "k9s"
    /// - Invalid: "-tool", "tool-", "tool--name", "Tool", "tool_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Runs of characters that cannot appear in a slug
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive a URL-safe slug from a display name.
///
/// Lower-cases, collapses every run of non `[a-z0-9]` characters into a
/// single hyphen and trims hyphens from both ends. May return an empty string
/// for names without any ASCII alphanumerics.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// First message per invalid field, keyed by field name
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .collect()
}

/// Flat list of field messages, ordered by field name
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    field_messages(errors).into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 2, message = "Too short."))]
        name: String,
        #[validate(url)]
        link: String,
    }

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("hoppscotch"));
        assert!(SLUG_REGEX.is_match("postman-clone"));
        assert!(SLUG_REGEX.is_match("k9s"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-tool")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("tool-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("tool--name")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Tool")); // uppercase
        assert!(!SLUG_REGEX.is_match("tool_name")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hoppscotch"), "hoppscotch");
        assert_eq!(slugify("Postman Clone"), "postman-clone");
        assert_eq!(slugify("  VS Code (OSS)!  "), "vs-code-oss");
        assert_eq!(slugify("C++ / Rust"), "c-rust");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_output_matches_regex() {
        for name in ["Hoppscotch", "Postman Clone", "--Edge--Case--", "a1 b2 c3"] {
            let slug = slugify(name);
            assert!(SLUG_REGEX.is_match(&slug), "bad slug {:?} for {:?}", slug, name);
        }
    }

    #[test]
    fn test_validation_messages() {
        let sample = Sample {
            name: "a".to_string(),
            link: "nope".to_string(),
        };
        let errors = sample.validate().unwrap_err();

        let fields = field_messages(&errors);
        assert_eq!(fields["name"], "Too short.");
        assert_eq!(fields["link"], "link is invalid");
        assert_eq!(
            validation_messages(&errors),
            vec!["link is invalid", "Too short."]
        );
    }
}

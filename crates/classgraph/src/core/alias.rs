//! Identifier canonicalization
//!
//! PlantUML aliases may only contain letters, digits and underscores, so
//! qualified names like `com.example.Outer.Inner` become
//! `com_example_Outer_Inner`.

/// Character substituted for every separator
pub const ALIAS_SEPARATOR: char = '_';

/// Map a fully-qualified name to a diagram-safe alias
///
/// Every character that is not an ASCII letter, digit or `_` is replaced by
/// [`ALIAS_SEPARATOR`], then leading and trailing separators are trimmed.
pub fn canonical_alias(qualified_name: &str) -> String {
    let replaced: String = qualified_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ALIAS_SEPARATOR {
                c
            } else {
                ALIAS_SEPARATOR
            }
        })
        .collect();
    replaced.trim_matches(ALIAS_SEPARATOR).to_string()
}

/// Alias of the diamond node for a multi-argument generic member type
///
/// The alias is derived from the owner's qualified name, the member name and
/// the fully-qualified type, so it is stable across runs.
pub fn diamond_alias(owner_id: &str, member: &str, qualified_type: &str) -> String {
    canonical_alias(&format!("{}.{}.{}", owner_id, member, qualified_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dots_become_underscores() {
        assert_eq!(canonical_alias("com.example.Outer.Inner"), "com_example_Outer_Inner");
    }

    #[test]
    fn test_trims_separators() {
        assert_eq!(canonical_alias(".Loose."), "Loose");
        assert_eq!(canonical_alias("Root"), "Root");
    }

    #[test]
    fn test_generic_punctuation_is_replaced() {
        assert_eq!(
            canonical_alias("kotlin.Pair<p.Text, p.Text>?"),
            "kotlin_Pair_p_Text__p_Text"
        );
    }

    #[test]
    fn test_diamond_alias_is_deterministic() {
        let a = diamond_alias("p.Box", "pair", "kotlin.Pair<p.Text, p.Text>");
        let b = diamond_alias("p.Box", "pair", "kotlin.Pair<p.Text, p.Text>");
        assert_eq!(a, b);
        assert_eq!(a, "p_Box_pair_kotlin_Pair_p_Text__p_Text");
        assert_ne!(a, diamond_alias("p.Box", "other", "kotlin.Pair<p.Text, p.Text>"));
    }
}

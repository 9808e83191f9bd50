//! `@handle` extraction and matching against a project's people.
//!
//! Matching is a heuristic. A token is tried against handles first, then
//! slugified display names, then email local parts; the first tier with a
//! hit wins. Tokens that match nobody are dropped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use atelier_core::types::id::UserId;
use atelier_entity::user::UserProfile;

static MENTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w@])@([\w][\w.\-]*)").expect("mention pattern is valid")
});

/// Distinct mention tokens in `text`, lowercased, in order of appearance.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    MENTION_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', '-']).to_lowercase())
        .filter(|token| !token.is_empty() && seen.insert(token.clone()))
        .collect()
}

/// Lowercase alphanumerics only: `"Ravi K. Sharma"` becomes `"ravisharma"`.
pub fn slugify(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve the mentions in `text` against `people`.
///
/// Returns each matched user once, in order of first mention.
pub fn resolve_mentions<'a, I>(text: &str, people: I) -> Vec<UserId>
where
    I: IntoIterator<Item = &'a UserProfile>,
{
    let tokens = extract_mentions(text);
    if tokens.is_empty() {
        return Vec::new();
    }
    let people: Vec<&UserProfile> = people.into_iter().collect();

    let mut matched = Vec::new();
    for token in &tokens {
        if let Some(user) = match_token(token, &people) {
            if !matched.contains(&user) {
                matched.push(user);
            }
        }
    }
    matched
}

fn match_token(token: &str, people: &[&UserProfile]) -> Option<UserId> {
    let by_handle = people.iter().find(|p| {
        p.handle
            .as_deref()
            .map(|h| h.trim_start_matches('@'))
            .is_some_and(|h| h.eq_ignore_ascii_case(token))
    });
    if let Some(person) = by_handle {
        return Some(person.id);
    }

    let slug = slugify(token);
    if !slug.is_empty() {
        if let Some(person) = people.iter().find(|p| slugify(&p.display_name) == slug) {
            return Some(person.id);
        }
    }

    people
        .iter()
        .find(|p| {
            p.email_local_part()
                .is_some_and(|local| local.eq_ignore_ascii_case(token))
        })
        .map(|p| p.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, handle: Option<&str>, email: Option<&str>) -> UserProfile {
        UserProfile {
            id: UserId::new(),
            display_name: name.to_string(),
            handle: handle.map(str::to_string),
            email: email.map(str::to_string),
            contact_address: None,
            role: "designer".to_string(),
            designation: None,
        }
    }

    #[test]
    fn test_extract_ignores_emails_and_trailing_punctuation() {
        let tokens = extract_mentions("Thanks @Meera. cc @ravi_k, mail ops@atelier.in or @meera again");
        assert_eq!(tokens, vec!["meera", "ravi_k"]);
    }

    #[test]
    fn test_handle_beats_display_name() {
        let by_name = person("Sam", None, None);
        let by_handle = person("Someone Else", Some("sam"), None);
        let matched = resolve_mentions("@sam please check", [&by_name, &by_handle]);
        assert_eq!(matched, vec![by_handle.id]);
    }

    #[test]
    fn test_display_name_slug_and_email_fallbacks() {
        let ravi = person("Ravi Kumar", None, None);
        let meera = person("M. Iyer", None, Some("meera.iyer@studio.in"));
        let matched = resolve_mentions("@ravi.kumar and @Meera.Iyer", [&ravi, &meera]);
        assert_eq!(matched, vec![ravi.id, meera.id]);
    }

    #[test]
    fn test_unmatched_tokens_are_dropped() {
        let ravi = person("Ravi", Some("ravi"), None);
        assert!(resolve_mentions("@nobody look", [&ravi]).is_empty());
        assert!(resolve_mentions("no mentions here", [&ravi]).is_empty());
    }
}

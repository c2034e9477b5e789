//! Semantic-version ordering over repository tags. Tags that do not parse
//! are skipped; only a malformed user-supplied version is an error.

use std::cmp::Ordering;

use semver::{Version, VersionReq};

use crate::error::{Error, Result};

fn parse_version(s: &str) -> Result<Version> {
    let trimmed = s.strip_prefix(['v', 'V']).unwrap_or(s);
    Ok(Version::parse(trimmed)?)
}

fn parse_tag(tag: &str) -> Option<Version> {
    parse_version(tag).ok()
}

fn parse_constraint(constraint: &str) -> Result<VersionReq> {
    let constraint = if constraint.is_empty() { "*" } else { constraint };
    Ok(VersionReq::parse(constraint)?)
}

fn sorted_tags(tags: &[String]) -> Vec<(Version, &String)> {
    let mut parsed: Vec<(Version, &String)> = tags
        .iter()
        .filter_map(|tag| parse_tag(tag).map(|v| (v, tag)))
        .collect();
    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    parsed
}

/// The highest tag satisfying `constraint`, in its original spelling.
pub fn latest(tags: &[String], constraint: &str) -> Result<String> {
    let req = parse_constraint(constraint)?;
    sorted_tags(tags)
        .iter()
        .rev()
        .find(|(version, _)| req.matches(version))
        .map(|(_, tag)| (*tag).clone())
        .ok_or_else(|| Error::NoMatchingVersion(constraint.to_string()))
}

/// The lowest tag satisfying `constraint` that is strictly greater than
/// `current`.
pub fn next(tags: &[String], constraint: &str, current: &str) -> Result<String> {
    let cur = parse_version(current)?;
    let req = parse_constraint(constraint)?;
    sorted_tags(tags)
        .iter()
        .find(|(version, _)| req.matches(version) && *version > cur)
        .map(|(_, tag)| (*tag).clone())
        .ok_or_else(|| Error::NoMatchingVersion(constraint.to_string()))
}

pub fn compare(v1: &str, v2: &str) -> Result<Ordering> {
    Ok(parse_version(v1)?.cmp(&parse_version(v2)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn latest_picks_the_highest_matching_tag() {
        let got = latest(&tags(&["0.9.0", "1.2.0", "1.10.0", "1.3.0"]), "*").unwrap();
        assert_eq!(got, "1.10.0");
    }

    #[test]
    fn latest_honors_the_constraint() {
        let got = latest(&tags(&["1.0.0", "1.5.0", "2.0.0"]), "^1").unwrap();
        assert_eq!(got, "1.5.0");
    }

    #[test]
    fn latest_keeps_the_original_tag_spelling() {
        let got = latest(&tags(&["v1.0.0", "v2.0.0"]), "*").unwrap();
        assert_eq!(got, "v2.0.0");
    }

    #[test]
    fn latest_skips_invalid_tags() {
        let got = latest(&tags(&["nightly", "1.0.0", "not-a-version"]), "*").unwrap();
        assert_eq!(got, "1.0.0");
    }

    #[test]
    fn latest_fails_on_no_tags() {
        assert!(matches!(
            latest(&[], "*"),
            Err(Error::NoMatchingVersion(_))
        ));
    }

    #[test]
    fn latest_fails_when_only_invalid_tags_exist() {
        assert!(matches!(
            latest(&tags(&["invalid"]), "*"),
            Err(Error::NoMatchingVersion(_))
        ));
    }

    #[test]
    fn latest_single_valid_tag() {
        assert_eq!(latest(&tags(&["1.0.0"]), "*").unwrap(), "1.0.0");
    }

    #[test]
    fn empty_constraint_means_any() {
        assert_eq!(latest(&tags(&["1.0.0", "2.0.0"]), "").unwrap(), "2.0.0");
    }

    #[test]
    fn next_returns_the_first_strictly_greater_tag() {
        let list = tags(&["1.0.0", "1.1.0", "2.0.0"]);
        assert_eq!(next(&list, "*", "1.0.0").unwrap(), "1.1.0");
        assert_eq!(next(&list, "*", "1.1.0").unwrap(), "2.0.0");
    }

    #[test]
    fn next_fails_when_already_at_the_top() {
        assert!(matches!(
            next(&tags(&["1.0.0"]), "*", "1.0.0"),
            Err(Error::NoMatchingVersion(_))
        ));
    }

    #[test]
    fn next_rejects_a_malformed_current_version() {
        assert!(matches!(
            next(&tags(&["1.0.0"]), "*", "garbage"),
            Err(Error::VersionSyntax(_))
        ));
    }

    #[test]
    fn compare_orders_by_precedence() {
        assert_eq!(compare("1.2.3", "1.2.4").unwrap(), Ordering::Less);
        assert_eq!(compare("1.2.3", "1.2.3").unwrap(), Ordering::Equal);
        assert_eq!(compare("1.2.4", "1.2.3").unwrap(), Ordering::Greater);
    }

    #[test]
    fn compare_accepts_v_prefixed_versions() {
        assert_eq!(compare("v1.0.0", "1.0.0").unwrap(), Ordering::Equal);
        assert_eq!(compare("v0.9.0", "v1.0.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn compare_rejects_garbage() {
        assert!(matches!(
            compare("abc", "1.0.0"),
            Err(Error::VersionSyntax(_))
        ));
    }
}

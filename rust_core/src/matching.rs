//! Fuzzy fighter name matching across sources.
//!
//! Sources disagree on spelling, ordering and nickname placement ("Jon
//! Jones", "Jones, Jon", "Jon 'Bones' Jones", "Bones Jones"). Matching is
//! deliberately permissive: a missed match creates a duplicate fighter
//! record, which is worse for this dataset than an occasional wrong merge.

use strsim::jaro_winkler;

/// Lowercase, strip everything non-alphabetic, collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_space = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            for lc in c.to_lowercase() {
                out.push(lc);
            }
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Staged comparison, first hit wins:
/// 1. normalized exact equality
/// 2. substring containment either direction (nickname embedded in full name)
/// 3. any shared token longer than two characters (name-order swaps,
///    single-name references)
pub fn names_match(a: &str, b: &str) -> bool {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    if na == nb {
        return true;
    }
    if na.contains(&nb) || nb.contains(&na) {
        return true;
    }
    let tokens_a: Vec<&str> = na.split(' ').collect();
    tokens_a
        .iter()
        .any(|t| t.len() > 2 && nb.split(' ').any(|u| u == *t))
}

/// Best candidate for `target` among `candidates`, or `None` when nothing
/// clears the staged comparison. Ties between stage hits break on
/// Jaro-Winkler similarity of the normalized strings.
pub fn find_best_match<'a>(target: &str, candidates: &'a [String]) -> Option<&'a str> {
    let nt = normalize_name(target);
    if nt.is_empty() {
        return None;
    }
    candidates
        .iter()
        .filter(|c| names_match(target, c))
        .map(|c| {
            let score = jaro_winkler(&nt, &normalize_name(c));
            (c, score)
        })
        .max_by(|(_, s1), (_, s2)| s1.partial_cmp(s2).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(c, _)| c.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_punctuation_and_case() {
        assert_eq!(normalize_name("Jon 'Bones' Jones"), "jon bones jones");
        assert_eq!(normalize_name("  O'Malley, Sean "), "o malley sean");
    }

    #[test]
    fn exact_and_substring_matches() {
        assert!(names_match("Jon Jones", "jon jones"));
        assert!(names_match("Jones", "Jon Jones"));
        assert!(names_match("Jon 'Bones' Jones", "Jon Jones"));
    }

    #[test]
    fn token_overlap_handles_order_swaps() {
        assert!(names_match("Jones Jon", "Jon Jones"));
        assert!(names_match("Aspinall", "Tom Aspinall"));
        // Two-letter tokens must not count.
        assert!(!names_match("Bo Ni", "Ni Kolov"));
    }

    #[test]
    fn unrelated_names_do_not_match() {
        assert!(!names_match("Jon Jones", "Tom Aspinall"));
        assert!(!names_match("", "Tom Aspinall"));
    }

    #[test]
    fn matching_is_symmetric() {
        let pairs = [
            ("Jon Jones", "Jones, Jon"),
            ("Sean O'Malley", "Suga Sean"),
            ("Alex Pereira", "Jamahal Hill"),
            ("Tom Aspinall", "Aspinall"),
        ];
        for (a, b) in pairs {
            assert_eq!(names_match(a, b), names_match(b, a), "{} vs {}", a, b);
        }
    }

    #[test]
    fn best_match_prefers_closest_candidate() {
        let candidates = vec![
            "Jon Jones".to_string(),
            "Jonathan Jones".to_string(),
            "Tom Aspinall".to_string(),
        ];
        assert_eq!(find_best_match("jon jones", &candidates), Some("Jon Jones"));
        assert_eq!(find_best_match("Volkanovski", &candidates), None);
    }
}

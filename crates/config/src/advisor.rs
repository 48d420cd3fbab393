//! Typo advisor: remembers every name looked up at a level and suggests the
//! closest one for a configured name that was never seen.

use std::collections::BTreeSet;
use std::sync::Mutex;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

#[derive(Debug, Default)]
pub(crate) struct TypoAdvisor {
    terms: Mutex<BTreeSet<String>>,
}

impl TypoAdvisor {
    pub(crate) fn add_term(&self, term: &str) {
        if let Ok(mut terms) = self.terms.lock() {
            terms.insert(term.to_string());
        }
    }

    pub(crate) fn has_seen(&self, name: &str) -> bool {
        self.terms.lock().map(|terms| terms.iter().any(|t| t.eq_ignore_ascii_case(name))).unwrap_or(false)
    }

    pub(crate) fn suggestion(&self, typo: &str) -> Option<String> {
        let terms = self.terms.lock().ok()?;
        closest_term(typo, terms.iter().map(String::as_str))
    }

    /// Note for a configured name nobody looked up, e.g. `type Foo was never looked up (did you mean Fooo?)`.
    pub(crate) fn not_seen_note(&self, kind: &str, name: &str) -> Option<String> {
        if self.has_seen(name) {
            return None;
        }
        let mut note = format!("{kind} {name} was never looked up");
        if let Some(s) = self.suggestion(name) {
            note.push_str(&format!(" (did you mean {s}?)"));
        }
        Some(note)
    }
}

/// Closest candidate to `typo`: small edit distance first, falling back to a fuzzy subsequence match.
pub(crate) fn closest_term<'a>(typo: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let lowered = typo.to_lowercase();
    let candidates: Vec<&str> = candidates.into_iter().filter(|c| !c.eq_ignore_ascii_case(typo)).collect();
    let threshold = (typo.chars().count() / 3).max(2);

    let by_distance = candidates
        .iter()
        .map(|c| (levenshtein_distance(&lowered, &c.to_lowercase()), *c))
        .filter(|(d, _)| *d <= threshold)
        .min();
    if let Some((_, best)) = by_distance {
        return Some(best.to_string());
    }

    let matcher = SkimMatcherV2::default();
    candidates
        .iter()
        .filter_map(|c| {
            let score = matcher.fuzzy_match(c, typo).or_else(|| matcher.fuzzy_match(typo, c))?;
            Some((score, *c))
        })
        .max_by(|(sa, ca), (sb, cb)| sa.cmp(sb).then_with(|| cb.cmp(ca)))
        .map(|(_, c)| c.to_string())
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

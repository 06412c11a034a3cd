use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Lowest score for a hit on a field that is not identical to the term.
const MIN_PARTIAL_SCORE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchConfig {
    /// Highest accepted `errors / term_len` ratio, in `[0, 1]`.
    pub threshold: f64,
    /// Hard cap on edit errors for a single term.
    pub distance: usize,
    pub max_pattern_len: usize,
    pub case_sensitive: bool,
    pub extended: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            distance: 50,
            max_pattern_len: 256,
            case_sensitive: false,
            extended: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermKind {
    Fuzzy,
    Exact,
    Include,
    Prefix,
    Suffix,
    NotInclude,
    NotPrefix,
    NotSuffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    kind: TermKind,
    pattern: Vec<char>,
}

/// A query split into alternative groups of terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    groups: Vec<Vec<Term>>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    config: MatchConfig,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl Matcher {
    pub fn new(mut config: MatchConfig) -> Self {
        config.threshold = if config.threshold.is_nan() {
            MatchConfig::default().threshold
        } else {
            config.threshold.clamp(0.0, 1.0)
        };
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Split `query` into terms. With `extended` on, terms take the operators
    /// `=x 'x ^x x$ !x !^x !x$`, operands may be double-quoted to keep spaces,
    /// and a standalone `|` separates alternatives.
    pub fn parse(&self, query: &str) -> Result<ParsedQuery, ScoringError> {
        let len = query.chars().count();
        if len > self.config.max_pattern_len {
            return Err(ScoringError::PatternTooLong {
                len,
                max: self.config.max_pattern_len,
            });
        }
        let folded = self.fold(query);
        if !self.config.extended {
            let trimmed = folded.trim();
            if trimmed.is_empty() {
                return Ok(ParsedQuery::default());
            }
            return Ok(ParsedQuery {
                groups: vec![vec![Term {
                    kind: TermKind::Fuzzy,
                    pattern: trimmed.chars().collect(),
                }]],
            });
        }

        let mut groups = Vec::new();
        let mut current = Vec::new();
        let mut saw_separator = false;
        for token in tokenize(&folded) {
            if token == "|" {
                if current.is_empty() {
                    return Err(ScoringError::EmptyGroup);
                }
                groups.push(std::mem::take(&mut current));
                saw_separator = true;
                continue;
            }
            current.push(parse_term(&token)?);
        }
        if current.is_empty() {
            if saw_separator {
                return Err(ScoringError::EmptyGroup);
            }
        } else {
            groups.push(current);
        }
        Ok(ParsedQuery { groups })
    }

    /// Combined score of `fields` (lower is better), or `None` if no field
    /// matches. Blank fields are skipped.
    pub fn score_fields(&self, query: &ParsedQuery, fields: &[&str]) -> Option<f64> {
        if query.is_empty() || fields.is_empty() {
            return None;
        }
        let weight = 1.0 / fields.len() as f64;
        let mut total = 1.0_f64;
        let mut matched = false;
        for field in fields {
            if field.trim().is_empty() {
                continue;
            }
            if let Some(score) = self.score_field(query, field) {
                matched = true;
                total *= score.max(f64::EPSILON).powf(weight * field_norm(field));
            }
        }
        matched.then_some(total)
    }

    fn score_field(&self, query: &ParsedQuery, field: &str) -> Option<f64> {
        let text: Vec<char> = self.fold(field).chars().collect();
        // First alternative whose terms all match wins.
        query.groups.iter().find_map(|group| {
            let mut sum = 0.0;
            for term in group {
                sum += self.score_term(term, &text)?;
            }
            Some(sum / group.len() as f64)
        })
    }

    fn score_term(&self, term: &Term, text: &[char]) -> Option<f64> {
        let p = term.pattern.as_slice();
        // only an identical field scores a perfect 0
        let exact = if text == p { 0.0 } else { MIN_PARTIAL_SCORE };
        let hit = |ok: bool| ok.then_some(exact);
        match term.kind {
            TermKind::Fuzzy => {
                if contains(text, p) {
                    return Some(exact);
                }
                let errors = approximate_distance(p, text);
                if errors > self.config.distance {
                    return None;
                }
                let score = errors as f64 / p.len() as f64;
                (score <= self.config.threshold).then_some(score.max(MIN_PARTIAL_SCORE))
            }
            TermKind::Exact => hit(text == p),
            TermKind::Include => hit(contains(text, p)),
            TermKind::Prefix => hit(text.starts_with(p)),
            TermKind::Suffix => hit(text.ends_with(p)),
            TermKind::NotInclude => hit(!contains(text, p)),
            TermKind::NotPrefix => hit(!text.starts_with(p)),
            TermKind::NotSuffix => hit(!text.ends_with(p)),
        }
    }

    fn fold(&self, s: &str) -> String {
        if self.config.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }
}

/// Whitespace-separated tokens; whitespace inside double quotes is kept.
fn tokenize(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in query.chars() {
        if c == '"' {
            quoted = !quoted;
            current.push(c);
        } else if c.is_whitespace() && !quoted {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_term(token: &str) -> Result<Term, ScoringError> {
    let (kind, operand) = if let Some(rest) = token.strip_prefix("!^") {
        (TermKind::NotPrefix, rest)
    } else if let Some(rest) = token.strip_prefix('!') {
        match rest.strip_suffix('$') {
            Some(inner) => (TermKind::NotSuffix, inner),
            None => (TermKind::NotInclude, rest),
        }
    } else if let Some(rest) = token.strip_prefix('^') {
        (TermKind::Prefix, rest)
    } else if let Some(rest) = token.strip_prefix('=') {
        (TermKind::Exact, rest)
    } else if let Some(rest) = token.strip_prefix('\'') {
        (TermKind::Include, rest)
    } else if let Some(rest) = token.strip_suffix('$') {
        (TermKind::Suffix, rest)
    } else {
        (TermKind::Fuzzy, token)
    };
    let operand = unquote(operand);
    if operand.is_empty() {
        return Err(ScoringError::EmptyTerm {
            operator: token.to_string(),
        });
    }
    Ok(Term {
        kind,
        pattern: operand.chars().collect(),
    })
}

fn unquote(operand: &str) -> &str {
    operand
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(operand)
}

fn contains(text: &[char], pattern: &[char]) -> bool {
    pattern.is_empty() || text.windows(pattern.len()).any(|w| w == pattern)
}

/// Minimum number of edits turning `pattern` into some substring of `text`.
pub(crate) fn approximate_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    if m == 0 {
        return 0;
    }
    // prev[i]: cost of pattern[..i] ending at the previous text position.
    // Row 0 stays 0 so a match may start anywhere.
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];
    let mut best = m;
    for &tc in text {
        curr[0] = 0;
        for i in 1..=m {
            let substitute = prev[i - 1] + usize::from(pattern[i - 1] != tc);
            curr[i] = substitute.min(prev[i] + 1).min(curr[i - 1] + 1);
        }
        best = best.min(curr[m]);
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

/// Shorter fields weigh more: `1 / sqrt(words)`, rounded to 3 decimals.
fn field_norm(field: &str) -> f64 {
    let words = field.split(' ').filter(|w| !w.is_empty()).count().max(1);
    (1000.0 / (words as f64).sqrt()).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn score(query: &str, field: &str) -> Option<f64> {
        let m = Matcher::default();
        let q = m.parse(query).unwrap();
        m.score_fields(&q, &[field])
    }

    #[test]
    fn test_distance_exact_substring_is_zero() {
        assert_eq!(approximate_distance(&chars("main"), &chars("src/main.ts")), 0);
    }

    #[test]
    fn test_distance_counts_single_edits() {
        assert_eq!(approximate_distance(&chars("mian"), &chars("main")), 2);
        assert_eq!(approximate_distance(&chars("maon"), &chars("main")), 1);
        assert_eq!(approximate_distance(&chars("man"), &chars("main")), 1);
        assert_eq!(approximate_distance(&chars("maiin"), &chars("main")), 1);
    }

    #[test]
    fn test_distance_pattern_longer_than_text() {
        assert_eq!(approximate_distance(&chars("abcdef"), &chars("abc")), 3);
        assert_eq!(approximate_distance(&chars("abc"), &chars("")), 3);
    }

    #[test]
    fn test_fuzzy_exact_match_scores_best() {
        let exact = score("main", "main.ts").unwrap();
        let typo = score("readmee", "readme.md").unwrap();
        assert!(exact < typo);
    }

    #[test]
    fn test_identical_field_beats_containing_field() {
        let identical = score("index.ts", "index.ts").unwrap();
        let containing = score("index.ts", "index.tsx").unwrap();
        assert!(identical < containing);
        assert_eq!(identical, f64::EPSILON);
        assert!(containing >= MIN_PARTIAL_SCORE);
    }

    #[test]
    fn test_operators_prefer_identical_fields() {
        assert!(score("'main", "main").unwrap() < score("'main", "main.ts").unwrap());
        assert!(score("^main", "main").unwrap() < score("^main", "main.ts").unwrap());
        assert_eq!(score("=main.ts", "main.ts"), Some(f64::EPSILON));
    }

    #[test]
    fn test_fuzzy_typo_scores_error_ratio() {
        let m = Matcher::new(MatchConfig {
            threshold: 1.0,
            ..MatchConfig::default()
        });
        let q = m.parse("abcdefghij").unwrap();
        let s = m.score_fields(&q, &["abcdefghiz"]).unwrap();
        assert!((s - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_quoted_operands_keep_spaces() {
        let m = Matcher::default();
        assert_eq!(tokenize(r#"'"read me" | x"#), vec![r#"'"read me""#, "|", "x"]);
        assert!(score(r#"="read me.md""#, "read me.md").is_some());
        assert!(score(r#"="read me""#, "read me.md").is_none());
        assert!(score(r#"'"d m""#, "read me.md").is_some());
        assert!(score(r#"!"d m""#, "read me.md").is_none());
        assert!(score(r#"^"read m""#, "read me.md").is_some());
        assert!(score(r#""me.md"$"#, "read me.md").is_some());
        assert!(matches!(
            m.parse(r#"="""#),
            Err(ScoringError::EmptyTerm { .. })
        ));
        assert!(matches!(
            m.parse(r#"'"""#),
            Err(ScoringError::EmptyTerm { .. })
        ));
    }

    #[test]
    fn test_fuzzy_threshold_rejects_far_matches() {
        assert!(score("main", "readme.md").is_none());
        assert!(score("main", "index.ts").is_none());
        // two edits over four characters is above the default threshold
        assert!(score("mian", "main.ts").is_none());
    }

    #[test]
    fn test_fuzzy_is_location_independent() {
        let early = score("needlx", "needle-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let late = score("needlx", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa-needle").unwrap();
        assert_eq!(early, late);
    }

    #[test]
    fn test_fuzzy_monotonic_in_errors() {
        let m = Matcher::new(MatchConfig {
            threshold: 1.0,
            ..MatchConfig::default()
        });
        let q = m.parse("component").unwrap();
        let zero = m.score_fields(&q, &["component.tsx"]).unwrap();
        let one = m.score_fields(&q, &["componant.tsx"]).unwrap();
        let two = m.score_fields(&q, &["compannt.tsx"]).unwrap();
        assert!(zero < one);
        assert!(one < two);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        assert!(score("README", "readme.md").is_some());
        let m = Matcher::new(MatchConfig {
            case_sensitive: true,
            ..MatchConfig::default()
        });
        let q = m.parse("'README").unwrap();
        assert!(m.score_fields(&q, &["readme.md"]).is_none());
    }

    #[test]
    fn test_operators() {
        assert!(score("=main.ts", "main.ts").is_some());
        assert!(score("=main", "main.ts").is_none());
        assert!(score("'ain", "main.ts").is_some());
        assert!(score("'mian", "main.ts").is_none());
        assert!(score("^ma", "main.ts").is_some());
        assert!(score("^ai", "main.ts").is_none());
        assert!(score(".ts$", "main.ts").is_some());
        assert!(score(".rs$", "main.ts").is_none());
        assert!(score("!test", "main.ts").is_some());
        assert!(score("!main", "main.ts").is_none());
        assert!(score("!^test", "main.ts").is_some());
        assert!(score("!^ma", "main.ts").is_none());
        assert!(score("!.rs$", "main.ts").is_some());
        assert!(score("!.ts$", "main.ts").is_none());
    }

    #[test]
    fn test_and_terms_must_all_match() {
        assert!(score("^main .ts$", "main.ts").is_some());
        assert!(score("^main .rs$", "main.ts").is_none());
    }

    #[test]
    fn test_or_groups() {
        assert!(score(".rs$ | .ts$", "main.ts").is_some());
        assert!(score(".rs$ | .go$", "main.ts").is_none());
    }

    #[test]
    fn test_empty_operands_are_rejected() {
        let m = Matcher::default();
        for q in ["^", "!", "'", "=", "$", "!^", "!$", "main ^"] {
            assert!(
                matches!(m.parse(q), Err(ScoringError::EmptyTerm { .. })),
                "{q} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_groups_are_rejected() {
        let m = Matcher::default();
        assert_eq!(m.parse("| main"), Err(ScoringError::EmptyGroup));
        assert_eq!(m.parse("main |"), Err(ScoringError::EmptyGroup));
        assert_eq!(m.parse("a | | b"), Err(ScoringError::EmptyGroup));
    }

    #[test]
    fn test_long_query_is_rejected() {
        let m = Matcher::default();
        let long = "x".repeat(257);
        assert_eq!(
            m.parse(&long),
            Err(ScoringError::PatternTooLong { len: 257, max: 256 })
        );
        assert!(m.parse(&"x".repeat(256)).is_ok());
    }

    #[test]
    fn test_whitespace_query_matches_nothing() {
        let m = Matcher::default();
        let q = m.parse("   ").unwrap();
        assert!(q.is_empty());
        assert!(m.score_fields(&q, &["main.ts"]).is_none());
    }

    #[test]
    fn test_plain_mode_treats_operators_literally() {
        let m = Matcher::new(MatchConfig {
            extended: false,
            ..MatchConfig::default()
        });
        let q = m.parse("^").unwrap();
        assert!(m.score_fields(&q, &["a^b"]).is_some());
        let q = m.parse("main ts").unwrap();
        assert!(m.score_fields(&q, &["main ts"]).is_some());
    }

    #[test]
    fn test_either_field_can_match() {
        let m = Matcher::default();
        let q = m.parse("/src").unwrap();
        assert!(m.score_fields(&q, &["test.ts", "/src/test.ts"]).is_some());
        assert!(m.score_fields(&q, &["test.ts", ""]).is_none());
    }

    #[test]
    fn test_matching_both_fields_beats_one() {
        let m = Matcher::default();
        let q = m.parse("test").unwrap();
        let both = m.score_fields(&q, &["test.ts", "/src/test.ts"]).unwrap();
        let one = m.score_fields(&q, &["test.ts", "/src/other.ts"]).unwrap();
        assert!(both < one);
    }

    #[test]
    fn test_threshold_is_clamped() {
        let m = Matcher::new(MatchConfig {
            threshold: 7.0,
            ..MatchConfig::default()
        });
        assert_eq!(m.config().threshold, 1.0);
        let m = Matcher::new(MatchConfig {
            threshold: f64::NAN,
            ..MatchConfig::default()
        });
        assert_eq!(m.config().threshold, 0.2);
    }

    #[test]
    fn test_distance_cap() {
        let m = Matcher::new(MatchConfig {
            threshold: 1.0,
            distance: 1,
            ..MatchConfig::default()
        });
        let q = m.parse("abcd").unwrap();
        assert!(m.score_fields(&q, &["abxd"]).is_some());
        assert!(m.score_fields(&q, &["axxd"]).is_none());
    }

    #[test]
    fn test_field_norm_prefers_short_fields() {
        assert_eq!(field_norm("main.ts"), 1.0);
        assert_eq!(field_norm("one two three four"), 0.5);
        assert_eq!(field_norm("a b"), 0.707);
    }
}

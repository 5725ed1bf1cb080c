//! Wildcard matching for tool-name filters.
//!
//! Supports `*` (zero or more characters) and `?` (exactly one character).
//! Matching is case-sensitive and anchored at both ends. Characters are
//! Unicode scalar values, so `?` matches one `char` rather than one byte.

/// Returns true if `name` matches `pattern` in its entirety.
///
/// Uses single-backtrack-point matching: on mismatch we resume from the most
/// recent `*`, letting it absorb one more character. This runs in
/// O(pattern × name) worst case without recursion.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0usize, 0usize);
    // (pattern index after the star, name index the star currently absorbs up to)
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p + 1, n));
                p += 1;
            }
            Some('?') => {
                p += 1;
                n += 1;
            }
            Some(c) if *c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star_p, star_n)) => {
                    p = star_p;
                    n = star_n + 1;
                    backtrack = Some((star_p, star_n + 1));
                }
                None => return false,
            },
        }
    }

    // Name exhausted: any remaining pattern must be all stars.
    pattern[p..].iter().all(|c| *c == '*')
}

/// Returns true if `name` matches any of `patterns`.
pub fn matches_any<S: AsRef<str>>(patterns: &[S], name: &str) -> bool {
    patterns.iter().any(|p| glob_match(p.as_ref(), name))
}

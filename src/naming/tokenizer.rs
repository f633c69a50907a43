// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Delimiter splitting that keeps architecture tokens such as `x86_64`
//! in one piece.

/// Length (in chars) of the first protected substring starting at `at`.
fn protected_at<S: AsRef<str>>(chars: &[char], at: usize, protected: &[S]) -> Option<usize> {
    protected.iter().find_map(|blob| {
        let blob: Vec<char> = blob.as_ref().chars().collect();
        if blob.is_empty() || at + blob.len() > chars.len() {
            return None;
        }
        let matches = chars[at..at + blob.len()]
            .iter()
            .zip(blob.iter())
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
        matches.then_some(blob.len())
    })
}

/// Split `name` at any of `delimiters`, never inside a protected substring.
///
/// A `.` directly in front of a protected substring is first rewritten to
/// the primary (first) delimiter, so `foo-1.0.i386` yields `i386` as its own
/// token. Delimiters are dropped and the trailing token is always emitted,
/// even when empty.
pub fn split_any<S: AsRef<str>>(name: &str, delimiters: &[char], protected: &[S]) -> Vec<String> {
    let mut chars: Vec<char> = name.chars().collect();

    if let Some(&primary) = delimiters.first()
        && !protected.is_empty()
    {
        for i in 1..chars.len() {
            if chars[i - 1] == '.' && protected_at(&chars, i, protected).is_some() {
                chars[i - 1] = primary;
            }
        }
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        if let Some(len) = protected_at(&chars, i, protected) {
            i += len;
            continue;
        }
        if delimiters.contains(&chars[i]) {
            tokens.push(chars[start..i].iter().collect());
            start = i + 1;
        }
        i += 1;
    }
    tokens.push(chars[start.min(chars.len())..].iter().collect());
    tokens
}

/// The character that separated each token from the next one in `source`.
///
/// Walks `source` by the char length of each token, so it must be given
/// the text the tokens were split from (before any token was rewritten).
/// The entry for the last token is `None`.
pub fn gap_delimiters(source: &str, tokens: &[String]) -> Vec<Option<char>> {
    let chars: Vec<char> = source.chars().collect();
    let mut position = 0;
    tokens
        .iter()
        .map(|token| {
            position += token.chars().count();
            let gap = chars.get(position).copied();
            if gap.is_some() {
                position += 1;
            }
            gap
        })
        .collect()
}

/// Every case-insensitive occurrence of each needle, grouped by needle.
///
/// Positions are char offsets. Occurrences of the same needle do not
/// overlap.
pub fn find_all_any_ci(haystack: &str, needles: &[&str]) -> Vec<(usize, String)> {
    let hay: Vec<char> = haystack.to_lowercase().chars().collect();
    let mut results = Vec::new();

    for needle in needles {
        let lower: Vec<char> = needle.to_lowercase().chars().collect();
        if lower.is_empty() {
            continue;
        }
        let mut i = 0;
        while i + lower.len() <= hay.len() {
            if hay[i..i + lower.len()] == lower[..] {
                results.push((i, needle.to_string()));
                i += lower.len();
            } else {
                i += 1;
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::tables::NamingTables;

    fn split(name: &str) -> Vec<String> {
        let tables = NamingTables::default();
        split_any(name, &tables.delimiters, &tables.protected_substrings())
    }

    #[test]
    fn keeps_architecture_tokens_whole() {
        assert_eq!(
            split("blender-2.79b-linux-glibc219-x86_64"),
            vec!["blender", "2.79b", "linux", "glibc219", "x86_64"]
        );
        assert_eq!(split("Foo_64-bit_1.0"), vec!["Foo", "64-bit", "1.0"]);
    }

    #[test]
    fn dot_before_architecture_becomes_delimiter() {
        assert_eq!(
            split("mfcl2740dwlpr-3.2.0-1.i386"),
            vec!["mfcl2740dwlpr", "3.2.0", "1", "i386"]
        );
        assert_eq!(
            split("brscan-skey-0.2.4-1.X86_64"),
            vec!["brscan", "skey", "0.2.4", "1", "X86_64"]
        );
    }

    #[test]
    fn trailing_empty_token_is_kept() {
        assert_eq!(split("foo-"), vec!["foo", ""]);
        assert_eq!(split(""), vec![""]);
    }

    #[test]
    fn no_protected_substrings_is_plain_split() {
        let none: [&str; 0] = [];
        assert_eq!(
            split_any("tsetup.1.8.2", &['.'], &none),
            vec!["tsetup", "1", "8", "2"]
        );
    }

    #[test]
    fn gap_delimiters_reads_original_text() {
        let source = "brscan-skey-0.2.4-1.x86_64";
        let tokens = split(source);
        assert_eq!(
            gap_delimiters(source, &tokens),
            vec![Some('-'), Some('-'), Some('-'), Some('.'), None]
        );
    }

    #[test]
    fn find_all_any_ci_reports_char_offsets() {
        assert_eq!(
            find_all_any_ci("blender-2.79b-linux-glibc219-x86_64", &["linux", "X86_64"]),
            vec![(14, "linux".to_string()), (29, "X86_64".to_string())]
        );
        assert!(find_all_any_ci("abc", &["", "z"]).is_empty());
    }
}

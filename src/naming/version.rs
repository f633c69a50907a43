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

//! Version token recognition and merging of a version run back into one
//! token.

use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionForm {
    /// Digits and dots only, such as `2.0.4.5` or `20181128`.
    Numeric,
    /// Starts with a digit and ends in letters, such as `2.79b` or `2ef957d`,
    /// or is a short commit hash such as `2ef9570`.
    Lettered,
    /// A known word, optionally followed by digits, such as `beta` or `rc2`.
    Keyword,
}

fn is_numeric(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit()) && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Abbreviated git hashes are at least seven hex digits.
const MIN_HASH_LEN: usize = 7;

fn is_commit_hash(token: &str) -> bool {
    token.len() >= MIN_HASH_LEN
        && token.chars().all(|c| c.is_ascii_hexdigit())
        && token.chars().any(|c| c.is_ascii_alphabetic())
}

fn is_lettered(token: &str) -> bool {
    let starts_with_digit = token.chars().next().is_some_and(|c| c.is_ascii_digit());
    let ends_with_letter = token.chars().last().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_digit
        && (ends_with_letter || is_commit_hash(token))
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c.is_ascii_alphabetic())
}

fn is_keyword<S: AsRef<str>>(token: &str, keywords: &[S]) -> bool {
    let lower = token.to_lowercase();
    keywords.iter().any(|keyword| {
        let keyword = keyword.as_ref().to_lowercase();
        match lower.strip_prefix(keyword.as_str()) {
            Some("") => true,
            Some(rest) => rest.chars().all(|c| c.is_ascii_digit()),
            None => false,
        }
    })
}

/// Which version form `token` has, if any. The token is taken as is; see
/// [`strip_version_prefix`] for the optional leading `v`.
pub fn version_form<S: AsRef<str>>(token: &str, keywords: &[S]) -> Option<VersionForm> {
    if token.is_empty() {
        return None;
    }
    if is_numeric(token) {
        Some(VersionForm::Numeric)
    } else if is_keyword(token, keywords) {
        Some(VersionForm::Keyword)
    } else if is_lettered(token) {
        Some(VersionForm::Lettered)
    } else {
        None
    }
}

/// Whether `token` is a version. Letter suffixes count only when
/// `allow_letters` is set.
pub fn is_version<S: AsRef<str>>(token: &str, allow_letters: bool, keywords: &[S]) -> bool {
    match version_form(token, keywords) {
        Some(VersionForm::Lettered) => allow_letters,
        Some(_) => true,
        None => false,
    }
}

/// Remove one leading `v`/`V` when what remains is a version.
pub fn strip_version_prefix<'a, S: AsRef<str>>(token: &'a str, keywords: &[S]) -> &'a str {
    match token.strip_prefix(['v', 'V']) {
        Some(rest) if version_form(rest, keywords).is_some() => rest,
        _ => token,
    }
}

/// Tokens after the version run has been merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSplit {
    pub parts: Vec<String>,
    /// Index of the first token of the version run in the input sequence.
    /// Tokens before it are name tokens.
    pub version_index: Option<usize>,
    /// The merged version text.
    pub version: Option<String>,
    /// The run put a lettered token before a later numeric one, as in
    /// `2.79b-3`. The run is still used but may not be what was meant.
    pub ambiguous_order: bool,
}

/// Find the version run in `tokens` and merge it into a single element.
///
/// `gaps` holds the delimiter that followed each token in the original
/// text (see [`super::tokenizer::gap_delimiters`]). Without it, or in
/// `two_only` mode, run elements are joined with `.`.
pub fn unsplit_version<S: AsRef<str>>(
    tokens: &[String],
    keywords: &[S],
    two_only: bool,
    gaps: Option<&[Option<char>]>,
) -> VersionSplit {
    let mut parts: Vec<String> = Vec::with_capacity(tokens.len());
    let mut first = None;
    let mut last = None;
    let mut lettered = None;
    let mut last_numeric = None;

    for (i, token) in tokens.iter().enumerate() {
        let token = strip_version_prefix(token, keywords);
        parts.push(token.to_string());
        match version_form(token, keywords) {
            Some(form) => {
                first.get_or_insert(i);
                last = Some(i);
                match form {
                    VersionForm::Lettered => {
                        lettered.get_or_insert(i);
                    }
                    VersionForm::Numeric => last_numeric = Some(i),
                    VersionForm::Keyword => {}
                }
            }
            None => {
                if first.is_some() {
                    parts.extend(tokens[i + 1..].iter().cloned());
                    break;
                }
            }
        }
    }

    let (Some(first), Some(last)) = (first, last) else {
        return VersionSplit {
            parts: tokens.to_vec(),
            version_index: None,
            version: None,
            ambiguous_order: false,
        };
    };

    let ambiguous_order = matches!((lettered, last_numeric), (Some(l), Some(n)) if l < n);
    if let (Some(lettered), Some(numeric)) = (lettered, last_numeric)
        && ambiguous_order
    {
        warn!(
            "Version run {:?} has the lettered part {:?} before the numeric part {:?}",
            &parts[first..=last],
            parts[lettered],
            parts[numeric]
        );
    }

    if first == 0 {
        let joined = parts.join(".");
        warn!("No name was detected in {tokens:?}, so all of it is treated as the version");
        return VersionSplit {
            parts: vec![String::new(), joined.clone()],
            version_index: Some(0),
            version: Some(joined),
            ambiguous_order,
        };
    }

    let mut merged = String::new();
    for i in first..=last {
        merged.push_str(&parts[i]);
        if i == last {
            break;
        }
        let next_is_keyword = is_keyword(&parts[i + 1], keywords);
        let gap = match gaps {
            _ if next_is_keyword => ' ',
            Some(gaps) if !two_only => gaps.get(i).copied().flatten().unwrap_or('.'),
            _ => '.',
        };
        merged.push(gap);
    }
    debug!("Merged version run {:?} into {merged:?}", &parts[first..=last]);

    let mut result: Vec<String> = parts[..first].to_vec();
    result.push(merged.clone());
    result.extend(parts[last + 1..].iter().cloned());

    VersionSplit {
        parts: result,
        version_index: Some(first),
        version: Some(merged),
        ambiguous_order,
    }
}

use std::collections::{HashSet, VecDeque};

use regex::Regex;
use regex_automata::dfa::{dense, Automaton, StartKind};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input, MatchKind};

use crate::error::{MapError, MapResult};

/// Regular expressions exempting resource paths from any restriction.
///
/// A pattern must match the whole absolute path, and it must be able to match
/// at least one path starting with `/`. Both are checked once, when the
/// patterns are compiled.
#[derive(Debug, Clone, Default)]
pub struct WhitelistPatterns {
    patterns: Vec<WhitelistPattern>,
}

#[derive(Debug, Clone)]
struct WhitelistPattern {
    source: String,
    anchored: Regex,
}

impl WhitelistPatterns {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new<I, S>(patterns: I) -> MapResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| WhitelistPattern::compile(pattern.as_ref()))
            .collect::<MapResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_whitelisted(&self, resource_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.anchored.is_match(resource_path))
    }

    /// The patterns as given, in order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|pattern| pattern.source.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl WhitelistPattern {
    fn compile(source: &str) -> MapResult<Self> {
        let invalid = |reason: String| MapError::InvalidPattern {
            pattern: source.to_string(),
            reason,
        };
        let anchored =
            Regex::new(&format!("^(?:{source})$")).map_err(|e| invalid(e.to_string()))?;
        if !admits_absolute_paths(source).map_err(invalid)? {
            return Err(invalid(
                "it will never match as it does not allow a path to start with '/'".to_string(),
            ));
        }
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }
}

/// Whether `pattern` matches at least one whole input starting with `/`.
///
/// Match states of the DFA are delayed by one byte: a match of the input read
/// so far only shows in the transition after it. The delayed match of the
/// empty input, seen right after `/`, is therefore not counted.
fn admits_absolute_paths(pattern: &str) -> Result<bool, String> {
    let dfa = dense::Builder::new()
        .configure(
            dense::DFA::config()
                .start_kind(StartKind::Anchored)
                .match_kind(MatchKind::All)
                .unicode_word_boundary(true),
        )
        .build(pattern)
        .map_err(|e| e.to_string())?;
    let input = Input::new("/").anchored(Anchored::Yes);
    let start = dfa
        .start_state_forward(&input)
        .map_err(|e| e.to_string())?;
    let after_slash = dfa.next_state(start, b'/');

    let mut seen: HashSet<StateID> = HashSet::from([after_slash]);
    let mut queue = VecDeque::from([after_slash]);
    while let Some(state) = queue.pop_front() {
        if dfa.is_dead_state(state) || dfa.is_quit_state(state) {
            continue;
        }
        if dfa.is_match_state(dfa.next_eoi_state(state)) {
            return Ok(true);
        }
        for byte in 0..=u8::MAX {
            let next = dfa.next_state(state, byte);
            if dfa.is_match_state(next) {
                return Ok(true);
            }
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    Ok(false)
}

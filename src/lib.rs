use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The smallest puzzle size the solver supports.
pub const MIN_WORD_SIZE: usize = 3;
/// The largest puzzle size; also the number of 2-bit fields in a [`Pattern`].
pub const MAX_WORD_SIZE: usize = 8;

const ALPHABET_SIZE: usize = 26;
const COLOR_BITS: u32 = 2;
const COLOR_MASK: u16 = 0b11;

/// Tolerance when comparing entropy values, absorbing floating-point noise
/// so that effectively tied guesses rank as equals.
const ENTROPY_EPSILON: f64 = 1e-9;

/// Relative paths of the WordNet index files a dictionary is drawn from.
pub const WORDNET_INDEX_FILES: [&str; 4] = [
    "dict/index.noun",
    "dict/index.verb",
    "dict/index.adj",
    "dict/index.adv",
];

static BUNDLED_WORDS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut words = HashSet::new();
    parse_word_list(include_str!("../data/words.txt"), &mut words);
    let mut words: Vec<String> = words.into_iter().collect();
    words.sort();
    words
});

/// Errors surfaced by the solver core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Pattern field access outside the supported position range.
    InvalidPosition { position: usize },
    /// Requested puzzle size outside the supported range.
    InvalidWordSize { size: usize },
    /// A word or feedback round with the wrong number of letters.
    InvalidLength { expected: usize, found: usize },
    /// A word containing something besides ASCII letters.
    InvalidWord { word: String },
    /// Feedback supplied before any guess was adopted.
    NoWorkingGuess,
    /// Loading left zero usable words of the requested size.
    NoWords { word_size: usize },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidPosition { position } => {
                write!(
                    f,
                    "pattern position {position} is outside 0-{}",
                    MAX_WORD_SIZE - 1
                )
            }
            SolverError::InvalidWordSize { size } => {
                write!(
                    f,
                    "word size {size} is outside {MIN_WORD_SIZE}-{MAX_WORD_SIZE}"
                )
            }
            SolverError::InvalidLength { expected, found } => {
                write!(f, "expected {expected} letters, but found {found}")
            }
            SolverError::InvalidWord { word } => {
                write!(f, "{word:?} contains something besides ASCII letters")
            }
            SolverError::NoWorkingGuess => write!(f, "no working guess to score"),
            SolverError::NoWords { word_size } => {
                write!(f, "no usable words of {word_size} letters were loaded")
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Per-position feedback for one letter of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Gray = 0,
    Yellow = 1,
    Green = 2,
}

impl Color {
    /// Parses an interactive feedback token: `gn` Green, `y` Yellow, `gr` Gray.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gn" => Some(Color::Green),
            "y" => Some(Color::Yellow),
            "gr" => Some(Color::Gray),
            _ => None,
        }
    }

    fn from_bits(bits: u16) -> Self {
        match bits {
            2 => Color::Green,
            1 => Color::Yellow,
            _ => Color::Gray,
        }
    }
}

/// Compact per-letter feedback for a whole guess, two bits per position.
///
/// Position 0 sits at the least significant bits. [`generate_pattern`] files
/// the guess's leftmost letter under field `word_size - 1`, so fields fill
/// from the rightmost end; [`build_pattern`] and [`Pattern::all_green`] agree
/// with that convention. Fields past `word_size` stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pattern(u16);

impl Pattern {
    /// Writes `color` into the 2-bit field for `position`.
    pub fn set_color(&mut self, position: usize, color: Color) -> Result<(), SolverError> {
        let shift = field_shift(position)?;
        self.0 = (self.0 & !(COLOR_MASK << shift)) | ((color as u16) << shift);
        Ok(())
    }

    /// Reads the color stored at `position`.
    pub fn get_color(&self, position: usize) -> Result<Color, SolverError> {
        let shift = field_shift(position)?;
        Ok(Color::from_bits((self.0 >> shift) & COLOR_MASK))
    }

    /// The pattern with every position up to `word_size` marked Green.
    pub fn all_green(word_size: usize) -> Self {
        let mut pattern = Pattern::default();
        for position in 0..word_size {
            pattern.set_unchecked(position, Color::Green);
        }
        pattern
    }

    fn set_unchecked(&mut self, position: usize, color: Color) {
        debug_assert!(position < MAX_WORD_SIZE);
        let shift = position as u32 * COLOR_BITS;
        self.0 = (self.0 & !(COLOR_MASK << shift)) | ((color as u16) << shift);
    }

    fn get_unchecked(&self, position: usize) -> Color {
        debug_assert!(position < MAX_WORD_SIZE);
        let shift = position as u32 * COLOR_BITS;
        Color::from_bits((self.0 >> shift) & COLOR_MASK)
    }
}

fn field_shift(position: usize) -> Result<u32, SolverError> {
    if position < MAX_WORD_SIZE {
        Ok(position as u32 * COLOR_BITS)
    } else {
        Err(SolverError::InvalidPosition { position })
    }
}

/// Builds a pattern from per-letter colors, leftmost letter first, using the
/// same field convention as [`generate_pattern`].
pub fn build_pattern(colors: &[Color], word_size: usize) -> Result<Pattern, SolverError> {
    let mut pattern = Pattern::default();
    for (i, &color) in colors.iter().enumerate() {
        let position = word_size
            .checked_sub(i + 1)
            .ok_or(SolverError::InvalidPosition { position: i })?;
        pattern.set_color(position, color)?;
    }
    Ok(pattern)
}

/// Simulates the feedback a puzzle engine would return for `guess` against
/// `target`. Both words must be `word_size` uppercase ASCII letters; the
/// dictionary guarantees this for every word it hands out.
///
/// Greens consume the target's letter counts before any Yellow is allocated,
/// which is what makes duplicate letters split correctly.
pub fn generate_pattern(guess: &str, target: &str, word_size: usize) -> Pattern {
    let guess_bytes = guess.as_bytes();
    let target_bytes = target.as_bytes();
    debug_assert_eq!(guess_bytes.len(), word_size);
    debug_assert_eq!(target_bytes.len(), word_size);

    let mut pattern = Pattern::default();
    let mut leftovers = [0u8; ALPHABET_SIZE];

    for i in 0..word_size {
        if guess_bytes[i] == target_bytes[i] {
            pattern.set_unchecked(word_size - 1 - i, Color::Green);
        } else {
            leftovers[letter_index(target_bytes[i])] += 1;
        }
    }

    for i in 0..word_size {
        if pattern.get_unchecked(word_size - 1 - i) == Color::Green {
            continue;
        }
        let lookup = letter_index(guess_bytes[i]);
        if leftovers[lookup] > 0 {
            pattern.set_unchecked(word_size - 1 - i, Color::Yellow);
            leftovers[lookup] -= 1;
        }
    }

    pattern
}

fn letter_index(letter: u8) -> usize {
    debug_assert!(
        letter.is_ascii_uppercase(),
        "words should use only uppercase ASCII letters"
    );
    (letter - b'A') as usize
}

/// The pattern distribution one guess would elicit from a candidate set.
#[derive(Debug, Clone)]
pub struct GuessAnalysis {
    guess: String,
    pattern_counts: HashMap<Pattern, usize>,
}

impl GuessAnalysis {
    /// Returns the analyzed guess word.
    pub fn guess(&self) -> &str {
        &self.guess
    }

    /// Number of candidate words the guess was compared against.
    pub fn total_words(&self) -> usize {
        self.pattern_counts.values().sum()
    }

    /// Returns how many distinct patterns were observed.
    pub fn distinct_patterns(&self) -> usize {
        self.pattern_counts.len()
    }

    /// Computes the Shannon entropy (in bits) of the pattern distribution.
    pub fn entropy_bits(&self) -> f64 {
        shannon_entropy(&self.pattern_counts)
    }
}

/// Simulates `guess` against every word in `others` and tallies the feedback
/// patterns it would produce.
pub fn analyze_guess_against<'a>(
    guess: &str,
    others: impl IntoIterator<Item = &'a str>,
    word_size: usize,
) -> GuessAnalysis {
    let mut pattern_counts = HashMap::new();
    for other in others {
        *pattern_counts
            .entry(generate_pattern(guess, other, word_size))
            .or_insert(0) += 1;
    }
    GuessAnalysis {
        guess: guess.to_string(),
        pattern_counts,
    }
}

fn shannon_entropy(counts: &HashMap<Pattern, usize>) -> f64 {
    let total: usize = counts.values().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts.values().fold(0.0, |acc, &count| {
        let probability = count as f64 / total;
        acc - probability * probability.log2()
    })
}

/// Transient ranking table mapping entropy values to the words achieving
/// them. Keys within tolerance of each other share one group, so
/// floating-point noise cannot split words that are effectively tied.
#[derive(Debug, Default)]
pub struct EntropyTable {
    // Sorted ascending by entropy key.
    groups: Vec<(f64, Vec<String>)>,
}

impl EntropyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `word` under `entropy`, joining an existing group when the keys
    /// are within tolerance of each other.
    pub fn insert(&mut self, entropy: f64, word: String) {
        match self
            .groups
            .binary_search_by(|(key, _)| entropy_cmp(*key, entropy))
        {
            Ok(index) => self.groups[index].1.push(word),
            Err(index) => self.groups.insert(index, (entropy, vec![word])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The words tied for the highest entropy, in insertion order.
    pub fn best(&self) -> Option<&[String]> {
        self.groups.last().map(|(_, words)| words.as_slice())
    }

    /// The highest entropy filed so far.
    pub fn best_entropy(&self) -> Option<f64> {
        self.groups.last().map(|(entropy, _)| *entropy)
    }
}

/// Epsilon-aware ordering for ranked entropy values.
fn entropy_cmp(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= ENTROPY_EPSILON {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Ranks every candidate by the entropy of the feedback it would elicit from
/// the rest of the set. Quadratic in the candidate count: each word is
/// simulated against every other word.
pub fn rank_candidates(candidates: &[String], word_size: usize) -> EntropyTable {
    let mut table = EntropyTable::new();
    for (i, guess) in candidates.iter().enumerate() {
        let others = candidates
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, word)| word.as_str());
        let analysis = analyze_guess_against(guess, others, word_size);
        table.insert(analysis.entropy_bits(), guess.clone());
    }
    table
}

/// Picks the candidate expected to reveal the most information. Ties within
/// the ranking tolerance resolve to the earliest candidate. A lone candidate
/// is returned directly; an empty set yields `None` rather than a guess.
pub fn best_guess(candidates: &[String], word_size: usize) -> Option<String> {
    if candidates.len() <= 1 {
        return candidates.first().cloned();
    }
    rank_candidates(candidates, word_size)
        .best()
        .and_then(|words| words.first().cloned())
}

/// Keeps exactly the candidates that would have produced `pattern` had they
/// been the hidden word, preserving their relative order.
pub fn filter_candidates(
    pattern: Pattern,
    guess: &str,
    candidates: &[String],
    word_size: usize,
) -> Vec<String> {
    candidates
        .iter()
        .filter(|word| generate_pattern(guess, word, word_size) == pattern)
        .cloned()
        .collect()
}

/// Expands a WordNet installation root into the index files to read.
pub fn wordnet_sources(root: &Path) -> Vec<PathBuf> {
    WORDNET_INDEX_FILES
        .iter()
        .map(|file| root.join(file))
        .collect()
}

/// Reads every source into one deduplicated set of uppercase words.
/// Unreadable sources are skipped with a warning; they are not fatal.
pub fn load_words(sources: &[PathBuf]) -> HashSet<String> {
    let mut words = HashSet::new();
    for source in sources {
        match fs::read_to_string(source) {
            Ok(contents) => parse_word_list(&contents, &mut words),
            Err(err) => eprintln!("Skipping {}: {err}", source.display()),
        }
    }
    words
}

/// Extracts the first whitespace-delimited token from each line, ignoring
/// empty lines and lines starting with a space (WordNet license headers) as
/// well as tokens that are not purely ASCII letters.
fn parse_word_list(contents: &str, words: &mut HashSet<String>) {
    for line in contents.lines() {
        if line.is_empty() || line.starts_with(' ') {
            continue;
        }
        if let Some(token) = line.split_whitespace().next() {
            if token.chars().all(|ch| ch.is_ascii_alphabetic()) {
                words.insert(token.to_ascii_uppercase());
            }
        }
    }
}

/// A fixed-size word list, loaded once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Dictionary {
    word_size: usize,
    words: Vec<String>,
}

impl Dictionary {
    /// Builds a dictionary of `word_size` words from the given word-list files.
    pub fn load(word_size: usize, sources: &[PathBuf]) -> Result<Self, SolverError> {
        Self::from_words(word_size, load_words(sources))
    }

    /// Builds a dictionary from the bundled word list.
    pub fn bundled(word_size: usize) -> Result<Self, SolverError> {
        Self::from_words(word_size, BUNDLED_WORDS.iter().cloned())
    }

    /// Keeps the words of exactly `word_size` letters, normalized to
    /// uppercase and sorted for a reproducible candidate order.
    pub fn from_words(
        word_size: usize,
        words: impl IntoIterator<Item = String>,
    ) -> Result<Self, SolverError> {
        if !(MIN_WORD_SIZE..=MAX_WORD_SIZE).contains(&word_size) {
            return Err(SolverError::InvalidWordSize { size: word_size });
        }
        let mut words: Vec<String> = words
            .into_iter()
            .filter(|word| word.chars().count() == word_size)
            .map(|word| word.to_ascii_uppercase())
            .collect();
        words.sort();
        words.dedup();
        if words.is_empty() {
            return Err(SolverError::NoWords { word_size });
        }
        Ok(Self { word_size, words })
    }

    pub fn word_size(&self) -> usize {
        self.word_size
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Result of one self-play game against a randomly drawn hidden word.
#[derive(Debug, Clone)]
pub struct SelfPlayOutcome {
    /// The hidden word the game was played against.
    pub target: String,
    /// The winning guess, or `None` when the round budget ran out.
    pub solution: Option<String>,
    /// How many guesses were spent.
    pub rounds: usize,
}

impl SelfPlayOutcome {
    pub fn is_win(&self) -> bool {
        self.solution.is_some()
    }
}

/// Plays one game against a random hidden word drawn from `dictionary`,
/// allowing `word_size + 1` rounds of guess, feedback, filter.
pub fn play_random_game(dictionary: &Dictionary, rng: &mut impl Rng) -> SelfPlayOutcome {
    let word_size = dictionary.word_size();
    let target = dictionary
        .words()
        .choose(rng)
        .expect("dictionary is never empty")
        .clone();
    let all_green = Pattern::all_green(word_size);
    let mut candidates = dictionary.words().to_vec();

    for round in 1..=word_size + 1 {
        let Some(guess) = best_guess(&candidates, word_size) else {
            break;
        };
        let pattern = generate_pattern(&guess, &target, word_size);
        if pattern == all_green {
            return SelfPlayOutcome {
                target,
                solution: Some(guess),
                rounds: round,
            };
        }
        candidates = filter_candidates(pattern, &guess, &candidates, word_size);
    }

    SelfPlayOutcome {
        target,
        solution: None,
        rounds: word_size + 1,
    }
}

/// Interactive session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    CollectingFeedback,
    Won,
    Quit,
}

/// What a completed round of feedback did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The feedback was all Green; the working guess is the hidden word.
    Won,
    /// Candidates were narrowed. `next_guess` is `None` when the feedback
    /// contradicts every remaining word.
    Narrowed {
        next_guess: Option<String>,
        remaining: usize,
    },
}

/// One interactive solving session: a shrinking candidate set plus the guess
/// currently awaiting feedback.
#[derive(Debug, Clone)]
pub struct Session {
    word_size: usize,
    candidates: Vec<String>,
    last_guess: Option<String>,
    state: SessionState,
}

impl Session {
    pub fn new(dictionary: &Dictionary) -> Self {
        Self {
            word_size: dictionary.word_size(),
            candidates: dictionary.words().to_vec(),
            last_guess: None,
            state: SessionState::AwaitingCommand,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn word_size(&self) -> usize {
        self.word_size
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn last_guess(&self) -> Option<&str> {
        self.last_guess.as_deref()
    }

    /// Ranks the current candidates and adopts the winner as the working
    /// guess. `None` when no candidates remain.
    pub fn next_guess(&mut self) -> Option<String> {
        let guess = best_guess(&self.candidates, self.word_size)?;
        self.last_guess = Some(guess.clone());
        self.state = SessionState::CollectingFeedback;
        Some(guess)
    }

    /// Adopts `word` as the working guess directly, bypassing ranking.
    pub fn set_word(&mut self, word: &str) -> Result<(), SolverError> {
        let word = word.to_ascii_uppercase();
        let found = word.chars().count();
        if found != self.word_size {
            return Err(SolverError::InvalidLength {
                expected: self.word_size,
                found,
            });
        }
        if !word.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(SolverError::InvalidWord { word });
        }
        self.last_guess = Some(word);
        self.state = SessionState::CollectingFeedback;
        Ok(())
    }

    /// Drops the working guess from the candidate set, e.g. when the puzzle
    /// rejected it. Returns the removed word if it was still a candidate.
    pub fn remove_last(&mut self) -> Option<String> {
        let last = self.last_guess.as_ref()?;
        let index = self.candidates.iter().position(|word| word == last)?;
        Some(self.candidates.remove(index))
    }

    /// Marks the session as collecting feedback for the working guess.
    /// Returns false when there is no working guess yet.
    pub fn begin_feedback(&mut self) -> bool {
        if self.last_guess.is_some() {
            self.state = SessionState::CollectingFeedback;
            true
        } else {
            false
        }
    }

    /// Abandons a feedback round without filtering.
    pub fn abort_feedback(&mut self) {
        if self.state == SessionState::CollectingFeedback {
            self.state = SessionState::AwaitingCommand;
        }
    }

    pub fn quit(&mut self) {
        self.state = SessionState::Quit;
    }

    /// Applies one full round of per-letter feedback to the working guess.
    /// All-Green wins the session; anything else narrows the candidates and
    /// adopts the next ranked guess, if any, as the new working guess.
    pub fn apply_feedback(&mut self, colors: &[Color]) -> Result<FeedbackOutcome, SolverError> {
        let guess = self
            .last_guess
            .clone()
            .ok_or(SolverError::NoWorkingGuess)?;
        if colors.len() != self.word_size {
            return Err(SolverError::InvalidLength {
                expected: self.word_size,
                found: colors.len(),
            });
        }
        let pattern = build_pattern(colors, self.word_size)?;

        if pattern == Pattern::all_green(self.word_size) {
            self.state = SessionState::Won;
            return Ok(FeedbackOutcome::Won);
        }

        self.candidates = filter_candidates(pattern, &guess, &self.candidates, self.word_size);
        let next_guess = best_guess(&self.candidates, self.word_size);
        if let Some(next) = &next_guess {
            self.last_guess = Some(next.clone());
        }
        self.state = SessionState::AwaitingCommand;
        Ok(FeedbackOutcome::Narrowed {
            next_guess,
            remaining: self.candidates.len(),
        })
    }
}


/// Returns the bundled uppercase word list, every supported length mixed.
pub fn bundled_words() -> &'static [String] {
    BUNDLED_WORDS.as_slice()
}

//! Artifact names from a letter-trigram model.
//!
//! The model is trained on a fixed list of Elvish-flavoured words. Each
//! generated word follows the trained letter statistics and is 5 to 9
//! letters long.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::object::Artifact;

pub const MIN_WORD_LEN: usize = 5;
pub const MAX_WORD_LEN: usize = 9;
const WORD_ATTEMPTS: usize = 100;

/// Salt separating the name stream from the generation stream.
const NAME_SALT: u64 = 0x4E41_4D45_5F52_4E47;

/// Names the unique specials always carry.
const CANNED_NAMES: [(usize, &str); 3] = [
    (13, "of Power (The One Ring)"),
    (34, "of Morgoth"),
    (111, "'Grond'"),
];

const TRAINING_WORDS: &[&str] = &[
    "adanedhel", "aeglos", "aelin", "aerlinn", "alcarin", "alqualonde", "amarth", "anarion",
    "ancalime", "andune", "anduril", "angrist", "annatar", "arandil", "arathorn", "aredhel",
    "arnediad", "arvedui", "athelas", "avathar", "barahir", "belegost", "beleriand", "brethil",
    "calenardhon", "carcharoth", "celebrant", "celebrimbor", "cirdan", "dagnir", "dagorlad",
    "doriath", "dorthonion", "earendil", "echoriath", "edhellond", "eithel", "elanor",
    "elemmire", "elendil", "elentari", "elerrina", "ellesar", "elostirion", "erebor",
    "eregion", "esgaroth", "estelin", "faelivrin", "falathrim", "fanuilos", "finarfin",
    "forlindon", "galadhrim", "gilthoniel", "glamdring", "gondolin", "haldir", "himring",
    "hithlum", "ilmarin", "isildur", "ithilien", "laurelin", "lindorie", "lothlorien",
    "luthien", "mallorn", "menegroth", "minastir", "mithrandir", "morwen", "nargothrond",
    "nenuial", "nimloth", "nimrodel", "orodreth", "ossiriand", "palantir", "pelargir",
    "quendi", "rivendel", "silmarien", "tarannon", "telperion", "thalion", "thangorodrim",
    "tinuviel", "turgon", "valinor", "vingilot", "yavanna",
];

/// Boundary symbol: start of word in the context, end of word as the next
/// letter.
const EDGE: usize = 0;
const SYMBOLS: usize = 27;

fn symbol(c: char) -> Option<usize> {
    c.is_ascii_lowercase().then(|| (c as u8 - b'a') as usize + 1)
}

fn letter(sym: usize) -> char {
    (b'a' + (sym - 1) as u8) as char
}

/// Next-letter counts for every two-letter context.
pub struct TrigramModel {
    counts: Vec<[u32; SYMBOLS]>,
}

impl TrigramModel {
    pub fn train<'w>(words: impl IntoIterator<Item = &'w str>) -> Self {
        let mut counts = vec![[0u32; SYMBOLS]; SYMBOLS * SYMBOLS];
        for word in words {
            let (mut c1, mut c2) = (EDGE, EDGE);
            for sym in word.chars().filter_map(symbol) {
                counts[c1 * SYMBOLS + c2][sym] += 1;
                c1 = c2;
                c2 = sym;
            }
            counts[c1 * SYMBOLS + c2][EDGE] += 1;
        }
        Self { counts }
    }

    pub fn standard() -> Self {
        Self::train(TRAINING_WORDS.iter().copied())
    }

    fn next<R: Rng>(&self, rng: &mut R, c1: usize, c2: usize) -> Option<usize> {
        let row = &self.counts[c1 * SYMBOLS + c2];
        let total: u32 = row.iter().sum();
        if total == 0 {
            return None;
        }
        let mut draw = rng.gen_range(0..total);
        for (sym, &n) in row.iter().enumerate() {
            if draw < n {
                return Some(sym);
            }
            draw -= n;
        }
        None
    }

    fn attempt<R: Rng>(&self, rng: &mut R, max: usize) -> String {
        let mut word = String::new();
        let (mut c1, mut c2) = (EDGE, EDGE);
        while word.len() <= max {
            match self.next(rng, c1, c2) {
                Some(EDGE) | None => break,
                Some(sym) => {
                    word.push(letter(sym));
                    c1 = c2;
                    c2 = sym;
                }
            }
        }
        word
    }

    /// A capitalised word of `MIN_WORD_LEN..=MAX_WORD_LEN` letters.
    pub fn make_word<R: Rng>(&self, rng: &mut R) -> String {
        let word = (0..WORD_ATTEMPTS)
            .map(|_| self.attempt(rng, MAX_WORD_LEN))
            .find(|w| (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&w.len()))
            .unwrap_or_else(|| {
                let fits: Vec<&str> = TRAINING_WORDS
                    .iter()
                    .copied()
                    .filter(|w| (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&w.len()))
                    .collect();
                fits.choose(rng).copied().unwrap_or("elenya").to_string()
            });
        capitalise(&word)
    }
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Wrap a word the way artifact names read: `'Word'` or `of Word`.
pub fn display_name<R: Rng>(rng: &mut R, word: &str) -> String {
    if rng.gen_ratio(1, 3) {
        format!("'{word}'")
    } else {
        format!("of {word}")
    }
}

/// One display name per catalogue slot. Unused slots get an empty name and
/// specials with a canned name get that name.
pub fn name_set(seed: u64, artifacts: &[Artifact], special_indices: &[usize]) -> Vec<String> {
    let model = TrigramModel::standard();
    let mut rng = StdRng::seed_from_u64(seed ^ NAME_SALT);
    artifacts
        .iter()
        .map(|art| {
            if art.is_unused() {
                return String::new();
            }
            if special_indices.contains(&art.index) {
                return CANNED_NAMES
                    .iter()
                    .find(|(idx, _)| *idx == art.index)
                    .map_or_else(|| art.name.clone(), |(_, name)| name.to_string());
            }
            let word = model.make_word(&mut rng);
            display_name(&mut rng, &word)
        })
        .collect()
}

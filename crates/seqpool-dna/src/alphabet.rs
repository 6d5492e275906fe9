//! Sequence alphabets with letter/code translation.
//!
//! An [`Alphabet`] maps letters to small integer codes `0..len` and back.
//! Letters outside the core alphabet (including the wildcard itself) encode
//! to the sentinel code `len`, which downstream consumers such as the k-mer
//! codec treat as "not a countable letter". Translation is case-insensitive
//! for the built-in alphabets.

/// A sequence alphabet: core letters, an optional wildcard, and for DNA a
/// complement table over codes.
#[derive(Debug, Clone)]
pub struct Alphabet {
    /// Core letters, uppercase; `letters[code]` is the letter for `code`.
    letters: Vec<u8>,
    /// Letter byte to code; `NON_CORE` marks anything outside the core.
    codes: [u8; 256],
    /// Wildcard letter reported for the sentinel code, if any.
    wildcard: Option<u8>,
    /// `complement[code]` for DNA alphabets.
    complement: Option<Vec<u8>>,
}

/// Internal marker in the `codes` table for non-core letters.
const NON_CORE: u8 = u8::MAX;

impl Alphabet {
    /// The DNA alphabet `ACGT` with wildcard `N` and complement support.
    #[must_use]
    pub fn dna() -> Self {
        let mut alphabet = Self::custom(b"ACGT", Some(b'N'));
        alphabet.complement = Some(vec![3, 2, 1, 0]); // A<->T, C<->G
        alphabet
    }

    /// The 20-letter protein alphabet with wildcard `X`.
    #[must_use]
    pub fn protein() -> Self {
        Self::custom(b"ACDEFGHIKLMNPQRSTVWY", Some(b'X'))
    }

    /// Build an alphabet from arbitrary core letters.
    ///
    /// Letters are translated case-insensitively. The wildcard, if given,
    /// is what [`letter`](Self::letter) reports for the sentinel code.
    ///
    /// # Panics
    ///
    /// Panics if `letters` is empty, holds more than 254 entries, or
    /// contains a duplicate (case-insensitively).
    #[must_use]
    pub fn custom(letters: &[u8], wildcard: Option<u8>) -> Self {
        assert!(!letters.is_empty(), "alphabet must have at least one letter");
        assert!(letters.len() < usize::from(NON_CORE), "alphabet too large");

        let letters: Vec<u8> = letters.iter().map(u8::to_ascii_uppercase).collect();
        let mut codes = [NON_CORE; 256];
        for (code, &letter) in letters.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let code = code as u8;
            assert_eq!(codes[usize::from(letter)], NON_CORE, "duplicate letter in alphabet");
            codes[usize::from(letter)] = code;
            codes[usize::from(letter.to_ascii_lowercase())] = code;
        }
        Self { letters, codes, wildcard, complement: None }
    }

    /// Number of core letters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Whether the alphabet has no letters (never true for built-ins).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// The sentinel code assigned to non-core letters.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sentinel(&self) -> u8 {
        self.letters.len() as u8
    }

    /// Code for a core letter, or `None` for anything else.
    #[must_use]
    pub fn code(&self, letter: u8) -> Option<u8> {
        let code = self.codes[usize::from(letter)];
        (code != NON_CORE).then_some(code)
    }

    /// Letter for a code; the sentinel code maps to the wildcard (or `?`
    /// when the alphabet has none).
    #[must_use]
    pub fn letter(&self, code: u8) -> u8 {
        self.letters.get(usize::from(code)).copied().unwrap_or(self.wildcard.unwrap_or(b'?'))
    }

    /// Whether `code` denotes a core letter.
    #[must_use]
    pub fn is_core(&self, code: u8) -> bool {
        usize::from(code) < self.letters.len()
    }

    /// Translate a sequence to codes; non-core letters become the sentinel.
    #[must_use]
    pub fn encode(&self, seq: &[u8]) -> Vec<u8> {
        seq.iter().map(|&letter| self.code(letter).unwrap_or(self.sentinel())).collect()
    }

    /// Translate codes back to letters.
    #[must_use]
    pub fn decode(&self, codes: &[u8]) -> Vec<u8> {
        codes.iter().map(|&code| self.letter(code)).collect()
    }

    /// Complement of a code, for alphabets that define one.
    #[must_use]
    pub fn complement_code(&self, code: u8) -> Option<u8> {
        self.complement.as_ref()?.get(usize::from(code)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dna_translation() {
        let dna = Alphabet::dna();
        assert_eq!(dna.len(), 4);
        assert_eq!(dna.code(b'A'), Some(0));
        assert_eq!(dna.code(b'c'), Some(1)); // case-insensitive
        assert_eq!(dna.code(b'G'), Some(2));
        assert_eq!(dna.code(b'T'), Some(3));
        assert_eq!(dna.code(b'N'), None);
        assert_eq!(dna.code(b'-'), None);
        assert_eq!(dna.sentinel(), 4);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let dna = Alphabet::dna();
        let codes = dna.encode(b"ACGTNacgtX");
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
        // Non-core letters come back as the wildcard
        assert_eq!(dna.decode(&codes), b"ACGTNACGTN".to_vec());
    }

    #[test]
    fn test_complement_codes() {
        let dna = Alphabet::dna();
        for (code, comp) in [(0, 3), (1, 2), (2, 1), (3, 0)] {
            assert_eq!(dna.complement_code(code), Some(comp));
        }
        assert_eq!(dna.complement_code(4), None); // sentinel has no complement

        let protein = Alphabet::protein();
        assert_eq!(protein.complement_code(0), None);
    }

    #[test]
    fn test_protein_alphabet() {
        let protein = Alphabet::protein();
        assert_eq!(protein.len(), 20);
        assert_eq!(protein.code(b'A'), Some(0));
        assert_eq!(protein.code(b'Y'), Some(19));
        assert_eq!(protein.code(b'X'), None);
        assert_eq!(protein.letter(protein.sentinel()), b'X');
    }

    #[test]
    fn test_custom_alphabet() {
        let binary = Alphabet::custom(b"01", None);
        assert_eq!(binary.len(), 2);
        assert_eq!(binary.encode(b"0110?"), vec![0, 1, 1, 0, 2]);
        assert_eq!(binary.letter(2), b'?');
    }

    #[test]
    #[should_panic(expected = "duplicate letter")]
    fn test_duplicate_letters_rejected() {
        let _ = Alphabet::custom(b"ACGA", None);
    }
}

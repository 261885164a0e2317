//! Challenge answer generation.

use rand::Rng;

use crate::config::ChallengeConfig;

/// Draws answers uniformly from a fixed alphabet
#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl ChallengeGenerator {
    pub fn new(alphabet: &str, length: usize) -> Self {
        Self {
            alphabet: alphabet.chars().collect(),
            length,
        }
    }

    pub fn from_config(settings: &ChallengeConfig) -> Self {
        Self::new(&settings.alphabet, settings.answer_len)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn contains(&self, c: char) -> bool {
        self.alphabet.contains(&c)
    }

    /// Generate a random answer string
    pub fn generate(&self, rng: &mut impl Rng) -> String {
        (0..self.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vigil_common::constants::challenge::ALPHABET;

    #[test]
    fn test_generate_answer() {
        let generator = ChallengeGenerator::new(ALPHABET, 5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let answer = generator.generate(&mut rng);
            assert_eq!(answer.chars().count(), 5);
            assert!(answer.chars().all(|c| generator.contains(c)));
        }
    }

    #[test]
    fn test_alphabet_coverage() {
        let generator = ChallengeGenerator::new(ALPHABET, 1);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5_000 {
            seen.extend(generator.generate(&mut rng).chars());
        }
        assert_eq!(seen.len(), ALPHABET.chars().count());
    }

    #[test]
    fn test_symbols_are_drawn() {
        let generator = ChallengeGenerator::new("!$%&?+*@#", 8);
        let answer = generator.generate(&mut rand::rng());
        assert!(answer.chars().all(|c| !c.is_ascii_alphanumeric()));
    }
}

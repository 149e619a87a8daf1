/// Trivia shown in the "Did you know?" panel.
pub const CAT_FACTS: &[&str] = &[
    "Cats sleep for around 13 to 16 hours a day.",
    "A group of cats is called a clowder.",
    "Cats have five toes on their front paws but only four on the back.",
    "A cat's purr vibrates at a frequency of 25 to 150 hertz.",
    "Cats can rotate their ears 180 degrees.",
    "Cats see about six times better than humans in dim light.",
    "A cat's nose print is unique, much like a human fingerprint.",
    "Cats walk like camels and giraffes, moving both right legs, then both left legs.",
    "Adult cats only meow to communicate with humans, not with each other.",
    "Cats can jump up to six times their own length.",
    "The oldest known pet cat was buried with its owner about 9,500 years ago.",
    "Cats chase laser dots because the fast, erratic movement looks like prey.",
];

/// Picks a random fact on every rotation.
pub struct FactRotator {
    facts: &'static [&'static str],
    current: usize,
    rng: fastrand::Rng,
}

impl FactRotator {
    pub fn new(facts: &'static [&'static str], mut rng: fastrand::Rng) -> Self {
        let current = if facts.is_empty() {
            0
        } else {
            rng.usize(0..facts.len())
        };
        Self { facts, current, rng }
    }

    pub fn current(&self) -> &'static str {
        self.facts.get(self.current).copied().unwrap_or("")
    }

    /// Switch to a different random fact.
    pub fn rotate(&mut self) -> &'static str {
        let len = self.facts.len();
        if len > 1 {
            // Skip over the current index so the panel always changes.
            let pick = self.rng.usize(0..len - 1);
            self.current = if pick >= self.current { pick + 1 } else { pick };
        }
        self.current()
    }
}

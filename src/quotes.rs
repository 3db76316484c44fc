//! Motivational quotes shown at launch and when a study session completes.

use rand::Rng;

/// The fixed quote list. Read-only for the lifetime of the program.
pub const QUOTES: &[&str] = &[
    "Keep going, you're doing great!",
    "Every step counts, no matter how small.",
    "Focus. Breathe. Believe.",
    "You’re capable of amazing things.",
    "One hour today can change your future.",
];

/// Pick a quote uniformly at random using the thread RNG
pub fn pick_quote() -> &'static str {
    pick_quote_with(&mut rand::thread_rng())
}

/// Pick a quote uniformly at random using the given RNG
pub fn pick_quote_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUOTES[rng.gen_range(0..QUOTES.len())]
}

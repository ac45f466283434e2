use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Proof of lock ownership.
///
/// A `Token` is minted every time a [`Mutex`](super::Mutex) is granted to a
/// task and must be handed back to [`Mutex::release`](super::Mutex::release).
/// It is a 128-bit identifier, displayed as a hyphenated UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Uuid);

impl Token {
    /// Returns the identifier carried by this token.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Token {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<Token> for Uuid {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for Token {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Source of fresh tokens.
///
/// A mutex asks its source for a new token on every grant. Implementations
/// must not hand out the same value twice during the mutex's lifetime.
/// Any `FnMut() -> Token` closure is a `TokenSource`.
pub trait TokenSource {
    /// Produces the next token.
    fn mint(&mut self) -> Token;
}

impl<F> TokenSource for F
where
    F: FnMut() -> Token,
{
    fn mint(&mut self) -> Token {
        self()
    }
}

/// Random version 4 UUID tokens.
///
/// This is the default source of [`Mutex`](super::Mutex).
#[derive(Debug, Clone)]
pub struct RandomTokens {
    rng: StdRng,
}

impl RandomTokens {
    /// Creates a source seeded from operating system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a source that yields the same token sequence for the same
    /// `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for RandomTokens {
    fn mint(&mut self) -> Token {
        let bytes: [u8; 16] = self.rng.r#gen();
        Token(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

/// Deterministic tokens `1, 2, 3, ...` encoded as UUIDs.
///
/// Intended for tests and traces that need predictable values.
#[derive(Debug, Clone)]
pub struct SequentialTokens {
    next: u128,
}

impl SequentialTokens {
    /// Creates a source whose first token is `00000000-0000-0000-0000-000000000001`.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a source whose first token encodes `first`.
    pub fn starting_at(first: u128) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for SequentialTokens {
    fn mint(&mut self) -> Token {
        let token = Token(Uuid::from_u128(self.next));
        self.next = self.next.wrapping_add(1);
        token
    }
}

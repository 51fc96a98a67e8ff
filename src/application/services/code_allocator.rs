//! Short code allocation with a bounded uniqueness pre-check.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{Alphabet, RandomSource, ThreadRandom};

/// Millisecond clock feeding the leading component of generated codes.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Wall clock in UTC milliseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Tunables for [`CodeAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorSettings {
    /// Candidates tried before giving up with [`AppError::CodeExhausted`].
    pub max_attempts: u32,
    /// Random symbols appended after the encoded timestamp.
    pub suffix_length: usize,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            suffix_length: 2,
        }
    }
}

/// Produces short codes not yet present in the link store.
///
/// A candidate is `encode(now_millis) + random_suffix(suffix_length)`. The
/// timestamp keeps codes roughly time-ordered; the suffix absorbs codes
/// generated within the same millisecond. Each candidate is checked with
/// [`LinkRepository::find_by_code`] and regenerated on collision.
///
/// The check is a pre-check only: two concurrent allocations can still pick
/// the same code, and the store's unique constraint decides on insert.
pub struct CodeAllocator<L: LinkRepository + ?Sized> {
    links: Arc<L>,
    alphabet: Alphabet,
    settings: AllocatorSettings,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl<L: LinkRepository + ?Sized> CodeAllocator<L> {
    /// Creates an allocator using the base-62 alphabet, the system clock,
    /// and the thread-local random generator.
    pub fn new(links: Arc<L>, settings: AllocatorSettings) -> Self {
        Self {
            links,
            alphabet: Alphabet::base62(),
            settings,
            clock: Arc::new(SystemClock),
            random: Arc::new(ThreadRandom),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Builds one candidate code without consulting the store.
    pub fn candidate(&self) -> String {
        let mut code = self.alphabet.encode(self.clock.now_millis());
        code.push_str(
            &self
                .alphabet
                .random_suffix(self.settings.suffix_length, self.random.as_ref()),
        );
        code
    }

    /// Returns a code that was free in the store at the time of the check.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeExhausted`] after `max_attempts` collisions.
    /// Store errors are propagated unchanged.
    pub async fn allocate(&self) -> Result<String, AppError> {
        let max_attempts = self.settings.max_attempts;

        for attempt in 1..=max_attempts {
            let code = self.candidate();

            if self.links.find_by_code(&code).await?.is_none() {
                debug!(%code, attempt, "Allocated short code");
                return Ok(code);
            }

            debug!(%code, attempt, "Short code collision");
        }

        warn!(attempts = max_attempts, "Short code allocation exhausted");
        Err(AppError::CodeExhausted {
            attempts: max_attempts,
        })
    }
}

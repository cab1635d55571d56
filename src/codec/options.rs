//! Codec configuration: target game selector and verification policy.

use std::fmt;

use crate::util::{Error, Result};

/// Game a CMDL document was authored for.
///
/// Each title writes a fixed model version; the version gates optional fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Game {
    Prime,
    Echoes,
    Corruption,
}

impl Game {
    /// All supported games.
    pub const ALL: [Game; 3] = [Game::Prime, Game::Echoes, Game::Corruption];

    /// Model version written by this game.
    #[inline]
    pub const fn model_version(self) -> u32 {
        match self {
            Self::Prime => 2,
            Self::Echoes => 4,
            Self::Corruption => 5,
        }
    }

    /// Game that writes the given model version.
    pub fn from_model_version(version: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.model_version() == version)
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prime => "prime",
            Self::Echoes => "echoes",
            Self::Corruption => "corruption",
        }
    }

    /// Parse a game from its short name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How informational stored fields are treated on decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Stale computed fields and game/version disagreements are errors.
    #[default]
    Strict,
    /// Trust the stream; disagreements are logged and recomputed on encode.
    Lenient,
}

/// Options shared by decode and encode.
#[derive(Clone, Debug, Default)]
pub struct CodecOptions {
    /// Game selector supplied by the caller, if known.
    pub target_game: Option<Game>,
    /// Verification policy.
    pub strictness: Strictness,
}

impl CodecOptions {
    /// Strict options without a game selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict options for a specific game.
    pub fn for_game(game: Game) -> Self {
        Self::new().with_game(game)
    }

    /// Set the target game.
    pub fn with_game(mut self, game: Game) -> Self {
        self.target_game = Some(game);
        self
    }

    /// Set the verification policy.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Switch to lenient verification.
    pub fn lenient(self) -> Self {
        self.with_strictness(Strictness::Lenient)
    }

    /// Check if strict verification is enabled.
    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }

    /// Check the document version against the target game, if one is set.
    pub fn check_version(&self, version: u32) -> Result<()> {
        let Some(game) = self.target_game else {
            return Ok(());
        };
        if game.model_version() == version {
            return Ok(());
        }
        if self.is_strict() {
            return Err(Error::VersionMismatch {
                game: game.name(),
                expected: game.model_version(),
                found: version,
            });
        }
        tracing::warn!(
            "target game {} expects model version {}, document has {}",
            game,
            game.model_version(),
            version
        );
        Ok(())
    }

    /// Apply the padding policy to bytes skipped for alignment.
    ///
    /// `offset` is the stream offset of the first padding byte.
    pub fn check_padding(&self, offset: usize, padding: &[u8]) -> Result<()> {
        let Some(i) = padding.iter().position(|&b| b != 0) else {
            return Ok(());
        };
        let err = Error::NonZeroPadding { offset: offset + i, value: padding[i] };
        if self.is_strict() {
            return Err(err);
        }
        tracing::warn!("{} (will be zeroed on encode)", err);
        Ok(())
    }

    /// Apply the stale-field policy to a stored value and its derived counterpart.
    pub fn check_computed(&self, field: &'static str, stored: u64, derived: u64) -> Result<()> {
        if stored == derived {
            return Ok(());
        }
        if self.is_strict() {
            return Err(Error::StaleComputedField { field, stored, derived });
        }
        tracing::warn!(
            "stale {}: stored {}, derived {} (will be rebuilt on encode)",
            field,
            stored,
            derived
        );
        Ok(())
    }
}

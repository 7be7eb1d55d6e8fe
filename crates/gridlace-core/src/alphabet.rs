//! Symbol alphabets.
//!
//! An [`Alphabet`] decides which characters a puzzle's symbols parse from
//! and render as. Nothing in the solving machinery depends on the choice of
//! characters; `@xqb%d7!4` works as well as `123456789` for a 9×9 puzzle.

use derive_more::{Display, Error};

use crate::{MAX_GRID_SIZE, Symbol};

/// Default symbol characters: digits first, then uppercase letters.
const DEFAULT_CHARS: &str = "123456789ABCDEFGHIJKLMNOPQRSTUVW";

/// Default character standing for an unresolved cell.
const DEFAULT_PLACEHOLDER: char = '.';

/// Errors from alphabet construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum AlphabetError {
    /// No default alphabet exists for the requested size.
    #[display("no default alphabet for size {size} (supported sizes: 1-{})", MAX_GRID_SIZE)]
    UnsupportedSize {
        /// The requested alphabet size.
        size: u8,
    },
    /// The same character was supplied for two symbols.
    #[display("duplicate symbol character {symbol:?}")]
    DuplicateSymbol {
        /// The repeated character.
        symbol: char,
    },
    /// The placeholder character is also a symbol character.
    #[display("placeholder {placeholder:?} collides with a symbol character")]
    PlaceholderCollision {
        /// The colliding placeholder.
        placeholder: char,
    },
}

/// The ordered, distinct characters a puzzle's symbols render as, plus the
/// placeholder character standing for an unresolved cell.
///
/// # Examples
///
/// ```
/// use gridlace_core::{Alphabet, Symbol};
///
/// let alphabet = Alphabet::for_size(12)?;
/// assert_eq!(alphabet.char_of(Symbol::new(0)), '1');
/// assert_eq!(alphabet.char_of(Symbol::new(11)), 'C');
/// assert_eq!(alphabet.symbol_of('A'), Some(Symbol::new(9)));
/// assert_eq!(alphabet.symbol_of('.'), None);
/// # Ok::<(), gridlace_core::AlphabetError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
    placeholder: char,
}

impl Alphabet {
    /// The default alphabet for a grid of the given size: the first `size`
    /// characters of `1-9` then `A-W`, with `.` as the placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`AlphabetError::UnsupportedSize`] if `size` is zero or
    /// exceeds [`MAX_GRID_SIZE`].
    pub fn for_size(size: u8) -> Result<Self, AlphabetError> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(AlphabetError::UnsupportedSize { size });
        }
        Ok(Self {
            chars: DEFAULT_CHARS.chars().take(usize::from(size)).collect(),
            placeholder: DEFAULT_PLACEHOLDER,
        })
    }

    /// Builds an alphabet from custom symbol characters, keeping `.` as the
    /// placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if a character repeats, if a character equals the
    /// placeholder, or if there are zero or more than [`MAX_GRID_SIZE`]
    /// characters.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Result<Self, AlphabetError> {
        let chars: Vec<char> = chars.into_iter().collect();
        if chars.is_empty() || chars.len() > usize::from(MAX_GRID_SIZE) {
            return Err(AlphabetError::UnsupportedSize {
                size: u8::try_from(chars.len()).unwrap_or(u8::MAX),
            });
        }
        for (i, &ch) in chars.iter().enumerate() {
            if chars[..i].contains(&ch) {
                return Err(AlphabetError::DuplicateSymbol { symbol: ch });
            }
        }
        Self {
            chars,
            placeholder: DEFAULT_PLACEHOLDER,
        }
        .check_placeholder()
    }

    /// Replaces the placeholder character.
    ///
    /// # Errors
    ///
    /// Returns [`AlphabetError::PlaceholderCollision`] if the placeholder is
    /// also a symbol character.
    pub fn with_placeholder(mut self, placeholder: char) -> Result<Self, AlphabetError> {
        self.placeholder = placeholder;
        self.check_placeholder()
    }

    fn check_placeholder(self) -> Result<Self, AlphabetError> {
        if self.chars.contains(&self.placeholder) {
            return Err(AlphabetError::PlaceholderCollision {
                placeholder: self.placeholder,
            });
        }
        Ok(self)
    }

    /// The number of symbols in the alphabet.
    #[must_use]
    #[inline]
    pub fn size(&self) -> u8 {
        #[expect(clippy::cast_possible_truncation)]
        let size = self.chars.len() as u8;
        size
    }

    /// The character standing for an unresolved cell.
    #[must_use]
    #[inline]
    pub fn placeholder(&self) -> char {
        self.placeholder
    }

    /// Looks up the symbol a character stands for, if any.
    ///
    /// The placeholder is not a symbol and maps to `None`.
    #[must_use]
    pub fn symbol_of(&self, ch: char) -> Option<Symbol> {
        self.chars.iter().position(|&c| c == ch).map(|i| {
            #[expect(clippy::cast_possible_truncation)]
            let index = i as u8;
            Symbol::new(index)
        })
    }

    /// The character the given symbol renders as.
    ///
    /// # Panics
    ///
    /// Panics if the symbol's index is outside this alphabet.
    #[must_use]
    pub fn char_of(&self, symbol: Symbol) -> char {
        self.chars[usize::from(symbol.index())]
    }

    /// Iterates over every symbol of the alphabet in order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + use<> {
        (0..self.size()).map(Symbol::new)
    }
}

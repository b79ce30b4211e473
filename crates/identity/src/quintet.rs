//! Quintet codec: a total bijection between fixed-width unsigned integers and pronounceable text.
//!
//! # Word Layout
//!
//! Each 16-bit word becomes five letters (consonant, vowel, consonant, vowel, consonant).
//! Bit ranges are taken low to high:
//!
//! | Letter | Bits       | Alphabet           |
//! |--------|------------|--------------------|
//! | `c1`   | `[0, 4)`   | `bdfghjklmnprstvz` |
//! | `v1`   | `[4, 6)`   | `aiou`             |
//! | `c2`   | `[6, 10)`  | `bdfghjklmnprstvz` |
//! | `v2`   | `[10, 12)` | `aiou`             |
//! | `c3`   | `[12, 16)` | `bdfghjklmnprstvz` |
//!
//! Wider integers are split into words most-significant first and joined with `-`, so
//! `encode(42u64)` is `babab-babab-babab-pobab`.

use crate::error::{MalformedIdentifier, MalformedReason};

/// Consonant alphabet, indexed by a 4-bit nibble.
pub const CONSONANTS: &[u8; 16] = b"bdfghjklmnprstvz";
/// Vowel alphabet, indexed by a 2-bit pair.
pub const VOWELS: &[u8; 4] = b"aiou";
/// Letters per encoded word.
pub const WORD_LEN: usize = 5;
/// Separator between encoded words.
pub const SEPARATOR: char = '-';

/// Slot kinds in letter order.
const SLOTS: [Slot; WORD_LEN] = [Slot::Consonant, Slot::Vowel, Slot::Consonant, Slot::Vowel, Slot::Consonant];
/// Bit offset of each letter in the word.
const SHIFTS: [u32; WORD_LEN] = [0, 4, 6, 10, 12];

#[derive(Clone, Copy)]
enum Slot {
	Consonant,
	Vowel,
}

impl Slot {
	const fn alphabet(self) -> &'static [u8] {
		match self {
			Self::Consonant => CONSONANTS,
			Self::Vowel => VOWELS,
		}
	}

	const fn mask(self) -> u16 {
		match self {
			Self::Consonant => 0xF,
			Self::Vowel => 0x3,
		}
	}
}

mod sealed {
	pub trait Sealed {}
}

/// Unsigned integer widths the codec supports.
pub trait QuintetInt: Copy + sealed::Sealed {
	/// Number of 16-bit words in this width.
	const WORDS: usize;

	/// Returns word `index`, counting from the most significant.
	fn word(self, index: usize) -> u16;

	/// Rebuilds the integer from words in most-significant-first order.
	fn from_words(words: &[u16]) -> Self;
}

macro_rules! impl_quintet_int {
	($($ty:ty),* $(,)?) => {
		$(
			impl sealed::Sealed for $ty {}

			impl QuintetInt for $ty {
				const WORDS: usize = <$ty>::BITS as usize / 16;

				fn word(self, index: usize) -> u16 {
					(self >> (16 * (Self::WORDS - 1 - index))) as u16
				}

				fn from_words(words: &[u16]) -> Self {
					words.iter().fold(0u128, |acc, &word| (acc << 16) | u128::from(word)) as $ty
				}
			}
		)*
	};
}

impl_quintet_int!(u16, u32, u64, u128);

/// Encodes one word as five ASCII letters.
pub const fn encode_word(word: u16) -> [u8; WORD_LEN] {
	let mut out = [0u8; WORD_LEN];
	let mut i = 0;
	while i < WORD_LEN {
		let slot = SLOTS[i];
		out[i] = slot.alphabet()[((word >> SHIFTS[i]) & slot.mask()) as usize];
		i += 1;
	}
	out
}

/// Encodes an integer as hyphen-joined words, most-significant word first.
pub fn encode<N: QuintetInt>(n: N) -> String {
	let mut out = String::with_capacity(N::WORDS * (WORD_LEN + 1));
	for index in 0..N::WORDS {
		if index > 0 {
			out.push(SEPARATOR);
		}
		out.extend(encode_word(n.word(index)).map(char::from));
	}
	out
}

/// Decodes hyphen-joined words into an integer of width `N`.
pub fn decode<N: QuintetInt>(text: &str) -> Result<N, MalformedIdentifier> {
	let found = text.split(SEPARATOR).count();
	if found != N::WORDS {
		return Err(MalformedIdentifier::new(
			text,
			MalformedReason::GroupCount {
				expected: N::WORDS,
				found,
			},
		));
	}

	let mut words = Vec::with_capacity(N::WORDS);
	for (group, chunk) in text.split(SEPARATOR).enumerate() {
		let word = decode_group(group, chunk).map_err(|reason| MalformedIdentifier::new(text, reason))?;
		words.push(word);
	}
	Ok(N::from_words(&words))
}

/// Decodes a single five-letter word.
pub fn decode_word(text: &str) -> Result<u16, MalformedIdentifier> {
	decode::<u16>(text)
}

fn decode_group(group: usize, chunk: &str) -> Result<u16, MalformedReason> {
	if let Some((position, found)) = chunk.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
		let len = chunk.chars().count();
		if len != WORD_LEN {
			return Err(MalformedReason::GroupLength { group, len });
		}
		return Err(MalformedReason::UnknownCharacter { group, position, found });
	}
	if chunk.len() != WORD_LEN {
		return Err(MalformedReason::GroupLength { group, len: chunk.len() });
	}
	match decode_word_bytes(chunk.as_bytes()) {
		Ok(word) => Ok(word),
		Err(position) => Err(MalformedReason::UnknownCharacter {
			group,
			position,
			found: chunk.as_bytes()[position] as char,
		}),
	}
}

/// Decodes five ASCII letters, returning the position of the first invalid letter on failure.
const fn decode_word_bytes(bytes: &[u8]) -> Result<u16, usize> {
	let mut word = 0u16;
	let mut i = 0;
	while i < WORD_LEN {
		match index_of(SLOTS[i].alphabet(), bytes[i]) {
			Some(value) => word |= value << SHIFTS[i],
			None => return Err(i),
		}
		i += 1;
	}
	Ok(word)
}

const fn index_of(alphabet: &[u8], byte: u8) -> Option<u16> {
	let mut i = 0;
	while i < alphabet.len() {
		if alphabet[i] == byte {
			return Some(i as u16);
		}
		i += 1;
	}
	None
}

/// Compile-time decoder for 64-bit identifiers (four words, 23 bytes).
pub(crate) const fn decode_u64_const(text: &str) -> Option<u64> {
	const GROUPS: usize = 4;
	let bytes = text.as_bytes();
	if bytes.len() != GROUPS * WORD_LEN + GROUPS - 1 {
		return None;
	}

	let mut raw = 0u64;
	let mut group = 0;
	while group < GROUPS {
		let start = group * (WORD_LEN + 1);
		if group > 0 && bytes[start - 1] != SEPARATOR as u8 {
			return None;
		}
		let (_, rest) = bytes.split_at(start);
		let (chunk, _) = rest.split_at(WORD_LEN);
		match decode_word_bytes(chunk) {
			Ok(word) => raw = (raw << 16) | word as u64,
			Err(_) => return None,
		}
		group += 1;
	}
	Some(raw)
}

use thiserror::Error;

/// Why a piece of text failed to decode as quintet words.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
	/// A group between separators did not have exactly five letters.
	#[error("group {group} has {len} characters, expected 5")]
	GroupLength { group: usize, len: usize },
	/// A letter outside the consonant or vowel alphabet for its slot.
	#[error("group {group} has unexpected character {found:?} at position {position}")]
	UnknownCharacter { group: usize, position: usize, found: char },
	/// The number of groups does not match the target integer width.
	#[error("found {found} groups, expected {expected}")]
	GroupCount { expected: usize, found: usize },
}

/// Text that is not a valid quintet encoding for the requested width.
///
/// Never retried: the input is wrong, not the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed identifier {input:?}: {reason}")]
pub struct MalformedIdentifier {
	input: String,
	reason: MalformedReason,
}

impl MalformedIdentifier {
	pub fn new(input: impl Into<String>, reason: MalformedReason) -> Self {
		Self {
			input: input.into(),
			reason,
		}
	}

	/// The text that failed to decode.
	pub fn input(&self) -> &str {
		&self.input
	}

	pub fn reason(&self) -> MalformedReason {
		self.reason
	}
}

//! Remote command descriptors and the catalog of commonly supported commands.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Error returned when a custom command descriptor fails validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CommandError {
	/// The command code was empty.
	#[error("Command name cannot be empty.")]
	EmptyName,
	/// The path was empty once surrounding slashes were removed.
	#[error("Command path cannot be empty.")]
	EmptyPath,
	/// The path contains a character that could change the query, fragment, or encoding.
	#[error("Command path contains the character {character:?}.")]
	InvalidPathCharacter {
		/// First offending character.
		character: char,
	},
	/// The path contains an empty, `.`, or `..` segment.
	#[error("Command path contains the segment {segment:?}.")]
	InvalidPathSegment {
		/// Offending segment.
		segment: String,
	},
}

/// Remote command descriptor: the command code plus the path segment it is posted to.
///
/// The path is relative to `/v1/accounts/{uid}/vehicles/{vin}/` and can never climb out of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Command {
	name: Cow<'static, str>,
	path: Cow<'static, str>,
}
impl Command {
	/// Requests a full status refresh from an electric vehicle.
	pub const DEEP_REFRESH: Self = Self::known("DEEPREFRESH", "ev");
	/// Starts charging immediately.
	pub const CHARGE_NOW: Self = Self::known("CNOW", "ev/chargenow");
	/// Asks the vehicle to report its current location.
	pub const REFRESH_LOCATION: Self = Self::known("VF", "location");
	/// Flashes the lights.
	pub const LIGHTS: Self = Self::known("HBLF", "remote");
	/// Starts climate preconditioning.
	pub const PRECONDITION: Self = Self::known("ROPRECOND", "remote");
	/// Locks the doors.
	pub const LOCK_DOORS: Self = Self::known("RDL", "remote");
	/// Unlocks the doors.
	pub const UNLOCK_DOORS: Self = Self::known("RDU", "remote");

	const fn known(name: &'static str, path: &'static str) -> Self {
		Self { name: Cow::Borrowed(name), path: Cow::Borrowed(path) }
	}

	/// Creates a custom command descriptor after validating its path.
	///
	/// Surrounding slashes are dropped. Only ASCII alphanumerics, `-`, `_`, `.`, and inner `/`
	/// separators are accepted, and no segment may be empty, `.`, or `..`.
	pub fn new(
		name: impl Into<Cow<'static, str>>,
		path: impl Into<Cow<'static, str>>,
	) -> Result<Self, CommandError> {
		let name = name.into();

		if name.is_empty() {
			return Err(CommandError::EmptyName);
		}

		let path = validate_path(&path.into())?.to_owned();

		Ok(Self { name, path: Cow::Owned(path) })
	}

	/// Command code sent as the `command` body field.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Path below the vehicle resource the command is posted to, without surrounding slashes.
	pub fn path(&self) -> &str {
		&self.path
	}
}
impl Display for Command {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} ({})", self.name, self.path)
	}
}

fn validate_path(raw: &str) -> Result<&str, CommandError> {
	let path = raw.trim_matches('/');

	if path.is_empty() {
		return Err(CommandError::EmptyPath);
	}
	if let Some(character) =
		path.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')))
	{
		return Err(CommandError::InvalidPathCharacter { character });
	}
	if let Some(segment) =
		path.split('/').find(|segment| segment.is_empty() || matches!(*segment, "." | ".."))
	{
		return Err(CommandError::InvalidPathSegment { segment: segment.to_owned() });
	}

	Ok(path)
}

//! Constants used throughout the Ancestry library.
//!
//! Central definitions for the persisted path format and the store file format.

/// Separator placed between identifiers in an encoded ancestry path.
pub const PATH_SEPARATOR: char = '/';

/// The current persistence file format version for the in-memory store.
/// v0 indicates this is an unstable format subject to breaking changes.
pub const PERSISTENCE_VERSION: u8 = 0;

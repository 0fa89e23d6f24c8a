//! Error types for rename requests.

use thiserror::Error;

use crate::syntax::DeclarationKind;

/// Reasons a rename request is rejected outright.
///
/// A cursor that does not sit on a renamable token is not an error: the
/// engine answers with an empty change set instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    /// The new name is empty or only whitespace.
    #[error("New name must not be empty")]
    EmptyName,

    /// Another declaration of the same kind already uses the new name.
    #[error("A {kind} named '{name}' already exists")]
    NameCollision { name: String, kind: DeclarationKind },
}

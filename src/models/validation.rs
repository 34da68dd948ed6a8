//! Field identifiers and the field → error mapping returned by validation.

use crate::errors::FieldError;
use std::{collections::BTreeMap, fmt};

/// A field of the submission draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    StartDateTime,
    Location,
    Media,
    TermsAccepted,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::StartDateTime,
        Field::Location,
        Field::Media,
        Field::TermsAccepted,
    ];

    /// Name used on the wire and by the presentation shell.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::StartDateTime => "startDateTime",
            Field::Location => "location",
            Field::Media => "media",
            Field::TermsAccepted => "termsAccepted",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed rule, reported against the field it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub reason: FieldError,
}

/// Mapping from field to error. A field that is absent is currently valid.
///
/// Always recomputed from the draft; never kept across edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: Field) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failed fields in declaration order.
    pub fn errors(&self) -> impl Iterator<Item = ValidationError> + '_ {
        self.errors
            .iter()
            .map(|(field, reason)| ValidationError {
                field: *field,
                reason: *reason,
            })
    }

    pub(crate) fn insert(&mut self, field: Field, reason: FieldError) {
        self.errors.insert(field, reason);
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in self.errors() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.reason)?;
            first = false;
        }
        Ok(())
    }
}

//! conversion errors
//!
//! Every error is terminal for a run. The message names the entity kind, the key values of the
//! offending row, where the row came from and the column/value at fault.
use crate::entity::{EntityKey, Kind, TemplateRef};
use crate::tables::Location;
use std::fmt::Display;

/// The row an error refers to
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub kind: Kind,
    pub key: EntityKey,
    pub location: Location,
}

impl Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.key, self.location)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("missing required {0} table ({})", .0.file_name())]
    MissingTable(Kind),

    #[error("{origin}: malformed row, column `{column}` {reason}")]
    MalformedRow {
        origin: Origin,
        column: &'static str,
        reason: String,
    },

    #[error("{origin}: invalid boolean `{value}` in column `{column}`, expected true or false")]
    InvalidBoolean {
        origin: Origin,
        column: &'static str,
        value: String,
    },

    #[error("{origin}: invalid CIDR `{value}` in column `{column}`: {reason}")]
    InvalidCidr {
        origin: Origin,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("{origin}: invalid value `{value}` in column `{column}`, expected one of: {}", join(.allowed))]
    InvalidEnum {
        origin: Origin,
        column: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("duplicate {kind} {key}: {duplicate} repeats {first}")]
    DuplicateEntity {
        kind: Kind,
        key: EntityKey,
        first: Location,
        duplicate: Location,
    },

    #[error("{origin}: {column} `{target}` does not match any {target_kind}")]
    UnresolvedReference {
        origin: Origin,
        column: &'static str,
        target: String,
        target_kind: Kind,
    },

    #[error(
        "{origin}: {column} `{target}` is ambiguous, found a {target_kind} of that name in {}{}",
        join(.candidates),
        qualify_hint(.column)
    )]
    AmbiguousReference {
        origin: Origin,
        column: &'static str,
        target: String,
        target_kind: Kind,
        candidates: Vec<TemplateRef>,
    },
}

fn qualify_hint(column: &str) -> String {
    match crate::entity::columns::qualifiers(column) {
        Some((schema, template)) => {
            format!("; add `{schema}` and `{template}` columns to qualify it")
        }
        None => String::new(),
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

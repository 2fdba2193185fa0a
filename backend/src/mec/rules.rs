//! Conditional business rules of the MEC mapping.
//!
//! - [`art_resolution`] - `resolution` attribute per art kind and work type
//! - [`parse_ratings`] - lenient `country:system:value;...` parsing
//! - [`ROLES`] / [`collect_people`] - credited people with billing order

use std::collections::HashMap;

use crate::field::{get_field, Field, Table};
use crate::models::{ArtKind, JobFunction, Person, Rating, WorkType};

// =============================================================================
// Art
// =============================================================================

/// Delivery resolution of an art reference.
///
/// | kind   | movie     | episode   | other     |
/// |--------|-----------|-----------|-----------|
/// | boxart | 1920x2560 | 2560x1920 | 2560x1920 |
/// | poster | 2000x3000 | 2000x3000 | 2000x3000 |
/// | cover  | 3840x2160 | 1920x1080 | 3840x2160 |
/// | hero   | 3840x2160 | 3840x2160 | 3840x2160 |
pub fn art_resolution(kind: ArtKind, work_type: WorkType) -> &'static str {
    match (kind, work_type) {
        (ArtKind::BoxArt, WorkType::Movie) => "1920x2560",
        (ArtKind::BoxArt, _) => "2560x1920",
        (ArtKind::Poster, _) => "2000x3000",
        (ArtKind::Cover, WorkType::Episode) => "1920x1080",
        (ArtKind::Cover, _) | (ArtKind::Hero, _) => "3840x2160",
    }
}

// =============================================================================
// Ratings
// =============================================================================

/// Parse `US:MPAA:PG-13;KR:KMRB:15`.
///
/// Segments are trimmed and split on `:`; anything that is not exactly three
/// parts is dropped silently.
pub fn parse_ratings(raw: &str) -> Vec<Rating> {
    raw.split(';')
        .filter_map(|segment| {
            let parts: Vec<&str> = segment.trim().split(':').collect();
            match parts.as_slice() {
                [country, system, value] => Some(Rating {
                    country: country.to_string(),
                    system: system.to_string(),
                    value: value.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

// =============================================================================
// People
// =============================================================================

/// A credited role column and the function group it bills under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSpec {
    pub column: Field,
    pub function: JobFunction,
}

/// Role columns in billing order.
pub const ROLES: [RoleSpec; 8] = [
    RoleSpec {
        column: Field::Director,
        function: JobFunction::Director,
    },
    RoleSpec {
        column: Field::Writer,
        function: JobFunction::Writer,
    },
    RoleSpec {
        column: Field::Actor1,
        function: JobFunction::Actor,
    },
    RoleSpec {
        column: Field::Actor2,
        function: JobFunction::Actor,
    },
    RoleSpec {
        column: Field::Actor3,
        function: JobFunction::Actor,
    },
    RoleSpec {
        column: Field::Actor4,
        function: JobFunction::Actor,
    },
    RoleSpec {
        column: Field::Actor5,
        function: JobFunction::Actor,
    },
    RoleSpec {
        column: Field::Actor6,
        function: JobFunction::Actor,
    },
];

/// Names for one role column across the whole table, keyed by row language.
///
/// A later row with the same language replaces the name but keeps its
/// position. Rows without a language still count (keyed by `""`).
pub fn collect_names(table: &Table, column: Field) -> Vec<(String, String)> {
    table.rows().iter().fold(Vec::new(), |mut names, row| {
        let name = get_field(row, column);
        if name.is_empty() {
            return names;
        }
        let language = get_field(row, Field::Language);
        match names.iter_mut().find(|(lang, _)| *lang == language) {
            Some(entry) => entry.1 = name,
            None => names.push((language, name)),
        }
        names
    })
}

/// Every credited person, in [`ROLES`] order.
///
/// Billing order counts per [`JobFunction`] and only advances for role
/// columns that produced a person, so `Actor1` and `Actor3` with an empty
/// `Actor2` bill as 1 and 2.
pub fn collect_people(table: &Table) -> Vec<Person> {
    let (people, _) = ROLES.iter().fold(
        (Vec::new(), HashMap::<JobFunction, u32>::new()),
        |(mut people, mut counters), role| {
            let names = collect_names(table, role.column);
            if !names.is_empty() {
                let counter = counters.entry(role.function).or_insert(1);
                people.push(Person {
                    function: role.function,
                    billing_order: *counter,
                    names,
                });
                *counter += 1;
            }
            (people, counters)
        },
    );
    people
}

//! Domain models for MEC metadata generation.
//!
//! This module contains the canonical records resolved from a [`Table`]:
//!
//! - [`BaseRecord`] - Title-level scalars taken from the first row
//! - [`LocalizedBlock`] - One language's title, art, summaries and genres
//! - [`WorkType`] - The branch-driving work type (parsed once)
//! - [`ArtKind`] - The four supported art references
//! - [`Rating`] - A `(country, system, value)` rating triple
//! - [`Person`] / [`JobFunction`] - Credited people with billing order

use crate::field::{cell_to_string, get_cell, get_field, to_date_string, Field, Row, Table};

// =============================================================================
// Work Type
// =============================================================================

/// Work type as used for conditional decisions.
///
/// Only `movie`, `season` and `episode` change the output; every other value
/// (`series`, `short`, ...) takes the default branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkType {
    Movie,
    Season,
    Episode,
    #[default]
    Other,
}

impl WorkType {
    /// Parse from raw cell text (trimmed, case-insensitive).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "movie" => Self::Movie,
            "season" => Self::Season,
            "episode" => Self::Episode,
            _ => Self::Other,
        }
    }

    /// `relationshipType` of the `Parent` element, for hierarchical types.
    pub fn parent_relationship(self) -> Option<&'static str> {
        match self {
            Self::Season => Some("isseasonof"),
            Self::Episode => Some("isepisodeof"),
            Self::Movie | Self::Other => None,
        }
    }

    /// Seasons and episodes carry sequence and parent information.
    pub fn is_hierarchical(self) -> bool {
        self.parent_relationship().is_some()
    }
}

// =============================================================================
// Base Record
// =============================================================================

/// Title-level fields, resolved once from the first row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseRecord {
    pub content_id: String,
    /// `WorkType` exactly as written; this is what the XML shows.
    pub work_type_raw: String,
    /// Parsed copy of `work_type_raw`; this is what decisions use.
    pub work_type: WorkType,
    pub release_year: String,
    /// Normalized to `YYYY-MM-DD` when possible.
    pub release_date: String,
    pub alt_id_org: String,
    /// Raw `country:system:value;...` list.
    pub rating_info: String,
    pub original_language: String,
    pub org_id: String,
    pub sequence_number: String,
    pub parent_content_id: String,
    pub display_string: String,
}

impl BaseRecord {
    pub fn from_row(row: &Row) -> Self {
        let work_type_raw = get_field(row, Field::WorkType);
        Self {
            content_id: get_field(row, Field::ContentId),
            work_type: WorkType::parse(&work_type_raw),
            work_type_raw,
            release_year: get_field(row, Field::ReleaseYear),
            release_date: to_date_string(&get_cell(row, Field::ReleaseDate)),
            alt_id_org: get_field(row, Field::AltIdOrg),
            rating_info: get_field(row, Field::RatingInfo),
            original_language: get_field(row, Field::OriginalLanguage),
            org_id: get_field(row, Field::OrgId),
            sequence_number: get_field(row, Field::SequenceNumber),
            parent_content_id: get_field(row, Field::ParentContentId),
            display_string: get_field(row, Field::DisplayString),
        }
    }
}

// =============================================================================
// Art References
// =============================================================================

/// The art reference columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtKind {
    BoxArt,
    Cover,
    Hero,
    Poster,
}

impl ArtKind {
    pub const ALL: [ArtKind; 4] = [ArtKind::BoxArt, ArtKind::Cover, ArtKind::Hero, ArtKind::Poster];

    /// The `purpose` attribute value (also the column name).
    pub fn purpose(self) -> &'static str {
        self.field().column()
    }

    pub fn field(self) -> Field {
        match self {
            ArtKind::BoxArt => Field::BoxArt,
            ArtKind::Cover => Field::Cover,
            ArtKind::Hero => Field::Hero,
            ArtKind::Poster => Field::Poster,
        }
    }
}

/// A non-empty art path for one [`ArtKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArtReference {
    pub kind: ArtKind,
    pub path: String,
}

// =============================================================================
// Localized Block
// =============================================================================

/// A genre cell: the column it came from and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreRef {
    pub column: String,
    pub id: String,
}

/// Per-language title, art, summaries and genres.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedBlock {
    pub language: String,
    pub title: String,
    /// Only kinds with a non-empty path, in [`ArtKind::ALL`] order.
    pub art: Vec<ArtReference>,
    pub summary190: String,
    pub summary400: String,
    /// Only genre columns with a non-empty value, in column order.
    pub genres: Vec<GenreRef>,
}

impl LocalizedBlock {
    /// Resolve a row; rows without a language yield `None`.
    pub fn from_row(row: &Row, table: &Table) -> Option<Self> {
        let language = get_field(row, Field::Language);
        if language.is_empty() {
            return None;
        }

        let art = ArtKind::ALL
            .iter()
            .map(|&kind| ArtReference {
                kind,
                path: get_field(row, kind.field()),
            })
            .filter(|art| !art.path.is_empty())
            .collect();

        let genres = table
            .genre_columns()
            .filter_map(|column| {
                let id = row.get(column).map(cell_to_string).unwrap_or_default();
                (!id.is_empty()).then(|| GenreRef {
                    column: column.to_string(),
                    id,
                })
            })
            .collect();

        Some(Self {
            language,
            title: get_field(row, Field::Title),
            art,
            summary190: get_field(row, Field::Summary190),
            summary400: get_field(row, Field::Summary400),
            genres,
        })
    }
}

// =============================================================================
// Ratings
// =============================================================================

/// One content rating.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub country: String,
    pub system: String,
    pub value: String,
}

// =============================================================================
// People
// =============================================================================

/// Function group of a credited person; each group has its own billing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobFunction {
    Director,
    Writer,
    Actor,
}

impl JobFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            JobFunction::Director => "Director",
            JobFunction::Writer => "Writer",
            JobFunction::Actor => "Actor",
        }
    }
}

/// A credited person with names per language.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub function: JobFunction,
    /// 1-based order within `function`.
    pub billing_order: u32,
    /// `(language, display name)` in first-seen language order.
    pub names: Vec<(String, String)>,
}

//! MEC (MovieLabs Media Entertainment Core) document generation.
//!
//! This module turns a [`Table`](crate::field::Table) into a
//! `mdmec:CoreMetadata` document:
//! - `element`: owned XML tree + pretty serializer (quick-xml)
//! - `rules`: art resolution, rating parsing, people and billing order
//! - `builder`: the row-to-tree mapping
//!
//! ## Example
//!
//! ```rust
//! use mecgen::field::Table;
//! use mecgen::mec::build_mec_xml;
//!
//! let table = Table::from_text(
//!     &["ContentID", "WorkType", "Language", "Title", "boxart"],
//!     &[vec!["M1", "movie", "en-US", "Okja", "a.jpg"]],
//! );
//! let xml = build_mec_xml(&table).unwrap();
//!
//! assert!(xml.contains(r#"<md:ArtReference resolution="1920x2560" purpose="boxart">a.jpg</md:ArtReference>"#));
//! ```

pub mod builder;
pub mod element;
pub mod rules;

pub use builder::{build_mec_document, build_mec_xml, content_id, CONTENT_ID_PREFIX};
pub use element::Element;
pub use rules::{art_resolution, collect_people, parse_ratings, RoleSpec, ROLES};

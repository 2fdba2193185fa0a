//! Well-formedness checks and structural comparison of XML documents.
//!
//! A document's *structure* is the preorder list of its elements, each
//! reduced to `(path, sorted attribute names)`. Text and attribute values are
//! ignored, so two MEC files for different titles compare equal as long as
//! they use the same elements and attributes in the same places.
//!
//! Names are written in `{namespace}local` form when namespaced, which keeps
//! the comparison independent of the prefixes a document happens to use.
//!
//! # Example
//!
//! ```rust
//! use mecgen::compare::diff_structure;
//!
//! let sample = r#"<a><b id="1"/><c/></a>"#;
//! let generated = r#"<a><b id="2" x="y"/></a>"#;
//! let diff = diff_structure(sample, generated).unwrap();
//!
//! assert_eq!(diff.missing.len(), 2); // /a/b [id] and /a/c
//! assert_eq!(diff.extra.len(), 1);   // /a/b [id, x]
//! ```

use std::collections::BTreeSet;
use std::fmt;

use roxmltree::{Document, ExpandedName, Node, ParsingOptions};
use serde::{Deserialize, Serialize};

use crate::error::{CompareError, CompareResult, DocumentSide, XmlSyntaxError};

// =============================================================================
// Well-formedness
// =============================================================================

fn parse(xml: &str) -> Result<Document<'_>, XmlSyntaxError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(xml, options).map_err(XmlSyntaxError::from)
}

/// Parse `xml` and report where it breaks, if it does.
pub fn check_well_formed(xml: &str) -> Result<(), XmlSyntaxError> {
    parse(xml).map(|_| ())
}

/// `true` if `xml` parses.
pub fn is_well_formed(xml: &str) -> bool {
    check_well_formed(xml).is_ok()
}

/// Numbered listing of a broken document with the failing line marked.
///
/// Returns `None` for well-formed input.
pub fn annotate_xml_error(xml: &str) -> Option<String> {
    let err = check_well_formed(xml).err()?;
    let mut out = format!("Invalid XML: {err}\n");
    for (i, line) in xml.lines().enumerate() {
        let number = i + 1;
        let marker = if number == err.line as usize { ">>" } else { "  " };
        out.push_str(&format!("{marker}{number:4}: {line}\n"));
    }
    Some(out)
}

// =============================================================================
// Structure
// =============================================================================

/// One element's structural signature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StructureEntry {
    /// `/`-joined tag chain from the root, e.g. `/root/child`.
    pub path: String,
    /// Attribute names, sorted; values are ignored.
    pub attributes: Vec<String>,
}

impl fmt::Display for StructureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.path, self.attributes.join(", "))
    }
}

/// Entries present on one side only, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructureDiff {
    /// In the sample but not in the generated document.
    pub missing: Vec<StructureEntry>,
    /// In the generated document but not in the sample.
    pub extra: Vec<StructureEntry>,
}

impl StructureDiff {
    pub fn is_identical(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

fn qualified(name: ExpandedName<'_, '_>) -> String {
    match name.namespace() {
        Some(ns) => format!("{{{ns}}}{}", name.name()),
        None => name.name().to_string(),
    }
}

fn collect(node: Node<'_, '_>, parent: &str, entries: &mut Vec<StructureEntry>) {
    let path = format!("{parent}/{}", qualified(node.tag_name()));
    let mut attributes: Vec<String> = node
        .attributes()
        .map(|a| match a.namespace() {
            Some(ns) => format!("{{{ns}}}{}", a.name()),
            None => a.name().to_string(),
        })
        .collect();
    attributes.sort();

    entries.push(StructureEntry {
        path: path.clone(),
        attributes,
    });
    for child in node.children().filter(Node::is_element) {
        collect(child, &path, entries);
    }
}

/// Preorder structural signature of a document.
pub fn structure_entries(xml: &str) -> Result<Vec<StructureEntry>, XmlSyntaxError> {
    let doc = parse(xml)?;
    let mut entries = Vec::new();
    collect(doc.root_element(), "", &mut entries);
    Ok(entries)
}

/// Compare the structure of `sample` (A) and `generated` (B).
///
/// `missing` = A minus B, `extra` = B minus A. A parse failure is an error
/// naming the broken side, never an empty diff.
pub fn diff_structure(sample: &str, generated: &str) -> CompareResult<StructureDiff> {
    let a: BTreeSet<StructureEntry> = structure_entries(sample)
        .map_err(|source| CompareError::Parse {
            side: DocumentSide::Sample,
            source,
        })?
        .into_iter()
        .collect();
    let b: BTreeSet<StructureEntry> = structure_entries(generated)
        .map_err(|source| CompareError::Parse {
            side: DocumentSide::Generated,
            source,
        })?
        .into_iter()
        .collect();

    Ok(StructureDiff {
        missing: a.difference(&b).cloned().collect(),
        extra: b.difference(&a).cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEC_SNIPPET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mdmec:CoreMetadata xmlns:md="urn:md" xmlns:mdmec="urn:mdmec" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="urn:x">
  <mdmec:Basic ContentID="md:cid:org:1">
    <md:Genre id="a"> </md:Genre>
  </mdmec:Basic>
</mdmec:CoreMetadata>
"#;

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed(MEC_SNIPPET));
        assert!(!is_well_formed("<a><b></a>"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("<md:a/>")); // unbound prefix
    }

    #[test]
    fn test_dtd_is_accepted() {
        assert!(is_well_formed("<!DOCTYPE a><a/>"));
    }

    #[test]
    fn test_annotate_marks_failing_line() {
        assert!(annotate_xml_error(MEC_SNIPPET).is_none());

        let report = annotate_xml_error("<a>\n  <b>\n</a>").unwrap();
        assert!(report.starts_with("Invalid XML:"));
        assert!(report.contains(">>   3: </a>"));
        assert!(report.contains("     1: <a>"));
    }

    #[test]
    fn test_entries_use_expanded_names() {
        let entries = structure_entries(MEC_SNIPPET).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/{urn:mdmec}CoreMetadata",
                "/{urn:mdmec}CoreMetadata/{urn:mdmec}Basic",
                "/{urn:mdmec}CoreMetadata/{urn:mdmec}Basic/{urn:md}Genre",
            ]
        );
        // namespace declarations are not attributes
        assert_eq!(
            entries[0].attributes,
            vec!["{http://www.w3.org/2001/XMLSchema-instance}schemaLocation".to_string()]
        );
        assert_eq!(entries[1].attributes, vec!["ContentID".to_string()]);
    }

    #[test]
    fn test_attribute_names_sorted_values_ignored() {
        let entries = structure_entries(r#"<r z="1" a="2" m="3"/>"#).unwrap();
        assert_eq!(entries[0].attributes, vec!["a", "m", "z"]);

        let diff = diff_structure(r#"<r a="1"/>"#, r#"<r a="2"/>"#).unwrap();
        assert!(diff.is_identical());
    }

    #[test]
    fn test_prefix_choice_does_not_matter() {
        let a = r#"<x:r xmlns:x="urn:a"><x:c/></x:r>"#;
        let b = r#"<y:r xmlns:y="urn:a"><y:c/></y:r>"#;
        assert!(diff_structure(a, b).unwrap().is_identical());
    }

    #[test]
    fn test_missing_and_extra() {
        let a = "<r><a/><b k=\"1\"/></r>";
        let b = "<r><b k=\"1\" j=\"2\"/><c/></r>";
        let diff = diff_structure(a, b).unwrap();

        let missing: Vec<String> = diff.missing.iter().map(|e| e.to_string()).collect();
        let extra: Vec<String> = diff.extra.iter().map(|e| e.to_string()).collect();
        assert_eq!(missing, vec!["/r/a []", "/r/b [k]"]);
        assert_eq!(extra, vec!["/r/b [j, k]", "/r/c []"]);
    }

    #[test]
    fn test_swap_symmetry() {
        let a = "<r><a/><b k=\"1\"/></r>";
        let b = "<r><b/><c/></r>";
        let ab = diff_structure(a, b).unwrap();
        let ba = diff_structure(b, a).unwrap();
        assert_eq!(ab.missing, ba.extra);
        assert_eq!(ab.extra, ba.missing);
    }

    #[test]
    fn test_parse_failure_names_side() {
        let err = diff_structure("<ok/>", "<broken>").unwrap_err();
        assert_eq!(err.side(), DocumentSide::Generated);

        let err = diff_structure("<broken>", "<ok/>").unwrap_err();
        assert_eq!(err.side(), DocumentSide::Sample);
    }

    #[test]
    fn test_duplicates_collapse() {
        let a = "<r><i/><i/><i/></r>";
        let b = "<r><i/></r>";
        assert!(diff_structure(a, b).unwrap().is_identical());
    }
}

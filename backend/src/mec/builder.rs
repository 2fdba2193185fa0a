//! Table to MEC `CoreMetadata` tree.
//!
//! ```text
//! mdmec:CoreMetadata
//! ├── mdmec:Basic @ContentID
//! │   ├── md:LocalizedInfo @language     (one per row with a language)
//! │   ├── md:ReleaseYear / ReleaseDate / WorkType
//! │   ├── md:AltIdentifier
//! │   ├── md:RatingSet
//! │   ├── md:People                      (one per credited role)
//! │   ├── md:OriginalLanguage / AssociatedOrg
//! │   └── md:SequenceInfo / md:Parent    (season and episode only)
//! └── mdmec:CompanyDisplayCredit
//! ```

use super::element::Element;
use super::rules::{art_resolution, collect_people, parse_ratings};
use crate::error::{BuildError, BuildResult};
use crate::field::Table;
use crate::models::{BaseRecord, LocalizedBlock, Person, WorkType};

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const MD_NAMESPACE: &str = "http://www.movielabs.com/schema/md/v2.6/md";
pub const MDMEC_NAMESPACE: &str = "http://www.movielabs.com/schema/mdmec/v2.6";
pub const SCHEMA_LOCATION: &str = "http://www.movielabs.com/schema/mdmec/v2.6/mdmec-v2.6.xsd";

/// Prefix of every content identifier.
pub const CONTENT_ID_PREFIX: &str = "md:cid:org:";

/// Fixed `AltIdentifier/Namespace`.
const ALT_ID_NAMESPACE: &str = "ORG";

/// Fixed `AssociatedOrg@role`.
const LICENSOR_ROLE: &str = "licensor";

/// Language of the company display credit.
const CREDIT_LANGUAGE: &str = "en-US";

/// Genre text placeholder; the schema wants non-empty content and no label
/// source exists at this layer.
const GENRE_PLACEHOLDER: &str = " ";

/// Format a content identifier (`md:cid:org:<id>`).
pub fn content_id(id: &str) -> String {
    format!("{CONTENT_ID_PREFIX}{id}")
}

/// Build the `mdmec:CoreMetadata` tree.
///
/// The first row is the base record; every row with a language adds a
/// `LocalizedInfo`. Missing values degrade to empty elements or omitted
/// optional elements.
pub fn build_mec_document(table: &Table) -> BuildResult<Element> {
    let base_row = table.first().ok_or(BuildError::EmptyTable)?;
    let base = BaseRecord::from_row(base_row);

    let mut basic =
        Element::new("mdmec:Basic").with_attr("ContentID", content_id(&base.content_id));

    for block in table
        .rows()
        .iter()
        .filter_map(|row| LocalizedBlock::from_row(row, table))
    {
        basic.push(localized_info(&block, base.work_type));
    }

    basic.push(Element::text_element("md:ReleaseYear", base.release_year.as_str()));
    basic.push(Element::text_element("md:ReleaseDate", base.release_date.as_str()));
    basic.push(Element::text_element("md:WorkType", base.work_type_raw.as_str()));

    basic.push(
        Element::new("md:AltIdentifier")
            .with_child(Element::text_element("md:Namespace", ALT_ID_NAMESPACE))
            .with_child(Element::text_element("md:Identifier", base.alt_id_org.as_str())),
    );

    basic.push(rating_set(&base.rating_info));

    for person in collect_people(table) {
        basic.push(people(&person));
    }

    basic.push(Element::text_element(
        "md:OriginalLanguage",
        base.original_language.as_str(),
    ));
    basic.push(
        Element::new("md:AssociatedOrg")
            .with_attr("organizationID", base.org_id.as_str())
            .with_attr("role", LICENSOR_ROLE),
    );

    if base.work_type.is_hierarchical() {
        hierarchy(&base, &mut basic);
    }

    let credit = Element::new("mdmec:CompanyDisplayCredit").with_child(
        Element::text_element("md:DisplayString", base.display_string.as_str())
            .with_attr("language", CREDIT_LANGUAGE),
    );

    Ok(Element::new("mdmec:CoreMetadata")
        .with_attr("xmlns:xsi", XSI_NAMESPACE)
        .with_attr("xmlns:md", MD_NAMESPACE)
        .with_attr("xmlns:mdmec", MDMEC_NAMESPACE)
        .with_attr("xsi:schemaLocation", SCHEMA_LOCATION)
        .with_child(basic)
        .with_child(credit))
}

/// Build and serialize the MEC document.
pub fn build_mec_xml(table: &Table) -> BuildResult<String> {
    build_mec_document(table)?.to_xml_string()
}

fn localized_info(block: &LocalizedBlock, work_type: WorkType) -> Element {
    let mut loc = Element::new("md:LocalizedInfo")
        .with_attr("language", block.language.as_str())
        .with_child(Element::text_element(
            "md:TitleDisplayUnlimited",
            block.title.as_str(),
        ))
        .with_child(Element::new("md:TitleSort"));

    for art in &block.art {
        loc.push(
            Element::text_element("md:ArtReference", art.path.as_str())
                .with_attr("resolution", art_resolution(art.kind, work_type))
                .with_attr("purpose", art.kind.purpose()),
        );
    }

    loc.push(Element::text_element("md:Summary190", block.summary190.as_str()));
    loc.push(Element::text_element("md:Summary400", block.summary400.as_str()));

    for genre in &block.genres {
        loc.push(
            Element::text_element("md:Genre", GENRE_PLACEHOLDER).with_attr("id", genre.id.as_str()),
        );
    }

    loc
}

fn rating_set(raw: &str) -> Element {
    let mut set = Element::new("md:RatingSet");
    for rating in parse_ratings(raw) {
        set.push(
            Element::new("md:Rating")
                .with_child(
                    Element::new("md:Region")
                        .with_child(Element::text_element("md:country", rating.country)),
                )
                .with_child(Element::text_element("md:System", rating.system))
                .with_child(Element::text_element("md:Value", rating.value)),
        );
    }
    set
}

fn people(person: &Person) -> Element {
    let job = Element::new("md:Job")
        .with_child(Element::text_element(
            "md:JobFunction",
            person.function.as_str(),
        ))
        .with_child(Element::text_element(
            "md:BillingBlockOrder",
            person.billing_order.to_string(),
        ));

    let name = person
        .names
        .iter()
        .fold(Element::new("md:Name"), |name, (language, display)| {
            name.with_child(
                Element::text_element("md:DisplayName", display.as_str())
                    .with_attr("language", language.as_str()),
            )
        });

    Element::new("md:People").with_child(job).with_child(name)
}

fn hierarchy(base: &BaseRecord, basic: &mut Element) {
    if !base.sequence_number.is_empty() {
        basic.push(
            Element::new("md:SequenceInfo")
                .with_child(Element::text_element("md:Number", base.sequence_number.as_str())),
        );
    }

    if let Some(relationship) = base.work_type.parent_relationship() {
        if !base.parent_content_id.is_empty() {
            basic.push(
                Element::new("md:Parent")
                    .with_attr("relationshipType", relationship)
                    .with_child(Element::text_element(
                        "md:ParentContentID",
                        content_id(&base.parent_content_id),
                    )),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_table() -> Table {
        Table::from_text(
            &[
                "ContentID", "WorkType", "Language", "Title", "boxart", "cover", "Summary190",
                "Summary400", "Genre1", "ReleaseYear", "ReleaseDate", "AltID_ORG", "RatingInfo",
                "Director", "Actor1", "OriginalLanguage", "OrgID", "DisplayString",
            ],
            &[
                vec![
                    "M100", "Movie", "en-US", "The Host", "a.jpg", "c.jpg", "short", "long",
                    "av_genre_horror", "2006.0", "2006.07.27", "ALT-9", "US:MPAA:R", "Bong",
                    "Song", "ko", "ORG-1", "© Studio",
                ],
                vec![
                    "", "", "ko-KR", "괴물", "", "", "짧은", "긴", "", "", "", "", "", "봉준호",
                    "송강호", "", "", "",
                ],
            ],
        )
    }

    #[test]
    fn test_root_and_basic() {
        let doc = build_mec_document(&movie_table()).unwrap();
        assert_eq!(doc.name, "mdmec:CoreMetadata");
        let attr_names: Vec<&str> = doc.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            attr_names,
            vec!["xmlns:xsi", "xmlns:md", "xmlns:mdmec", "xsi:schemaLocation"]
        );

        let basic = doc.child("mdmec:Basic").unwrap();
        assert_eq!(basic.attr("ContentID"), Some("md:cid:org:M100"));
        assert_eq!(basic.children_named("md:LocalizedInfo").count(), 2);

        let credit = doc.child("mdmec:CompanyDisplayCredit").unwrap();
        let display = credit.child("md:DisplayString").unwrap();
        assert_eq!(display.attr("language"), Some("en-US"));
        assert_eq!(display.text.as_deref(), Some("© Studio"));
    }

    #[test]
    fn test_localized_info_child_order() {
        let doc = build_mec_document(&movie_table()).unwrap();
        let basic = doc.child("mdmec:Basic").unwrap();
        let loc = basic.child("md:LocalizedInfo").unwrap();

        let names: Vec<&str> = loc.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "md:TitleDisplayUnlimited",
                "md:TitleSort",
                "md:ArtReference",
                "md:ArtReference",
                "md:Summary190",
                "md:Summary400",
                "md:Genre",
            ]
        );

        let boxart = &loc.children[2];
        assert_eq!(boxart.attr("resolution"), Some("1920x2560"));
        assert_eq!(boxart.attr("purpose"), Some("boxart"));
        assert_eq!(boxart.text.as_deref(), Some("a.jpg"));

        let genre = loc.child("md:Genre").unwrap();
        assert_eq!(genre.attr("id"), Some("av_genre_horror"));
        assert_eq!(genre.text.as_deref(), Some(" "));
    }

    #[test]
    fn test_scalars_and_people() {
        let doc = build_mec_document(&movie_table()).unwrap();
        let basic = doc.child("mdmec:Basic").unwrap();

        assert_eq!(basic.child("md:ReleaseYear").unwrap().text.as_deref(), Some("2006"));
        assert_eq!(basic.child("md:ReleaseDate").unwrap().text.as_deref(), Some("2006-07-27"));
        assert_eq!(basic.child("md:WorkType").unwrap().text.as_deref(), Some("Movie"));

        let people: Vec<&Element> = basic.children_named("md:People").collect();
        assert_eq!(people.len(), 2);
        let director_names = people[0].child("md:Name").unwrap();
        assert_eq!(director_names.children.len(), 2);
        assert_eq!(director_names.children[1].attr("language"), Some("ko-KR"));
        assert_eq!(director_names.children[1].text.as_deref(), Some("봉준호"));

        let org = basic.child("md:AssociatedOrg").unwrap();
        assert_eq!(org.attr("organizationID"), Some("ORG-1"));
        assert_eq!(org.attr("role"), Some("licensor"));

        assert!(basic.child("md:Parent").is_none());
        assert!(basic.child("md:SequenceInfo").is_none());
    }

    #[test]
    fn test_episode_hierarchy() {
        let table = Table::from_text(
            &["ContentID", "WorkType", "Language", "SequenceNumber", "ParentContentID", "cover"],
            &[vec!["E1", "episode", "en-US", "3.0", "S1", "c.jpg"]],
        );
        let doc = build_mec_document(&table).unwrap();
        let basic = doc.child("mdmec:Basic").unwrap();

        let seq = basic.child("md:SequenceInfo").unwrap();
        assert_eq!(seq.child("md:Number").unwrap().text.as_deref(), Some("3"));

        let parent = basic.child("md:Parent").unwrap();
        assert_eq!(parent.attr("relationshipType"), Some("isepisodeof"));
        assert_eq!(
            parent.child("md:ParentContentID").unwrap().text.as_deref(),
            Some("md:cid:org:S1")
        );

        let cover = basic
            .child("md:LocalizedInfo")
            .and_then(|l| l.child("md:ArtReference"))
            .unwrap();
        assert_eq!(cover.attr("resolution"), Some("1920x1080"));
    }

    #[test]
    fn test_season_without_parent() {
        let table = Table::from_text(
            &["ContentID", "WorkType", "Language", "SequenceNumber"],
            &[vec!["S1", "Season", "en-US", "2"]],
        );
        let doc = build_mec_document(&table).unwrap();
        let basic = doc.child("mdmec:Basic").unwrap();
        assert!(basic.child("md:SequenceInfo").is_some());
        assert!(basic.child("md:Parent").is_none());
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let table = Table::from_text(&["ContentID"], &[]);
        assert!(matches!(
            build_mec_document(&table),
            Err(BuildError::EmptyTable)
        ));
    }

    #[test]
    fn test_xml_output_is_well_formed() {
        let xml = build_mec_xml(&movie_table()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mdmec:CoreMetadata"));
        assert!(xml.contains("  <mdmec:Basic ContentID=\"md:cid:org:M100\">"));
        assert!(xml.contains("<md:TitleSort/>"));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }
}

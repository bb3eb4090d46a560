use std::collections::BTreeMap;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::types::{Extent, FieldSpec, GeometryKind, Value};

use super::attribute::read_attributes;
use super::decode::{read_lines, read_points, read_polygons, skip_section};
use super::header::{read_comment, read_feature_code, read_head, read_table_structure};
use super::lexer::{Section, SectionKind, split_sections};
use super::{FeatureStore, VctFeature, VctMetadata};

/// Decoding state shared by the section readers.
#[derive(Default)]
pub(crate) struct ReadState {
    pub(crate) metadata: VctMetadata,
    pub(crate) extent: Extent,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) features: BTreeMap<i64, VctFeature>,
}

impl ReadState {
    pub(crate) fn geometry_kind(&self) -> GeometryKind {
        self.metadata.feature_class.geometry_kind
    }

    /// Store a decoded feature. Geometry from a section that does not match
    /// the document's geometry kind is dropped, the identifier is kept.
    pub(crate) fn insert_feature(
        &mut self,
        id: i64,
        section_kind: GeometryKind,
        geometry: Option<Geometry>,
    ) {
        let geometry = geometry.filter(|geometry| !geometry.is_empty());
        let geometry = if section_kind == self.geometry_kind() {
            geometry
        } else {
            if geometry.is_some() {
                log::debug!(
                    "dropping {section_kind} geometry of feature {id} in a {} document",
                    self.geometry_kind()
                );
            }
            None
        };

        let feature = VctFeature {
            id,
            geometry,
            attributes: Vec::new(),
        };
        if self.features.insert(id, feature).is_some() {
            log::warn!("feature {id} is declared more than once; keeping the last record");
        }
    }

    fn finish(mut self) -> (VctMetadata, FeatureStore) {
        let field_count = self.fields.len();
        for feature in self.features.values_mut() {
            if feature.attributes.len() > field_count {
                log::warn!(
                    "feature {} has {} attribute values for {field_count} fields; truncating",
                    feature.id,
                    feature.attributes.len()
                );
            }
            feature.attributes.resize(field_count, Value::Null);
        }

        let store = FeatureStore::from_parts(
            self.metadata.feature_class.geometry_kind,
            self.fields,
            self.features,
            self.extent,
        );
        (self.metadata, store)
    }
}

type SectionReader = fn(&Section<'_>, &mut ReadState) -> Result<()>;

/// Sections run header first, then schema, geometry and attributes, whatever
/// their order in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Header,
    Schema,
    Geometry,
    Ignored,
    Attributes,
}

fn section_reader(kind: SectionKind) -> (Phase, SectionReader) {
    match kind {
        SectionKind::Comment => (Phase::Header, read_comment),
        SectionKind::Head => (Phase::Header, read_head),
        SectionKind::FeatureCode => (Phase::Schema, read_feature_code),
        SectionKind::TableStructure => (Phase::Schema, read_table_structure),
        SectionKind::Point => (Phase::Geometry, read_points),
        SectionKind::Line => (Phase::Geometry, read_lines),
        SectionKind::Polygon => (Phase::Geometry, read_polygons),
        SectionKind::Solid
        | SectionKind::Aggregation
        | SectionKind::Annotation
        | SectionKind::Topology
        | SectionKind::Style => (Phase::Ignored, skip_section),
        SectionKind::Attribute => (Phase::Attributes, read_attributes),
    }
}

/// Decode a whole VCT document.
pub(crate) fn read_document(text: &str) -> Result<(VctMetadata, FeatureStore)> {
    let sections = split_sections(text)?;

    let mut plan: Vec<(Phase, SectionReader, &Section<'_>)> = sections
        .iter()
        .map(|section| {
            let (phase, reader) = section_reader(section.kind);
            (phase, reader, section)
        })
        .collect();
    plan.sort_by_key(|(phase, _, _)| *phase);

    let mut state = ReadState::default();
    for (_, reader, section) in plan {
        reader(section, &mut state)?;
    }
    Ok(state.finish())
}

use std::collections::BTreeMap;

use crate::error::{Result, VctError};
use crate::geometry::Geometry;
use crate::options::ExtentUpdate;
use crate::types::{Extent, FieldSpec, GeometryKind, Value};

use super::VctFeature;

/// Result of one batch mutation.
///
/// Per-item failures do not stop the batch; they are collected as
/// human-readable messages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditOutcome {
    /// Messages for the items that were rejected.
    pub errors: Vec<String>,
    /// Identifiers assigned by `add_features`, in insertion order.
    pub added_ids: Vec<i64>,
}

impl EditOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn reject(&mut self, err: VctError) {
        self.errors.push(err.to_string());
    }
}

/// Attribute rows are comma separated, one per line.
fn check_writable(value: &Value) -> Result<()> {
    match value {
        Value::Text(text) if text.contains([',', '\n', '\r']) => Err(VctError::UnwritableValue {
            value: text.clone(),
        }),
        _ => Ok(()),
    }
}

/// In-memory feature collection with its field catalog.
///
/// Features are kept in identifier order. Every feature carries exactly one
/// value per field.
#[derive(Clone, Debug)]
pub struct FeatureStore {
    geometry_kind: GeometryKind,
    fields: Vec<FieldSpec>,
    features: BTreeMap<i64, VctFeature>,
    extent: Extent,
    next_id: i64,
    extent_update: ExtentUpdate,
}

impl FeatureStore {
    pub fn new(geometry_kind: GeometryKind, fields: Vec<FieldSpec>) -> Self {
        Self::from_parts(geometry_kind, fields, BTreeMap::new(), Extent::EMPTY)
    }

    pub(crate) fn from_parts(
        geometry_kind: GeometryKind,
        fields: Vec<FieldSpec>,
        features: BTreeMap<i64, VctFeature>,
        extent: Extent,
    ) -> Self {
        let next_id = features
            .keys()
            .next_back()
            .map_or(1, |max| max.saturating_add(1).max(1));
        Self {
            geometry_kind,
            fields,
            features,
            extent,
            next_id,
            extent_update: ExtentUpdate::default(),
        }
    }

    pub(crate) fn set_extent_update(&mut self, extent_update: ExtentUpdate) {
        self.extent_update = extent_update;
    }

    pub fn geometry_kind(&self) -> GeometryKind {
        self.geometry_kind
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Position of the field named `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// The identifier the next added feature will receive.
    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn feature(&self, id: i64) -> Option<&VctFeature> {
        self.features.get(&id)
    }

    /// Iterate over features in identifier order.
    pub fn features(&self) -> impl Iterator<Item = &VctFeature> + '_ {
        self.features.values()
    }

    /// Attribute `idx` of feature `id`, interpreted by the field's type.
    pub fn typed_attribute(&self, id: i64, idx: usize) -> Result<Value> {
        let feature = self.feature(id).ok_or(VctError::MissingFeature { id })?;
        let field = self.fields.get(idx).ok_or(VctError::InvalidFieldIndex {
            index: idx,
            field_count: self.fields.len(),
        })?;
        let value = feature.attributes.get(idx).unwrap_or(&Value::Null);
        field.interpret(value)
    }

    /// Add features under freshly assigned identifiers.
    ///
    /// Identifiers carried by the input are ignored. Attribute lists are
    /// padded with nulls, or truncated with an error message. A feature whose
    /// geometry kind differs from the store's is rejected.
    pub fn add_features<I>(&mut self, features: I) -> EditOutcome
    where
        I: IntoIterator<Item = VctFeature>,
    {
        let mut outcome = EditOutcome::default();
        let update_extent = self.features.is_empty() || !self.extent.is_empty();
        let field_count = self.fields.len();

        for mut feature in features {
            if let Some(geometry) = &feature.geometry
                && geometry.kind() != self.geometry_kind
            {
                outcome.reject(VctError::GeometryKindMismatch {
                    expected: self.geometry_kind,
                    actual: geometry.kind(),
                });
                continue;
            }

            if let Err(err) = feature.attributes.iter().try_for_each(check_writable) {
                outcome.reject(err);
                continue;
            }

            if feature.attributes.len() > field_count {
                outcome.reject(VctError::TooManyAttributes {
                    expected: field_count,
                    got: feature.attributes.len(),
                });
            }
            feature.attributes.resize(field_count, Value::Null);

            let id = self.next_id;
            self.next_id += 1;
            feature.id = id;

            let bounds = feature.geometry.as_ref().and_then(Geometry::bounds);
            if let Some(bounds) = bounds.filter(|_| update_extent) {
                self.extent.combine(&bounds);
            }
            self.features.insert(id, feature);
            outcome.added_ids.push(id);
        }
        outcome
    }

    /// Remove the listed features; unknown identifiers are ignored.
    pub fn delete_features<I>(&mut self, ids: I) -> EditOutcome
    where
        I: IntoIterator<Item = i64>,
    {
        for id in ids {
            self.features.remove(&id);
        }
        self.update_extent();
        EditOutcome::default()
    }

    /// Append fields to the catalog. Existing features get a null value for
    /// every appended field.
    pub fn add_attributes<I>(&mut self, fields: I) -> EditOutcome
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        let mut outcome = EditOutcome::default();
        for field in fields {
            if !field.field_type.is_supported() {
                log::debug!(
                    "field {} has unsupported type {}",
                    field.name,
                    field.field_type
                );
                outcome.reject(VctError::UnsupportedFieldType {
                    field: field.name,
                    field_type: field.field_type.to_string(),
                });
                continue;
            }
            if self.field_index(&field.name).is_some() {
                outcome.reject(VctError::FieldAlreadyExists { name: field.name });
                continue;
            }

            self.fields.push(field);
            for feature in self.features.values_mut() {
                feature.attributes.push(Value::Null);
            }
        }
        outcome
    }

    /// Rename fields by index.
    pub fn rename_attributes<I>(&mut self, renames: I) -> EditOutcome
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let mut outcome = EditOutcome::default();
        for (idx, name) in renames {
            if idx >= self.fields.len() {
                outcome.reject(VctError::InvalidFieldIndex {
                    index: idx,
                    field_count: self.fields.len(),
                });
                continue;
            }
            match self.field_index(&name) {
                Some(existing) if existing == idx => {}
                Some(_) => outcome.reject(VctError::FieldAlreadyExists { name }),
                None => self.fields[idx].name = name,
            }
        }
        outcome
    }

    /// Remove fields by index, from every feature as well as the catalog.
    pub fn delete_attributes<I>(&mut self, indices: I) -> EditOutcome
    where
        I: IntoIterator<Item = usize>,
    {
        let mut outcome = EditOutcome::default();
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        for idx in indices {
            if idx >= self.fields.len() {
                outcome.reject(VctError::InvalidFieldIndex {
                    index: idx,
                    field_count: self.fields.len(),
                });
                continue;
            }
            self.fields.remove(idx);
            for feature in self.features.values_mut() {
                if idx < feature.attributes.len() {
                    feature.attributes.remove(idx);
                }
            }
        }
        outcome
    }

    /// Overwrite attribute values, keyed by feature id then field index.
    /// Unknown feature ids are skipped.
    pub fn change_attribute_values<I, A>(&mut self, changes: I) -> EditOutcome
    where
        I: IntoIterator<Item = (i64, A)>,
        A: IntoIterator<Item = (usize, Value)>,
    {
        let mut outcome = EditOutcome::default();
        let field_count = self.fields.len();
        for (id, values) in changes {
            let Some(feature) = self.features.get_mut(&id) else {
                continue;
            };
            for (idx, value) in values {
                if let Err(err) = check_writable(&value) {
                    outcome.reject(err);
                    continue;
                }
                match feature.attributes.get_mut(idx) {
                    Some(slot) if idx < field_count => *slot = value,
                    _ => outcome.reject(VctError::InvalidFieldIndex {
                        index: idx,
                        field_count,
                    }),
                }
            }
        }
        outcome
    }

    /// Replace geometries. Unknown feature ids are skipped; a geometry of
    /// another kind is rejected.
    pub fn change_geometry_values<I>(&mut self, changes: I) -> EditOutcome
    where
        I: IntoIterator<Item = (i64, Geometry)>,
    {
        let mut outcome = EditOutcome::default();
        for (id, geometry) in changes {
            let Some(feature) = self.features.get_mut(&id) else {
                continue;
            };
            if geometry.kind() != self.geometry_kind {
                outcome.reject(VctError::GeometryKindMismatch {
                    expected: self.geometry_kind,
                    actual: geometry.kind(),
                });
                continue;
            }
            feature.geometry = Some(geometry);
        }
        self.update_extent();
        outcome
    }

    fn update_extent(&mut self) {
        self.extent = match self.extent_update {
            ExtentUpdate::Recompute => {
                let mut extent = Extent::EMPTY;
                for bounds in self
                    .features
                    .values()
                    .filter_map(|feature| feature.geometry.as_ref().and_then(Geometry::bounds))
                {
                    extent.combine(&bounds);
                }
                extent
            }
            ExtentUpdate::Reset => Extent::EMPTY,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureStore;
    use crate::Result;
    use crate::error::VctError;
    use crate::geometry::Geometry;
    use crate::options::ExtentUpdate;
    use crate::types::{Extent, FieldSpec, FieldType, GeometryKind, Value};
    use crate::vct::VctFeature;
    use geo_types::{LineString, Point};
    use std::collections::BTreeMap;

    fn point_store() -> FeatureStore {
        FeatureStore::new(
            GeometryKind::Point,
            vec![
                FieldSpec::new("name", FieldType::Varchar),
                FieldSpec::new("depth", FieldType::Double).with_length(10, 2),
            ],
        )
    }

    fn point(x: f64, y: f64, attributes: Vec<Value>) -> Result<VctFeature> {
        VctFeature::new(Point::new(x, y), attributes)
    }

    fn assert_attribute_lengths(store: &FeatureStore) {
        for feature in store.features() {
            assert_eq!(feature.attributes().len(), store.fields().len());
        }
    }

    #[test]
    fn add_features_assigns_fresh_ids() -> Result<()> {
        let mut store = point_store();
        let mut feature = point(1.0, 1.0, vec![Value::from("a")])?;
        feature.id = 99;
        let outcome = store.add_features([feature, point(2.0, 3.0, Vec::new())?]);
        assert!(outcome.is_success());
        assert_eq!(outcome.added_ids, vec![1, 2]);
        assert_eq!(store.next_id(), 3);
        assert_eq!(
            store.feature(1).map(|f| f.attributes().to_vec()),
            Some(vec![Value::from("a"), Value::Null])
        );
        assert_eq!(store.extent(), Extent::new(1.0, 1.0, 2.0, 3.0));
        Ok(())
    }

    #[test]
    fn too_many_attributes_are_truncated_with_error() -> Result<()> {
        let mut store = point_store();
        let outcome = store.add_features([point(
            0.0,
            0.0,
            vec![Value::from("a"), Value::from(1.5), Value::from("extra")],
        )?]);
        assert_eq!(outcome.added_ids, vec![1]);
        assert_eq!(
            outcome.errors,
            vec!["Feature has too many attributes (expecting 2, received 3)".to_string()]
        );
        assert_attribute_lengths(&store);
        Ok(())
    }

    #[test]
    fn geometry_kind_mismatch_is_rejected() -> Result<()> {
        let mut store = point_store();
        let line = VctFeature::new(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]), Vec::new())?;
        let outcome = store.add_features([line, point(5.0, 5.0, Vec::new())?]);
        assert_eq!(outcome.added_ids, vec![1]);
        assert_eq!(
            outcome.errors,
            vec!["Could not add feature with geometry type Line to layer of type Point".to_string()]
        );
        assert_eq!(store.feature_count(), 1);
        Ok(())
    }

    #[test]
    fn ids_are_never_reused() -> Result<()> {
        let mut store = point_store();
        store.add_features([point(0.0, 0.0, Vec::new())?, point(1.0, 1.0, Vec::new())?]);
        store.delete_features([2]);
        let outcome = store.add_features([point(2.0, 2.0, Vec::new())?]);
        assert_eq!(outcome.added_ids, vec![3]);
        let ids: Vec<i64> = store.features().map(VctFeature::id).collect();
        assert_eq!(ids, vec![1, 3]);
        Ok(())
    }

    #[test]
    fn delete_features_recomputes_or_resets_extent() -> Result<()> {
        let mut store = point_store();
        store.add_features([point(0.0, 0.0, Vec::new())?, point(10.0, 10.0, Vec::new())?]);
        store.delete_features([2, 42]);
        assert_eq!(store.feature_count(), 1);
        assert_eq!(store.extent(), Extent::new(0.0, 0.0, 0.0, 0.0));

        store.set_extent_update(ExtentUpdate::Reset);
        store.delete_features([42]);
        assert!(store.extent().is_empty());

        // an empty extent on a non-empty store is not grown by additions
        store.add_features([point(3.0, 3.0, Vec::new())?]);
        assert!(store.extent().is_empty());
        Ok(())
    }

    #[test]
    fn add_then_delete_attribute_keeps_lengths() -> Result<()> {
        let mut store = point_store();
        store.add_features([point(0.0, 0.0, vec![Value::from("a"), Value::from(2.0)])?]);

        let outcome = store.add_attributes([FieldSpec::new("kind", FieldType::Char)]);
        assert!(outcome.is_success());
        assert_eq!(store.fields().len(), 3);
        assert_attribute_lengths(&store);
        assert_eq!(store.feature(1).map(|f| f.attributes()[2].clone()), Some(Value::Null));

        let outcome = store.delete_attributes([2, 0, 2]);
        assert!(outcome.is_success());
        assert_eq!(store.fields(), &[FieldSpec::new("depth", FieldType::Double).with_length(10, 2)]);
        assert_eq!(
            store.feature(1).map(|f| f.attributes().to_vec()),
            Some(vec![Value::from(2.0)])
        );
        Ok(())
    }

    #[test]
    fn delete_then_add_attribute_restores_length() -> Result<()> {
        let mut store = point_store();
        store.add_features([
            point(0.0, 0.0, vec![Value::from("a"), Value::from(1.0)])?,
            point(1.0, 1.0, vec![Value::from("b"), Value::from(2.0)])?,
        ]);
        let depth = store.fields()[1].clone();

        assert!(store.delete_attributes([1]).is_success());
        assert!(store.add_attributes([depth.clone()]).is_success());

        assert_eq!(store.fields().len(), 2);
        assert_eq!(store.fields()[1], depth);
        for feature in store.features() {
            assert_eq!(feature.attributes().len(), 2);
            assert_eq!(feature.attributes()[1], Value::Null);
        }
        assert_eq!(
            store.feature(2).map(|f| f.attributes()[0].clone()),
            Some(Value::from("b"))
        );
        Ok(())
    }

    #[test]
    fn add_attributes_rejects_other_types_and_duplicates() -> Result<()> {
        let mut store = point_store();
        store.add_features([
            point(0.0, 0.0, vec![Value::from("a"), Value::from(1.0)])?,
            point(1.0, 1.0, vec![Value::from("b")])?,
        ]);
        let fields = store.fields().to_vec();
        let attributes: Vec<Vec<Value>> =
            store.features().map(|f| f.attributes().to_vec()).collect();

        let outcome =
            store.add_attributes([FieldSpec::new("blob", FieldType::Other("Geometry".to_string()))]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(store.fields(), fields.as_slice());
        let unchanged: Vec<Vec<Value>> =
            store.features().map(|f| f.attributes().to_vec()).collect();
        assert_eq!(unchanged, attributes);

        let outcome = store.add_attributes([
            FieldSpec::new("name", FieldType::Char),
            FieldSpec::new("note", FieldType::Varchar),
        ]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(store.fields().len(), 3);
        assert_eq!(store.field_index("note"), Some(2));
        assert_attribute_lengths(&store);
        Ok(())
    }

    #[test]
    fn rename_and_delete_report_bad_indices() {
        let mut store = point_store();
        let outcome = store.rename_attributes([
            (0, "label".to_string()),
            (1, "label".to_string()),
            (7, "x".to_string()),
        ]);
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(store.field_index("label"), Some(0));
        assert_eq!(store.fields()[1].name, "depth");

        let outcome = store.delete_attributes([5]);
        assert_eq!(
            outcome.errors,
            vec![
                VctError::InvalidFieldIndex {
                    index: 5,
                    field_count: 2
                }
                .to_string()
            ]
        );
    }

    #[test]
    fn change_attribute_values_by_id_and_index() -> Result<()> {
        let mut store = point_store();
        store.add_features([point(0.0, 0.0, Vec::new())?]);

        let mut changes = BTreeMap::new();
        changes.insert(1, BTreeMap::from([(1, Value::from("7.25")), (4, Value::from(0))]));
        changes.insert(50, BTreeMap::from([(0, Value::from("ghost"))]));
        let outcome = store.change_attribute_values(changes);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(store.typed_attribute(1, 1)?, Value::Real(7.25));
        assert_eq!(store.typed_attribute(1, 0)?, Value::Null);
        assert!(matches!(
            store.typed_attribute(2, 0),
            Err(VctError::MissingFeature { id: 2 })
        ));
        Ok(())
    }

    #[test]
    fn values_that_would_split_a_row_are_rejected() -> Result<()> {
        let mut store = point_store();
        let outcome = store.add_features([
            point(0.0, 0.0, vec![Value::from("a,b")])?,
            point(1.0, 1.0, vec![Value::from("plain")])?,
        ]);
        assert_eq!(outcome.added_ids, vec![1]);
        assert_eq!(
            outcome.errors,
            vec![VctError::UnwritableValue { value: "a,b".to_string() }.to_string()]
        );

        let outcome = store.change_attribute_values([(
            1,
            [(0, Value::from("two\nlines")), (1, Value::from("3.5"))],
        )]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(store.typed_attribute(1, 0)?, Value::from("plain"));
        assert_eq!(store.typed_attribute(1, 1)?, Value::Real(3.5));
        Ok(())
    }

    #[test]
    fn change_geometry_values_checks_kind() -> Result<()> {
        let mut store = point_store();
        store.add_features([point(0.0, 0.0, Vec::new())?]);

        let moved = Geometry::from_geometry(&Point::new(5.0, 6.0))?;
        let line = Geometry::from_geometry(&LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))?;
        let outcome = store.change_geometry_values([(1, line), (3, moved.clone())]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(store.extent(), Extent::new(0.0, 0.0, 0.0, 0.0));

        store.change_geometry_values([(1, moved.clone())]);
        assert_eq!(store.feature(1).and_then(|f| f.geometry()), Some(&moved));
        assert_eq!(store.extent(), Extent::new(5.0, 6.0, 5.0, 6.0));
        Ok(())
    }

    #[test]
    fn mutation_sequence_keeps_attribute_lengths() -> Result<()> {
        let mut store = point_store();
        store.add_features([point(0.0, 0.0, vec![Value::from("a")])?]);
        store.add_attributes([FieldSpec::new("a", FieldType::Int)]);
        store.add_features([point(1.0, 0.0, vec![Value::from("b"); 5])?]);
        store.delete_attributes([0]);
        store.add_features([VctFeature::without_geometry(Vec::new())]);
        store.add_attributes([FieldSpec::new("b", FieldType::Date)]);
        store.delete_features([1]);
        assert_attribute_lengths(&store);
        assert_eq!(store.feature_count(), 2);
        Ok(())
    }
}

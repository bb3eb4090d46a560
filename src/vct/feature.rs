use crate::error::{Result, VctError};
use crate::geometry::Geometry;
use crate::types::Value;
use geo_traits::GeometryTrait;

/// A single feature with its geometry and owned attribute values.
#[derive(Clone, Debug, PartialEq)]
pub struct VctFeature {
    pub(crate) id: i64,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) attributes: Vec<Value>,
}

impl VctFeature {
    /// Build a feature from any `geo_traits` geometry.
    ///
    /// The id is assigned when the feature is added to a store.
    pub fn new<G, I>(geometry: G, attributes: I) -> Result<Self>
    where
        G: GeometryTrait<T = f64>,
        I: IntoIterator<Item = Value>,
    {
        Ok(Self {
            id: 0,
            geometry: Some(Geometry::from_geometry(&geometry)?),
            attributes: attributes.into_iter().collect(),
        })
    }

    /// Build a feature without geometry.
    pub fn without_geometry<I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            id: 0,
            geometry: None,
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Encode the geometry as WKB; `None` when the feature has no geometry.
    pub fn geometry_wkb(&self) -> Result<Option<Vec<u8>>> {
        self.geometry.as_ref().map(Geometry::to_wkb).transpose()
    }

    pub fn attributes(&self) -> &[Value] {
        &self.attributes
    }

    /// Read an attribute by index, converting it with `TryFrom<Value>`.
    pub fn attribute<T>(&self, idx: usize) -> Result<T>
    where
        T: TryFrom<Value, Error = VctError>,
    {
        let value = self
            .attributes
            .get(idx)
            .ok_or(VctError::InvalidFieldIndex {
                index: idx,
                field_count: self.attributes.len(),
            })?;
        T::try_from(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::VctFeature;
    use crate::Result;
    use crate::error::VctError;
    use crate::geometry::Geometry;
    use crate::types::Value;
    use geo_types::Point;

    #[test]
    fn builds_from_geo_types() -> Result<()> {
        let feature = VctFeature::new(Point::new(1.0, 2.0), [Value::from("a"), Value::from(3)])?;
        assert_eq!(feature.id(), 0);
        assert_eq!(
            feature.geometry().map(Geometry::kind),
            Some(crate::types::GeometryKind::Point)
        );
        let wkb = feature.geometry_wkb()?.expect("has geometry");
        assert_eq!(Geometry::from_wkb(&wkb)?, feature.geometry().cloned().expect("geometry"));
        Ok(())
    }

    #[test]
    fn typed_attribute_access() -> Result<()> {
        let feature = VctFeature::without_geometry([Value::from("name"), Value::Integer(7), Value::Null]);
        assert_eq!(feature.attribute::<String>(0)?, "name");
        assert_eq!(feature.attribute::<i64>(1)?, 7);
        assert_eq!(feature.attribute::<Option<i64>>(2)?, None);
        let err = feature.attribute::<i64>(5).expect_err("out of range");
        assert!(matches!(
            err,
            VctError::InvalidFieldIndex {
                index: 5,
                field_count: 3
            }
        ));
        assert_eq!(feature.geometry_wkb()?, None);
        Ok(())
    }
}

//! Reader and writer for VCT, the line-oriented Chinese national vector
//! exchange format.
//!
//! ## Overview
//!
//! - `VctFile` represents a whole document: metadata, field catalog and
//!   features, plus the file that backs it.
//! - `FeatureStore` holds the features and the field catalog and implements
//!   the mutation API.
//! - `VctFeature` represents a single feature with its geometry and
//!   attribute values.
//! - `Value` represents a single attribute value.
//!
//! `VctFile` supports several open modes:
//!
//! - `VctFile::open_read_only(path)`: read an existing file; mutations fail
//!   with `VctError::ReadOnly`.
//! - `VctFile::open(path)`: read an existing file and write every mutation
//!   back to it.
//! - `VctFile::create(path, feature_class, fields)`: create a new file.
//! - `VctFile::new_in_memory(feature_class, fields)` or `text.parse()`: a
//!   document that is never written to disk.
//!
//! A document holds features of one geometry kind (point, line or polygon),
//! decided by its feature-code section. Geometries are `geo-types`
//! multi-geometries; `VctFeature::new` accepts anything implementing
//! `geo_traits::GeometryTrait<T = f64>` (for example `geo_types::Point` or
//! `wkt::Wkt`).
//!
//! ## Reader
//!
//! ```no_run
//! use vctfile::VctFile;
//! use wkt::ToWkt;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vct = VctFile::open_read_only("data/parcels.vct")?;
//!     println!("crs: {:?}, extent: {:?}", vct.crs(), vct.extent());
//!     for feature in vct.features() {
//!         if let Some(geometry) = feature.geometry() {
//!             println!("{}: {}", feature.id(), geometry.to_geo().wkt_string());
//!         }
//!         for (field, value) in vct.fields().iter().zip(feature.attributes()) {
//!             println!("  {} = {value}", field.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Attribute values are decoded as text. `FeatureStore::typed_attribute`
//! interprets them by the declared field type, and `VctFeature::attribute`
//! converts with `TryFrom<Value>`; convert to `Option<T>` to accept nulls:
//!
//! ```no_run
//! # use vctfile::VctFile;
//! # let vct = VctFile::open_read_only("data/parcels.vct")?;
//! let area: f64 = vct.typed_attribute(1, 1)?.try_into()?;
//! let owner: Option<String> = vct.feature(1).ok_or("missing")?.attribute(0)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Writer
//!
//! ```no_run
//! use geo_types::Point;
//! use vctfile::{FeatureClass, FieldSpec, FieldType, GeometryKind, Value, VctFeature, VctFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut vct = VctFile::create(
//!         "wells.vct",
//!         FeatureClass::new("1001", "Wells", GeometryKind::Point, "WELLS"),
//!         vec![
//!             FieldSpec::new("name", FieldType::Varchar),
//!             FieldSpec::new("depth", FieldType::Double).with_length(8, 2),
//!         ],
//!     )?;
//!
//!     let outcome = vct.add_features([VctFeature::new(
//!         Point::new(1.0, 2.0),
//!         [Value::from("alpha"), Value::from(12.5)],
//!     )?])?;
//!     assert_eq!(outcome.added_ids, vec![1]);
//!     Ok(())
//! }
//! ```
//!
//! Every mutation returns an `EditOutcome`. Items that cannot be applied
//! (a geometry of another kind, too many attribute values, an unknown field
//! index) are reported in `EditOutcome::errors` and `VctFile::errors` while
//! the rest of the batch goes through.
mod bounds;
mod conversions;
mod error;
mod geometry;
mod options;
mod types;
mod vct;

pub use error::{Result, VctError};
pub use geometry::Geometry;
pub use options::{ExtentUpdate, VctOptions};
pub use types::{Crs, Extent, FeatureClass, FieldSpec, FieldType, GeometryKind, Value};
pub use vct::{EditOutcome, FeatureStore, VctFeature, VctFile, VctMetadata};

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, VctError};
use crate::geometry::Geometry;
use crate::options::VctOptions;
use crate::types::{Crs, Extent, FeatureClass, FieldSpec, GeometryKind, Value};

use super::reader::read_document;
use super::writer::write_document;
use super::{EditOutcome, FeatureStore, VctFeature, VctMetadata};

/// A VCT document: metadata, features and the file that backs them.
///
/// Writable documents are re-serialized to their file after every
/// mutation.
#[derive(Debug)]
pub struct VctFile {
    path: Option<PathBuf>,
    read_only: bool,
    options: VctOptions,
    metadata: VctMetadata,
    store: FeatureStore,
    errors: Vec<String>,
}

impl VctFile {
    /// Open a VCT file without write access.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = Self::read(path.as_ref(), VctOptions::default())?;
        file.read_only = true;
        Ok(file)
    }

    /// Open an existing VCT file in read-write mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, VctOptions::default())
    }

    /// Open an existing VCT file in read-write mode with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: VctOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VctError::Message(format!(
                "VCT file does not exist: {}",
                path.display()
            )));
        }
        Self::read(path, options)
    }

    /// Create a new VCT file holding no features.
    pub fn create<P: AsRef<Path>>(
        path: P,
        feature_class: FeatureClass,
        fields: Vec<FieldSpec>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(VctError::Message(format!(
                "VCT file already exists: {}",
                path.display()
            )));
        }

        let mut file = Self::new_in_memory(feature_class, fields);
        file.path = Some(path.to_path_buf());
        file.flush()?;
        Ok(file)
    }

    /// Create a document that is never written to disk.
    pub fn new_in_memory(feature_class: FeatureClass, fields: Vec<FieldSpec>) -> Self {
        let store = FeatureStore::new(feature_class.geometry_kind, fields);
        let metadata = VctMetadata {
            feature_class,
            ..Default::default()
        };
        Self::from_parts(None, metadata, store, VctOptions::default())
    }

    fn read(path: &Path, options: VctOptions) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let (metadata, store) = read_document(&text)?;
        log::debug!(
            "read {} features from {}",
            store.feature_count(),
            path.display()
        );
        Ok(Self::from_parts(
            Some(path.to_path_buf()),
            metadata,
            store,
            options,
        ))
    }

    fn from_parts(
        path: Option<PathBuf>,
        metadata: VctMetadata,
        mut store: FeatureStore,
        options: VctOptions,
    ) -> Self {
        store.set_extent_update(options.extent_update);
        Self {
            path,
            read_only: false,
            options,
            metadata,
            store,
            errors: Vec::new(),
        }
    }

    /// Use different options from now on.
    pub fn set_options(&mut self, options: VctOptions) {
        self.store.set_extent_update(options.extent_update);
        self.options = options;
    }

    pub fn options(&self) -> &VctOptions {
        &self.options
    }

    /// The backing file; `None` for in-memory documents.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Serialize the whole document.
    pub fn to_vct_string(&self) -> String {
        let mut buf = Vec::new();
        if let Err(err) = write_document(&mut buf, &self.metadata, &self.store, &self.options) {
            // writing into a Vec does not fail
            log::warn!("failed to serialize document: {err}");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write the document to its backing file. In-memory documents are left
    /// untouched.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let out = BufWriter::new(File::create(path)?);
        write_document(out, &self.metadata, &self.store, &self.options)?;
        log::info!(
            "wrote {} features to {}",
            self.store.feature_count(),
            path.display()
        );
        Ok(())
    }

    pub fn metadata(&self) -> &VctMetadata {
        &self.metadata
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn crs(&self) -> Option<Crs> {
        self.metadata.crs
    }

    pub fn extent(&self) -> Extent {
        self.store.extent()
    }

    pub fn comments(&self) -> &[String] {
        &self.metadata.comments
    }

    /// All comment blocks joined by newlines.
    pub fn data_comment(&self) -> String {
        self.metadata.comments.join("\n")
    }

    pub fn head_lines(&self) -> &[String] {
        &self.metadata.head_lines
    }

    pub fn feature_class(&self) -> &FeatureClass {
        &self.metadata.feature_class
    }

    pub fn custom_items(&self) -> &[String] {
        &self.metadata.custom_items
    }

    /// True when the feature-code section named a supported geometry kind.
    pub fn is_valid(&self) -> bool {
        self.geometry_kind() != GeometryKind::Unknown
    }

    pub fn geometry_kind(&self) -> GeometryKind {
        self.store.geometry_kind()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        self.store.fields()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.store.field_index(name)
    }

    pub fn feature_count(&self) -> usize {
        self.store.feature_count()
    }

    pub fn feature(&self, id: i64) -> Option<&VctFeature> {
        self.store.feature(id)
    }

    /// Iterate over features in identifier order.
    ///
    /// Example:
    /// ```no_run
    /// use vctfile::VctFile;
    ///
    /// let vct = VctFile::open_read_only("data/parcels.vct")?;
    /// for feature in vct.features() {
    ///     let _id = feature.id();
    ///     let _wkb = feature.geometry_wkb()?;
    /// }
    /// # Ok::<(), vctfile::VctError>(())
    /// ```
    pub fn features(&self) -> impl Iterator<Item = &VctFeature> + '_ {
        self.store.features()
    }

    pub fn typed_attribute(&self, id: i64, idx: usize) -> Result<Value> {
        self.store.typed_attribute(id, idx)
    }

    /// Messages of every rejected mutation item since the last
    /// `clear_errors`.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn add_features<I>(&mut self, features: I) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = VctFeature>,
    {
        self.ensure_writable()?;
        let outcome = self.store.add_features(features);
        self.commit(outcome)
    }

    pub fn delete_features<I>(&mut self, ids: I) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = i64>,
    {
        self.ensure_writable()?;
        let outcome = self.store.delete_features(ids);
        self.commit(outcome)
    }

    pub fn add_attributes<I>(&mut self, fields: I) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        self.ensure_writable()?;
        let outcome = self.store.add_attributes(fields);
        self.commit(outcome)
    }

    pub fn rename_attributes<I>(&mut self, renames: I) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        self.ensure_writable()?;
        let outcome = self.store.rename_attributes(renames);
        self.commit(outcome)
    }

    pub fn delete_attributes<I>(&mut self, indices: I) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = usize>,
    {
        self.ensure_writable()?;
        let outcome = self.store.delete_attributes(indices);
        self.commit(outcome)
    }

    pub fn change_attribute_values<I, A>(&mut self, changes: I) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = (i64, A)>,
        A: IntoIterator<Item = (usize, Value)>,
    {
        self.ensure_writable()?;
        let outcome = self.store.change_attribute_values(changes);
        self.commit(outcome)
    }

    pub fn change_geometry_values<I>(&mut self, changes: I) -> Result<EditOutcome>
    where
        I: IntoIterator<Item = (i64, Geometry)>,
    {
        self.ensure_writable()?;
        let outcome = self.store.change_geometry_values(changes);
        self.commit(outcome)
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(VctError::ReadOnly);
        }
        if !self.is_valid() {
            return Err(VctError::InvalidDocument {
                geometry_token: self.metadata.feature_class.geometry_token.clone(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, outcome: EditOutcome) -> Result<EditOutcome> {
        for message in &outcome.errors {
            log::debug!("rejected edit: {message}");
        }
        self.errors.extend(outcome.errors.iter().cloned());
        self.flush()?;
        Ok(outcome)
    }
}

impl FromStr for VctFile {
    type Err = VctError;

    /// Decode a document held in memory. The result is not backed by a file.
    fn from_str(text: &str) -> Result<Self> {
        let (metadata, store) = read_document(text)?;
        Ok(Self::from_parts(None, metadata, store, VctOptions::default()))
    }
}

/// How the document extent follows feature deletions and geometry changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtentUpdate {
    /// Recompute the extent from every remaining geometry.
    #[default]
    Recompute,
    /// Reset the extent to empty. Later additions only grow it once the
    /// store is empty again.
    Reset,
}

/// Options applied when a document is opened or created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VctOptions {
    pub extent_update: ExtentUpdate,
    /// Fixed number of decimals for written coordinates. `None` writes the
    /// shortest text that parses back to the same `f64`.
    pub coordinate_precision: Option<usize>,
}

impl VctOptions {
    pub fn with_extent_update(mut self, extent_update: ExtentUpdate) -> Self {
        self.extent_update = extent_update;
        self
    }

    pub fn with_coordinate_precision(mut self, decimals: usize) -> Self {
        self.coordinate_precision = Some(decimals);
        self
    }
}

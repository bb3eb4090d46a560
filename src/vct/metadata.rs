use crate::types::{Crs, FeatureClass};

/// Document-level information read from the Comment, Head and FeatureCode
/// sections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VctMetadata {
    /// One entry per Comment section, its lines concatenated.
    pub comments: Vec<String>,
    /// Head lines as read, re-emitted verbatim on write.
    pub head_lines: Vec<String>,
    pub crs: Option<Crs>,
    pub feature_class: FeatureClass,
    /// FeatureCode lines after the first, kept verbatim.
    pub custom_items: Vec<String>,
}

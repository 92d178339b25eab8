use serde::{Deserialize, Serialize};

/// Annotations for a single image, as returned in `responses[0]` of an
/// images:annotate call. Missing arrays deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisionAnnotations {
    pub text_annotations: Vec<EntityAnnotation>,
    pub logo_annotations: Vec<EntityAnnotation>,
    pub localized_object_annotations: Vec<LocalizedObject>,
    pub label_annotations: Vec<EntityAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAnnotation {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizedObject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl LocalizedObject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: None,
        }
    }
}

impl VisionAnnotations {
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.localized_object_annotations
            .iter()
            .map(|o| o.name.as_str())
    }
}

//! Wire types of the analysis service

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The body POSTed to the analysis service
#[derive(Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Base 64 image, without a `data:` prefix
    pub image: String,
}

impl Debug for AnalysisRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnalysisRequest {{ image: <{} base64 chars> }}", self.image.len())
    }
}

/// What the analysis service found. Every field is optional, and a missing
/// or `null` field means "no data"
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub labels: Option<Vec<Label>>,
    pub faces: Option<Vec<Face>>,

    /// Set when the service analyzed an object already in the bucket
    pub image_url: Option<String>,
}

/// A detected object or category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    pub name: String,
    pub confidence: f64,
}

/// One detected face
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Face {
    pub confidence: f64,
    pub age_range: Option<AgeRange>,
    pub gender: Option<Gender>,
    pub emotions: Option<Vec<Emotion>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AgeRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Gender {
    pub value: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Emotion {
    #[serde(rename = "Type")]
    pub kind: String,
    pub confidence: f64,
}

impl Label {
    pub fn new(name: &str, confidence: f64) -> Self {
        Label {
            name: name.into(),
            confidence,
        }
    }
}

impl Emotion {
    pub fn new(kind: &str, confidence: f64) -> Self {
        Emotion {
            kind: kind.into(),
            confidence,
        }
    }
}

//! Turns an analysis outcome into what the results area shows. `ResultsView`
//! is the view-model; `to_html` is the only place markup is produced

use crate::error::{ClientError, Result};
use crate::protocol::{AnalysisResult, Emotion, Face, Label};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::cmp::Ordering;

pub const NOTHING_DETECTED: &str = "No objects or faces detected in this image.";

/// Round half up, so `2.5 -> 3` and `-2.5 -> -2`
pub fn round_confidence(confidence: f64) -> i64 {
    (confidence + 0.5).floor() as i64
}

/// The single most confident emotion. Ties go to the first one listed
pub fn top_emotion(emotions: &[Emotion]) -> Option<&Emotion> {
    let mut sorted: Vec<&Emotion> = emotions.iter().collect();
    sorted.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    sorted.first().copied()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelView {
    pub name: String,
    pub confidence: i64,
}

impl LabelView {
    /// Width of the confidence bar, in percent
    pub fn bar_width(&self) -> i64 {
        self.confidence.clamp(0, 100)
    }
}

impl From<&Label> for LabelView {
    fn from(label: &Label) -> Self {
        LabelView {
            name: label.name.clone(),
            confidence: round_confidence(label.confidence),
        }
    }
}

/// `(text, rounded confidence)`
pub type Attribute = (String, i64);

#[derive(Debug, Clone, PartialEq)]
pub struct FaceView {
    /// 1-indexed position in the service's face list
    pub number: usize,
    pub confidence: i64,
    pub age_range: Option<(f64, f64)>,
    pub gender: Option<Attribute>,
    pub emotion: Option<Attribute>,
}

impl FaceView {
    fn new(number: usize, face: &Face) -> Self {
        FaceView {
            number,
            confidence: round_confidence(face.confidence),
            age_range: face.age_range.as_ref().map(|r| (r.low, r.high)),
            gender: face
                .gender
                .as_ref()
                .map(|g| (g.value.clone(), round_confidence(g.confidence))),
            emotion: face
                .emotions
                .as_deref()
                .and_then(top_emotion)
                .map(|e| (e.kind.clone(), round_confidence(e.confidence))),
        }
    }
}

/// Contents of the results area
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsView {
    /// Cleared, e.g. while an analysis is in flight
    #[default]
    Empty,

    Detected {
        labels: Vec<LabelView>,
        faces: Vec<FaceView>,
        image_url: Option<String>,
    },

    NothingDetected,

    /// The analysis failed. Holds the failure description
    Error(String),
}

impl ResultsView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let labels: Vec<LabelView> = result
            .labels
            .iter()
            .flatten()
            .map(LabelView::from)
            .collect();
        let faces: Vec<FaceView> = result
            .faces
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, face)| FaceView::new(i + 1, face))
            .collect();

        if labels.is_empty() && faces.is_empty() {
            return ResultsView::NothingDetected;
        }

        ResultsView::Detected {
            labels,
            faces,
            image_url: result.image_url.clone(),
        }
    }

    pub fn from_outcome(outcome: &Result<AnalysisResult>) -> Self {
        match outcome {
            Ok(result) => Self::from_result(result),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn from_error(err: &ClientError) -> Self {
        ResultsView::Error(err.to_string())
    }

    pub fn to_html(&self) -> String {
        match self {
            ResultsView::Empty => String::new(),
            ResultsView::NothingDetected => {
                format!(r#"<div class="alert alert-info mt-3">{NOTHING_DETECTED}</div>"#)
            }
            ResultsView::Error(message) => format!(
                r#"<div class="alert alert-danger mt-3">Error analyzing image: {}</div>"#,
                encode_text(message)
            ),
            ResultsView::Detected {
                labels,
                faces,
                image_url,
            } => {
                let mut html = String::new();
                if !labels.is_empty() {
                    html.push_str(&labels_card(labels));
                }
                if !faces.is_empty() {
                    html.push_str(&faces_card(faces));
                }
                if let Some(url) = image_url {
                    html.push_str(&format!(
                        r#"<p class="mt-3"><a href="{}">Analyzed image</a></p>"#,
                        encode_double_quoted_attribute(url)
                    ));
                }
                html
            }
        }
    }
}

fn card(title: &str, body: &str) -> String {
    format!(
        r#"<div class="card result-card"><div class="card-header"><h5>{title}</h5></div><div class="card-body">{body}</div></div>"#
    )
}

fn labels_card(labels: &[LabelView]) -> String {
    let mut body = String::from(r#"<div class="row">"#);
    for label in labels {
        let width = label.bar_width();
        body.push_str(&format!(
            concat!(
                r#"<div class="col-md-6 mb-3">"#,
                r#"<p class="mb-1"><strong>{name}</strong> ({confidence}%)</p>"#,
                r#"<div class="progress confidence-bar">"#,
                r#"<div class="progress-bar" role="progressbar" style="width: {width}%" "#,
                r#"aria-valuenow="{width}" aria-valuemin="0" aria-valuemax="100"></div>"#,
                r#"</div></div>"#
            ),
            name = encode_text(&label.name),
            confidence = label.confidence,
            width = width,
        ));
    }
    body.push_str("</div>");
    card("Detected Objects", &body)
}

fn faces_card(faces: &[FaceView]) -> String {
    let mut body = String::new();
    for face in faces {
        body.push_str(r#"<div class="mb-4">"#);
        body.push_str(&format!(
            "<p><strong>Face {}</strong> ({}% confidence)</p>",
            face.number, face.confidence
        ));
        if let Some((low, high)) = face.age_range {
            body.push_str(&format!("<p>Age range: {low} - {high} years</p>"));
        }
        if let Some((value, confidence)) = &face.gender {
            body.push_str(&format!(
                "<p>Gender: {} ({confidence}% confidence)</p>",
                encode_text(value)
            ));
        }
        if let Some((kind, confidence)) = &face.emotion {
            body.push_str(&format!(
                "<p>Emotion: {} ({confidence}% confidence)</p>",
                encode_text(kind)
            ));
        }
        body.push_str("<hr></div>");
    }
    card("Detected Faces", &body)
}

//! The upload page. Rendered once per `GET /` from the current session, so a
//! reload shows whatever the session holds

use crate::config::Settings;
use crate::session::SessionView;
use html_escape::{encode_double_quoted_attribute, encode_text};

const STYLE: &str = r#"
    .drop-area { border: 2px dashed #adb5bd; border-radius: 8px; padding: 40px; text-align: center; cursor: pointer; }
    .drop-area.active { border-color: #0d6efd; background: #f1f6ff; }
    #preview-image { max-width: 100%; max-height: 360px; }
    .result-card { margin-top: 1rem; }
    .confidence-bar { height: 8px; }
"#;

const SCRIPT: &str = r#"
const dropArea = document.getElementById('drop-area');
const fileInput = document.getElementById('file-input');
const previewContainer = document.getElementById('preview-container');
const previewImage = document.getElementById('preview-image');
const analyzeBtn = document.getElementById('analyze-btn');
const resultsContainer = document.getElementById('results-container');
const loadingSpinner = document.getElementById('loading-spinner');

dropArea.addEventListener('click', () => fileInput.click());
fileInput.addEventListener('change', (e) => stage(e.target.files[0]));
analyzeBtn.addEventListener('click', analyze);

['dragover', 'dragleave', 'drop'].forEach((name) => {
    dropArea.addEventListener(name, (e) => { e.preventDefault(); e.stopPropagation(); });
});
dropArea.addEventListener('dragover', () => dropArea.classList.add('active'));
dropArea.addEventListener('dragleave', () => dropArea.classList.remove('active'));
dropArea.addEventListener('drop', (e) => {
    dropArea.classList.remove('active');
    stage(e.dataTransfer.files[0]);
});

function show(state) {
    if (state.preview) {
        previewImage.src = state.preview.data_uri;
        previewContainer.style.display = 'block';
    }
    analyzeBtn.disabled = !state.trigger_enabled;
    loadingSpinner.style.display = state.loading ? 'block' : 'none';
}

async function stage(file) {
    const headers = { 'Content-Type': (file && file.type) || 'application/octet-stream' };
    if (file) headers['X-File-Name'] = encodeURIComponent(file.name);
    const res = await fetch('/select', { method: 'POST', headers, body: file || '' });
    const body = await res.json().catch(() => null);
    if (!res.ok) {
        alert(body && body.errors ? body.errors[0] : 'Upload failed: ' + res.status);
        return;
    }
    show(body);
}

async function analyze() {
    loadingSpinner.style.display = 'block';
    analyzeBtn.disabled = true;
    resultsContainer.innerHTML = '';
    try {
        const res = await fetch('/analyze', { method: 'POST' });
        resultsContainer.innerHTML = await res.text();
    } catch (error) {
        resultsContainer.textContent = 'Error analyzing image: ' + error.message;
    } finally {
        show(await (await fetch('/state')).json());
    }
}
"#;

pub fn render(view: &SessionView, results_html: &str, settings: &Settings) -> String {
    let (preview_src, preview_display) = match &view.preview {
        Some(preview) => (preview.data_uri.as_str(), "block"),
        None => ("", "none"),
    };
    let disabled = if view.trigger_enabled { "" } else { " disabled" };
    let spinner_display = if view.loading { "block" } else { "none" };
    let file_name = view
        .file_name
        .as_deref()
        .map(|name| format!("<p class=\"text-muted\">{}</p>", encode_text(name)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Image Analysis</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css">
<style>{STYLE}</style>
</head>
<body>
<div class="container py-4">
<h1>Image Analysis</h1>
<div id="drop-area" class="drop-area">
<p>Drag and drop an image here, or click to select a file</p>
<input type="file" id="file-input" accept="image/*" hidden>
</div>
<div id="preview-container" class="mt-3" style="display: {preview_display}">
<img id="preview-image" src="{preview_src}" alt="Preview">
{file_name}
</div>
<button id="analyze-btn" class="btn btn-primary"{disabled}>Analyze Image</button>
<div id="loading-spinner" class="spinner-border mt-3" role="status" style="display: {spinner_display}"></div>
<div id="results-container">{results_html}</div>
<footer class="text-muted small mt-4">Analysis service: {endpoint} &middot; bucket {bucket} ({region})</footer>
</div>
<script>{SCRIPT}</script>
</body>
</html>
"#,
        preview_src = encode_double_quoted_attribute(preview_src),
        endpoint = encode_text(&settings.endpoint),
        bucket = encode_text(&settings.bucket),
        region = encode_text(&settings.region),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Preview;
    use crate::session::Phase;

    fn settings() -> Settings {
        Settings {
            endpoint: "http://localhost/analyze".into(),
            bucket: "bucket".into(),
            region: "us-east-1".into(),
            listen_port: 0,
            log: "info".into(),
        }
    }

    #[test]
    fn test_staged_image() {
        let view = SessionView {
            phase: Phase::Previewing,
            file_name: Some("<cat>.png".into()),
            preview: Some(Preview {
                data_uri: "data:image/png;base64,AAAA".into(),
                width: Some(1),
                height: Some(1),
            }),
            loading: false,
            trigger_enabled: true,
        };
        let html = render(&view, "<p>results</p>", &settings());

        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(html.contains(r#"style="display: block""#));
        assert!(html.contains(r#"class="btn btn-primary">Analyze Image"#));
        assert!(html.contains("&lt;cat&gt;.png"));
        assert!(html.contains(r#"<div id="results-container"><p>results</p></div>"#));
    }

    #[test]
    fn test_loading() {
        let view = SessionView {
            phase: Phase::Analyzing,
            file_name: None,
            preview: None,
            loading: true,
            trigger_enabled: false,
        };
        let html = render(&view, "", &settings());
        assert!(html.contains(r#"role="status" style="display: block""#));
        assert!(html.contains(r#"class="btn btn-primary" disabled>"#));
    }

    #[test]
    fn test_upload_errors_without_json_body() {
        // A 413 from the body limit may not carry JSON
        assert!(SCRIPT.contains("await res.json().catch(() => null)"));
        assert!(SCRIPT.contains("'Upload failed: ' + res.status"));
    }
}

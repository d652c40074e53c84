//! The client session owns everything the UI shows: the staged image, its
//! preview, the loading indicator, the analyze trigger and the results
//! area. One session is created at startup and shared by reference.
//!
//! Each analyze call takes a sequence token. A response is rendered only if
//! its token is still the latest when it settles, so an older, slower call
//! can never overwrite a newer result.

use crate::client::AnalysisClient;
use crate::error::Result;
use crate::protocol::AnalysisResult;
use crate::render::ResultsView;
use crate::selection::{FileInput, Preview, SelectedImage};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

/// Where the session is in the select/analyze cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    FileSelected,
    Previewing,
    Analyzing,
    Rendered,
    Errored,
}

#[derive(Debug)]
struct State {
    phase: Phase,
    image: Option<SelectedImage>,
    preview: Option<Preview>,
    loading: bool,
    trigger_enabled: bool,
    results: ResultsView,

    /// Token handed to the most recent analyze call
    latest: u64,

    /// Analyze calls that have not settled yet
    in_flight: usize,
}

impl State {
    /// Bookkeeping shared by every way an analyze call can end
    fn release(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
        self.trigger_enabled = self.in_flight == 0 && self.image.is_some();
    }
}

/// A read-only snapshot of the session, as served to the page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub file_name: Option<String>,
    pub preview: Option<Preview>,
    pub loading: bool,
    pub trigger_enabled: bool,
}

#[derive(Debug)]
pub struct ClientSession {
    client: AnalysisClient,
    state: Mutex<State>,
}

impl ClientSession {
    pub fn new(client: AnalysisClient) -> Self {
        ClientSession {
            client,
            state: Mutex::new(State {
                phase: Phase::Idle,
                image: None,
                preview: None,
                loading: false,
                trigger_enabled: false,
                results: ResultsView::Empty,
                latest: 0,
                in_flight: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage a picked file and show its preview. A file that is not an image
    /// is rejected and leaves the session untouched
    pub async fn select_file(&self, input: Option<FileInput>) -> Result<SelectedImage> {
        let image = SelectedImage::from_input(input).map_err(|err| {
            warn!("rejected file selection: {err}");
            err
        })?;

        let previous = {
            let mut state = self.lock();
            std::mem::replace(&mut state.phase, Phase::FileSelected)
        };

        let preview = match image.preview().await {
            Ok(preview) => preview,
            Err(err) => {
                warn!("could not preview {}: {err}", image.name());
                self.lock().phase = previous;
                return Err(err);
            }
        };

        info!(
            "staged {} ({}, {:?}x{:?})",
            image.name(),
            image.mime(),
            preview.width,
            preview.height
        );

        let mut state = self.lock();
        state.image = Some(image.clone());
        state.preview = Some(preview);
        state.phase = Phase::Previewing;
        state.trigger_enabled = state.in_flight == 0;
        Ok(image)
    }

    /// Analyze the staged image and render the outcome. Returns `None` when
    /// nothing is staged; otherwise the view this call produced, which is
    /// only shown if no newer call was started in the meantime
    pub async fn analyze(&self) -> Option<ResultsView> {
        let (token, image) = {
            let mut state = self.lock();
            let image = state.image.clone()?;
            state.latest += 1;
            state.in_flight += 1;
            state.loading = true;
            state.trigger_enabled = false;
            state.results = ResultsView::Empty;
            state.phase = Phase::Analyzing;
            (state.latest, image)
        };

        info!("analysis #{token} of {} started", image.name());
        let pending = Pending {
            session: self,
            token,
            settled: false,
        };
        let outcome = self.client.analyze(&image).await;

        Some(pending.settle(outcome))
    }

    pub fn view(&self) -> SessionView {
        let state = self.lock();
        SessionView {
            phase: state.phase,
            file_name: state.image.as_ref().map(|i| i.name().to_string()),
            preview: state.preview.clone(),
            loading: state.loading,
            trigger_enabled: state.trigger_enabled,
        }
    }

    /// What the results area currently shows
    pub fn results(&self) -> ResultsView {
        self.lock().results.clone()
    }

    pub fn results_html(&self) -> String {
        self.results().to_html()
    }
}

/// An analyze call that has not settled. Dropping it unsettled (the call's
/// future was dropped) still clears the loading indicator and re-enables the
/// trigger
struct Pending<'a> {
    session: &'a ClientSession,
    token: u64,
    settled: bool,
}

impl Pending<'_> {
    fn settle(mut self, outcome: Result<AnalysisResult>) -> ResultsView {
        let view = ResultsView::from_outcome(&outcome);
        if let Err(err) = &outcome {
            error!("analysis #{} failed: {err}", self.token);
        }

        let mut state = self.session.lock();
        if self.token == state.latest {
            state.results = view.clone();
            state.phase = match outcome {
                Ok(_) => Phase::Rendered,
                Err(_) => Phase::Errored,
            };
        } else {
            warn!(
                "discarding analysis #{}: #{} is newer",
                self.token, state.latest
            );
        }
        state.release();
        self.settled = true;

        view
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        warn!("analysis #{} dropped before it settled", self.token);
        let mut state = self.session.lock();
        if self.token == state.latest && state.phase == Phase::Analyzing {
            state.phase = Phase::Idle;
        }
        state.release();
    }
}

//! Analysis controller - owns the state and at most one open stream

use super::client::{AnalysisClient, AnalysisStream, Closure, StreamRequest, StreamUpdate};
use super::state::AnalysisState;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Query is empty")]
    EmptyQuery,
}

/// Anything that can open an analysis stream for a request
pub trait StreamOpener {
    fn open_stream(&self, request: StreamRequest) -> AnalysisStream;
}

impl StreamOpener for AnalysisClient {
    fn open_stream(&self, request: StreamRequest) -> AnalysisStream {
        self.open(request)
    }
}

/// Single consumer of the stream channel.
///
/// Submitting replaces any previous stream: the old one is closed and the
/// state is reset before the new connection is opened. Dropping the
/// controller closes whatever stream is still open.
pub struct AnalysisController<O: StreamOpener = AnalysisClient> {
    opener: O,
    user_id: String,
    state: AnalysisState,
    active: Option<AnalysisStream>,
}

impl<O: StreamOpener> AnalysisController<O> {
    pub fn new(opener: O, user_id: impl Into<String>) -> Self {
        Self {
            opener,
            user_id: user_id.into(),
            state: AnalysisState::new(),
            active: None,
        }
    }

    pub fn submit(&mut self, query: &str) -> Result<(), SubmitError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SubmitError::EmptyQuery);
        }

        if let Some(previous) = self.active.take() {
            debug!(session_id = previous.session_id(), "Closing superseded analysis stream");
            previous.close();
        }

        self.state.begin(query);
        let stream = self
            .opener
            .open_stream(StreamRequest::new(query, self.user_id.clone()));
        info!(session_id = stream.session_id(), "Analysis submitted");
        self.active = Some(stream);
        Ok(())
    }

    /// Wait for the next update and apply it. Returns false once no stream
    /// is open.
    pub async fn next_update(&mut self) -> bool {
        let Some(stream) = self.active.as_mut() else {
            return false;
        };

        let update = stream.next().await;
        match update {
            Some(update) => self.apply(update),
            None => self.stream_lost(),
        }
        true
    }

    /// Apply every update already queued without waiting; returns how many
    /// were applied.
    pub fn poll_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Some(stream) = self.active.as_mut() {
            let next = stream.try_next();
            match next {
                Ok(update) => {
                    self.apply(update);
                    applied += 1;
                }
                Err(false) => break,
                Err(true) => {
                    self.stream_lost();
                    break;
                }
            }
        }
        applied
    }

    /// Drive the current stream until it closes
    pub async fn run_to_completion(&mut self) {
        while self.next_update().await {}
    }

    /// Close the open stream, if any, and end the loading state
    pub fn cancel(&mut self) {
        if let Some(stream) = self.active.take() {
            stream.close();
            self.state.finish(Closure::Normal);
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    fn apply(&mut self, update: StreamUpdate) {
        let closed = matches!(update, StreamUpdate::Closed(_));
        self.state.apply(update);
        if closed {
            self.active = None;
        }
    }

    fn stream_lost(&mut self) {
        self.active = None;
        self.state
            .finish(Closure::Abnormal("stream task ended without closing".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::events::AnalysisEvent;
    use std::cell::RefCell;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    /// Hands out pre-wired channels instead of opening connections
    #[derive(Default)]
    struct ScriptedOpener {
        senders: RefCell<Vec<(mpsc::Sender<StreamUpdate>, CancellationToken, String)>>,
    }

    impl StreamOpener for ScriptedOpener {
        fn open_stream(&self, request: StreamRequest) -> AnalysisStream {
            let (tx, rx) = mpsc::channel(16);
            let (stream, cancel) = AnalysisStream::from_channel(rx);
            self.senders.borrow_mut().push((tx, cancel, request.message));
            stream
        }
    }

    #[test]
    fn test_empty_query_rejected() {
        let mut controller = AnalysisController::new(ScriptedOpener::default(), "default_user");
        assert_eq!(controller.submit("   "), Err(SubmitError::EmptyQuery));
        assert!(!controller.is_streaming());
    }

    #[tokio::test]
    async fn test_resubmit_closes_previous_stream() {
        let mut controller = AnalysisController::new(ScriptedOpener::default(), "default_user");
        controller.submit("first").unwrap();
        controller.submit("second").unwrap();

        let senders = controller.opener.senders.borrow();
        assert_eq!(senders.len(), 2);
        assert!(senders[0].1.is_cancelled());
        assert!(!senders[1].1.is_cancelled());
        assert_eq!(senders[1].2, "second");
        drop(senders);

        assert_eq!(controller.state().query(), "second");
    }

    #[tokio::test]
    async fn test_updates_from_superseded_stream_are_dropped() {
        let mut controller = AnalysisController::new(ScriptedOpener::default(), "default_user");
        controller.submit("first").unwrap();
        let old_tx = controller.opener.senders.borrow()[0].0.clone();
        controller.submit("second").unwrap();

        // The old receiver is gone together with its stream
        let sent = old_tx
            .send(StreamUpdate::Event(AnalysisEvent::Error { message: None }))
            .await;
        assert!(sent.is_err());
        assert_eq!(controller.poll_updates(), 0);
        assert!(controller.state().error().is_none());
    }

    #[tokio::test]
    async fn test_closed_update_ends_stream() {
        let mut controller = AnalysisController::new(ScriptedOpener::default(), "default_user");
        controller.submit("q").unwrap();
        let tx = controller.opener.senders.borrow()[0].0.clone();

        tx.send(StreamUpdate::Closed(Closure::Normal)).await.unwrap();
        assert!(controller.next_update().await);
        assert!(!controller.is_streaming());
        assert!(!controller.state().is_loading());
        assert!(!controller.next_update().await);
    }

    #[tokio::test]
    async fn test_sender_dropped_without_close() {
        let mut controller = AnalysisController::new(ScriptedOpener::default(), "default_user");
        controller.submit("q").unwrap();
        controller.opener.senders.borrow_mut().clear();

        controller.run_to_completion().await;
        assert!(!controller.state().is_loading());
        assert!(controller.state().error().is_some());
    }

    #[tokio::test]
    async fn test_drop_cancels_stream() {
        let opener = ScriptedOpener::default();
        let mut controller = AnalysisController::new(opener, "default_user");
        controller.submit("q").unwrap();
        let token = controller.opener.senders.borrow()[0].1.clone();
        drop(controller);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_clears_loading() {
        let mut controller = AnalysisController::new(ScriptedOpener::default(), "default_user");
        controller.submit("q").unwrap();
        controller.cancel();
        assert!(!controller.state().is_loading());
        assert!(controller.state().error().is_none());
    }
}

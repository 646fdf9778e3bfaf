//! Whole-page state for one browser session
//!
//! [`Session`] ties the upload surface, the current batch and the views
//! over it together and keeps them consistent: uploads are disabled while a
//! run is outstanding, and every change of batch prunes the selection and
//! the dropped positions.

use crate::arrangement::{Arrangement, DragPayload, Position, Rect};
use crate::library::Library;
use crate::run::{DetectionRun, FailurePolicy, Resolution, RunError, RunTicket};
use crate::selection::Selection;
use crate::upload::{UploadError, UploadSurface, UploadedImage};
use brickyard_pieces::{Piece, PieceId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("upload an image first")]
    MissingImage,

    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    upload: UploadSurface,
    batch: Vec<Piece>,
    selection: Selection,
    library: Library,
    arrangement: Arrangement,
    run: DetectionRun,
}

impl Session {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            run: DetectionRun::new(policy),
            ..Self::default()
        }
    }

    pub fn upload(&self) -> &UploadSurface {
        &self.upload
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.upload.preview()
    }

    pub fn batch(&self) -> &[Piece] {
        &self.batch
    }

    pub fn piece(&self, id: &PieceId) -> Option<&Piece> {
        self.batch.iter().find(|piece| &piece.id == id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_pieces(&self) -> Vec<&Piece> {
        self.selection.pieces(&self.batch)
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library {
        &mut self.library
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn arrangement_mut(&mut self) -> &mut Arrangement {
        &mut self.arrangement
    }

    pub fn run(&self) -> &DetectionRun {
        &self.run
    }

    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    /// Install a new image. The previous batch belongs to the old image and
    /// is discarded together with selection and positions.
    ///
    /// Rejected while a run is in progress; [`Session::clear_image`] is the
    /// way to abandon a run.
    pub fn upload_image(&mut self, image: UploadedImage) -> Result<(), SessionError> {
        self.upload.accept(image)?;
        self.discard_batch();
        Ok(())
    }

    /// Remove the image. Allowed mid-run; the outstanding run is abandoned.
    pub fn clear_image(&mut self) -> bool {
        let had_image = self.upload.clear();
        if self.run.cancel() {
            self.upload.set_disabled(false);
        }
        self.discard_batch();
        had_image
    }

    /// Start a run for the current image and lock the upload surface
    pub fn start_detection(&mut self) -> Result<(RunTicket, UploadedImage), SessionError> {
        let image = self.upload.preview().cloned().ok_or(SessionError::MissingImage)?;
        let ticket = self.run.begin()?;
        self.upload.set_disabled(true);
        tracing::info!("detection run started for {}", image.name);
        Ok((ticket, image))
    }

    /// Apply a run's result. Returns the alert message when the run failed
    /// and the previous batch was kept.
    pub fn finish_detection(
        &mut self,
        ticket: RunTicket,
        result: Result<Vec<Piece>, String>,
    ) -> Option<String> {
        match self.run.resolve(ticket, result) {
            Resolution::Stale => None,
            Resolution::Replace(pieces) => {
                self.upload.set_disabled(false);
                tracing::info!("received {} pieces", pieces.len());
                self.batch = pieces;
                self.selection.retain_batch(&self.batch);
                self.arrangement.retain_batch(&self.batch);
                None
            }
            Resolution::KeepPrevious { message } => {
                self.upload.set_disabled(false);
                Some(message)
            }
        }
    }

    /// Back to the upload step: empty batch, nothing selected, default view
    pub fn reset_detection(&mut self) {
        self.discard_batch();
        self.arrangement.reset();
    }

    /// Flip the selection of a piece in the batch. `None` for unknown ids.
    pub fn toggle_piece(&mut self, id: &PieceId) -> Option<bool> {
        self.piece(id)?;
        Some(self.selection.toggle(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Handle a drop on the arrangement canvas.
    ///
    /// Places the dragged piece at the drop point and selects it if it was
    /// not selected yet. Foreign payloads and unknown pieces are ignored.
    pub fn drop_piece(
        &mut self,
        payload: &str,
        client_x: f64,
        client_y: f64,
        rect: Rect,
    ) -> Option<(PieceId, Position)> {
        let payload = DragPayload::parse(payload)?;
        let id = self.piece(&payload.piece_id)?.id.clone();
        let position = rect.relative_position(client_x, client_y)?;
        self.arrangement.place(id.clone(), position);
        self.selection.insert(id.clone());
        Some((id, position))
    }

    /// Arrangement reset: nothing selected, zoom 1.0, no dropped positions
    pub fn reset_view(&mut self) {
        self.selection.clear();
        self.arrangement.reset();
    }

    fn discard_batch(&mut self) {
        self.batch.clear();
        self.selection.clear();
        self.arrangement.retain_batch(&self.batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickyard_pieces::mock_batch;

    fn image(name: &str) -> UploadedImage {
        UploadedImage {
            name: name.into(),
            size: 2048,
            mime: "image/png".into(),
            data_url: "data:image/png;base64,AAAA".into(),
        }
    }

    fn rect() -> Rect {
        Rect {
            left: 0.0,
            top: 0.0,
            width: 200.0,
            height: 100.0,
        }
    }

    fn session_with_batch() -> Session {
        let mut session = Session::default();
        session.upload_image(image("set.png")).unwrap();
        let (ticket, _) = session.start_detection().unwrap();
        session.finish_detection(ticket, Ok(mock_batch()));
        session
    }

    #[test]
    fn test_start_requires_image() {
        let mut session = Session::default();
        assert_eq!(
            session.start_detection().unwrap_err(),
            SessionError::MissingImage
        );
        assert!(!session.is_running());
    }

    #[test]
    fn test_upload_disabled_while_running() {
        let mut session = Session::default();
        session.upload_image(image("a.png")).unwrap();
        let (ticket, sent) = session.start_detection().unwrap();
        assert_eq!(sent.name, "a.png");
        assert!(session.upload().is_disabled());
        assert_eq!(
            session.upload_image(image("b.png")),
            Err(SessionError::Upload(UploadError::Disabled))
        );
        assert_eq!(
            session.start_detection().unwrap_err(),
            SessionError::Run(RunError::AlreadyRunning)
        );

        assert!(session.is_running());
        assert_eq!(session.image().map(|i| i.name.as_str()), Some("a.png"));

        session.finish_detection(ticket, Ok(mock_batch()));
        assert!(!session.upload().is_disabled());
        assert_eq!(session.batch().len(), 4);
    }

    #[test]
    fn test_failed_run_keeps_previous_batch() {
        let mut session = session_with_batch();
        let (ticket, _) = session.start_detection().unwrap();
        let alert = session.finish_detection(ticket, Err("API error (500): boom".into()));
        assert_eq!(alert.as_deref(), Some("API error (500): boom"));
        assert_eq!(session.batch().len(), 4);
        assert!(!session.is_running());
    }

    #[test]
    fn test_clear_mid_run_ignores_late_result() {
        let mut session = Session::default();
        session.upload_image(image("a.png")).unwrap();
        let (ticket, _) = session.start_detection().unwrap();

        assert!(session.clear_image());
        assert!(!session.upload().is_disabled());
        assert_eq!(session.finish_detection(ticket, Ok(mock_batch())), None);
        assert!(session.batch().is_empty());
        assert!(session.image().is_none());
    }

    #[test]
    fn test_toggle_piece() {
        let mut session = session_with_batch();
        let id = session.batch()[0].id.clone();
        assert_eq!(session.toggle_piece(&id), Some(true));
        assert_eq!(session.selected_pieces().len(), 1);
        assert_eq!(session.toggle_piece(&id), Some(false));
        assert!(session.selection().is_empty());
        assert_eq!(session.toggle_piece(&PieceId::from("nope")), None);
    }

    #[test]
    fn test_drop_places_and_selects() {
        let mut session = session_with_batch();
        let id = session.batch()[2].id.clone();
        let payload = DragPayload::new(id.clone(), 2).to_json();

        let (dropped, position) = session.drop_piece(&payload, 100.0, 50.0, rect()).unwrap();
        assert_eq!(dropped, id);
        assert_eq!(position, Position { x: 50.0, y: 50.0 });
        assert!(session.selection().contains(&id));
        assert_eq!(session.arrangement().position(&id), Some(position));

        // Dropping an already selected piece keeps it selected
        session.drop_piece(&payload, 20.0, 10.0, rect()).unwrap();
        assert!(session.selection().contains(&id));
        assert_eq!(session.selection().len(), 1);
    }

    #[test]
    fn test_drop_ignores_foreign_payloads() {
        let mut session = session_with_batch();
        assert!(session.drop_piece("not json", 10.0, 10.0, rect()).is_none());
        let unknown = DragPayload::new(PieceId::from("ghost"), 9).to_json();
        assert!(session.drop_piece(&unknown, 10.0, 10.0, rect()).is_none());
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_new_batch_prunes_selection_and_positions() {
        let mut session = session_with_batch();
        let kept = session.batch()[0].id.clone();
        let dropped = session.batch()[3].id.clone();
        session.toggle_piece(&kept);
        session.toggle_piece(&dropped);
        let payload = DragPayload::new(dropped.clone(), 3).to_json();
        session.drop_piece(&payload, 10.0, 10.0, rect());

        let (ticket, _) = session.start_detection().unwrap();
        let smaller: Vec<Piece> = mock_batch().into_iter().take(2).collect();
        session.finish_detection(ticket, Ok(smaller));

        assert!(session.selection().contains(&kept));
        assert!(!session.selection().contains(&dropped));
        assert!(session.arrangement().position(&dropped).is_none());
    }

    #[test]
    fn test_reset_view_clears_selection_zoom_and_positions() {
        let mut session = session_with_batch();
        let id = session.batch()[1].id.clone();
        let payload = DragPayload::new(id.clone(), 1).to_json();
        session.drop_piece(&payload, 50.0, 50.0, rect());
        session
            .arrangement_mut()
            .adjust_zoom(crate::arrangement::ZoomDirection::In);

        session.reset_view();
        assert!(session.selection().is_empty());
        assert_eq!(session.arrangement().zoom(), 1.0);
        assert!(session.arrangement().position(&id).is_none());
        assert_eq!(session.batch().len(), 4);
    }

    #[test]
    fn test_reset_detection() {
        let mut session = session_with_batch();
        let id = session.batch()[0].id.clone();
        session.toggle_piece(&id);
        session.reset_detection();
        assert!(session.batch().is_empty());
        assert!(session.selection().is_empty());
        assert!(session.image().is_some());
    }
}

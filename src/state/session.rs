/// Session state controller
///
/// Owns the person photo, the four outfit slots and the generation
/// outcome. Every mutation goes through here; the UI only reads.

use std::fmt::Display;

use super::data::{EncodedImage, GenerationOutcome, OutfitRole, OutfitSlots};
use crate::gemini::{GenerationError, TryOnClient};

/// Shown when generate is pressed without enough inputs
pub const MISSING_INPUTS_MESSAGE: &str = "Please upload your photo and at least one clothing item.";

/// Shown when the person photo cannot be read
pub const SUBJECT_LOAD_MESSAGE: &str = "Failed to load your photo.";

/// Owned snapshot of the inputs for one generation attempt
///
/// Cloned out of the session so the request can run in the background
/// while the session keeps accepting events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub subject: EncodedImage,
    pub outfit: OutfitSlots,
}

/// In-memory state for one user; nothing here is persisted
#[derive(Debug, Default)]
pub struct Session {
    subject: Option<EncodedImage>,
    outfit: OutfitSlots,
    outcome: GenerationOutcome,
    /// Last upload failure, kept apart from the generation outcome
    upload_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> Option<&EncodedImage> {
        self.subject.as_ref()
    }

    pub fn outfit(&self) -> &OutfitSlots {
        &self.outfit
    }

    pub fn outcome(&self) -> &GenerationOutcome {
        &self.outcome
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    /// Store a decoded person photo
    ///
    /// On a decode failure the current photo is kept and an error is
    /// recorded instead.
    pub fn set_subject_image<E: Display>(&mut self, decoded: Result<EncodedImage, E>) {
        match decoded {
            Ok(image) => {
                tracing::info!(file = ?image.file_name, media_type = %image.media_type, "Person photo set");
                self.subject = Some(image);
                self.upload_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load person photo");
                self.upload_error = Some(SUBJECT_LOAD_MESSAGE.to_string());
            }
        }
    }

    /// Store a decoded clothing photo under `role`, replacing any previous one
    pub fn set_outfit_image<E: Display>(&mut self, role: OutfitRole, decoded: Result<EncodedImage, E>) {
        match decoded {
            Ok(image) => {
                tracing::info!(%role, file = ?image.file_name, media_type = %image.media_type, "Outfit image set");
                self.outfit.set(role, image);
                self.upload_error = None;
            }
            Err(e) => {
                tracing::warn!(%role, error = %e, "Failed to load outfit image");
                self.upload_error = Some(format!("Failed to load {} image.", role));
            }
        }
    }

    pub fn clear_subject_image(&mut self) {
        if self.subject.take().is_some() {
            tracing::debug!("Person photo removed");
        }
        self.upload_error = None;
    }

    pub fn clear_outfit_image(&mut self, role: OutfitRole) {
        if self.outfit.clear(role).is_some() {
            tracing::debug!(%role, "Outfit image removed");
        }
        self.upload_error = None;
    }

    /// Person photo present, at least one clothing item, nothing in flight
    pub fn can_generate(&self) -> bool {
        self.subject.is_some() && !self.outfit.is_empty() && !self.outcome.is_in_progress()
    }

    /// Check the gate and move to `InProgress`
    ///
    /// Missing inputs turn into a `Failed` outcome with an instruction for
    /// the user. A request already in flight is left alone so its result
    /// still lands, and at most one request is ever outstanding.
    pub fn begin_generation(&mut self) -> Option<GenerationRequest> {
        if self.outcome.is_in_progress() {
            tracing::debug!("Generation already in progress, ignoring");
            return None;
        }

        let subject = match &self.subject {
            Some(subject) if !self.outfit.is_empty() => subject.clone(),
            _ => {
                self.outcome = GenerationOutcome::Failed(MISSING_INPUTS_MESSAGE.to_string());
                return None;
            }
        };

        self.outcome = GenerationOutcome::InProgress;
        self.upload_error = None;

        Some(GenerationRequest {
            subject,
            outfit: self.outfit.clone(),
        })
    }

    /// Record the result of the request started by `begin_generation`
    pub fn finish_generation(&mut self, result: Result<String, GenerationError>) {
        self.outcome = match result {
            Ok(data_uri) => GenerationOutcome::Succeeded(data_uri),
            Err(e) => GenerationOutcome::Failed(e.to_string()),
        };
    }

    /// Run a full generation attempt against `client`
    ///
    /// Never leaves the session `InProgress` once it returns.
    pub async fn generate<C: TryOnClient>(&mut self, client: &C) {
        let Some(request) = self.begin_generation() else {
            return;
        };

        let result = client
            .request_try_on(&request.subject, &request.outfit)
            .await;
        self.finish_generation(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;

    /// Records every call and replies with a fixed result
    struct FakeClient {
        reply: Result<String, GenerationError>,
        calls: Mutex<Vec<GenerationRequest>>,
    }

    impl FakeClient {
        fn replying(reply: Result<String, GenerationError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl TryOnClient for FakeClient {
        fn request_try_on(
            &self,
            subject: &EncodedImage,
            outfit: &OutfitSlots,
        ) -> impl Future<Output = Result<String, GenerationError>> + Send {
            self.calls.lock().unwrap().push(GenerationRequest {
                subject: subject.clone(),
                outfit: outfit.clone(),
            });
            let reply = self.reply.clone();
            async move { reply }
        }
    }

    fn image(tag: &str) -> EncodedImage {
        EncodedImage {
            data_uri: format!("data:image/png;base64,{}", tag),
            media_type: "image/png".to_string(),
            file_name: Some(format!("{}.png", tag)),
        }
    }

    fn ok(tag: &str) -> Result<EncodedImage, String> {
        Ok(image(tag))
    }

    fn failed_read() -> Result<EncodedImage, String> {
        Err("permission denied".to_string())
    }

    #[test]
    fn test_can_generate_truth_table() {
        for has_subject in [false, true] {
            for mask in 0u8..16 {
                for in_progress in [false, true] {
                    let mut session = Session::new();
                    if has_subject {
                        session.set_subject_image(ok("me"));
                    }
                    for (bit, role) in OutfitRole::ALL.iter().enumerate() {
                        if mask & (1 << bit) != 0 {
                            session.set_outfit_image(*role, ok(role.name()));
                        }
                    }
                    if in_progress {
                        session.outcome = GenerationOutcome::InProgress;
                    }

                    let expected = has_subject && mask != 0 && !in_progress;
                    assert_eq!(
                        session.can_generate(),
                        expected,
                        "subject={} mask={:04b} in_progress={}",
                        has_subject,
                        mask,
                        in_progress
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_subject_and_top_succeeds() {
        let client = FakeClient::replying(Ok("data:image/png;base64,RESULT".to_string()));
        let mut session = Session::new();
        session.set_subject_image(ok("me"));
        session.set_outfit_image(OutfitRole::Top, ok("shirt"));

        session.generate(&client).await;

        assert_eq!(
            session.outcome(),
            &GenerationOutcome::Succeeded("data:image/png;base64,RESULT".to_string())
        );
        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].subject, image("me"));
        assert_eq!(calls[0].outfit.get(OutfitRole::Top), Some(&image("shirt")));
        assert_eq!(calls[0].outfit.filled().count(), 1);
    }

    #[tokio::test]
    async fn test_no_clothing_never_calls_client() {
        let client = FakeClient::replying(Ok("unused".to_string()));
        let mut session = Session::new();
        session.set_subject_image(ok("me"));

        session.generate(&client).await;

        assert_eq!(
            session.outcome(),
            &GenerationOutcome::Failed(MISSING_INPUTS_MESSAGE.to_string())
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_subject_never_calls_client() {
        let client = FakeClient::replying(Ok("unused".to_string()));
        let mut session = Session::new();
        session.set_outfit_image(OutfitRole::Top, ok("shirt"));
        session.set_outfit_image(OutfitRole::Shoes, ok("boots"));

        session.generate(&client).await;

        assert_eq!(
            session.outcome(),
            &GenerationOutcome::Failed(MISSING_INPUTS_MESSAGE.to_string())
        );
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_client_failure_shows_generic_message() {
        let client = FakeClient::replying(Err(GenerationError));
        let mut session = Session::new();
        session.set_subject_image(ok("me"));
        session.set_outfit_image(OutfitRole::Bottom, ok("jeans"));

        session.generate(&client).await;

        assert_eq!(
            session.outcome(),
            &GenerationOutcome::Failed(GenerationError.to_string())
        );
        assert!(session.can_generate());
    }

    #[tokio::test]
    async fn test_new_attempt_replaces_previous_result() {
        let mut session = Session::new();
        session.set_subject_image(ok("me"));
        session.set_outfit_image(OutfitRole::Head, ok("cap"));

        session
            .generate(&FakeClient::replying(Ok("data:image/png;base64,FIRST".to_string())))
            .await;
        assert_eq!(session.outcome().result(), Some("data:image/png;base64,FIRST"));

        session.generate(&FakeClient::replying(Err(GenerationError))).await;
        assert_eq!(session.outcome().result(), None);
        assert!(matches!(session.outcome(), GenerationOutcome::Failed(_)));
    }

    #[test]
    fn test_begin_while_in_progress_is_ignored() {
        let mut session = Session::new();
        session.set_subject_image(ok("me"));
        session.set_outfit_image(OutfitRole::Top, ok("shirt"));

        let first = session.begin_generation();
        assert!(first.is_some());
        assert!(!session.can_generate());

        assert_eq!(session.begin_generation(), None);
        assert_eq!(session.outcome(), &GenerationOutcome::InProgress);

        session.finish_generation(Ok("data:image/png;base64,DONE".to_string()));
        assert!(session.can_generate());
    }

    #[test]
    fn test_request_snapshot_is_independent() {
        let mut session = Session::new();
        session.set_subject_image(ok("me"));
        session.set_outfit_image(OutfitRole::Top, ok("shirt"));

        let request = session.begin_generation().unwrap();
        session.clear_outfit_image(OutfitRole::Top);

        assert_eq!(request.outfit.get(OutfitRole::Top), Some(&image("shirt")));
    }

    #[test]
    fn test_remove_only_affects_one_role() {
        let mut session = Session::new();
        for role in OutfitRole::ALL {
            session.set_outfit_image(role, ok(role.name()));
        }

        session.clear_outfit_image(OutfitRole::Bottom);

        assert!(session.outfit().get(OutfitRole::Bottom).is_none());
        for role in [OutfitRole::Head, OutfitRole::Top, OutfitRole::Shoes] {
            assert_eq!(session.outfit().get(role), Some(&image(role.name())));
        }
    }

    #[test]
    fn test_decode_failure_keeps_existing_images() {
        let mut session = Session::new();
        session.set_subject_image(ok("me"));
        session.set_outfit_image(OutfitRole::Shoes, ok("boots"));

        session.set_subject_image(failed_read());
        assert_eq!(session.subject(), Some(&image("me")));
        assert_eq!(session.upload_error(), Some(SUBJECT_LOAD_MESSAGE));

        session.set_outfit_image(OutfitRole::Shoes, failed_read());
        assert_eq!(session.outfit().get(OutfitRole::Shoes), Some(&image("boots")));
        assert_eq!(session.upload_error(), Some("Failed to load shoes image."));

        // Generation outcome is not touched by upload failures
        assert_eq!(session.outcome(), &GenerationOutcome::Idle);
    }

    #[test]
    fn test_successful_upload_clears_upload_error() {
        let mut session = Session::new();
        session.set_outfit_image(OutfitRole::Head, failed_read());
        assert!(session.upload_error().is_some());

        session.set_outfit_image(OutfitRole::Head, ok("cap"));
        assert_eq!(session.upload_error(), None);
    }

    #[test]
    fn test_clear_subject() {
        let mut session = Session::new();
        session.set_subject_image(ok("me"));
        session.clear_subject_image();
        assert!(session.subject().is_none());
    }
}

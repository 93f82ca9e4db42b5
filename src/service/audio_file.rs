use crate::cache::Collection;
use crate::gateway::{FilePart, GatewayRequest, segment};
use crate::models::audio_file::{AudioFile, NewAudioFile, PlaybackUrl};
use crate::service::coordinator::{AfterMutation, PostMutation};
use crate::service::{ActionContext, Outcome};
use serde::de::IgnoredAny;
use tracing::info;

const LIST_FAILED: &str = "Error getting audio files. Please try again.";
const CREATE_FAILED: &str = "Error creating new audio file. Please try again.";
const PLAYBACK_FAILED: &str = "Error getting audio URL. Please try again.";

pub struct AudioFileService<'a> {
    ctx: ActionContext<'a>,
}

impl<'a> AudioFileService<'a> {
    pub fn new(ctx: ActionContext<'a>) -> Self {
        AudioFileService { ctx }
    }

    pub async fn list_audio_files(&self) -> Outcome<Vec<AudioFile>> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        if let Some(files) = self.ctx.views.get(Collection::AudioFiles, &session).await {
            return Outcome::Rendered(Ok(files));
        }

        let generation = self.ctx.views.generation(Collection::AudioFiles).await;
        let request = GatewayRequest::get("/audio_files").bearer(&session.token);
        let result = self.ctx.gateway.call_objs::<AudioFile>(request, LIST_FAILED).await;
        if let Ok(files) = &result {
            self.ctx.views.put(Collection::AudioFiles, &session, generation, files).await;
        }
        self.ctx.settle(result)
    }

    /// Upload a new file. The payload goes out untouched and the response body
    /// is discarded on success.
    pub async fn create_audio_file(&self, new_file: NewAudioFile) -> Outcome<()> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        let size = new_file.upload.bytes.len();
        let file = FilePart {
            field: "audio_file",
            file_name: new_file.upload.file_name,
            content_type: new_file.upload.content_type,
            bytes: new_file.upload.bytes,
        };
        let request = GatewayRequest::post("/audio_files/")
            .bearer(&session.token)
            .multipart(vec![("description", new_file.description), ("category", new_file.category)], file);

        match self.ctx.gateway.call::<IgnoredAny>(request, CREATE_FAILED).await {
            Ok(_) => {
                info!(size, "audio file uploaded");
                PostMutation::new(self.ctx.views).complete(Collection::AudioFiles, AfterMutation::Navigate).await
            }
            Err(err) => self.ctx.settle(Err(err)),
        }
    }

    /// Ask for a short-lived playback URL. Requested on every playback
    /// attempt and never cached.
    pub async fn streaming_url(&self, id: &str) -> Outcome<PlaybackUrl> {
        let Some(session) = self.ctx.require_session() else {
            return Outcome::to_login();
        };

        let request = GatewayRequest::get(format!("/audio_files/token/{}", segment(id))).bearer(&session.token);
        self.ctx.settle(self.ctx.gateway.call(request, PLAYBACK_FAILED).await)
    }
}

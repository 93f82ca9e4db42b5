use crate::error::action_error::ActionError;
use crate::models::audio_file::{AudioFile, AudioUpload, NewAudioFile, PlaybackUrl};
use crate::routes::Actions;
use crate::service::Outcome;
use crate::service::audio_file::AudioFileService;
use rocket::FromForm;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::routes;
use tokio::io::AsyncReadExt;
use tracing::error;

const UPLOAD_UNREADABLE: &str = "Error reading uploaded file. Please try again.";

#[derive(FromForm)]
pub struct AudioFileForm<'r> {
    pub description: String,
    pub category: String,
    pub audio_file: TempFile<'r>,
}

/// Pull the uploaded bytes out of Rocket's temp file. The browser's file name
/// and content type go to the backend untouched; the backend derives the
/// stored blob's extension from the name.
async fn read_upload(file: &TempFile<'_>) -> std::io::Result<AudioUpload> {
    let mut bytes = Vec::with_capacity(file.len() as usize);
    let reader = file.open().await?;
    tokio::pin!(reader);
    reader.read_to_end(&mut bytes).await?;

    let content_type = file.content_type().map(|ct| ct.to_string()).unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = match file.raw_name().map(|name| name.dangerous_unsafe_unsanitized_raw().as_str()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback_file_name(file),
    };

    Ok(AudioUpload {
        file_name,
        content_type,
        bytes,
    })
}

fn fallback_file_name(file: &TempFile<'_>) -> String {
    let stem = file.name().unwrap_or("upload");
    match file.content_type().and_then(|ct| ct.extension()) {
        Some(extension) => format!("{stem}.{extension}"),
        None => stem.to_string(),
    }
}

#[rocket::get("/")]
pub async fn list_audio_files(actions: Actions<'_>) -> Outcome<Vec<AudioFile>> {
    let sessions = actions.sessions();
    AudioFileService::new(actions.context(&sessions)).list_audio_files().await
}

#[rocket::post("/", data = "<form>")]
pub async fn create_audio_file(actions: Actions<'_>, form: Form<AudioFileForm<'_>>) -> Outcome<()> {
    let form = form.into_inner();
    let upload = match read_upload(&form.audio_file).await {
        Ok(upload) => upload,
        Err(err) => {
            error!(error = %err, "failed to read uploaded audio file");
            return Outcome::Rendered(Err(ActionError::transport(UPLOAD_UNREADABLE)));
        }
    };

    let new_file = NewAudioFile {
        description: form.description,
        category: form.category,
        upload,
    };
    let sessions = actions.sessions();
    AudioFileService::new(actions.context(&sessions)).create_audio_file(new_file).await
}

#[rocket::get("/<id>/play")]
pub async fn play_audio_file(actions: Actions<'_>, id: &str) -> Outcome<PlaybackUrl> {
    let sessions = actions.sessions();
    AudioFileService::new(actions.context(&sessions)).streaming_url(id).await
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_audio_files, create_audio_file, play_audio_file]
}

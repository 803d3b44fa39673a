use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

/// Serve an embedded file with its guessed MIME type, or 404.
pub fn serve(path: &str) -> Response {
    let path = path.trim_start_matches('/');

    match Assets::get(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                file.data.into_owned(),
            )
                .into_response()
        }
        None => {
            tracing::debug!("Static asset not found: {}", path);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

//! Stream de cambios por Server-Sent Events
//!
//! Reenvía al navegador cada evento del puente de cambios. En modo local el
//! stream sólo emite keep-alives.

use axum::{
    extract::{Extension, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing::{debug, warn};

use crate::{middleware::auth::AuthenticatedUser, state::AppState};

const KEEP_ALIVE_SECS: u64 = 15;

pub async fn stream_changes(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("📡 {} abrió el stream de cambios", user.email);

    let stream = BroadcastStream::new(state.bridge.events()).filter_map(|message| match message {
        Ok(change) => match Event::default().event("change").json_data(&change) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!("⚠️ Evento no serializable: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("⚠️ Cliente SSE atrasado: {}", e);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)))
}

use crate::database::PageStore;
use crate::entities::Theme;
use crate::error::{AppError, AppResult};
use crate::models::{DraftPage, PageData, SavePageDataRequest};
use crate::utils::{
    Elapsed, MAX_PAYLOAD_BYTES, cap_payload, parse_start, script_start, youtube_video_id,
};
use askama::Template;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Image ceiling for a plain save, the largest plan's allowance
pub const MAX_SAVED_IMAGES: usize = 10;

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    couple_names: &'a str,
    message: &'a str,
    dark: bool,
    images_json: String,
    video_id: Option<String>,
    start: String,
    elapsed: Elapsed,
}

#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn PageStore>,
}

impl PageService {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    /// Progressive save from the builder form; every field of `pageData` is optional
    pub async fn save_draft(&self, request: SavePageDataRequest) -> AppResult<()> {
        let session_id = request.session_id.trim();
        if session_id.is_empty() {
            return Err(AppError::ValidationError("sessionId is required".to_string()));
        }
        let page = request
            .page_data
            .ok_or_else(|| AppError::ValidationError("pageData is required".to_string()))?;

        let mut page = normalize_page(page);
        page.images.truncate(MAX_SAVED_IMAGES);

        self.store.upsert(session_id, &page).await?;
        log::info!("Draft saved for session {session_id}");
        Ok(())
    }

    pub async fn render(&self, session_id: &str) -> AppResult<String> {
        let draft = self
            .store
            .find_by_session_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Página não encontrada".to_string()))?;

        render_page(&draft, Utc::now())
    }
}

/// Caps every stored payload and drops blank optional text
pub fn normalize_page(mut page: PageData) -> PageData {
    page.images = page
        .images
        .into_iter()
        .map(|img| cap_payload(img, MAX_PAYLOAD_BYTES))
        .collect();
    page.video_url = page
        .video_url
        .filter(|v| !v.trim().is_empty())
        .map(|v| cap_payload(v, MAX_PAYLOAD_BYTES));
    page
}

/// Renders a stored draft into the final page
pub fn render_page(draft: &DraftPage, now: DateTime<Utc>) -> AppResult<String> {
    let couple_names = draft
        .couple_names
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::IncompleteData(format!("page {} has no couple names", draft.session_id))
        })?;
    let images = draft.image_list().ok_or_else(|| {
        AppError::IncompleteData(format!("page {} has malformed images", draft.session_id))
    })?;

    let start = draft.start_date.as_deref().and_then(parse_start);

    let template = PageTemplate {
        couple_names,
        message: draft.message.as_deref().unwrap_or_default(),
        dark: draft.theme == Theme::Dark,
        images_json: script_safe_json(&serde_json::to_string(&images)?),
        video_id: draft.video_url.as_deref().and_then(youtube_video_id),
        start: draft
            .start_date
            .as_deref()
            .and_then(script_start)
            .unwrap_or_default(),
        elapsed: Elapsed::between(start, now.naive_utc()),
    };

    Ok(template.render()?)
}

/// JSON that cannot terminate the surrounding `<script>` element
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
        .replace("<!--", "<\\!--")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

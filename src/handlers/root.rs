use std::sync::Arc;

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::debug;

use crate::{
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub theme: &'a str,
    pub debug: bool,
}

pub async fn root_handler(State(state): State<Arc<ServerState>>) -> HandlerResponse<Html<String>> {
    let start = tokio_now();

    let page = IndexTemplate {
        theme: state.get_theme(),
        debug: state.is_debug(),
    }
    .render()
    .map_err(|e| code_err(CodeError::TEMPLATE_RENDER_ERROR, e))?;

    debug!(
        duration = ?start.elapsed(),
        uptime = ?state.get_uptime(),
        theme = %state.get_theme(),
        "Rendered landing page"
    );

    Ok(Html(page))
}

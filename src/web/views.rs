use super::prelude::*;
use crate::constants::{DOWNLOAD_FILENAME, GENERATE_PATH, UPLOAD_HINT};

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub(crate) struct HomeTemplate {
    pub(crate) upload_hint: &'static str,
    pub(crate) generate_path: &'static str,
    pub(crate) download_filename: &'static str,
    pub(crate) configured: bool,
}

/// handles the / GET
pub(crate) async fn root_handler(State(state): State<AppState>) -> HomeTemplate {
    HomeTemplate {
        upload_hint: UPLOAD_HINT,
        generate_path: GENERATE_PATH,
        download_filename: DOWNLOAD_FILENAME,
        configured: state.provider.is_configured(),
    }
}

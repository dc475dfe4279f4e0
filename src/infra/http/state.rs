use std::sync::Arc;

use crate::application::export::ExportService;
use crate::application::repos::{ContentRepo, SettingsRepo};
use crate::application::tokens::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub export: Arc<ExportService>,
    pub content: Arc<dyn ContentRepo>,
    pub settings: Arc<dyn SettingsRepo>,
    pub tokens: Arc<dyn TokenService>,
}

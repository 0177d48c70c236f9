//! Prompts panel: edit, save and reset the AI prompt templates

use log::{error, warn};

use super::Workspace;
use crate::backend::BackendError;
use crate::models::{PromptKind, PromptSet};
use crate::notice::Notice;

/// Editor over a working copy of the prompt set
///
/// The working copy starts from the saved prompts, or from the store when
/// nothing was saved. Edits reach the store only through [`PromptsPanel::save_all`]
/// or a reset of all prompts.
pub struct PromptsPanel {
    ws: Workspace,
    working: PromptSet,
}

impl PromptsPanel {
    pub(super) fn new(ws: Workspace) -> Self {
        let working = match ws.prompt_storage.load() {
            Ok(Some(saved)) => saved,
            Ok(None) => PromptSet::clone(&ws.store().prompts()),
            Err(e) => {
                warn!("Failed to load saved prompts: {:#}", e);
                ws.ctx.notify(Notice::error("Failed to load saved prompts"));
                PromptSet::clone(&ws.store().prompts())
            }
        };
        Self { ws, working }
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.working
    }

    /// Replace the prompt text of one template
    pub fn edit_prompt(&mut self, kind: PromptKind, text: impl Into<String>) {
        self.working.template_mut(kind).prompt = text.into();
    }

    /// Persist the working copy and make it the active prompt set
    pub fn save_all(&self) -> bool {
        match self.ws.prompt_storage.save(&self.working) {
            Ok(()) => {
                self.ws.store().set_prompts(self.working.clone());
                self.ws
                    .ctx
                    .notify(Notice::success("All prompts saved successfully!"));
                true
            }
            Err(e) => {
                error!("Failed to save prompts: {:#}", e);
                self.ws.ctx.notify(Notice::error("Failed to save prompts"));
                false
            }
        }
    }

    /// Restore one template in the working copy from the backend defaults
    pub async fn reset_prompt(&mut self, kind: PromptKind) -> Result<(), BackendError> {
        match self.ws.backend().default_prompts().await {
            Ok(defaults) => {
                let template = defaults.template(kind).clone();
                let notice = Notice::success(format!("{} reset to default", template.name));
                *self.working.template_mut(kind) = template;
                self.ws.ctx.notify(notice);
                Ok(())
            }
            Err(e) => {
                error!("Failed to reset {} prompt: {}", kind, e);
                self.ws
                    .ctx
                    .notify(Notice::error("Failed to reset prompt").with_detail(e.to_string()));
                Err(e)
            }
        }
    }

    /// Forget the saved prompts and activate the backend defaults
    pub async fn reset_all(&mut self) -> Result<(), BackendError> {
        let defaults = match self.ws.backend().default_prompts().await {
            Ok(defaults) => defaults,
            Err(e) => {
                error!("Failed to reset prompts: {}", e);
                self.ws
                    .ctx
                    .notify(Notice::error("Failed to reset prompts").with_detail(e.to_string()));
                return Err(e);
            }
        };

        self.working = defaults.clone();
        self.ws.store().set_prompts(defaults);
        match self.ws.prompt_storage.clear() {
            Ok(()) => self
                .ws
                .ctx
                .notify(Notice::success("All prompts reset to defaults")),
            Err(e) => {
                warn!("Failed to remove saved prompts: {:#}", e);
                self.ws.ctx.notify(
                    Notice::warning("Prompts reset for this session only")
                        .with_detail("Saved prompts could not be removed and will load next time"),
                );
            }
        }
        Ok(())
    }
}

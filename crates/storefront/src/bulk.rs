//! Bulk actions on admin list pages.

use tracing::info;

use crate::error::{Result, StorefrontError};
use crate::state::PageState;
use crate::validation::ValidationError;

/// A confirmed bulk action, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
    pub action: String,
    pub item_ids: Vec<String>,
}

/// Confirmation prompt for applying `action` to `count` items.
#[must_use]
pub fn confirmation_prompt(action: &str, count: usize) -> String {
    format!("Are you sure you want to {action} {count} item(s)?")
}

#[derive(Clone)]
pub struct BulkActions {
    state: PageState,
}

impl BulkActions {
    #[must_use]
    pub const fn new(state: PageState) -> Self {
        Self { state }
    }

    /// Check or uncheck every item; returns how many items there are.
    pub fn select_all(&self, checked: bool) -> usize {
        self.state.page().update(|page| {
            page.bulk_actions.as_mut().map_or(0, |panel| {
                panel.select_all = checked;
                for item in &mut panel.items {
                    item.checked = checked;
                }
                panel.items.len()
            })
        })
    }

    /// Check or uncheck one item.
    pub fn set_item(&self, id: &str, checked: bool) -> bool {
        self.state.page().update(|page| {
            page.bulk_actions
                .as_mut()
                .and_then(|panel| panel.items.iter_mut().find(|item| item.id == id))
                .map(|item| item.checked = checked)
                .is_some()
        })
    }

    /// Choose the action to apply.
    pub fn set_action(&self, action: &str) {
        self.state.page().update(|page| {
            if let Some(panel) = page.bulk_actions.as_mut() {
                action.clone_into(&mut panel.action);
            }
        });
    }

    /// Ask `confirm` and, if it agrees, return the request to submit.
    ///
    /// `Ok(None)` means the admin declined.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoBulkSelection`] (with a warning toast)
    /// when no action or no item is selected, or
    /// [`StorefrontError::MissingElement`] outside admin list pages.
    pub fn apply(&self, confirm: impl FnOnce(&str) -> bool) -> Result<Option<BulkRequest>> {
        let request = self
            .state
            .page()
            .read(|page| {
                page.bulk_actions.as_ref().map(|panel| BulkRequest {
                    action: panel.action.clone(),
                    item_ids: panel
                        .items
                        .iter()
                        .filter(|item| item.checked)
                        .map(|item| item.id.clone())
                        .collect(),
                })
            })
            .ok_or(StorefrontError::MissingElement("bulk actions"))?;

        if request.action.is_empty() || request.item_ids.is_empty() {
            let err = ValidationError::NoBulkSelection;
            self.state.toaster().warning(err.to_string());
            return Err(err.into());
        }

        if !confirm(&confirmation_prompt(&request.action, request.item_ids.len())) {
            return Ok(None);
        }

        info!(
            action = %request.action,
            items = request.item_ids.len(),
            "Bulk action confirmed"
        );
        Ok(Some(request))
    }
}

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{
    consts::consts::PersonId, http::client::ApiError, model::person::PersonRecord,
    notify::Notifier,
};

use super::{controller::SearchController, editor::PersonForm, source::PersonSource};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this person?";

static NOT_FOUND_MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Person with ID(.)+not found").expect("not found pattern is valid"));

static DUPLICATE_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Person with cpf or email already exists!").expect("duplicate pattern is valid")
});

/// Clears the in-flight flag when dropped, so a save future cancelled mid-request releases it too
struct SubmissionGuard<'a>(&'a AtomicBool);

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Overlay<R> {
    Closed,
    Adding,
    Editing(R),
}

#[derive(Error, Debug, PartialEq)]
pub enum SaveFailure {
    #[error("Person not found!")]
    NotFound,
    #[error("A person with that email or CPF already exists!")]
    Duplicate,
    #[error("Session expired")]
    SessionExpired,
    #[error("A submission is already in progress")]
    InProgress,
    #[error("Unclassified failure: {0}")]
    Unclassified(String),
}

impl SaveFailure {
    pub fn classify(error: &ApiError) -> Self {
        if let ApiError::Unauthorized = error {
            return SaveFailure::SessionExpired;
        }

        match error.message() {
            Some(message) if NOT_FOUND_MESSAGE.is_match(message) => SaveFailure::NotFound,
            Some(message) if DUPLICATE_MESSAGE.is_match(message) => SaveFailure::Duplicate,
            _ => SaveFailure::Unclassified(error.to_string()),
        }
    }
}

/// Interactive yes/no gate in front of destructive actions
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// The person dashboard: a paged table plus an add / edit overlay.
///
/// Only one save may be in flight, a second one is rejected with `SaveFailure::InProgress`.
pub struct PersonListView<S: PersonSource> {
    controller: SearchController<S>,
    overlay: Mutex<Overlay<S::Record>>,
    is_submitting: AtomicBool,
    notifier: Notifier,
}

impl<S: PersonSource> PersonListView<S> {
    pub fn new(controller: SearchController<S>, notifier: Notifier) -> Self {
        Self {
            controller,
            overlay: Mutex::new(Overlay::Closed),
            is_submitting: AtomicBool::new(false),
            notifier,
        }
    }

    pub fn controller(&self) -> &SearchController<S> {
        &self.controller
    }

    fn overlay_mut(&self) -> MutexGuard<'_, Overlay<S::Record>> {
        self.overlay.lock().expect("overlay lock poisoned")
    }

    pub fn overlay(&self) -> Overlay<S::Record> {
        self.overlay_mut().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting.load(Ordering::SeqCst)
    }

    pub fn open_add(&self) {
        *self.overlay_mut() = Overlay::Adding;
    }

    pub fn open_edit(&self, record: S::Record) {
        *self.overlay_mut() = Overlay::Editing(record);
    }

    pub fn close(&self) {
        *self.overlay_mut() = Overlay::Closed;
    }

    /// Editor state for the open overlay, `None` when it is closed
    pub fn form(&self) -> Option<PersonForm> {
        match &*self.overlay_mut() {
            Overlay::Closed => None,
            Overlay::Adding => Some(PersonForm::new()),
            Overlay::Editing(record) => Some(PersonForm::from_record(record)),
        }
    }

    /// Updates when editing, creates when adding. The overlay stays open on failure.
    pub async fn save(&self, record: S::Record) -> Result<(), SaveFailure> {
        if self.is_submitting.swap(true, Ordering::SeqCst) {
            log::warn!("Save requested while another one is in flight");
            return Err(SaveFailure::InProgress);
        }

        let submission = SubmissionGuard(&self.is_submitting);

        let editing_id = {
            let overlay = self.overlay_mut();

            match &*overlay {
                Overlay::Editing(existing) => existing.person_id().or_else(|| record.person_id()),
                _ => None,
            }
        };

        let result = match &editing_id {
            Some(id) => self.controller.source().update(id, &record).await,
            None => self.controller.source().create(&record).await,
        };

        drop(submission);

        match result {
            Ok(()) => {
                log::info!(
                    "Saved person [Id: {}]",
                    editing_id.map_or("new".to_string(), |id| id.to_string())
                );
                self.notifier.success("Person saved successfully");
                self.close();
                self.controller.refresh().await;

                Ok(())
            }
            Err(e) => {
                log::error!("Unable to save person: {}", e);

                let failure = SaveFailure::classify(&e);

                match &failure {
                    SaveFailure::NotFound | SaveFailure::Duplicate => {
                        self.notifier.warning(&failure.to_string())
                    }
                    // The response interceptor already redirected to the login page
                    SaveFailure::SessionExpired => {}
                    _ => self.notifier.error("Failed to save person"),
                }

                Err(failure)
            }
        }
    }

    /// Returns whether the record was deleted, `false` when the user declined
    pub async fn delete(
        &self,
        id: &PersonId,
        confirm: &dyn Confirm,
    ) -> Result<bool, SaveFailure> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        match self.controller.source().delete(id).await {
            Ok(()) => {
                log::info!("Deleted person [Id: {}]", id);
                self.notifier.success("Person deleted successfully");
                self.controller.refresh().await;

                Ok(true)
            }
            Err(e) => {
                log::error!("Unable to delete person [Id: {}]: {}", id, e);

                let failure = SaveFailure::classify(&e);

                if failure != SaveFailure::SessionExpired {
                    self.notifier.error("Failed to delete person");
                }

                Err(failure)
            }
        }
    }
}

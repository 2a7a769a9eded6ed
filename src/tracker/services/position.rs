//! Position listing and CRUD.

use super::forms::{FormErrors, NameForm};
use crate::tracker::{
    domain::{EntityName, Page, PageError, PageRequest, Position, PositionId, PositionSummary},
    ports::{TrackerRepositoryError, TrackerStore, search_term},
};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for position operations.
#[derive(Debug, Clone, Error)]
pub enum PositionServiceError {
    /// The submitted form failed validation; nothing was stored.
    #[error("invalid position form: {0}")]
    Invalid(FormErrors),
    /// The position does not exist.
    #[error("position not found: {0}")]
    NotFound(PositionId),
    /// The requested page does not exist.
    #[error(transparent)]
    Page(#[from] PageError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrackerRepositoryError),
}

/// Result type for position service operations.
pub type PositionServiceResult<T> = Result<T, PositionServiceError>;

/// Position orchestration service.
pub struct PositionService<R: ?Sized> {
    store: Arc<R>,
}

impl<R> PositionService<R>
where
    R: TrackerStore + ?Sized,
{
    /// Creates a new position service.
    #[must_use]
    pub const fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Returns one page of positions whose name contains `name`, each with
    /// its worker count.
    ///
    /// # Errors
    ///
    /// Returns [`PositionServiceError::Page`] for a page past the end.
    pub async fn list(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> PositionServiceResult<Page<PositionSummary>> {
        let term = search_term(name);
        let total = self.store.count_positions(term.as_deref()).await?;
        let window = page.window(total)?;
        let rows = self
            .store
            .position_summaries(term.as_deref(), window)
            .await?;
        Ok(Page::new(rows, window))
    }

    /// Finds a position.
    ///
    /// # Errors
    ///
    /// Returns [`PositionServiceError::NotFound`] when it does not exist.
    pub async fn find(&self, id: PositionId) -> PositionServiceResult<Position> {
        self.store
            .find_position(id)
            .await?
            .ok_or(PositionServiceError::NotFound(id))
    }

    /// Validates and stores a new position.
    ///
    /// # Errors
    ///
    /// Returns [`PositionServiceError::Invalid`] when the name is rejected.
    pub async fn create(&self, form: &NameForm) -> PositionServiceResult<Position> {
        let position = Position::new(validate_name(form)?);
        self.store.insert_position(&position).await?;
        tracing::info!(position_id = %position.id(), name = %position.name(), "created position");
        Ok(position)
    }

    /// Validates and applies a rename.
    ///
    /// # Errors
    ///
    /// Returns [`PositionServiceError::NotFound`] or
    /// [`PositionServiceError::Invalid`].
    pub async fn update(&self, id: PositionId, form: &NameForm) -> PositionServiceResult<Position> {
        let mut position = self.find(id).await?;
        position.rename(validate_name(form)?);
        self.store
            .update_position(&position)
            .await
            .map_err(not_found)?;
        tracing::info!(position_id = %id, "renamed position");
        Ok(position)
    }

    /// Deletes a position; its workers keep existing without one.
    ///
    /// # Errors
    ///
    /// Returns [`PositionServiceError::NotFound`] when it does not exist.
    pub async fn delete(&self, id: PositionId) -> PositionServiceResult<()> {
        self.store.delete_position(id).await.map_err(not_found)?;
        tracing::info!(position_id = %id, "deleted position");
        Ok(())
    }
}

fn validate_name(form: &NameForm) -> PositionServiceResult<EntityName> {
    EntityName::new(form.name.as_str())
        .map_err(|err| PositionServiceError::Invalid(FormErrors::single("name", err.to_string())))
}

fn not_found(err: TrackerRepositoryError) -> PositionServiceError {
    match err {
        TrackerRepositoryError::PositionNotFound(id) => PositionServiceError::NotFound(id),
        other => other.into(),
    }
}

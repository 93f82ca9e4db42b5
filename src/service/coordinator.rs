use crate::cache::{Collection, ViewCache};
use crate::service::Outcome;
use tracing::info;

/// What the page does once a mutation has gone through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterMutation {
    /// Leave for the collection's list view (create, update).
    Navigate,
    /// Stay on the current view and re-render it (delete).
    Stay,
}

/// Runs the effects that follow a successful mutation: invalidate first,
/// then navigate or return silently.
pub struct PostMutation<'a> {
    views: &'a ViewCache,
}

impl<'a> PostMutation<'a> {
    pub fn new(views: &'a ViewCache) -> Self {
        PostMutation { views }
    }

    pub async fn complete(&self, collection: Collection, after: AfterMutation) -> Outcome<()> {
        let dropped = self.views.invalidate(collection).await;
        info!(view = collection.view_path(), dropped, after = ?after, "mutation completed");

        match after {
            AfterMutation::Navigate => Outcome::Redirect(collection.view_path().to_string()),
            AfterMutation::Stay => Outcome::Rendered(Ok(())),
        }
    }
}

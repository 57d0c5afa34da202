//! A user's profile page.

use super::feed::toggle_like_in;
use super::profile_list::{ProfileListKind, ProfileListView};
use super::{LoadError, Slot, ViewStatus};
use crate::pagination::{LoadMore, PagedList, PaginationController};
use crate::scope::{Delivery, ViewScope};
use speshal_core::model::{NewPost, Post, PostId, Profile, ProfilePatch};
use speshal_core::reconcile::{MutationReconciler, ProfileEditOutcome, RelationOutcome};
use speshal_core::{ErrorKind, Result, SpeshalError};
use speshal_interaction::SpeshalApi;

/// Profile header plus the profile's posts.
///
/// Posts of a closed profile the session may not see stay "not loaded"
/// while the profile itself is shown.
#[derive(Debug)]
pub struct ProfileView {
    api: SpeshalApi,
    scope: ViewScope,
    username: String,
    status: Slot<ViewStatus>,
    profile: Slot<Option<Profile>>,
    posts: PagedList<Post>,
}

impl ProfileView {
    pub fn new(api: SpeshalApi, username: impl Into<String>) -> Self {
        let scope = ViewScope::new();
        let posts = PagedList::new(PaginationController::new(api.clone()), scope.clone());
        Self {
            api,
            scope,
            username: username.into(),
            status: Slot::new(ViewStatus::Loading),
            profile: Slot::new(None),
            posts,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn status(&self) -> ViewStatus {
        self.status.get()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.profile.get()
    }

    pub fn posts(&self) -> &PagedList<Post> {
        &self.posts
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Loads profile and posts concurrently.
    pub async fn load(&self) -> Delivery<ViewStatus> {
        let both = futures::future::join(
            self.api.fetch_profile(&self.username),
            self.api.fetch_posts(&self.username),
        );
        let Delivery::Delivered((profile, posts)) = self.scope.run(both).await else {
            return Delivery::Discarded;
        };

        let status = match profile {
            Ok(profile) => {
                self.profile.set(Some(profile));
                match posts {
                    Ok(page) => {
                        self.posts.load(page);
                        ViewStatus::Loaded
                    }
                    Err(e) if is_closed_profile(&e) => {
                        tracing::debug!(username = %self.username, "Posts hidden by closed profile");
                        self.posts.discard();
                        ViewStatus::Loaded
                    }
                    Err(e) => ViewStatus::Failed(LoadError::from(&e)),
                }
            }
            Err(e) => ViewStatus::Failed(LoadError::from(&e)),
        };
        self.status.set(status.clone());
        Delivery::Delivered(status)
    }

    pub async fn load_more_posts(&self) -> Result<LoadMore> {
        self.posts.load_more().await
    }

    pub async fn toggle_like(&self, id: PostId) -> Result<Delivery<Post>> {
        toggle_like_in(&self.api, &self.scope, &self.posts, id).await
    }

    pub async fn subscribe(&self) -> Result<Delivery<RelationOutcome>> {
        let Delivery::Delivered(updated) = self.scope.run(self.api.subscribe(&self.username)).await else {
            return Ok(Delivery::Discarded);
        };
        self.apply_relation(updated?).await
    }

    pub async fn cancel_subscription(&self) -> Result<Delivery<RelationOutcome>> {
        let Delivery::Delivered(updated) = self
            .scope
            .run(self.api.cancel_subscription(&self.username))
            .await
        else {
            return Ok(Delivery::Discarded);
        };
        self.apply_relation(updated?).await
    }

    async fn apply_relation(&self, updated: Profile) -> Result<Delivery<RelationOutcome>> {
        let outcome = self.profile.update(|held| {
            if let Some(held) = held.as_mut() {
                return self
                    .posts
                    .update(|posts| MutationReconciler::apply_relation(held, &updated, posts));
            }
            *held = Some(updated.clone());
            RelationOutcome::Unchanged
        });

        if outcome == RelationOutcome::PostsRevealed {
            let Delivery::Delivered(page) = self.scope.run(self.api.fetch_posts(&self.username)).await else {
                return Ok(Delivery::Discarded);
            };
            match page {
                Ok(page) => self.posts.load(page),
                Err(e) if is_closed_profile(&e) => self.posts.discard(),
                Err(e) => return Err(e),
            }
        }
        Ok(Delivery::Delivered(outcome))
    }

    /// Edits the session's own profile.
    ///
    /// Validation failures come back as `SpeshalError::Validation` for the form.
    pub async fn edit_profile(&self, patch: &ProfilePatch) -> Result<Delivery<ProfileEditOutcome>> {
        if !self.profile().is_some_and(|p| p.is_mine()) {
            return Err(SpeshalError::forbidden(format!("profile {}", self.username)));
        }

        let Delivery::Delivered(edited) = self.scope.run(self.api.patch_my_profile(patch)).await else {
            return Ok(Delivery::Discarded);
        };
        let edited = edited?;

        let outcome = self.profile.update(|held| match held {
            Some(held) => self
                .posts
                .update(|posts| MutationReconciler::apply_profile_edit(held, edited, posts)),
            None => ProfileEditOutcome::Updated { avatar_changed: false },
        });
        if let ProfileEditOutcome::Redirect { username } = &outcome {
            tracing::info!(from = %self.username, to = %username, "Username changed, redirecting");
        }
        Ok(Delivery::Delivered(outcome))
    }

    /// Uploads a post and puts it at the top of the held list.
    pub async fn handle_upload(&self, post: &NewPost) -> Result<Delivery<Post>> {
        let Delivery::Delivered(created) = self.scope.run(self.api.upload_post(post)).await else {
            return Ok(Delivery::Discarded);
        };
        let created = created?;
        self.posts.update(|posts| {
            if posts.is_loaded() {
                posts.prepend(created.clone());
            }
        });
        Ok(Delivery::Delivered(created))
    }

    pub async fn followers(&self) -> Result<ProfileListView> {
        self.relation_list(ProfileListKind::Followers(self.username.clone()))
            .await
    }

    pub async fn followings(&self) -> Result<ProfileListView> {
        self.relation_list(ProfileListKind::Followings(self.username.clone()))
            .await
    }

    async fn relation_list(&self, kind: ProfileListKind) -> Result<ProfileListView> {
        if !self.profile().is_some_and(|p| p.is_visible_to_me()) {
            return Err(SpeshalError::forbidden(format!("relations of {}", self.username)));
        }
        let view = ProfileListView::new(self.api.clone(), kind);
        view.load().await?;
        Ok(view)
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

fn is_closed_profile(err: &SpeshalError) -> bool {
    matches!(err.kind(), ErrorKind::AuthInvalid | ErrorKind::Forbidden)
}

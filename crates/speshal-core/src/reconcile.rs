//! Applying write results to data that was already fetched.
//!
//! Nothing here talks to the network. A view performs the write, then hands
//! the server's answer to [`MutationReconciler`] together with the
//! collections it owns.

use crate::collection::Collection;
use crate::model::{LikeCount, Post, Profile, ShortProfile};

/// Which like endpoint a toggle should call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    pub fn for_post(post: &Post) -> Self {
        if post.is_liked_by_me {
            Self::Unlike
        } else {
            Self::Like
        }
    }
}

/// Effect of a relation change on the profile's post list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOutcome {
    Unchanged,
    /// The profile became hidden and its posts were discarded.
    PostsHidden,
    /// The profile became visible; posts should be fetched.
    PostsRevealed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEditOutcome {
    Updated { avatar_changed: bool },
    /// The username changed. The held profile is stale and the caller should
    /// navigate to the new identity.
    Redirect { username: String },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MutationReconciler;

impl MutationReconciler {
    /// Sets the like flag to what `action` asked for and takes the server's count.
    ///
    /// Only the given copy is touched; use [`Collection::replace`] to write it back.
    pub fn apply_like(post: &mut Post, action: LikeAction, count: LikeCount) {
        post.is_liked_by_me = action == LikeAction::Like;
        post.nlikes = count.nlikes;
    }

    /// Applies a like result to the matching post in `posts`, if held.
    pub fn apply_like_in(
        posts: &mut Collection<Post>,
        post_id: u64,
        action: LikeAction,
        count: LikeCount,
    ) -> Option<Post> {
        let mut post = posts.get(&post_id)?.clone();
        Self::apply_like(&mut post, action, count);
        posts.replace(post.clone());
        Some(post)
    }

    /// Takes the relation fields of `updated` (the server's answer to a
    /// subscribe or cancel) and discards `posts` if the profile stopped
    /// being visible.
    pub fn apply_relation(
        profile: &mut Profile,
        updated: &Profile,
        posts: &mut Collection<Post>,
    ) -> RelationOutcome {
        let was_visible = profile.is_visible_to_me();

        profile.followed_by_me_status = updated.followed_by_me_status;
        profile.nfollowers = updated.nfollowers;
        profile.is_opened = updated.is_opened;

        match (was_visible, profile.is_visible_to_me()) {
            (true, false) => {
                posts.discard();
                RelationOutcome::PostsHidden
            }
            (false, true) => RelationOutcome::PostsRevealed,
            _ => RelationOutcome::Unchanged,
        }
    }

    /// Removes an answered follow request from the pending list.
    pub fn apply_request_answered(pending: &mut Collection<ShortProfile>, username: &str) -> bool {
        pending.remove(&username.to_string()).is_some()
    }

    /// Applies the result of editing the session's own profile.
    pub fn apply_profile_edit(
        profile: &mut Profile,
        edited: Profile,
        posts: &mut Collection<Post>,
    ) -> ProfileEditOutcome {
        if edited.username != profile.username {
            return ProfileEditOutcome::Redirect {
                username: edited.username,
            };
        }

        let avatar_changed = edited.avatar != profile.avatar;
        if avatar_changed {
            Self::propagate_avatar(posts, &edited.username, edited.avatar.as_deref());
        }
        *profile = edited;
        ProfileEditOutcome::Updated { avatar_changed }
    }

    /// Rewrites the embedded owner avatar of every post by `username`.
    /// Returns the number of posts touched.
    pub fn propagate_avatar(posts: &mut Collection<Post>, username: &str, avatar: Option<&str>) -> usize {
        posts.update_where(
            |post| post.owner.username == username,
            |post| post.owner.avatar = avatar.map(str::to_string),
        )
    }
}

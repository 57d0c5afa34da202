//! Domain entities as the API serializes them.
//!
//! Entities are held by value. The same post can sit in a feed and in a
//! profile's post list at once; nothing links the two copies.

use crate::collection::Identified;
use crate::http::MultipartForm;
use serde::{Deserialize, Serialize};

pub type PostId = u64;
pub type CommentId = u64;

/// How the current session relates to a profile.
///
/// Absent (`None` at the use site) means no subscription, or an anonymous viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowStatus {
    Pending,
    Accepted,
    /// The profile belongs to the session's own user.
    #[serde(rename = "self")]
    Myself,
}

/// Compact profile embedded in posts, comments and profile lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortProfile {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Identified for ShortProfile {
    type Key = String;

    fn identity(&self) -> String {
        self.username.clone()
    }
}

/// Full profile as returned by profile, subscribe and edit endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub is_opened: bool,
    #[serde(default)]
    pub nfollowers: u64,
    #[serde(default)]
    pub nfollows: u64,
    #[serde(default)]
    pub followed_by_me_status: Option<FollowStatus>,
}

impl Profile {
    /// Whether the session may see this profile's posts and relations.
    pub fn is_visible_to_me(&self) -> bool {
        self.is_opened
            || matches!(
                self.followed_by_me_status,
                Some(FollowStatus::Accepted | FollowStatus::Myself)
            )
    }

    pub fn is_mine(&self) -> bool {
        self.followed_by_me_status == Some(FollowStatus::Myself)
    }
}

impl Identified for Profile {
    type Key = String;

    fn identity(&self) -> String {
        self.username.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub owner: ShortProfile,
    pub text: String,
}

impl Identified for Comment {
    type Key = CommentId;

    fn identity(&self) -> CommentId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub owner: ShortProfile,
    pub picture: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nlikes: u64,
    /// Present on list endpoints only; single-post responses omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_comments: Option<Vec<Comment>>,
    #[serde(default)]
    pub is_liked_by_me: bool,
}

impl Identified for Post {
    type Key = PostId;

    fn identity(&self) -> PostId {
        self.id
    }
}

/// Response of the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response of the refresh endpoint. `refresh` is present when the server rotates it.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeCount {
    pub nlikes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MyUsername {
    pub username: String,
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Partial update of the session's own profile. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub avatar: Option<Upload>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub is_opened: Option<bool>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new();
        if let Some(avatar) = &self.avatar {
            form = form.file("avatar", avatar.file_name.clone(), avatar.bytes.clone());
        }
        for (name, value) in [
            ("username", &self.username),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("description", &self.description),
        ] {
            if let Some(value) = value {
                form = form.text(name, value.clone());
            }
        }
        if let Some(is_opened) = self.is_opened {
            form = form.text("is_opened", if is_opened { "true" } else { "false" });
        }
        form
    }
}

/// A post to be uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub picture: Option<Upload>,
    pub description: Option<String>,
}

impl NewPost {
    pub fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new();
        if let Some(picture) = &self.picture {
            form = form.file("picture", picture.file_name.clone(), picture.bytes.clone());
        }
        if let Some(description) = &self.description {
            form = form.text("description", description.clone());
        }
        form
    }
}

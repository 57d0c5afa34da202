use super::App;
use super::output::{self, form_error};
use anyhow::{Context, Result};
use speshal_application::{Delivery, ProfileView};
use speshal_core::model::{NewPost, ProfilePatch, Upload};
use speshal_core::reconcile::ProfileEditOutcome;
use std::path::{Path, PathBuf};

pub struct ProfileEdit {
    pub avatar: Option<PathBuf>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub is_opened: Option<bool>,
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    Ok(Upload::new(file_name, bytes))
}

pub async fn upload(app: &App, picture: &Path, description: Option<String>) -> Result<()> {
    app.require_login().await?;
    let post = NewPost {
        picture: Some(read_upload(picture)?),
        description,
    };
    let created = app.api.upload_post(&post).await.map_err(form_error)?;
    output::post(&created);
    Ok(())
}

pub async fn edit_profile(app: &App, edit: ProfileEdit) -> Result<()> {
    app.require_login().await?;
    let patch = ProfilePatch {
        avatar: edit.avatar.as_deref().map(read_upload).transpose()?,
        username: edit.username,
        first_name: edit.first_name,
        last_name: edit.last_name,
        description: edit.description,
        is_opened: edit.is_opened,
    };
    if patch.is_empty() {
        anyhow::bail!("Nothing to change");
    }

    let me = app.api.fetch_my_username().await?;
    let view = ProfileView::new(app.api.clone(), me.clone());
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error(&format!("profile {}", me), status)?;
    }

    match view.edit_profile(&patch).await.map_err(form_error)? {
        Delivery::Delivered(ProfileEditOutcome::Redirect { username }) => {
            println!("Username changed to {}", username);
        }
        Delivery::Delivered(ProfileEditOutcome::Updated { .. }) => {
            if let Some(profile) = view.profile() {
                output::profile(&profile);
            }
        }
        Delivery::Discarded => {}
    }
    Ok(())
}

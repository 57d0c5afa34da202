//! Plain-text rendering.

use speshal_application::{LoadError, ViewStatus};
use speshal_core::SpeshalError;
use speshal_core::model::{Comment, Post, Profile, ShortProfile};

pub fn display_name(username: &str, first_name: &str, last_name: &str) -> String {
    let full = format!("{} {}", first_name, last_name);
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        format!("{} ({})", username, full)
    }
}

pub fn short_profile(profile: &ShortProfile) {
    println!(
        "  {}",
        display_name(&profile.username, &profile.first_name, &profile.last_name)
    );
}

pub fn profile(profile: &Profile) {
    println!(
        "{}",
        display_name(&profile.username, &profile.first_name, &profile.last_name)
    );
    if !profile.description.is_empty() {
        println!("  {}", profile.description);
    }
    let relation = match profile.followed_by_me_status {
        Some(status) => format!("{:?}", status),
        None => "not following".to_string(),
    };
    println!(
        "  {} followers, {} following, {}, {}",
        profile.nfollowers,
        profile.nfollows,
        if profile.is_opened { "open" } else { "closed" },
        relation
    );
}

pub fn post(post: &Post) {
    let heart = if post.is_liked_by_me { "♥" } else { "♡" };
    println!("#{} by {}  {} {}", post.id, post.owner.username, heart, post.nlikes);
    println!("  {}", post.picture);
    if let Some(description) = post.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {}", description);
    }
    for comment in post.preview_comments.iter().flatten() {
        println!("    {}: {}", comment.owner.username, comment.text);
    }
}

pub fn comment(comment: &Comment) {
    println!("  {}: {}", comment.owner.username, comment.text);
}

/// Turns a failed screen load into an error message.
pub fn status_error(what: &str, status: ViewStatus) -> anyhow::Result<()> {
    match status {
        ViewStatus::Loaded | ViewStatus::Loading => Ok(()),
        ViewStatus::Failed(LoadError::NotLoggedIn) => anyhow::bail!("{}: log in first", what),
        ViewStatus::Failed(LoadError::Forbidden) => anyhow::bail!("{}: access forbidden", what),
        ViewStatus::Failed(LoadError::NotFound) => anyhow::bail!("{}: not found", what),
        ViewStatus::Failed(LoadError::Failed(message)) => anyhow::bail!("{}: {}", what, message),
    }
}

/// Prints field errors of a rejected form, or passes the error through.
pub fn form_error(err: SpeshalError) -> anyhow::Error {
    if let Some(errors) = err.field_errors() {
        for (field, messages) in errors.iter() {
            for message in messages {
                eprintln!("  {}: {}", field, message);
            }
        }
        return anyhow::anyhow!("The server rejected the form");
    }
    err.into()
}

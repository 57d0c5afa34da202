use super::App;
use super::output;
use anyhow::Result;
use speshal_application::{Delivery, FeedView, LoadMore, PagedList, PostView, ProfileListKind, ProfileListView, ProfileView};
use speshal_core::collection::CollectionState;
use speshal_core::model::PostId;
use serde::de::DeserializeOwned;

/// Loads up to `pages - 1` further pages.
async fn load_pages<T: DeserializeOwned + Clone>(list: &PagedList<T>, pages: usize) -> Result<()> {
    for _ in 1..pages {
        match list.load_more().await? {
            LoadMore::Appended(_) => {}
            _ => break,
        }
    }
    Ok(())
}

pub async fn feed(app: &App, pages: usize) -> Result<()> {
    app.require_login().await?;
    let view = FeedView::new(app.api.clone());
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error("feed", status)?;
    }
    load_pages(view.posts(), pages).await?;

    let posts = view.posts().items();
    if posts.is_empty() {
        println!("Your feed is empty.");
    }
    for post in &posts {
        output::post(post);
    }
    if view.posts().has_more() {
        println!("(more with --pages {})", pages + 1);
    }
    Ok(())
}

pub async fn profile(app: &App, username: &str, pages: usize) -> Result<()> {
    let view = ProfileView::new(app.api.clone(), username);
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error(&format!("profile {}", username), status)?;
    }
    if let Some(profile) = view.profile() {
        output::profile(&profile);
    }

    if view.posts().state() == CollectionState::NotLoaded {
        println!("This profile is closed.");
        return Ok(());
    }
    load_pages(view.posts(), pages).await?;
    for post in view.posts().items() {
        output::post(&post);
    }
    Ok(())
}

pub async fn post(app: &App, id: PostId) -> Result<()> {
    let view = PostView::new(app.api.clone(), id);
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error(&format!("post {}", id), status)?;
    }
    if let Some(post) = view.post() {
        output::post(&post);
    }
    load_pages(view.comments(), usize::MAX).await?;
    for comment in view.comments().items() {
        output::comment(&comment);
    }
    Ok(())
}

async fn profile_list(app: &App, kind: ProfileListKind, empty: &str) -> Result<()> {
    let view = ProfileListView::new(app.api.clone(), kind);
    view.load().await?;
    load_pages(view.profiles(), usize::MAX).await?;

    let profiles = view.profiles().items();
    if profiles.is_empty() {
        println!("{}", empty);
    }
    for profile in &profiles {
        output::short_profile(profile);
    }
    Ok(())
}

pub async fn followers(app: &App, username: &str) -> Result<()> {
    profile_list(app, ProfileListKind::Followers(username.to_string()), "No followers.").await
}

pub async fn followings(app: &App, username: &str) -> Result<()> {
    profile_list(app, ProfileListKind::Followings(username.to_string()), "Follows nobody.").await
}

pub async fn likes(app: &App, id: PostId) -> Result<()> {
    profile_list(app, ProfileListKind::Likes(id), "No likes yet.").await
}

pub async fn search(app: &App, query: &str) -> Result<()> {
    let page = app.api.search_users(query).await?;
    if page.items.is_empty() {
        println!("No users match '{}'.", query);
    }
    for profile in &page.items {
        output::short_profile(profile);
    }
    Ok(())
}

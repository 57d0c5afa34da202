use super::App;
use super::output;
use anyhow::Result;
use speshal_application::{CommentOutcome, Delivery, IncomingRequestsView, PostView, ProfileView};
use speshal_core::model::PostId;
use speshal_core::reconcile::{LikeAction, RelationOutcome};

/// Likes or unlikes a post. A no-op when it is already in the wanted state.
pub async fn like(app: &App, id: PostId, liked: bool) -> Result<()> {
    app.require_login().await?;
    let view = PostView::new(app.api.clone(), id);
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error(&format!("post {}", id), status)?;
    }
    let Some(post) = view.post() else {
        anyhow::bail!("post {}: not found", id);
    };

    let wanted = if liked { LikeAction::Like } else { LikeAction::Unlike };
    if LikeAction::for_post(&post) != wanted {
        println!("Already {} ({} likes)", if liked { "liked" } else { "not liked" }, post.nlikes);
        return Ok(());
    }
    if let Delivery::Delivered(post) = view.toggle_like().await? {
        println!("{} likes", post.nlikes);
    }
    Ok(())
}

pub async fn comment(app: &App, id: PostId, text: &str) -> Result<()> {
    app.require_login().await?;
    let view = PostView::new(app.api.clone(), id);
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error(&format!("post {}", id), status)?;
    }
    match view.add_comment(text).await? {
        CommentOutcome::Added(comment) => output::comment(&comment),
        CommentOutcome::Rejected(message) => anyhow::bail!("Comment rejected: {}", message),
        CommentOutcome::Discarded => {}
    }
    Ok(())
}

pub async fn follow(app: &App, username: &str, subscribe: bool) -> Result<()> {
    app.require_login().await?;
    let view = ProfileView::new(app.api.clone(), username);
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error(&format!("profile {}", username), status)?;
    }

    let outcome = if subscribe {
        view.subscribe().await?
    } else {
        view.cancel_subscription().await?
    };
    if let Some(profile) = view.profile() {
        output::profile(&profile);
    }
    match outcome {
        Delivery::Delivered(RelationOutcome::PostsRevealed) => {
            println!("{} posts now visible", view.posts().len())
        }
        Delivery::Delivered(RelationOutcome::PostsHidden) => println!("Posts are hidden again"),
        _ => {}
    }
    Ok(())
}

pub async fn pending(app: &App) -> Result<()> {
    app.require_login().await?;
    let view = IncomingRequestsView::new(app.api.clone());
    if let Delivery::Delivered(status) = view.load().await {
        output::status_error("follow requests", status)?;
    }
    let requests = view.pending().items();
    if requests.is_empty() {
        println!("No pending requests.");
    }
    for profile in &requests {
        output::short_profile(profile);
    }
    Ok(())
}

/// Accepts or rejects one follow request.
pub async fn answer(app: &App, username: &str, accept: bool) -> Result<()> {
    app.require_login().await?;
    let view = IncomingRequestsView::new(app.api.clone());
    let answered = if accept {
        view.accept(username).await?
    } else {
        view.reject(username).await?
    };
    if !answered.is_discarded() {
        println!("{} {}", if accept { "Accepted" } else { "Rejected" }, username);
    }
    Ok(())
}

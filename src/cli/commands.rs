use std::time::Duration;

use url::Url;

use crate::app::{AppContext, Result, TributaryError};
use crate::domain::{Post, User};
use crate::scheduler::Scheduler;
use crate::session::Session;
use crate::store::Store;

pub fn register(ctx: &AppContext, session: &mut Session, name: &str) -> Result<()> {
    let user = ctx.store.create_user(name)?;
    session.set_user(&user.name)?;

    println!("new user {} created", user.name);
    print_user(&user);
    Ok(())
}

pub fn login(ctx: &AppContext, session: &mut Session, name: &str) -> Result<()> {
    let user = ctx
        .store
        .get_user(name)?
        .ok_or_else(|| TributaryError::NoSuchUser(name.to_string()))?;
    session.set_user(&user.name)?;

    println!("user is now: {}", user.name);
    Ok(())
}

pub fn reset(ctx: &AppContext) -> Result<()> {
    ctx.store.delete_all_users()?;
    println!("reset complete");
    Ok(())
}

pub fn users(ctx: &AppContext, session: &Session) -> Result<()> {
    let current = session.current_user_name.as_deref().unwrap_or("");

    for user in ctx.store.list_users()? {
        if user.name == current {
            println!(" * {} (current)", user.name);
        } else {
            println!(" * {}", user.name);
        }
    }

    Ok(())
}

pub async fn agg(ctx: &AppContext, interval: Duration) -> Result<()> {
    Scheduler::new(interval).run(ctx).await
}

pub fn feeds(ctx: &AppContext) -> Result<()> {
    for listing in ctx.store.list_feeds()? {
        println!();
        println!("Feed Name: {}", listing.name);
        println!("URL: {}", listing.url);
        println!("Creator Name: {}", listing.creator);
    }

    Ok(())
}

pub fn add_feed(ctx: &AppContext, user: &User, name: &str, url: &str) -> Result<()> {
    Url::parse(url)?;

    let feed = ctx.store.create_feed(name, url, user.id)?;
    // The creator auto-follows the feed they add.
    ctx.store.create_feed_follow(user.id, feed.id)?;

    println!("successfully added feed: {}", feed.name);
    Ok(())
}

pub fn follow(ctx: &AppContext, user: &User, url: &str) -> Result<()> {
    let feed_id = ctx.store.get_feed_id_by_url(url)?;
    let summary = ctx.store.create_feed_follow(user.id, feed_id)?;

    println!(
        "user {} is now following feed: {}",
        summary.user_name, summary.feed_name
    );
    Ok(())
}

pub fn unfollow(ctx: &AppContext, user: &User, url: &str) -> Result<()> {
    let feed_id = ctx.store.get_feed_id_by_url(url)?;
    ctx.store.delete_feed_follow(user.id, feed_id)?;
    Ok(())
}

pub fn following(ctx: &AppContext, user: &User) -> Result<()> {
    println!("you are currently following:");
    for name in ctx.store.list_feed_follows_for_user(user.id)? {
        println!("  - '{}'", name);
    }

    Ok(())
}

pub fn browse(ctx: &AppContext, user: &User, limit: i64) -> Result<()> {
    for post in ctx.store.list_posts_for_user(user.id, limit)? {
        println!();
        print_post(&post);
    }

    Ok(())
}

fn print_user(user: &User) {
    println!("ID: {}", user.id);
    println!("Time Created: {}", user.created_at);
    println!("Time Updated: {}", user.updated_at);
    println!("Name: {}", user.name);
}

fn print_post(post: &Post) {
    println!("Title: {}", post.title);
    println!("Description: {}", post.description.as_deref().unwrap_or(""));
    println!("Link: {}", post.url);
    println!("Published: {}", post.published_at);
}

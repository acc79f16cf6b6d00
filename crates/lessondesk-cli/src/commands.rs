//! Subcommand handlers. Each one runs against a restored `AuthContext`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, warn};

use lessondesk_core::models::SubscriptionFilters;
use lessondesk_core::utils::format_phone;
use lessondesk_core::{
    ApiError, ApiGateway, AuthContext, CacheStore, Config, CredentialStore, FileStorage,
    PersistentStore,
};

use crate::render;

/// Build the session stack on the on-disk store and restore any saved login.
pub fn open_session(config: &Config) -> Result<AuthContext> {
    let storage: Arc<dyn PersistentStore> = Arc::new(FileStorage::new(config.storage_dir()?)?);
    let cache = Arc::new(CacheStore::new(storage.clone()).with_default_ttl(config.cache_ttl()));
    let credentials = Arc::new(CredentialStore::load(storage));
    let gateway = ApiGateway::new(config, cache, credentials)?;

    let mut ctx = AuthContext::new(gateway);
    ctx.restore();
    Ok(ctx)
}

fn require_session(ctx: &AuthContext) -> Result<()> {
    if !ctx.is_authenticated() {
        bail!("Not logged in. Run `lessondesk login` first.");
    }
    Ok(())
}

/// Turn a gateway failure into a printable error, applying any session
/// change it caused first.
fn failure(ctx: &mut AuthContext, error: ApiError) -> anyhow::Error {
    ctx.sync_events();
    debug!(error = %error, "Command failed");
    anyhow!(error.user_message())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

pub async fn login(ctx: &mut AuthContext, config: &mut Config, phone: Option<String>) -> Result<()> {
    let phone = match phone.or_else(|| config.last_phone.clone()) {
        Some(phone) => phone,
        None => prompt("Phone (+998XXXXXXXXX): ")?,
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    match ctx.login(&phone, &password).await {
        Ok(user) => {
            config.last_phone = Some(user.phone_number.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to remember phone number");
            }
            println!("Logged in as {}", format_phone(&user.phone_number));
            Ok(())
        }
        Err(e) => {
            let message = ctx
                .state()
                .error()
                .map(str::to_string)
                .unwrap_or_else(|| e.user_message());
            Err(anyhow!(message))
        }
    }
}

pub fn logout(ctx: &mut AuthContext) {
    ctx.logout();
    println!("Logged out");
}

pub async fn status(ctx: &mut AuthContext, config: &Config) -> Result<()> {
    println!("Backend: {}", config.base_url());
    if config.cache_enabled {
        println!("Cache:   on, entries kept {}s", config.cache_ttl().as_secs());
    } else {
        println!("Cache:   off");
    }

    if !ctx.is_authenticated() {
        println!("Session: not logged in");
        return Ok(());
    }

    match ctx.verify().await {
        Ok(()) => {
            let who = ctx
                .user()
                .map(|u| format_phone(&u.phone_number))
                .unwrap_or_else(|| "admin".to_string());
            println!("Session: logged in as {}", who);
        }
        Err(e) if e.is_auth() => println!("Session: expired, please log in again"),
        Err(e) => println!("Session: saved, but could not be checked ({})", e.user_message()),
    }
    Ok(())
}

pub async fn stats(ctx: &mut AuthContext, refresh: bool) -> Result<()> {
    require_session(ctx)?;
    let gateway = ctx.gateway().clone();

    let (stats, financial) =
        futures::join!(gateway.fetch_stats(refresh), gateway.fetch_financial_stats());

    let stats = stats.map_err(|e| failure(ctx, e))?;
    print!("{}", render::stats(&stats.data, stats.source));

    match financial {
        Ok(financial) => print!("{}", render::financial(&financial)),
        Err(e) => {
            ctx.sync_events();
            eprintln!("Revenue unavailable: {}", e.user_message());
        }
    }
    Ok(())
}

pub async fn students(ctx: &mut AuthContext, search: Option<&str>, refresh: bool) -> Result<()> {
    require_session(ctx)?;
    let result = ctx.gateway().fetch_users(refresh).await;
    let response = result.map_err(|e| failure(ctx, e))?;

    let matching: Vec<_> = response
        .data
        .iter()
        .filter(|s| search.map_or(true, |q| s.matches(q)))
        .collect();
    print!("{}", render::students(&matching, response.source));
    Ok(())
}

pub async fn leaderboard(ctx: &mut AuthContext, refresh: bool) -> Result<()> {
    require_session(ctx)?;
    let result = ctx.gateway().fetch_leaderboard(refresh).await;
    let response = result.map_err(|e| failure(ctx, e))?;
    print!("{}", render::leaderboard(&response.data, response.source));
    Ok(())
}

pub async fn content(ctx: &mut AuthContext, refresh: bool) -> Result<()> {
    require_session(ctx)?;
    let gateway = ctx.gateway().clone();

    let (lessons, quiz, topics) = futures::join!(
        gateway.fetch_lessons(refresh),
        gateway.fetch_quiz(refresh),
        gateway.fetch_grammar_topics(refresh)
    );

    let lessons = lessons.map_err(|e| failure(ctx, e))?;
    let quiz = quiz.map_err(|e| failure(ctx, e))?;
    let topics = topics.map_err(|e| failure(ctx, e))?;

    let cached = lessons.is_cached() && quiz.is_cached() && topics.is_cached();
    print!("{}", render::content(&lessons.data, &quiz.data, &topics.data));
    if cached {
        println!("(cached)");
    }
    Ok(())
}

pub async fn subscriptions(ctx: &mut AuthContext, filters: SubscriptionFilters) -> Result<()> {
    require_session(ctx)?;
    let result = ctx.gateway().fetch_subscriptions(&filters).await;
    let subscriptions = result.map_err(|e| failure(ctx, e))?;
    print!("{}", render::subscriptions(&subscriptions));
    Ok(())
}

pub fn cache_clear(ctx: &AuthContext) {
    ctx.gateway().clear_cache();
    println!("Cache cleared");
}

pub fn cache_invalidate(ctx: &AuthContext, pattern: &str) {
    let removed = ctx.gateway().invalidate(pattern);
    println!("Removed {} cached entries matching '{}'", removed, pattern);
}

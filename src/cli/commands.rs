use std::path::Path;

use futures::future::join_all;
use serde_json::Value;

use crate::app::{AppContext, PulpitError, Result};
use crate::domain::{FormData, RequestOptions, ResourceFamily};

/// Lists warmed by `prefetch`, mirroring the app's home screen.
const PREFETCH_ENDPOINTS: &[&str] = &[
    "/devotions?limit=10",
    "/podcasts?page=1",
    "/sermons?page=1",
    "/events/upcoming?limit=5",
    "/live-broadcasts/current",
];

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn get(ctx: &AppContext, endpoint: &str, refresh: bool) -> Result<()> {
    let data = ctx
        .client
        .request(endpoint, RequestOptions::get().force_refresh(refresh))
        .await?;
    print_json(&data)
}

pub async fn list(
    ctx: &AppContext,
    family: &str,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<()> {
    let family = ResourceFamily::parse(family)
        .ok_or_else(|| PulpitError::Other(format!("Unknown resource family: {}", family)))?;

    let page = page.map(|p| p.to_string());
    let limit = limit.map(|l| l.to_string());
    let mut params = Vec::new();
    if let Some(page) = page.as_deref() {
        params.push(("page", page));
    }
    if let Some(limit) = limit.as_deref() {
        params.push(("limit", limit));
    }

    let data = ctx.client.resource(family).list(&params).await?;
    print_json(&data)
}

pub async fn search(ctx: &AppContext, query: &str, kind: Option<&str>) -> Result<()> {
    let data = ctx.client.search(query, kind).await?;
    print_json(&data)
}

pub async fn login(ctx: &AppContext, email: &str, password: Option<String>) -> Result<()> {
    let password = password
        .or_else(|| std::env::var("PULPIT_PASSWORD").ok())
        .ok_or_else(|| {
            PulpitError::Config("No password given. Use --password or set PULPIT_PASSWORD.".into())
        })?;

    ctx.client.login(email, &password).await?;

    if ctx.session.token().is_none() {
        return Err(PulpitError::InvalidResponse {
            message: "login response carried no token".into(),
        });
    }
    ctx.persist_session()?;
    println!("Logged in as {}", email);
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.client.logout();
    ctx.persist_session()?;
    println!("Logged out");
    Ok(())
}

pub async fn upload(ctx: &AppContext, endpoint: &str, file: &Path, field: &str) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let form = FormData::new().file(field, file_name, guess_mime(file), bytes);
    let data = ctx.client.upload(endpoint, form).await?;

    if let Some(url) = data.get("url").and_then(Value::as_str) {
        println!("Uploaded: {}", ctx.asset_url(url));
    }
    print_json(&data)
}

pub async fn prefetch(ctx: &AppContext) -> Result<()> {
    println!("Prefetching {} lists...", PREFETCH_ENDPOINTS.len());

    let calls = PREFETCH_ENDPOINTS.iter().map(|endpoint| {
        let client = ctx.client.clone();
        async move {
            let result = client.request(endpoint, RequestOptions::get()).await;
            (*endpoint, result)
        }
    });

    let mut errors = 0;
    for (endpoint, result) in join_all(calls).await {
        match result {
            Ok(_) => println!("  cached {}", endpoint),
            Err(e) => {
                errors += 1;
                tracing::error!(endpoint, error = %e, "prefetch failed");
                eprintln!("  Error fetching {}: {}", endpoint, e);
            }
        }
    }

    println!("Prefetch complete: {} errors", errors);
    Ok(())
}

pub fn cache_list(ctx: &AppContext) -> Result<()> {
    let keys = ctx.client.cached_keys()?;

    if keys.is_empty() {
        println!("Cache is empty");
        return Ok(());
    }

    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

pub fn cache_clear(ctx: &AppContext, family: Option<&str>) -> Result<()> {
    let removed = match family {
        Some(family) => ctx.client.clear_cache_by_type(family)?,
        None => ctx.client.clear_all_cache()?,
    };
    println!("Removed {} cached responses", removed);
    Ok(())
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("cover.JPG")), Some("image/jpeg"));
        assert_eq!(guess_mime(Path::new("sermon.mp3")), Some("audio/mpeg"));
        assert_eq!(guess_mime(Path::new("notes")), None);
        assert_eq!(guess_mime(Path::new("archive.zip")), None);
    }
}

use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::path::Path;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated seed list; `now` expands to the current timestamp.
pub fn parse_seeds(s: &str) -> Result<Vec<u64>> {
    let seeds = split_csv(s)
        .iter()
        .map(|token| {
            if token.eq_ignore_ascii_case("now") {
                Ok(u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default())
            } else {
                token
                    .parse::<u64>()
                    .with_context(|| format!("invalid seed `{token}`"))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    Ok(seeds)
}

/// MIME type guessed from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv(" a, ,b,"), vec!["a", "b"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn seeds_parse_and_reject_garbage() {
        assert_eq!(parse_seeds("1, 42").unwrap(), vec![1, 42]);
        assert_eq!(parse_seeds("now").unwrap().len(), 1);
        assert!(parse_seeds("x").is_err());
        assert!(parse_seeds(" , ").is_err());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("a/b.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("c.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }
}

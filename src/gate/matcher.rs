use crate::config::GateConfig;

const STATIC_PREFIXES: [&str; 6] = ["/_next/", "/static/", "/assets/", "/images/", "/fonts/", "/favicon.ico"];

const STATIC_EXTENSIONS: [&str; 14] = [
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "css", "js", "map", "txt", "woff", "woff2", "ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    StaticAsset,
    AuthFlow,
    Protected,
}

pub fn is_static_asset(path: &str) -> bool {
    if STATIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }

    let last_segment = path.rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            STATIC_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
        }
        _ => false,
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).map_or(false, |rest| rest.starts_with('/'))
}

pub fn classify(path: &str, config: &GateConfig) -> PathKind {
    if is_static_asset(path) {
        PathKind::StaticAsset
    } else if under(path, &config.auth_prefix) {
        PathKind::AuthFlow
    } else {
        PathKind::Protected
    }
}

/// Whether the gate runs for `path` at all
///
/// Static assets, backend API routes and the login page are excluded.
pub fn matches(path: &str, config: &GateConfig) -> bool {
    !(is_static_asset(path) || under(path, &config.api_prefix) || path == config.login_path)
}

//! HTTP surface: locale negotiation middleware plus page and API routes.
//!
//! Page routes (`/`, `/{locale}`, `/{locale}/...`) run through
//! [`negotiate_locale`], which resolves the request's locale, stores the
//! result in request extensions, and writes the preference cookie back when
//! the locale was negotiated rather than pinned by the path.

use crate::i18n::{
    Alternate, Dictionary, FallbackResolver, Locale, LocaleConfig, LocaleMatch, LocaleMatcher,
    LocaleSignals, MatchSource, MetricsReport, ResolvedDictionary,
};
use axum::{
    extract::{Path, Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Name of the stored locale preference cookie.
pub const LOCALE_COOKIE: &str = "locale";

/// One year, in seconds.
pub const LOCALE_COOKIE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    resolver: Arc<FallbackResolver>,
    matcher: LocaleMatcher,
    secure_cookies: bool,
}

impl AppState {
    pub fn new(resolver: Arc<FallbackResolver>, secure_cookies: bool) -> Self {
        let matcher = LocaleMatcher::new(Arc::clone(resolver.store().registry()));
        Self {
            resolver,
            matcher,
            secure_cookies,
        }
    }

    pub fn resolver(&self) -> &FallbackResolver {
        &self.resolver
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(root))
        .route("/:locale", get(page))
        .route("/:locale/*rest", get(page))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            negotiate_locale,
        ));

    let api = Router::new()
        .route("/health", get(health))
        .route("/api/locales", get(locales))
        .route("/api/metrics", get(metrics))
        .route("/api/dictionary/:locale", get(dictionary));

    pages
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the request locale and persist it when freshly negotiated.
pub async fn negotiate_locale(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let cookie = cookie_value(headers, LOCALE_COOKIE);
    let matched = state.matcher.resolve(&LocaleSignals {
        path_segment: first_segment(request.uri().path()),
        cookie: cookie.as_deref(),
        accept_language: headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()),
    });
    let secure = state.secure_cookies || is_forwarded_https(headers);

    debug!(
        locale = %matched.locale,
        source = ?matched.source,
        "Negotiated request locale"
    );

    request.extensions_mut().insert(matched);
    let mut response = next.run(request).await;

    if matched.should_persist() {
        if let Ok(value) = HeaderValue::from_str(&locale_cookie(matched.locale, secure)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// `Set-Cookie` value persisting a locale preference.
pub fn locale_cookie(locale: Locale, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        LOCALE_COOKIE, locale, LOCALE_COOKIE_MAX_AGE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Value of the named cookie across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

fn first_segment(path: &str) -> Option<&str> {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

fn is_forwarded_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|proto| proto.trim().eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

// ==================== Page Routes ====================

/// Page data handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct PagePayload {
    pub locale: Locale,
    pub served: Locale,
    pub lang: &'static str,
    pub path: String,
    pub title: String,
    pub description: String,
    pub alternates: Vec<AlternateLink>,
    pub dictionary: Dictionary,
}

#[derive(Debug, Serialize)]
pub struct AlternateLink {
    pub hreflang: &'static str,
    pub href: String,
}

impl PagePayload {
    fn build(state: &AppState, resolved: &ResolvedDictionary, rest: &str) -> Self {
        let registry = state.matcher.registry();
        let page = rest.split('/').next().filter(|s| !s.is_empty()).unwrap_or("home");

        let site_title = resolved.text("seo.siteName", "Portfolio");
        let title = resolved
            .text(&format!("seo.pages.{}.title", page), site_title)
            .to_string();
        let description = resolved
            .text(
                &format!("seo.pages.{}.description", page),
                resolved.text("seo.description", ""),
            )
            .to_string();

        let suffix = if rest.is_empty() {
            String::new()
        } else {
            format!("/{}", rest)
        };
        let alternates = registry
            .alternates()
            .into_iter()
            .map(|Alternate { hreflang, prefix }| AlternateLink {
                hreflang,
                href: format!("{}{}", prefix, suffix),
            })
            .collect();

        Self {
            locale: resolved.requested(),
            served: resolved.served(),
            lang: registry.tag(resolved.requested()),
            path: rest.to_string(),
            title,
            description,
            alternates,
            dictionary: resolved.merged(),
        }
    }
}

async fn root(Extension(matched): Extension<LocaleMatch>) -> Redirect {
    Redirect::temporary(&format!("/{}", matched.locale))
}

async fn page(
    State(state): State<AppState>,
    Extension(matched): Extension<LocaleMatch>,
    uri: Uri,
) -> Response {
    let path = uri.path().trim_start_matches('/');

    if matched.source != MatchSource::Path {
        let query = uri.query().map(|q| format!("?{}", q)).unwrap_or_default();
        return Redirect::temporary(&format!("/{}/{}{}", matched.locale, path, query))
            .into_response();
    }

    let rest = path
        .split_once('/')
        .map(|(_, rest)| rest.trim_end_matches('/'))
        .unwrap_or("");
    let resolved = state.resolver.resolve(matched.locale).await;
    Json(PagePayload::build(&state, &resolved, rest)).into_response()
}

// ==================== API Routes ====================

async fn health() -> &'static str {
    "ok"
}

async fn locales(State(state): State<AppState>) -> Json<Vec<LocaleConfig>> {
    let registry = state.matcher.registry();
    Json(
        registry
            .supported()
            .into_iter()
            .filter_map(|locale| registry.config(locale).cloned())
            .collect(),
    )
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(state.resolver.store().metrics().report())
}

async fn dictionary(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    match state.matcher.registry().lookup(&code) {
        Some(locale) => Json(state.resolver.resolve(locale).await.merged()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("locale '{}' is not supported", code) })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LocaleRegistry;

    #[test]
    fn test_locale_cookie_attributes() {
        let es = LocaleRegistry::builtin().lookup("es").unwrap();
        assert_eq!(
            locale_cookie(es, false),
            "locale=es; Path=/; Max-Age=31536000; SameSite=Lax"
        );
        assert!(locale_cookie(es, true).ends_with("; Secure"));
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; locale=pt"));
        assert_eq!(cookie_value(&headers, "locale").as_deref(), Some("pt"));
        assert_eq!(cookie_value(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("locale=\"de\""));
        assert_eq!(cookie_value(&headers, "locale").as_deref(), Some("de"));
    }

    #[test]
    fn test_first_segment() {
        assert_eq!(first_segment("/es/projects"), Some("es"));
        assert_eq!(first_segment("/en"), Some("en"));
        assert_eq!(first_segment("/"), None);
        assert_eq!(first_segment(""), None);
    }

    #[test]
    fn test_forwarded_https() {
        let mut headers = HeaderMap::new();
        assert!(!is_forwarded_https(&headers));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("HTTPS"));
        assert!(is_forwarded_https(&headers));
    }
}

use std::path::{Path, PathBuf};

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

/// Where the router reads files from.
#[derive(Debug, Clone)]
pub(crate) struct SiteRoots {
    pub site_dir: PathBuf,
    pub data_dir: PathBuf,
}

pub(crate) fn build_app(roots: &SiteRoots) -> Router {
    let data = ServeDir::new(&roots.data_dir)
        .precompressed_br()
        .precompressed_gzip();
    let site = ServeDir::new(&roots.site_dir)
        .precompressed_br()
        .precompressed_gzip();

    Router::new()
        .nest_service("/data", data)
        .fallback_service(site)
        .layer(middleware::from_fn(set_cache_control))
        .layer(CompressionLayer::new())
}

async fn set_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if path.starts_with("/data/") {
        return Some("public, max-age=3600");
    }

    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }

    None
}

fn is_hashed_bundle_asset(path: &str) -> bool {
    let path = Path::new(path);
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/worldanthem-client-71578f6b278221f3_bg.wasm"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            cache_control_for_path("/styles-a93762ff3bf6d63a.css"),
            Some("public, max-age=31536000, immutable")
        );
    }

    #[test]
    fn hour_cache_for_datasets() {
        assert_eq!(
            cache_control_for_path("/data/countries.geojson"),
            Some("public, max-age=3600")
        );
    }

    #[test]
    fn no_override_for_pages_and_unhashed_scripts() {
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/map.html"), None);
        assert_eq!(cache_control_for_path("/app.js"), None);
    }

    struct Fixture {
        root: PathBuf,
        roots: SiteRoots,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!("worldanthem-app-{name}-{}", std::process::id()));
            let roots = SiteRoots {
                site_dir: root.join("site"),
                data_dir: root.join("data"),
            };
            std::fs::create_dir_all(&roots.site_dir).unwrap();
            std::fs::create_dir_all(&roots.data_dir).unwrap();
            std::fs::write(roots.site_dir.join("index.html"), "<div id=\"map\"></div>").unwrap();
            std::fs::write(
                roots.data_dir.join("countries.geojson"),
                r#"{"type":"FeatureCollection","features":[]}"#,
            )
            .unwrap();
            Self { root, roots }
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn serves_boundary_file_with_data_cache_header() {
        let fixture = Fixture::new("data");
        let response = build_app(&fixture.roots)
            .oneshot(get("/data/countries.geojson"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=3600"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"{\"type\":\"FeatureCollection\""));
    }

    #[tokio::test]
    async fn serves_site_index_without_cache_override() {
        let fixture = Fixture::new("index");
        let response = build_app(&fixture.roots).oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn missing_boundary_file_is_not_found() {
        let fixture = Fixture::new("missing");
        std::fs::remove_file(fixture.roots.data_dir.join("countries.geojson")).unwrap();
        let response = build_app(&fixture.roots)
            .oneshot(get("/data/countries.geojson"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }
}

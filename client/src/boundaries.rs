use worldanthem_shared::{BOUNDARY_DATA_PATH, BoundaryError, CountryFeature, parse_feature_collection};

/// Fetch and parse the country boundary collection.
pub async fn load_boundaries() -> Result<Vec<CountryFeature>, BoundaryError> {
    let resp = gloo_net::http::Request::get(BOUNDARY_DATA_PATH)
        .send()
        .await
        .map_err(|e| BoundaryError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(BoundaryError::Status(resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| BoundaryError::Network(e.to_string()))?;
    parse_feature_collection(&body)
}

/// Log the outcome of a boundary load to the browser console.
pub fn report(outcome: &Result<Vec<CountryFeature>, BoundaryError>) {
    match outcome {
        Ok(features) => {
            web_sys::console::log_1(&format!("✓ Loaded {} countries", features.len()).into());
        }
        Err(e) => {
            web_sys::console::error_1(&format!("Error loading country boundaries: {e}").into());
            web_sys::console::log_1(&"Falling back to sample markers".into());
        }
    }
}

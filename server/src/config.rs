use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_SITE_DIR: &str = "client/dist";
pub const DEFAULT_DATA_DIR: &str = "data";

/// File under the data directory holding the country boundaries.
pub const BOUNDARY_FILE_NAME: &str = "countries.geojson";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Built front-end bundle, served at `/`.
pub fn site_dir() -> PathBuf {
    dir_from_env("SITE_DIR", DEFAULT_SITE_DIR)
}

/// Downloaded datasets, served at `/data`.
pub fn data_dir() -> PathBuf {
    dir_from_env("DATA_DIR", DEFAULT_DATA_DIR)
}

fn dir_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        temp_env::with_vars_unset(["PORT", "SITE_DIR", "DATA_DIR"], || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
            assert_eq!(site_dir(), PathBuf::from("client/dist"));
            assert_eq!(data_dir(), PathBuf::from("data"));
        });
    }

    #[test]
    fn reads_overrides() {
        temp_env::with_vars(
            [
                ("PORT", Some("8080")),
                ("SITE_DIR", Some("/srv/site")),
                ("DATA_DIR", Some(" /srv/data ")),
            ],
            || {
                assert_eq!(server_port(), 8080);
                assert_eq!(site_dir(), PathBuf::from("/srv/site"));
                assert_eq!(data_dir(), PathBuf::from("/srv/data"));
            },
        );
    }

    #[test]
    fn invalid_values_fall_back() {
        temp_env::with_vars([("PORT", Some("0")), ("DATA_DIR", Some("   "))], || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
            assert_eq!(data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        });
        temp_env::with_var("PORT", Some("not-a-port"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
    }
}

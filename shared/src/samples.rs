use serde::{Deserialize, Serialize};

use crate::view::LatLng;

/// Raw marker for "no recording yet" in embedded table rows.
pub const AUDIO_SENTINEL: &str = "TODO";

/// Audio recording reference, or the not-yet-available sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AudioRef {
    Available(String),
    ComingSoon,
}

impl AudioRef {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == AUDIO_SENTINEL {
            Self::ComingSoon
        } else {
            Self::Available(trimmed.to_string())
        }
    }

    /// Text shown (and searched) in the audio column.
    pub fn label(&self) -> &str {
        match self {
            Self::Available(url) => url,
            Self::ComingSoon => "Coming Soon",
        }
    }
}

impl From<String> for AudioRef {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<AudioRef> for String {
    fn from(audio: AudioRef) -> Self {
        match audio {
            AudioRef::Available(url) => url,
            AudioRef::ComingSoon => AUDIO_SENTINEL.to_string(),
        }
    }
}

/// A country with its anthem details.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountrySample {
    pub name: String,
    pub anthem: String,
    /// Adoption year; may be "Unknown".
    pub anthem_date: String,
    /// Founding year; may carry an era suffix such as "660 BCE".
    pub founded: String,
    #[serde(default)]
    pub centroid: Option<LatLng>,
    #[serde(default = "coming_soon")]
    pub audio: AudioRef,
}

fn coming_soon() -> AudioRef {
    AudioRef::ComingSoon
}

/// Table row layout: country, anthem, adopted, founded, audio-or-sentinel.
pub type TableRow = [String; 5];

impl CountrySample {
    pub fn from_row([name, anthem, anthem_date, founded, audio]: TableRow) -> Self {
        Self {
            name,
            anthem,
            anthem_date,
            founded,
            centroid: None,
            audio: AudioRef::parse(&audio),
        }
    }
}

/// One embedded row: either the 5-cell table layout or a full record.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmbeddedRow {
    Cells(TableRow),
    Record(CountrySample),
}

/// Parse rows embedded by the host page. Each entry is a 5-string array or
/// an object with the `CountrySample` field names.
pub fn parse_table_rows(json: &str) -> Result<Vec<CountrySample>, serde_json::Error> {
    let rows: Vec<EmbeddedRow> = serde_json::from_str(json)?;
    Ok(rows
        .into_iter()
        .map(|row| match row {
            EmbeddedRow::Cells(cells) => CountrySample::from_row(cells),
            EmbeddedRow::Record(sample) => sample,
        })
        .collect())
}

const MAP_SAMPLES: &[(&str, &str, &str, &str, f64, f64)] = &[
    ("United States", "The Star-Spangled Banner", "1931", "1776", 37.0902, -95.7129),
    ("United Kingdom", "God Save the King", "Unknown", "1707", 55.3781, -3.4360),
    ("France", "La Marseillaise", "1795", "1792", 46.2276, 2.2137),
    ("Germany", "Deutschlandlied", "1922", "1871", 51.1657, 10.4515),
    ("Japan", "Kimigayo", "1888", "660 BCE", 36.2048, 138.2529),
];

const TABLE_ROWS: &[[&str; 5]] = &[
    ["Afghanistan", "Milli Surood", "2006", "1919", AUDIO_SENTINEL],
    ["Albania", "Hymni i Flamurit", "1912", "1912", AUDIO_SENTINEL],
    ["Algeria", "Kassaman", "1962", "1962", AUDIO_SENTINEL],
    ["Andorra", "El Gran Carlemany", "1921", "1278", AUDIO_SENTINEL],
    ["Angola", "Angola Avante", "1975", "1975", AUDIO_SENTINEL],
    ["Antigua and Barbuda", "Fair Antigua, We Salute Thee", "1981", "1981", AUDIO_SENTINEL],
    ["Argentina", "Himno Nacional Argentino", "1813", "1816", AUDIO_SENTINEL],
    ["Armenia", "Mer Hayrenik", "1991", "1991", AUDIO_SENTINEL],
    ["Australia", "Advance Australia Fair", "1984", "1901", AUDIO_SENTINEL],
    ["Austria", "Land der Berge, Land am Strome", "1946", "1918", AUDIO_SENTINEL],
    ["United States", "The Star-Spangled Banner", "1931", "1776", AUDIO_SENTINEL],
    ["United Kingdom", "God Save the King", "Unknown", "1707", AUDIO_SENTINEL],
    ["France", "La Marseillaise", "1795", "1792", AUDIO_SENTINEL],
    ["Germany", "Deutschlandlied", "1922", "1871", AUDIO_SENTINEL],
    ["Japan", "Kimigayo", "1888", "660 BCE", AUDIO_SENTINEL],
    ["China", "March of the Volunteers", "1949", "1949", AUDIO_SENTINEL],
    ["India", "Jana Gana Mana", "1950", "1947", AUDIO_SENTINEL],
    ["Brazil", "Hino Nacional Brasileiro", "1890", "1822", AUDIO_SENTINEL],
    ["Canada", "O Canada", "1980", "1867", AUDIO_SENTINEL],
    ["Mexico", "Himno Nacional Mexicano", "1943", "1821", AUDIO_SENTINEL],
];

/// Point samples used by the map when boundary data is unavailable.
pub fn map_samples() -> Vec<CountrySample> {
    MAP_SAMPLES
        .iter()
        .map(|&(name, anthem, anthem_date, founded, lat, lng)| CountrySample {
            name: name.to_string(),
            anthem: anthem.to_string(),
            anthem_date: anthem_date.to_string(),
            founded: founded.to_string(),
            centroid: Some(LatLng::new(lat, lng)),
            audio: AudioRef::ComingSoon,
        })
        .collect()
}

/// Rows shown by the countries table when the page embeds none.
pub fn table_rows() -> Vec<CountrySample> {
    TABLE_ROWS
        .iter()
        .map(|row| CountrySample::from_row(row.map(str::to_string)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_samples_have_valid_centroids() {
        let samples = map_samples();
        assert_eq!(samples.len(), 5);
        for sample in &samples {
            let centroid = sample.centroid.expect("map sample needs a centroid");
            assert!(centroid.is_valid(), "{} has invalid centroid", sample.name);
        }
    }

    #[test]
    fn japan_sample_keeps_bce_founding_year() {
        let samples = map_samples();
        let japan = samples.iter().find(|s| s.name == "Japan").unwrap();
        assert_eq!(japan.anthem, "Kimigayo");
        assert_eq!(japan.founded, "660 BCE");
    }

    #[test]
    fn table_rows_use_coming_soon_sentinel() {
        let rows = table_rows();
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|row| row.audio == AudioRef::ComingSoon));
        assert!(rows.iter().all(|row| row.centroid.is_none()));
    }

    #[test]
    fn audio_ref_parses_sentinel_and_urls() {
        assert_eq!(AudioRef::parse("TODO"), AudioRef::ComingSoon);
        assert_eq!(AudioRef::parse(""), AudioRef::ComingSoon);
        assert_eq!(
            AudioRef::parse(" /audio/jp.mp3 "),
            AudioRef::Available("/audio/jp.mp3".to_string())
        );
        assert_eq!(AudioRef::ComingSoon.label(), "Coming Soon");
    }

    #[test]
    fn parse_table_rows_reads_embedded_json() {
        let json = r#"[
            ["Japan", "Kimigayo", "1888", "660 BCE", "/audio/jp.mp3"],
            ["Canada", "O Canada", "1980", "1867", "TODO"]
        ]"#;
        let rows = parse_table_rows(json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].audio, AudioRef::Available("/audio/jp.mp3".into()));
        assert_eq!(rows[1].audio, AudioRef::ComingSoon);
    }

    #[test]
    fn parse_table_rows_accepts_records() {
        let json = r#"[
            {
                "name": "Japan",
                "anthem": "Kimigayo",
                "anthem_date": "1888",
                "founded": "660 BCE",
                "centroid": {"lat": 36.2048, "lng": 138.2529},
                "audio": "/audio/jp.mp3"
            },
            {"name": "Canada", "anthem": "O Canada", "anthem_date": "1980", "founded": "1867"},
            ["France", "La Marseillaise", "1795", "1792", "TODO"]
        ]"#;
        let rows = parse_table_rows(json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].centroid, Some(LatLng::new(36.2048, 138.2529)));
        assert_eq!(rows[0].audio, AudioRef::Available("/audio/jp.mp3".into()));
        assert_eq!(rows[1].centroid, None);
        assert_eq!(rows[1].audio, AudioRef::ComingSoon);
        assert_eq!(rows[2].name, "France");
        assert_eq!(rows[2].audio, AudioRef::ComingSoon);
    }

    #[test]
    fn parse_table_rows_rejects_short_rows() {
        assert!(parse_table_rows(r#"[["Japan", "Kimigayo"]]"#).is_err());
    }

    #[test]
    fn audio_ref_serializes_as_raw_string() {
        let json = serde_json::to_string(&AudioRef::ComingSoon).unwrap();
        assert_eq!(json, "\"TODO\"");
    }
}

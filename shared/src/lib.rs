pub mod country;
pub mod layer;
pub mod popup;
pub mod properties;
pub mod samples;
pub mod spatial;
pub mod style;
pub mod table;
pub mod view;

pub use country::{BOUNDARY_DATA_PATH, BoundaryError, CountryFeature, parse_feature_collection};
pub use layer::{MapLayer, Pick};
pub use popup::{PopupContent, PopupLine, Tooltip};
pub use samples::{AudioRef, CountrySample};
pub use view::{LatLng, MapView, TileCoord, TileSource};

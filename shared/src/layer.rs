use crate::country::{BoundaryError, CountryFeature};
use crate::popup::{PopupContent, Tooltip};
use crate::samples::CountrySample;
use crate::spatial::SpatialGrid;
use crate::style::{self, FeatureStyle};
use crate::view::{LatLng, MapView};

/// Pin icon size in CSS pixels; the tip sits on the marker position.
pub const MARKER_WIDTH: f64 = 25.0;
pub const MARKER_HEIGHT: f64 = 41.0;
/// Popups on markers open this far above the pin tip.
pub const MARKER_POPUP_OFFSET: f64 = 34.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerEvent {
    Click,
    HoverEnter,
    HoverExit,
}

/// Outcome of dispatching an event to a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerAction {
    Restyled,
    OpenPopup(PopupContent),
    Ignored,
}

/// A popup ready to be shown, anchored at a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPopup {
    pub content: PopupContent,
    pub anchor: LatLng,
    /// Extra upward screen offset from the anchor.
    pub offset_y: f64,
}

/// One interactive boundary and everything bound to it.
#[derive(Debug, Clone)]
pub struct LayerEntry {
    pub feature: CountryFeature,
    pub style: FeatureStyle,
    pub tooltip: Tooltip,
    bindings: Vec<LayerEvent>,
}

impl LayerEntry {
    fn bind(feature: CountryFeature) -> Self {
        Self {
            style: style::style_for(&feature),
            tooltip: Tooltip::for_feature(&feature),
            bindings: vec![LayerEvent::Click, LayerEvent::HoverEnter, LayerEvent::HoverExit],
            feature,
        }
    }

    pub fn handler_count(&self, event: LayerEvent) -> usize {
        self.bindings.iter().filter(|bound| **bound == event).count()
    }
}

/// Interactive layer built from a parsed boundary collection.
pub struct CountriesLayer {
    entries: Vec<LayerEntry>,
    /// Draw order, back to front.
    order: Vec<usize>,
    /// Position of each entry within `order`.
    rank: Vec<usize>,
    hovered: Option<usize>,
    grid: SpatialGrid,
}

impl CountriesLayer {
    pub fn build(features: Vec<CountryFeature>) -> Self {
        let grid = SpatialGrid::build(&features);
        let entries: Vec<LayerEntry> = features.into_iter().map(LayerEntry::bind).collect();
        let order: Vec<usize> = (0..entries.len()).collect();
        let rank = order.clone();
        Self {
            entries,
            order,
            rank,
            hovered: None,
            grid,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: usize) -> Option<&LayerEntry> {
        self.entries.get(idx)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Entries back to front.
    pub fn render_order(&self) -> impl Iterator<Item = &LayerEntry> {
        self.order.iter().map(|&idx| &self.entries[idx])
    }

    pub fn bring_to_front(&mut self, idx: usize) {
        if idx >= self.entries.len() || self.order.last() == Some(&idx) {
            return;
        }
        self.order.retain(|&i| i != idx);
        self.order.push(idx);
        for (position, &i) in self.order.iter().enumerate() {
            self.rank[i] = position;
        }
    }

    /// Run the handler bound to `event` on entry `idx`.
    pub fn dispatch(&mut self, idx: usize, event: LayerEvent) -> LayerAction {
        let Some(entry) = self.entries.get_mut(idx) else {
            return LayerAction::Ignored;
        };
        if entry.handler_count(event) == 0 {
            return LayerAction::Ignored;
        }

        match event {
            LayerEvent::HoverEnter => {
                entry.style = style::hover_enter(&entry.feature, &entry.style);
                self.bring_to_front(idx);
                LayerAction::Restyled
            }
            LayerEvent::HoverExit => {
                entry.style = style::hover_exit(&entry.feature, &entry.style);
                LayerAction::Restyled
            }
            LayerEvent::Click => LayerAction::OpenPopup(PopupContent::for_country(&entry.feature)),
        }
    }

    /// Move the hover highlight to `target`. Returns whether anything changed.
    pub fn hover(&mut self, target: Option<usize>) -> bool {
        if self.hovered == target {
            return false;
        }
        if let Some(previous) = self.hovered.take() {
            self.dispatch(previous, LayerEvent::HoverExit);
        }
        if let Some(next) = target {
            if self.dispatch(next, LayerEvent::HoverEnter) == LayerAction::Restyled {
                self.hovered = Some(next);
            }
        }
        true
    }

    /// Topmost feature containing the coordinate.
    pub fn hit_test(&self, lng: f64, lat: f64) -> Option<usize> {
        self.grid
            .candidates(lng, lat)
            .iter()
            .copied()
            .filter(|&idx| self.entries[idx].feature.contains(lng, lat))
            .max_by_key(|&idx| self.rank[idx])
    }
}

/// A fallback point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub position: LatLng,
    pub popup: PopupContent,
}

/// Point markers built from the embedded samples.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    /// One marker per sample with a valid centroid.
    pub fn from_samples(samples: &[CountrySample]) -> Self {
        let markers = samples
            .iter()
            .filter_map(|sample| {
                let position = sample.centroid.filter(LatLng::is_valid)?;
                Some(Marker {
                    name: sample.name.clone(),
                    position,
                    popup: PopupContent::for_sample(sample),
                })
            })
            .collect();
        Self { markers }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Topmost marker whose pin covers the screen point. Later markers draw
    /// over earlier ones.
    pub fn hit_test(&self, view: &MapView, sx: f64, sy: f64) -> Option<usize> {
        self.markers.iter().enumerate().rev().find_map(|(idx, marker)| {
            let (px, py) = view.latlng_to_screen(marker.position);
            let inside = (sx - px).abs() <= MARKER_WIDTH / 2.0 && sy <= py && sy >= py - MARKER_HEIGHT;
            inside.then_some(idx)
        })
    }
}

/// Something under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Feature(usize),
    Marker(usize),
}

/// The map's single interactive layer. Set once per page load from the
/// boundary request outcome.
pub enum MapLayer {
    Pending,
    Boundaries(CountriesLayer),
    Fallback(MarkerLayer),
}

impl MapLayer {
    pub fn from_outcome(
        outcome: Result<Vec<CountryFeature>, BoundaryError>,
        samples: &[CountrySample],
    ) -> Self {
        match outcome {
            Ok(features) => Self::Boundaries(CountriesLayer::build(features)),
            Err(_) => Self::Fallback(MarkerLayer::from_samples(samples)),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn countries(&self) -> Option<&CountriesLayer> {
        match self {
            Self::Boundaries(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn markers(&self) -> Option<&MarkerLayer> {
        match self {
            Self::Fallback(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn pick(&self, view: &MapView, sx: f64, sy: f64) -> Option<Pick> {
        match self {
            Self::Pending => None,
            Self::Boundaries(layer) => {
                let at = view.screen_to_latlng(sx, sy);
                layer.hit_test(at.lng, at.lat).map(Pick::Feature)
            }
            Self::Fallback(layer) => layer.hit_test(view, sx, sy).map(Pick::Marker),
        }
    }

    /// Update hover state for the current pick. Returns whether the layer
    /// needs a repaint.
    pub fn hover(&mut self, pick: Option<Pick>) -> bool {
        match self {
            Self::Boundaries(layer) => {
                let target = match pick {
                    Some(Pick::Feature(idx)) => Some(idx),
                    _ => None,
                };
                layer.hover(target)
            }
            Self::Pending | Self::Fallback(_) => false,
        }
    }

    pub fn tooltip(&self, pick: Pick) -> Option<&Tooltip> {
        match (self, pick) {
            (Self::Boundaries(layer), Pick::Feature(idx)) => layer.entry(idx).map(|e| &e.tooltip),
            _ => None,
        }
    }

    /// Handle a click on `pick` at map position `at`.
    pub fn click(&mut self, pick: Pick, at: LatLng) -> Option<OpenPopup> {
        match (self, pick) {
            (Self::Boundaries(layer), Pick::Feature(idx)) => match layer.dispatch(idx, LayerEvent::Click) {
                LayerAction::OpenPopup(content) => Some(OpenPopup {
                    content,
                    anchor: at,
                    offset_y: 0.0,
                }),
                _ => None,
            },
            (Self::Fallback(layer), Pick::Marker(idx)) => {
                let marker = layer.markers().get(idx)?;
                Some(OpenPopup {
                    content: marker.popup.clone(),
                    anchor: marker.position,
                    offset_y: MARKER_POPUP_OFFSET,
                })
            }
            _ => None,
        }
    }
}

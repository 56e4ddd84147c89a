//! Map documents: the renderable description a terminal action submits.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use geoscope_colormap::{ColorRamp, Palette};
use geoscope_core::{Expr, Image};

/// A longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// How an image layer maps values to colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisParams {
    /// Continuous data over a [min, max] domain through an ordered ramp.
    Continuous { min: f64, max: f64, ramp: ColorRamp },
    /// Categorical class codes `min..=max` through an ordered palette.
    Categorical { min: u32, max: u32, palette: Palette },
    /// Three bands mapped to R, G, B, values scaled to [0, max].
    Rgb { bands: [String; 3], max: f64 },
}

impl VisParams {
    /// Continuous ramp over a value domain.
    pub fn continuous(min: f64, max: f64, ramp: ColorRamp) -> Self {
        Self::Continuous { min, max, ramp }
    }

    /// Categorical palette; entry `i` colors class `min + i`.
    pub fn categorical(min: u32, max: u32, palette: Palette) -> Self {
        Self::Categorical { min, max, palette }
    }

    /// True-color band triple.
    pub fn rgb(red: &str, green: &str, blue: &str, max: f64) -> Self {
        Self::Rgb {
            bands: [red.to_string(), green.to_string(), blue.to_string()],
            max,
        }
    }
}

/// One visual overlay: an image expression plus its visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub expression: Arc<Expr>,
    pub vis: VisParams,
}

impl Layer {
    pub fn new(name: &str, image: &Image, vis: VisParams) -> Self {
        Self {
            name: name.to_string(),
            expression: Arc::clone(image.expr()),
            vis,
        }
    }
}

/// Where a label is anchored on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPosition {
    TopCenter,
    TopLeft,
    TopRight,
    BottomCenter,
}

/// A text label drawn over the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub position: LabelPosition,
}

impl Label {
    /// A title centered at the top of the map.
    pub fn title(text: &str) -> Self {
        Self {
            text: text.to_string(),
            position: LabelPosition::TopCenter,
        }
    }
}

/// A renderable map: center, zoom, ordered layers, optional title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapView {
    pub center: LonLat,
    pub zoom: u8,
    pub layers: Vec<Layer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Label>,
}

impl MapView {
    /// An empty map centered at (lon, lat).
    pub fn centered(lon: f64, lat: f64, zoom: u8) -> Self {
        Self {
            center: LonLat::new(lon, lat),
            zoom,
            layers: Vec::new(),
            title: None,
        }
    }

    /// Append a layer; later layers draw on top.
    pub fn add_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Set the title label.
    pub fn with_title(mut self, label: Label) -> Self {
        self.title = Some(label);
        self
    }

    /// Layer names in draw order.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscope_core::Image;

    fn ramp() -> ColorRamp {
        ColorRamp::parse("lightblue,orange,yellow,red,purple").unwrap()
    }

    #[test]
    fn comparison_layers_share_vis() {
        let vis_a = VisParams::continuous(0.00002, 0.0005, ramp());
        let vis_b = VisParams::continuous(0.00002, 0.0005, ramp());
        assert_eq!(vis_a, vis_b);
    }

    #[test]
    fn categorical_vis_serialization() {
        let vis = VisParams::categorical(0, 17, Palette::igbp());
        let json = serde_json::to_value(&vis).unwrap();
        assert_eq!(json["kind"], "categorical");
        assert_eq!(json["min"], 0);
        assert_eq!(json["max"], 17);
        assert_eq!(json["palette"].as_array().unwrap().len(), 18);
    }

    #[test]
    fn rgb_vis_serialization() {
        let vis = VisParams::rgb("B3", "B2", "B1", 0.4);
        let json = serde_json::to_value(&vis).unwrap();
        assert_eq!(json["bands"], serde_json::json!(["B3", "B2", "B1"]));
        assert_eq!(json["max"], 0.4);
    }

    #[test]
    fn map_document_shape() {
        let img = Image::load("scene");
        let map = MapView::centered(107.013905, 16.566622, 5)
            .with_title(Label::title("Nitrogen dioxide CONCENTRATIONS Map as of February 2020"))
            .add_layer(Layer::new(
                "Feb 2019",
                &img,
                VisParams::continuous(0.00002, 0.0005, ramp()),
            ));

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["center"]["lon"], 107.013905);
        assert_eq!(json["zoom"], 5);
        assert_eq!(json["title"]["position"], "top-center");
        assert_eq!(json["layers"][0]["name"], "Feb 2019");
        assert_eq!(json["layers"][0]["expression"]["op"], "loadImage");
    }

    #[test]
    fn layers_keep_draw_order() {
        let img = Image::load("scene");
        let vis = || VisParams::rgb("B3", "B2", "B1", 0.4);
        let map = MapView::centered(0.0, 0.0, 10)
            .add_layer(Layer::new("landsat", &img, vis()))
            .add_layer(Layer::new("classification", &img, vis()));
        assert_eq!(map.layer_names(), vec!["landsat", "classification"]);
    }

    #[test]
    fn untitled_map_omits_title() {
        let map = MapView::centered(0.0, 0.0, 3);
        let json = serde_json::to_value(&map).unwrap();
        assert!(json.get("title").is_none());
    }
}

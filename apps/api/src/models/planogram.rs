use serde::{Deserialize, Serialize};

/// One horizontal level of a fixture, as loaded by the hosting application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: String,
    /// Display order on the fixture (1 = bottom).
    pub level: i32,
    /// Usable interior width in centimeters.
    pub width: f64,
    #[serde(default)]
    pub eye_level: bool,
}

/// One product's placement on one shelf.
///
/// `width` is the per-facing width; when it is missing or non-positive the
/// allocation config's `default_product_width` is used instead. `facings`
/// defaults to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSlot {
    pub product_id: String,
    pub shelf_id: String,
    /// Left-edge offset from the start of the shelf, in centimeters.
    pub position_x: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub facings: Option<u32>,
}

impl ProductSlot {
    /// Returns a copy of this slot moved to `position_x`.
    pub fn moved_to(&self, position_x: f64) -> ProductSlot {
        ProductSlot {
            position_x,
            ..self.clone()
        }
    }
}

impl Shelf {
    /// Shelf width with negative and non-finite values clamped to zero.
    pub fn usable_width(&self) -> f64 {
        if self.width.is_finite() {
            self.width.max(0.0)
        } else {
            0.0
        }
    }
}

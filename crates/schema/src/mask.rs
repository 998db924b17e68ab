use crate::errors::SchemaError;

/// Per-pixel road labelling, row-major, one byte per pixel.
///
/// Labels are binary: [`SegmentationMask::ROAD`] or [`SegmentationMask::NON_ROAD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SegmentationMask {
    pub const NON_ROAD: u8 = 0;
    pub const ROAD: u8 = 1;

    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, SchemaError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SchemaError::MaskSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        if let Some((index, &label)) = data
            .iter()
            .enumerate()
            .find(|(_, l)| **l != Self::ROAD && **l != Self::NON_ROAD)
        {
            return Err(SchemaError::InvalidMaskLabel { index, label });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, label: u8) -> Result<Self, SchemaError> {
        Self::new(width, height, vec![label; width as usize * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn is_road(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == Some(Self::ROAD)
    }

    /// Labels of row `y` between columns `[x1, x2)`.
    pub fn row_span(&self, y: u32, x1: u32, x2: u32) -> &[u8] {
        let x2 = x2.min(self.width);
        if y >= self.height || x1 >= x2 {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.data[start + x1 as usize..start + x2 as usize]
    }

    pub fn road_fraction(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let road = self.data.iter().filter(|&&l| l == Self::ROAD).count();
        road as f32 / self.data.len() as f32
    }
}

use std::str::FromStr;

/// Fixed model input resolution (width, height).
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (320, 320);

/// Channel order the model expects in its input tensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    /// Order produced by OpenCV-style decoders; the bundled models were exported with it.
    #[default]
    Bgr,
}

impl FromStr for ChannelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            other => Err(format!(
                "{} is not a supported channel order. Use either `rgb` or `bgr`.",
                other
            )),
        }
    }
}

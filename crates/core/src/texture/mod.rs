use serde::{Deserialize, Serialize};

/// Transfer function describing how the bytes of a frame are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransferFunction {
    /// Standard display encoding. Video decoders produce this.
    #[default]
    Srgb,
    Linear,
}

impl TransferFunction {
    /// Converts an encoded channel value in [0, 1] to linear light.
    pub fn decode(self, value: f32) -> f32 {
        match self {
            TransferFunction::Linear => value,
            TransferFunction::Srgb => {
                if value <= 0.040_45 {
                    value / 12.92
                } else {
                    ((value + 0.055) / 1.055).powf(2.4)
                }
            }
        }
    }

    /// Converts a linear channel value in [0, 1] to this encoding.
    pub fn encode(self, value: f32) -> f32 {
        match self {
            TransferFunction::Linear => value,
            TransferFunction::Srgb => {
                if value <= 0.003_130_8 {
                    value * 12.92
                } else {
                    1.055 * value.powf(1.0 / 2.4) - 0.055
                }
            }
        }
    }
}

/// A single RGBA8 frame read from a playback surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub transfer: TransferFunction,
}

impl VideoFrame {
    pub fn solid(width: u32, height: u32, rgba: [u8; 4], transfer: TransferFunction) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }

        Self {
            width,
            height,
            pixels,
            transfer,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Re-encodes the colour channels into `target`. Alpha is left untouched.
    pub fn converted_to(&self, target: TransferFunction) -> VideoFrame {
        if self.transfer == target {
            return self.clone();
        }

        let source = self.transfer;
        let pixels = self
            .pixels
            .chunks_exact(4)
            .flat_map(|px| {
                let [r, g, b, a] = [px[0], px[1], px[2], px[3]];
                [
                    convert_channel(r, source, target),
                    convert_channel(g, source, target),
                    convert_channel(b, source, target),
                    a,
                ]
            })
            .collect();

        VideoFrame {
            width: self.width,
            height: self.height,
            pixels,
            transfer: target,
        }
    }
}

fn convert_channel(value: u8, from: TransferFunction, to: TransferFunction) -> u8 {
    let linear = from.decode(value as f32 / 255.0);
    (to.encode(linear).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Read access to the current visual frame of a playback surface.
///
/// Implementations must answer synchronously; the render graph calls this
/// once per rendered frame.
pub trait FrameSampler {
    /// Returns the most recent frame, or `None` when nothing is decoded yet.
    fn sample_frame(&self) -> Option<VideoFrame>;

    /// Encoding of the frames returned by [`FrameSampler::sample_frame`].
    fn transfer_function(&self) -> TransferFunction;
}

/// Unlit material that shows a video frame on the text mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMaterial {
    /// Encoding the shader expects for the colour map.
    pub expected_transfer: TransferFunction,
    pub tone_mapped: bool,
    #[serde(skip)]
    map: Option<VideoFrame>,
    #[serde(skip)]
    uploads: u64,
}

impl Default for VideoMaterial {
    fn default() -> Self {
        Self::new(TransferFunction::Srgb)
    }
}

impl VideoMaterial {
    pub fn new(expected_transfer: TransferFunction) -> Self {
        Self {
            expected_transfer,
            tone_mapped: false,
            map: None,
            uploads: 0,
        }
    }

    /// Pulls the sampler's current frame into the colour map. Returns whether
    /// a frame was available.
    pub fn upload_from<S: FrameSampler + ?Sized>(&mut self, sampler: &S) -> bool {
        match sampler.sample_frame() {
            Some(frame) => {
                self.map = Some(frame.converted_to(self.expected_transfer));
                self.uploads += 1;
                true
            }
            None => false,
        }
    }

    pub fn map(&self) -> Option<&VideoFrame> {
        self.map.as_ref()
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn clear(&mut self) {
        self.map = None;
    }
}

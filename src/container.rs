//! Image container consumed by the detectors.
//!
//! Containers are values: every transform returns a new container with a derived id and
//! leaves the source untouched.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct ImageContainer {
    id: String,
    path: Option<PathBuf>,
    image: RgbImage,
}

impl ImageContainer {
    /// Half-width of the square structuring element used by the morphology ops. A centred
    /// square has odd side, so this is 51x51, the nearest to a 50x50 element.
    const MORPH_RADIUS: u8 = 25;
    const DENOISE_RADIUS: u32 = 1;

    pub fn new(id: impl Into<String>, image: RgbImage) -> Self {
        Self {
            id: id.into(),
            path: None,
            image,
        }
    }

    /// Read an image from disk, converting it to 8-bit RGB.
    pub fn load(id: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| Error::Load {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let container = Self {
            id: id.into(),
            path: Some(path.to_path_buf()),
            image,
        };
        debug!("loaded {}", container);
        Ok(container)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.image.save(path).map_err(|source| Error::Save {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the pixels came from, when loaded from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Luma conversion of the pixels.
    pub fn grayscale(&self) -> GrayImage {
        imageops::grayscale(&self.image)
    }

    /// Grayscale copy wrapped as a new (3-channel) container.
    pub fn to_gray(&self) -> Self {
        let gray = self.grayscale();
        let rgb = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            let l = gray.get_pixel(x, y)[0];
            image::Rgb([l, l, l])
        });
        self.derive("_2Gray", rgb)
    }

    pub fn rescale(&self, height: u32, width: u32) -> Self {
        let resized = imageops::resize(&self.image, width, height, FilterType::Triangle);
        self.derive("_resize", resized)
    }

    pub fn reduce_noise(&self) -> Self {
        let denoised =
            imageproc::filter::median_filter(&self.image, Self::DENOISE_RADIUS, Self::DENOISE_RADIUS);
        self.derive("_reduceNoise", denoised)
    }

    pub fn erode(&self) -> Self {
        let eroded = per_channel(&self.image, |c| {
            imageproc::morphology::erode(c, Norm::LInf, Self::MORPH_RADIUS)
        });
        self.derive("_erode", eroded)
    }

    pub fn dilate(&self) -> Self {
        let dilated = per_channel(&self.image, |c| {
            imageproc::morphology::dilate(c, Norm::LInf, Self::MORPH_RADIUS)
        });
        self.derive("_dilate", dilated)
    }

    /// Erosion followed by dilation.
    pub fn open(&self) -> Self {
        let opened = self.erode().dilate();
        self.derive("_opened", opened.image)
    }

    /// Dilation followed by erosion.
    pub fn close(&self) -> Self {
        let closed = self.dilate().erode();
        self.derive("_closed", closed.image)
    }

    /// 256-bin histogram of the grayscale pixels.
    pub fn histogram(&self) -> [u32; 256] {
        let mut bins = [0u32; 256];
        for p in self.grayscale().pixels() {
            bins[p[0] as usize] += 1;
        }
        bins
    }

    fn derive(&self, suffix: &str, image: RgbImage) -> Self {
        Self {
            id: format!("{}{}", self.id, suffix),
            path: None,
            image,
        }
    }
}

impl fmt::Display for ImageContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image {} of size (w,h) = ({},{})",
            self.id,
            self.width(),
            self.height()
        )
    }
}

/// Apply a single-channel operation to each RGB channel and re-interleave the result.
fn per_channel<F>(image: &RgbImage, op: F) -> RgbImage
where
    F: Fn(&GrayImage) -> GrayImage,
{
    let (w, h) = image.dimensions();
    let channels: Vec<GrayImage> = (0..3)
        .map(|c| op(&GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y)[c]]))))
        .collect();
    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            channels[0].get_pixel(x, y)[0],
            channels[1].get_pixel(x, y)[0],
            channels[2].get_pixel(x, y)[0],
        ])
    })
}

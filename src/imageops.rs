use image::{ImageBuffer, Pixel, Primitive, Rgb, Rgb32FImage, RgbImage};
use num_traits::AsPrimitive;

/// Rescales an RGB buffer of any subpixel type to unit-range f32.
///
/// Integer subpixels are divided by their maximum; f32/f64 buffers are
/// already in [0, 1] and pass through unchanged.
pub fn normalize_rgb<S>(image: &ImageBuffer<Rgb<S>, Vec<S>>) -> Rgb32FImage
where
    Rgb<S>: Pixel<Subpixel = S>,
    S: Primitive + AsPrimitive<f32> + 'static,
{
    let max: f32 = S::DEFAULT_MAX_VALUE.as_();
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        Rgb([r.as_() / max, g.as_() / max, b.as_() / max])
    })
}

/// Quantises a unit-range image to 8 bits, clamping out-of-range values.
pub fn to_rgb8(image: &Rgb32FImage) -> RgbImage {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let Rgb(channels) = *image.get_pixel(x, y);
        Rgb(channels.map(quantize))
    })
}

fn quantize(value: f32) -> u8 {
    let scaled: f32 = value.clamp(0.0, 1.0) * f32::from(u8::MAX);
    scaled.round().as_()
}

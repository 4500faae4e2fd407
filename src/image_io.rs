use image::DynamicImage;
use image::GenericImageView;
use image::codecs::jpeg::JpegEncoder;

pub const MODEL_JPEG_QUALITY: u8 = 90;
pub const MODEL_MAX_DIM: u32 = 2048;

/// An image ready to be attached to a model request.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// # Errors
///
/// Returns Err if the bytes aren't an image format we can decode.
pub fn decode_upload(bytes: &[u8]) -> image::ImageResult<DynamicImage> {
    image::load_from_memory(bytes)
}

/// Downscale oversized photos and re-encode as JPEG.
///
/// # Errors
///
/// Returns Err if the image encoding fails
pub fn to_model_jpeg(img: &DynamicImage) -> image::ImageResult<EncodedImage> {
    let (w, h) = img.dimensions();
    let sized = if w <= MODEL_MAX_DIM && h <= MODEL_MAX_DIM {
        img.clone()
    } else {
        img.resize(
            MODEL_MAX_DIM,
            MODEL_MAX_DIM,
            image::imageops::FilterType::Triangle,
        )
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(sized.to_rgb8());
    let mut bytes = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, MODEL_JPEG_QUALITY))?;

    Ok(EncodedImage {
        mime_type: "image/jpeg",
        bytes,
    })
}

/// Decode an upload and prepare it for the model in one step.
///
/// # Errors
///
/// Returns Err if decoding or re-encoding fails.
pub fn prepare_upload(bytes: &[u8]) -> image::ImageResult<EncodedImage> {
    let img = decode_upload(bytes)?;
    to_model_jpeg(&img)
}

use std::path::Path;
use std::sync::Once;

use ffmpeg::util::frame::video::Video;
use ffmpeg::{codec, decoder, format, media, software};
use ffmpeg_next::{self as ffmpeg};

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        ffmpeg::init().unwrap();
    });
}

/// One decoded or generated still image, tightly packed RGB24.
#[derive(Debug)]
pub struct RgbFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbFrame {
    pub fn from_image(image: &image::RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().clone(),
        }
    }

    fn from_decoded(frame: &Video) -> Self {
        let width = frame.width();
        let height = frame.height();
        let stride = frame.stride(0);
        let row = width as usize * 3;
        let mut data = Vec::with_capacity(row * height as usize);
        // libav rows may carry alignment padding past width * 3
        for chunk in frame.data(0).chunks(stride).take(height as usize) {
            data.extend_from_slice(&chunk[..row]);
        }
        Self {
            width,
            height,
            data,
        }
    }
}

pub struct DecodedVideo {
    pub frames: Vec<RgbFrame>,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
}

/// Decodes every frame of the best video stream, in order, along with the
/// stream's frame rate and dimensions.
pub fn decode_frames(input_path: &Path) -> anyhow::Result<DecodedVideo> {
    let mut input = format::input(&input_path)?;

    let video_stream = input
        .streams()
        .best(media::Type::Video)
        .ok_or(anyhow::anyhow!(ffmpeg::Error::StreamNotFound))?;
    let video_stream_index = video_stream.index();
    let frame_rate = integer_frame_rate(&video_stream);

    let codec_params = video_stream.parameters();
    let mut decoder = codec::context::Context::from_parameters(codec_params)?
        .decoder()
        .video()?;
    let width = decoder.width();
    let height = decoder.height();

    let mut scaler = software::scaling::context::Context::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        format::Pixel::RGB24,
        decoder.width(),
        decoder.height(),
        software::scaling::Flags::BILINEAR,
    )?;

    let mut frames = Vec::new();
    let mut receive_decoded_frames =
        |decoder: &mut decoder::Video| -> Result<(), anyhow::Error> {
            let mut decoded = Video::empty();
            while decoder.receive_frame(&mut decoded).is_ok() {
                let mut rgb_frame = Video::empty();
                scaler.run(&decoded, &mut rgb_frame)?;
                frames.push(RgbFrame::from_decoded(&rgb_frame));
            }
            Ok(())
        };

    for (stream, packet) in input.packets() {
        if stream.index() == video_stream_index {
            decoder.send_packet(&packet)?;
            receive_decoded_frames(&mut decoder)?;
        }
    }
    decoder.send_eof()?;
    receive_decoded_frames(&mut decoder)?;

    Ok(DecodedVideo {
        frames,
        frame_rate,
        width,
        height,
    })
}

fn integer_frame_rate(stream: &format::stream::Stream) -> u32 {
    let average: f64 = stream.avg_frame_rate().into();
    let rate = if average > 0.0 {
        average
    } else {
        stream.rate().into()
    };
    rate.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_image_keeps_dimensions_and_bytes() {
        let image = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        let frame = RgbFrame::from_image(&image);
        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.data.len(), 4 * 2 * 3);
        assert_eq!(&frame.data[..3], &[10, 20, 30]);
    }
}

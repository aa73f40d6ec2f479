use std::path::Path;

use ffmpeg::util::frame::video::Video;
use ffmpeg::{codec, encoder, format, software, Dictionary, Error, Packet, Rational};
use ffmpeg_next::{self as ffmpeg};

use crate::decode::RgbFrame;

/// All synthesized videos are written at this rate.
pub const SYNTHESIS_FRAME_RATE: i32 = 24;

/// Encodes an ordered frame sequence into a single video file.
///
/// The output dimensions come from the first frame; every frame must share
/// them. No resizing or cropping is performed, only the pixel-format
/// conversion the encoder needs.
pub fn write_video(frames: &[RgbFrame], output_path: &Path) -> anyhow::Result<()> {
    let first = frames
        .first()
        .ok_or(anyhow::anyhow!("no frames to encode"))?;
    let width = first.width;
    let height = first.height;

    let mut output = format::output(&output_path)?;
    let global_header = output
        .format()
        .flags()
        .contains(format::Flags::GLOBAL_HEADER);

    let codec = encoder::find(codec::Id::MPEG4).ok_or(anyhow::anyhow!(Error::EncoderNotFound))?;
    let mut output_stream = output.add_stream(codec)?;
    let mut encoder = codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()?;
    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(format::Pixel::YUV420P);
    encoder.set_time_base(Rational(1, SYNTHESIS_FRAME_RATE));
    encoder.set_frame_rate(Some(Rational(SYNTHESIS_FRAME_RATE, 1)));
    if global_header {
        encoder.set_flags(codec::Flags::GLOBAL_HEADER);
    }
    let mut encoder = encoder.open_with(Dictionary::new())?;
    output_stream.set_parameters(&encoder);

    output.write_header()?;
    let output_stream_time_base = output
        .stream(0)
        .ok_or(anyhow::anyhow!(Error::StreamNotFound))?
        .time_base();

    let mut scaler = software::scaling::context::Context::get(
        format::Pixel::RGB24,
        width,
        height,
        format::Pixel::YUV420P,
        width,
        height,
        software::scaling::Flags::BILINEAR,
    )?;

    for (index, frame) in frames.iter().enumerate() {
        anyhow::ensure!(
            frame.width == width && frame.height == height,
            "frame {} is {}x{}, expected {}x{}",
            index,
            frame.width,
            frame.height,
            width,
            height
        );
        let mut rgb_frame = Video::new(format::Pixel::RGB24, width, height);
        fill_rgb_frame(&mut rgb_frame, frame);

        let mut yuv_frame = Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(index as i64));

        encoder.send_frame(&yuv_frame)?;
        receive_encoded_packets(&mut encoder, &mut output, output_stream_time_base)?;
    }

    encoder.send_eof()?;
    receive_encoded_packets(&mut encoder, &mut output, output_stream_time_base)?;
    output.write_trailer()?;

    Ok(())
}

fn fill_rgb_frame(destination: &mut Video, source: &RgbFrame) {
    let stride = destination.stride(0);
    let row = source.width as usize * 3;
    let data = destination.data_mut(0);
    for (y, source_row) in source.data.chunks(row).enumerate() {
        data[y * stride..y * stride + row].copy_from_slice(source_row);
    }
}

fn receive_encoded_packets(
    encoder: &mut encoder::Video,
    output: &mut format::context::Output,
    output_stream_time_base: Rational,
) -> anyhow::Result<()> {
    let mut packet = Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(0);
        packet.rescale_ts(Rational(1, SYNTHESIS_FRAME_RATE), output_stream_time_base);
        packet.write_interleaved(output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_sequence_is_rejected() {
        crate::decode::init();
        let err = write_video(&[], Path::new("/tmp/filmloom-never-written.mp4")).unwrap_err();
        assert!(err.to_string().contains("no frames"));
    }
}

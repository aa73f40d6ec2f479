use std::path::Path;

use ffmpeg::util::frame::video::Video;
use ffmpeg::{codec, decoder, encoder, filter, format, media, picture, Dictionary, Error, Packet, Rational};
use ffmpeg_next::{self as ffmpeg};

/// Re-encodes a video with two burned-in text overlays spanning its whole
/// duration: the transcript caption along the bottom edge and a
/// `Prompt: …` banner along the top.
pub fn burn_overlays(
    input_path: &Path,
    output_path: &Path,
    caption: &str,
    prompt: &str,
) -> anyhow::Result<()> {
    let mut input = format::input(&input_path)?;

    let input_stream = input
        .streams()
        .best(media::Type::Video)
        .ok_or(anyhow::anyhow!(Error::StreamNotFound))?;
    let input_stream_index = input_stream.index();
    let input_time_base = input_stream.time_base();
    let frame_rate = input_stream.avg_frame_rate();
    let mut decoder = codec::context::Context::from_parameters(input_stream.parameters())?
        .decoder()
        .video()?;

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
    encoder.set_width(decoder.width());
    encoder.set_height(decoder.height());
    encoder.set_format(format::Pixel::YUV420P);
    encoder.set_time_base(input_time_base);
    encoder.set_frame_rate(Some(frame_rate));
    if global_header {
        encoder.set_flags(codec::Flags::GLOBAL_HEADER);
    }
    let mut encoder = encoder.open_with(Dictionary::new())?;
    output_stream.set_parameters(&encoder);

    let mut filter_graph = overlay_graph(&decoder, input_time_base, caption, prompt)?;

    output.write_header()?;
    let output_stream_time_base = output
        .stream(0)
        .ok_or(anyhow::anyhow!(Error::StreamNotFound))?
        .time_base();

    for (stream, packet) in input.packets() {
        if stream.index() != input_stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        filter_decoded_frames(
            &mut decoder,
            &mut filter_graph,
            &mut encoder,
            &mut output,
            input_time_base,
            output_stream_time_base,
        )?;
    }
    decoder.send_eof()?;
    filter_decoded_frames(
        &mut decoder,
        &mut filter_graph,
        &mut encoder,
        &mut output,
        input_time_base,
        output_stream_time_base,
    )?;

    filter_graph
        .get("in")
        .ok_or(anyhow::anyhow!("Failed to get filter"))?
        .source()
        .flush()?;
    encode_filtered_frames(
        &mut filter_graph,
        &mut encoder,
        &mut output,
        input_time_base,
        output_stream_time_base,
    )?;

    encoder.send_eof()?;
    receive_encoded_packets(&mut encoder, &mut output, input_time_base, output_stream_time_base)?;
    output.write_trailer()?;

    Ok(())
}

fn overlay_graph(
    decoder: &decoder::Video,
    time_base: Rational,
    caption: &str,
    prompt: &str,
) -> anyhow::Result<filter::Graph> {
    let mut filter_graph = filter::Graph::new();

    let pixel_format = decoder
        .format()
        .descriptor()
        .ok_or(anyhow::anyhow!("Unknown pixel format"))?
        .name();
    let aspect_ratio = decoder.aspect_ratio();
    let (aspect_num, aspect_den) =
        if aspect_ratio.numerator() > 0 && aspect_ratio.denominator() > 0 {
            (aspect_ratio.numerator(), aspect_ratio.denominator())
        } else {
            (1, 1)
        };
    let args = format!(
        "video_size={}x{}:pix_fmt={}:time_base={}/{}:pixel_aspect={}/{}",
        decoder.width(),
        decoder.height(),
        pixel_format,
        time_base.numerator(),
        time_base.denominator(),
        aspect_num,
        aspect_den
    );

    filter_graph.add(
        &filter::find("buffer").ok_or(anyhow::anyhow!("Failed to find filter"))?,
        "in",
        &args,
    )?;
    filter_graph.add(
        &filter::find("buffersink").ok_or(anyhow::anyhow!("Failed to find filter"))?,
        "out",
        "",
    )?;

    {
        let mut out = filter_graph
            .get("out")
            .ok_or(anyhow::anyhow!("Failed to get filter"))?;
        out.set_pixel_format(format::Pixel::YUV420P);
    }

    filter_graph
        .output("in", 0)?
        .input("out", 0)?
        .parse(&overlay_filter_spec(caption, prompt))?;
    filter_graph.validate()?;

    Ok(filter_graph)
}

fn overlay_filter_spec(caption: &str, prompt: &str) -> String {
    let banner = format!("Prompt: {prompt}");
    format!(
        "drawtext=text='{}':expansion=none:fontsize=28:fontcolor=white:box=1:boxcolor=black@0.5:boxborderw=8:x=(w-text_w)/2:y=h-text_h-24,\
        drawtext=text='{}':expansion=none:fontsize=28:fontcolor=white:box=1:boxcolor=black@0.5:boxborderw=8:x=(w-text_w)/2:y=24",
        escape_drawtext(caption),
        escape_drawtext(&banner)
    )
}

/// Prepares free text for a quoted drawtext argument: newlines collapse to
/// spaces, backslashes are doubled and single quotes use the
/// close-escape-reopen sequence the filter-graph parser expects.
pub fn escape_drawtext(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\\', "\\\\")
        .replace('\'', "'\\''")
}

fn filter_decoded_frames(
    decoder: &mut decoder::Video,
    filter_graph: &mut filter::Graph,
    encoder: &mut encoder::Video,
    output: &mut format::context::Output,
    input_time_base: Rational,
    output_stream_time_base: Rational,
) -> anyhow::Result<()> {
    let mut decoded = Video::empty();
    while decoder.receive_frame(&mut decoded).is_ok() {
        filter_graph
            .get("in")
            .ok_or(anyhow::anyhow!("Failed to get filter"))?
            .source()
            .add(&decoded)?;
        encode_filtered_frames(
            filter_graph,
            encoder,
            output,
            input_time_base,
            output_stream_time_base,
        )?;
    }
    Ok(())
}

fn encode_filtered_frames(
    filter_graph: &mut filter::Graph,
    encoder: &mut encoder::Video,
    output: &mut format::context::Output,
    input_time_base: Rational,
    output_stream_time_base: Rational,
) -> anyhow::Result<()> {
    let mut filtered = Video::empty();
    while filter_graph
        .get("out")
        .ok_or(anyhow::anyhow!("Failed to get filter"))?
        .sink()
        .frame(&mut filtered)
        .is_ok()
    {
        filtered.set_kind(picture::Type::None);
        encoder.send_frame(&filtered)?;
        receive_encoded_packets(encoder, output, input_time_base, output_stream_time_base)?;
    }
    Ok(())
}

fn receive_encoded_packets(
    encoder: &mut encoder::Video,
    output: &mut format::context::Output,
    input_time_base: Rational,
    output_stream_time_base: Rational,
) -> anyhow::Result<()> {
    let mut packet = Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(0);
        packet.rescale_ts(input_time_base, output_stream_time_base);
        packet.write_interleaved(output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_collapses_whitespace() {
        assert_eq!(escape_drawtext("a dark\nforest  here"), "a dark forest here");
    }

    #[test]
    fn escape_handles_quotes_and_backslashes() {
        assert_eq!(escape_drawtext(r"it's a\b"), r"it'\''s a\\b");
    }

    #[test]
    fn filter_spec_contains_both_overlays() {
        let spec = overlay_filter_spec("hello world", "A dark forest.");
        assert!(spec.contains("text='hello world'"));
        assert!(spec.contains("text='Prompt: A dark forest.'"));
        assert!(spec.contains("y=h-text_h-24"));
        assert!(spec.contains("y=24"));
    }
}

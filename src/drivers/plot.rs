use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use crate::drivers::error::MonitorError;
use crate::drivers::frame::PlotFrame;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub line_color: RGBColor,
    /// Captions, axis text and legend. Off renders geometry only.
    pub labels: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            background: RGBColor(10, 10, 10),
            line_color: RGBColor(31, 119, 180),
            labels: true,
        }
    }
}
/// Render both stacked charts (amplitude 9 parts, voltage 1 part) as PNG.
pub fn render_frame_png(frame: &PlotFrame, style: &PlotStyle) -> Result<Vec<u8>, MonitorError> {
    if frame.is_empty() {
        return Err(MonitorError::Plot("plot frame has no samples".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let (upper, lower) = root.split_vertically(style.height * 9 / 10);
        let x_max = frame.x.last().copied().unwrap_or(0.0).max(1.0);
        draw_amplitude(&upper, frame, style, x_max)?;
        draw_voltage(&lower, frame, style, x_max)?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
pub fn save_frame_png(
    frame: &PlotFrame,
    style: &PlotStyle,
    path: &Path,
) -> Result<PathBuf, MonitorError> {
    let png = render_frame_png(frame, style)?;
    std::fs::write(path, png)?;
    Ok(path.to_path_buf())
}
/// `eeg_frame_<unix-seconds>.png` in the working directory.
pub fn default_export_path() -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    PathBuf::from(format!("eeg_frame_{secs}.png"))
}
fn draw_amplitude(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    frame: &PlotFrame,
    style: &PlotStyle,
    x_max: f64,
) -> Result<(), MonitorError> {
    let y_max = frame.peak_amplitude().max(1.0) * 1.05;
    let mut builder = ChartBuilder::on(area);
    builder.margin(10);
    if style.labels {
        builder
            .caption(
                "Real-Time Frequency and mV Values",
                ("sans-serif", 20).into_font().color(&WHITE),
            )
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 35);
    }
    let mut chart = builder.build_cartesian_2d(0f64..x_max, 0f64..y_max)?;
    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(&WHITE.mix(0.1));
    if style.labels {
        mesh.x_desc("Frequency (Hz)")
            .y_desc("Intensity (dB)")
            .label_style(("sans-serif", 12).into_font().color(&WHITE))
            .axis_desc_style(("sans-serif", 14).into_font().color(&WHITE));
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;
    chart.draw_series(LineSeries::new(
        frame.amplitude_points().into_iter().map(|[x, y]| (x, y)),
        &style.line_color,
    ))?;
    for fill in &frame.band_fills {
        let [r, g, b] = fill.band.rgb();
        let color = RGBColor(r, g, b);
        let anno = if fill.points.is_empty() {
            chart.draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), &color))?
        } else {
            chart.draw_series(
                AreaSeries::new(
                    fill.points.iter().map(|p| (p[0], p[1])),
                    0.0,
                    color.mix(1.0),
                )
                .border_style(color),
            )?
        };
        anno.label(fill.band.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 16, y + 4)], color.filled()));
    }
    if style.labels {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 12).into_font().color(&WHITE))
            .border_style(&WHITE.mix(0.2))
            .background_style(&style.background)
            .draw()?;
    }
    Ok(())
}
fn draw_voltage(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    frame: &PlotFrame,
    style: &PlotStyle,
    x_max: f64,
) -> Result<(), MonitorError> {
    let y_max = frame.voltage.iter().copied().fold(0.0, f64::max).max(1e-3) * 1.05;
    let mut builder = ChartBuilder::on(area);
    builder.margin(5);
    if style.labels {
        builder
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 30);
    }
    let mut chart = builder.build_cartesian_2d(0f64..x_max, 0f64..y_max)?;
    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(&WHITE.mix(0.1)).y_labels(3);
    if style.labels {
        mesh.x_desc("Time")
            .y_desc("Voltage (mV)")
            .label_style(("sans-serif", 10).into_font().color(&WHITE))
            .axis_desc_style(("sans-serif", 12).into_font().color(&WHITE));
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;
    chart.draw_series(LineSeries::new(
        frame.voltage_points().into_iter().map(|[x, y]| (x, y)),
        &style.line_color,
    ))?;
    Ok(())
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, MonitorError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| MonitorError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::SampleChunk;
    fn geometry_only() -> PlotStyle {
        PlotStyle {
            width: 320,
            height: 200,
            labels: false,
            ..PlotStyle::default()
        }
    }
    #[test]
    fn renders_png_for_chunk() {
        let chunk = SampleChunk::new(50_000, (0..200).map(|i| (i * 37 % 500 - 250) as i16).collect());
        let frame = PlotFrame::from_chunk(&chunk, 3.3 / 1024.0);
        let png = render_frame_png(&frame, &geometry_only()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 320);
        assert_eq!(decoded.height(), 200);
    }
    #[test]
    fn silent_chunk_still_renders() {
        let frame = PlotFrame::from_chunk(&SampleChunk::new(100, vec![0; 16]), 1.0);
        assert!(render_frame_png(&frame, &geometry_only()).is_ok());
    }
    #[test]
    fn empty_frame_is_rejected() {
        let frame = PlotFrame::from_chunk(&SampleChunk::new(100, Vec::new()), 1.0);
        assert!(matches!(
            render_frame_png(&frame, &geometry_only()),
            Err(MonitorError::Plot(_))
        ));
    }
    #[test]
    fn export_path_is_png() {
        let path = default_export_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }
}

use crate::drivers::{EegBand, FrequencySpectrum, SampleChunk};
/// Distance between consecutive points on the plotted x axis.
pub const X_STEP: f64 = 2.0;
/// Points of the amplitude curve that fall inside one band.
#[derive(Clone, Debug)]
pub struct BandFill {
    pub band: EegBand,
    pub points: Vec<[f64; 2]>,
}
/// Everything the two charts need for one tick.
#[derive(Clone, Debug)]
pub struct PlotFrame {
    pub sample_rate_hz: u32,
    pub x: Vec<f64>,
    pub amplitude: Vec<f64>,
    pub voltage: Vec<f64>,
    pub band_fills: Vec<BandFill>,
    pub band_power: Vec<(EegBand, f64)>,
}
impl PlotFrame {
    pub fn from_chunk(chunk: &SampleChunk, voltage_scale: f64) -> Self {
        let amplitude = rectify(&chunk.samples);
        let voltage = to_voltage(&amplitude, voltage_scale);
        let x = x_axis(amplitude.len());
        let band_fills = band_fills(&x, &amplitude);
        Self {
            sample_rate_hz: chunk.sample_rate_hz,
            x,
            amplitude,
            voltage,
            band_fills,
            band_power: Vec::new(),
        }
    }
    pub fn with_spectrum(mut self, spectrum: &FrequencySpectrum) -> Self {
        self.band_power = spectrum.band_powers();
        self
    }
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    pub fn amplitude_points(&self) -> Vec<[f64; 2]> {
        zip_points(&self.x, &self.amplitude)
    }
    pub fn voltage_points(&self) -> Vec<[f64; 2]> {
        zip_points(&self.x, &self.voltage)
    }
    pub fn peak_amplitude(&self) -> f64 {
        self.amplitude.iter().copied().fold(0.0, f64::max)
    }
}
/// Absolute value of every sample; `i16::MIN` maps to 32768.
pub fn rectify(samples: &[i16]) -> Vec<f64> {
    samples.iter().map(|&s| (s as i32).abs() as f64).collect()
}
pub fn to_voltage(amplitude: &[f64], scale: f64) -> Vec<f64> {
    amplitude.iter().map(|a| a * scale).collect()
}
/// `0, 2, 4, ...` with `len` points.
pub fn x_axis(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64 * X_STEP).collect()
}
pub fn band_fills(x: &[f64], y: &[f64]) -> Vec<BandFill> {
    EegBand::ALL
        .iter()
        .map(|&band| BandFill {
            band,
            points: x
                .iter()
                .zip(y)
                .filter(|(x, _)| band.contains(**x))
                .map(|(x, y)| [*x, *y])
                .collect(),
        })
        .collect()
}
fn zip_points(x: &[f64], y: &[f64]) -> Vec<[f64; 2]> {
    x.iter().zip(y).map(|(x, y)| [*x, *y]).collect()
}

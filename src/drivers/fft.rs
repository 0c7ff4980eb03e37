use std::sync::Arc;
use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use crate::drivers::EegBand;
/// Magnitude spectrum of a block of samples.
#[derive(Clone, Debug)]
pub struct FrequencySpectrum {
    pub sample_rate_hz: u32,
    pub frequencies_hz: Vec<f64>,
    pub magnitudes: Vec<f64>,
}
impl FrequencySpectrum {
    pub fn bin_width_hz(&self) -> f64 {
        self.frequencies_hz.get(1).copied().unwrap_or(0.0)
    }
    /// Sum of squared magnitudes over the bins inside `band`.
    pub fn band_power(&self, band: EegBand) -> f64 {
        self.frequencies_hz
            .iter()
            .zip(&self.magnitudes)
            .filter(|(f, _)| band.contains(**f))
            .fold(0.0, |acc, (_, m)| acc + m * m)
    }
    pub fn band_powers(&self) -> Vec<(EegBand, f64)> {
        EegBand::ALL
            .iter()
            .map(|&band| (band, self.band_power(band)))
            .collect()
    }
    /// Frequency of the strongest non-DC bin.
    pub fn peak_hz(&self) -> Option<f64> {
        self.frequencies_hz
            .iter()
            .zip(&self.magnitudes)
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(f, _)| *f)
    }
}
/// Forward FFT of a fixed size, planned once.
pub struct SpectrumBuilder {
    fft_size: usize,
    fft: Arc<dyn Fft<f64>>,
}
impl SpectrumBuilder {
    pub fn with_size(fft_size: usize) -> Self {
        let fft = FftPlanner::<f64>::new().plan_fft_forward(fft_size);
        Self { fft_size, fft }
    }
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
    /// Mean-removed spectrum of up to `fft_size` samples, zero-padded.
    pub fn compute_samples(
        &self,
        sample_rate_hz: u32,
        samples: impl IntoIterator<Item = i16>,
    ) -> FrequencySpectrum {
        let mut buffer: Vec<Complex64> = samples
            .into_iter()
            .take(self.fft_size)
            .map(|s| Complex64::new(s as f64, 0.0))
            .collect();
        if !buffer.is_empty() {
            let mean = buffer.iter().map(|c| c.re).sum::<f64>() / buffer.len() as f64;
            for c in &mut buffer {
                c.re -= mean;
            }
        }
        buffer.resize(self.fft_size, Complex64::new(0.0, 0.0));
        self.fft.process(&mut buffer);
        let bin_hz = sample_rate_hz as f64 / self.fft_size as f64;
        let frequencies = (0..self.fft_size / 2).map(|k| k as f64 * bin_hz).collect();
        let magnitudes = buffer
            .iter()
            .take(self.fft_size / 2)
            .map(|c| c.norm() / self.fft_size as f64)
            .collect();
        FrequencySpectrum {
            sample_rate_hz,
            frequencies_hz: frequencies,
            magnitudes,
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::drivers::SampleChunk;
    impl SpectrumBuilder {
        fn compute(&self, chunk: &SampleChunk) -> FrequencySpectrum {
            self.compute_samples(chunk.sample_rate_hz, chunk.samples.iter().copied())
        }
    }
    fn tone(sample_rate_hz: u32, freq_hz: f64, len: usize) -> SampleChunk {
        let samples = (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate_hz as f64;
                ((2.0 * std::f64::consts::PI * freq_hz * t).sin() * 10_000.0) as i16
            })
            .collect();
        SampleChunk::new(sample_rate_hz, samples)
    }
    #[test]
    fn finds_peak_of_pure_tone() {
        let chunk = tone(256, 10.0, 256);
        let spectrum = SpectrumBuilder::with_size(256).compute(&chunk);
        assert_eq!(spectrum.frequencies_hz.len(), 128);
        assert_relative_eq!(spectrum.bin_width_hz(), 1.0);
        assert_relative_eq!(spectrum.peak_hz().unwrap(), 10.0);
    }
    #[test]
    fn tone_power_lands_in_its_band() {
        let chunk = tone(256, 10.0, 256);
        let spectrum = SpectrumBuilder::with_size(256).compute(&chunk);
        let alpha = spectrum.band_power(EegBand::Alpha);
        let beta = spectrum.band_power(EegBand::Beta);
        assert!(alpha > 100.0 * beta, "alpha={alpha} beta={beta}");
    }
    #[test]
    fn short_chunk_is_zero_padded() {
        let chunk = SampleChunk::new(100, vec![5; 10]);
        let spectrum = SpectrumBuilder::with_size(64).compute(&chunk);
        assert_eq!(spectrum.magnitudes.len(), 32);
        assert!(spectrum.magnitudes.iter().all(|m| m.abs() < 1e-9));
    }
    #[test]
    fn band_without_bins_is_positive_zero() {
        // 4-point FFT at 50 kHz: bins at 0 Hz and 12.5 kHz only.
        let chunk = SampleChunk::new(50_000, vec![1, -1, 1, -1]);
        let spectrum = SpectrumBuilder::with_size(4).compute(&chunk);
        let theta = spectrum.band_power(EegBand::Theta);
        assert_eq!(theta, 0.0);
        assert!(theta.is_sign_positive());
    }
    #[test]
    fn one_builder_serves_many_chunks() {
        let builder = SpectrumBuilder::with_size(256);
        let a = builder.compute(&tone(256, 10.0, 256));
        let b = builder.compute(&tone(256, 20.0, 256));
        assert_relative_eq!(a.peak_hz().unwrap(), 10.0);
        assert_relative_eq!(b.peak_hz().unwrap(), 20.0);
    }
}

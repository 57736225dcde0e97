//! Doppler (Gaussian) line-profile convolution.
//!
//! Each line `i` with centre `νᵢ`, intensity `Iᵢ` and half-width `wᵢ` contributes
//!
//! ```text
//! Iᵢ · exp(-ln2·(ν - νᵢ)²/wᵢ²) / wᵢ · sqrt(ln2/π)
//! ```
//!
//! at every grid point `ν`. Two interchangeable [`ProfileKernel`]s evaluate the superposition:
//! [`BatchKernel`] materialises the full lines × grid matrix, [`StreamingKernel`] walks line by
//! line into per-worker buffers and never holds more than one grid-sized buffer per worker.

use super::broadening::{HalfWidths, Widths};
use super::error::{SpectroscopyError, ensure_len};
use crate::core::models::cross_section::CrossSection;
use crate::core::models::grid::SpectralGrid;
use crate::core::units::{Dimension, Quantity, Unit};
use nalgebra::DMatrix;
use std::f64::consts::{LN_2, PI};
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Above this many matrix elements, [`KernelChoice::Auto`] switches to streaming.
pub const DEFAULT_MAX_BATCH_ELEMENTS: usize = 4_000_000;

#[inline]
fn normalization() -> f64 {
    (LN_2 / PI).sqrt()
}

/// Normalised Gaussian evaluated at `offset` from the line centre.
#[inline]
pub fn doppler_kernel(offset: f64, half_width: f64) -> f64 {
    (-LN_2 * offset * offset / (half_width * half_width)).exp() / half_width * normalization()
}

/// Validated lines in base units (cm⁻¹ centres and widths, cm intensities).
#[derive(Debug, Clone)]
pub struct LineSet<'a> {
    centers: &'a [f64],
    intensities: &'a [f64],
    widths: Widths<'a>,
}

impl<'a> LineSet<'a> {
    pub fn new(
        centers: &'a [f64],
        intensities: &'a [f64],
        widths: Widths<'a>,
    ) -> Result<Self, SpectroscopyError> {
        ensure_len("intensities", centers.len(), intensities.len())?;
        if let Widths::PerLine(ws) = &widths {
            ensure_len("half_widths", centers.len(), ws.len())?;
        }
        Ok(Self {
            centers,
            intensities,
            widths,
        })
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    #[inline]
    fn contribution(&self, line: usize, wavenumber: f64) -> f64 {
        self.intensities[line]
            * doppler_kernel(wavenumber - self.centers[line], self.widths.get(line))
    }
}

/// A strategy for adding the profile of a set of lines onto a grid.
pub trait ProfileKernel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Adds every line's contribution into `out`, which has the grid's length.
    fn accumulate(&self, grid: &[f64], lines: &LineSet<'_>, out: &mut [f64]);
}

/// Evaluates the full `M × N` kernel matrix and sums over lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchKernel;

impl ProfileKernel for BatchKernel {
    fn name(&self) -> &'static str {
        "batch"
    }

    fn accumulate(&self, grid: &[f64], lines: &LineSet<'_>, out: &mut [f64]) {
        if lines.is_empty() || grid.is_empty() {
            return;
        }
        let matrix = DMatrix::from_fn(lines.len(), grid.len(), |i, j| {
            lines.contribution(i, grid[j])
        });
        for (o, v) in out.iter_mut().zip(matrix.row_sum().iter()) {
            *o += v;
        }
    }
}

/// Line-by-line accumulation; with the `parallel` feature the lines are split across
/// rayon workers, each folding into its own grid buffer before an element-wise reduce.
#[derive(Debug, Clone, Copy)]
pub struct StreamingKernel {
    min_lines_per_task: usize,
}

impl Default for StreamingKernel {
    fn default() -> Self {
        Self {
            min_lines_per_task: 64,
        }
    }
}

impl StreamingKernel {
    pub fn new(min_lines_per_task: usize) -> Self {
        Self {
            min_lines_per_task: min_lines_per_task.max(1),
        }
    }

    #[inline]
    fn add_line(grid: &[f64], lines: &LineSet<'_>, line: usize, out: &mut [f64]) {
        for (o, &nu) in out.iter_mut().zip(grid) {
            *o += lines.contribution(line, nu);
        }
    }
}

impl ProfileKernel for StreamingKernel {
    fn name(&self) -> &'static str {
        "streaming"
    }

    #[cfg(feature = "parallel")]
    fn accumulate(&self, grid: &[f64], lines: &LineSet<'_>, out: &mut [f64]) {
        let n = grid.len();
        let partial = (0..lines.len())
            .into_par_iter()
            .with_min_len(self.min_lines_per_task)
            .fold(
                || vec![0.0; n],
                |mut acc, line| {
                    Self::add_line(grid, lines, line, &mut acc);
                    acc
                },
            )
            .reduce(
                || vec![0.0; n],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(&b) {
                        *x += y;
                    }
                    a
                },
            );
        for (o, p) in out.iter_mut().zip(partial) {
            *o += p;
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn accumulate(&self, grid: &[f64], lines: &LineSet<'_>, out: &mut [f64]) {
        for line in 0..lines.len() {
            Self::add_line(grid, lines, line, out);
        }
    }
}

/// Kernel selection by expected problem size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelChoice {
    Batch,
    Streaming,
    Auto { max_batch_elements: usize },
}

impl Default for KernelChoice {
    fn default() -> Self {
        KernelChoice::Auto {
            max_batch_elements: DEFAULT_MAX_BATCH_ELEMENTS,
        }
    }
}

impl KernelChoice {
    pub fn kernel_for(&self, lines: usize, grid_points: usize) -> Box<dyn ProfileKernel> {
        match self {
            KernelChoice::Batch => Box::new(BatchKernel),
            KernelChoice::Streaming => Box::new(StreamingKernel::default()),
            KernelChoice::Auto { max_batch_elements } => {
                if lines.saturating_mul(grid_points) <= *max_batch_elements {
                    Box::new(BatchKernel)
                } else {
                    Box::new(StreamingKernel::default())
                }
            }
        }
    }
}

/// Refuses line intensities that would poison every grid point (NaN from `vfi = 0`,
/// infinities from overflow).
fn ensure_finite_intensities(intensities: &[f64]) -> Result<(), SpectroscopyError> {
    let mut non_finite = intensities
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.is_finite());
    if let Some((first, value)) = non_finite.next() {
        let count = 1 + non_finite.count();
        return Err(SpectroscopyError::Domain(format!(
            "{} line intensities are not finite (first at line {}: {})",
            count, first, value
        )));
    }
    Ok(())
}

fn accumulate_into(
    kernel: &dyn ProfileKernel,
    grid: &SpectralGrid,
    centers: &Quantity,
    intensities: &Quantity,
    half_widths: &HalfWidths,
    out: &mut [f64],
) -> Result<usize, SpectroscopyError> {
    let centers = centers.to_base(Dimension::Wavenumber, "centers")?;
    let intensities = intensities.to_base(Dimension::Length, "intensities")?;
    ensure_len("intensities", centers.len(), intensities.len())?;
    ensure_finite_intensities(&intensities)?;
    let widths = half_widths.resolve(centers.len())?;
    let lines = LineSet::new(&centers, &intensities, widths)?;

    kernel.accumulate(grid.as_slice(), &lines, out);
    trace!(
        kernel = kernel.name(),
        lines = lines.len(),
        grid_points = grid.len(),
        "Accumulated Doppler profile."
    );
    Ok(lines.len())
}

/// Doppler-broadened cross-section of a set of lines on `grid`, in cm².
///
/// `centers` and `half_widths` must be wavenumbers, `intensities` lengths (cm/molecule).
///
/// # Arguments
///
/// * `kernel` - Evaluation strategy; every kernel gives the same result.
/// * `grid` - Wavenumbers at which the profile is sampled.
/// * `centers` - Line positions.
/// * `intensities` - Line intensities, one per centre.
/// * `half_widths` - One width for all lines, or one per line.
///
/// # Return
///
/// One cross-section value per grid point, tagged cm².
///
/// # Errors
///
/// Reported before the kernel runs:
/// * [`SpectroscopyError::Units`] for missing or mismatched units.
/// * [`SpectroscopyError::LengthMismatch`] for unequal argument lengths.
/// * [`SpectroscopyError::Domain`] when any intensity is NaN or infinite.
/// * [`SpectroscopyError::NonPositiveHalfWidth`] for a zero, negative or non-finite width.
pub fn doppler_profile(
    kernel: &dyn ProfileKernel,
    grid: &SpectralGrid,
    centers: &Quantity,
    intensities: &Quantity,
    half_widths: &HalfWidths,
) -> Result<Quantity, SpectroscopyError> {
    let mut out = vec![0.0; grid.len()];
    accumulate_into(kernel, grid, centers, intensities, half_widths, &mut out)?;
    Ok(Quantity::new(out, Unit::SquareCentimeter))
}

/// Incrementally builds one cross-section from successive batches of lines.
pub struct ProfileAccumulator {
    grid: SpectralGrid,
    values: Vec<f64>,
    choice: KernelChoice,
    lines: usize,
}

impl ProfileAccumulator {
    pub fn new(grid: SpectralGrid, choice: KernelChoice) -> Self {
        let values = vec![0.0; grid.len()];
        Self {
            grid,
            values,
            choice,
            lines: 0,
        }
    }

    pub fn grid(&self) -> &SpectralGrid {
        &self.grid
    }

    /// Lines accumulated so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Adds a batch of lines. On error the buffer is left untouched.
    ///
    /// # Errors
    ///
    /// The same checks as [`doppler_profile`], applied to this batch; line indices in
    /// errors are relative to the batch.
    pub fn add_lines(
        &mut self,
        centers: &Quantity,
        intensities: &Quantity,
        half_widths: &HalfWidths,
    ) -> Result<(), SpectroscopyError> {
        let kernel = self.choice.kernel_for(centers.len(), self.grid.len());
        let added = accumulate_into(
            kernel.as_ref(),
            &self.grid,
            centers,
            intensities,
            half_widths,
            &mut self.values,
        )?;
        self.lines += added;
        Ok(())
    }

    pub fn finish(self) -> CrossSection {
        CrossSection::new(
            self.grid,
            Quantity::new(self.values, Unit::SquareCentimeter),
            self.lines,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::{Scalar, UnitsError};

    fn wn(values: Vec<f64>) -> Quantity {
        Quantity::new(values, Unit::PerCentimeter)
    }

    fn cm(values: Vec<f64>) -> Quantity {
        Quantity::new(values, Unit::Centimeter)
    }

    fn grid(start: f64, stop: f64, points: usize) -> SpectralGrid {
        SpectralGrid::linspace(
            &Scalar::new(start, Unit::PerCentimeter),
            &Scalar::new(stop, Unit::PerCentimeter),
            points,
        )
        .unwrap()
    }

    /// Deterministic pseudo-random values in `[lo, hi)`.
    fn sequence(seed: u64, count: usize, lo: f64, hi: f64) -> Vec<f64> {
        let mut state = seed;
        (0..count)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
                lo + unit * (hi - lo)
            })
            .collect()
    }

    fn assert_close(a: &[f64], b: &[f64], rel: f64) {
        assert_eq!(a.len(), b.len());
        let scale = a.iter().fold(0.0f64, |m, v| m.max(v.abs())).max(1e-300);
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() <= rel * scale, "{} vs {}", x, y);
        }
    }

    #[test]
    fn single_line_peak_matches_normalised_gaussian_height() {
        let g = grid(990.0, 1010.0, 2001);
        let (intensity, width) = (2.0e-20, 0.5);
        let profile = doppler_profile(
            &BatchKernel,
            &g,
            &wn(vec![1000.0]),
            &cm(vec![intensity]),
            &HalfWidths::Shared(Scalar::new(width, Unit::PerCentimeter)),
        )
        .unwrap();

        let expected_peak = intensity / width * (LN_2 / PI).sqrt();
        let peak = profile.values()[1000];
        assert!((peak - expected_peak).abs() <= expected_peak * 1e-9);
        assert_eq!(profile.unit(), Some(Unit::SquareCentimeter));
        assert_eq!(profile.len(), g.len());
    }

    #[test]
    fn single_line_integrates_to_its_intensity() {
        let g = grid(980.0, 1020.0, 4001);
        let intensity = 3.0e-21;
        let profile = doppler_profile(
            &StreamingKernel::default(),
            &g,
            &wn(vec![1000.0]),
            &cm(vec![intensity]),
            &HalfWidths::Shared(Scalar::new(0.8, Unit::PerCentimeter)),
        )
        .unwrap();

        let x = g.as_slice();
        let y = profile.values();
        let integral: f64 = x
            .windows(2)
            .zip(y.windows(2))
            .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
            .sum();
        assert!((integral - intensity).abs() <= intensity * 1e-6);
    }

    #[test]
    fn batch_and_streaming_kernels_agree() {
        let g = grid(500.0, 600.0, 1001);
        let m = 750;
        let centers = wn(sequence(1, m, 495.0, 605.0));
        let intensities = cm(sequence(2, m, 1e-24, 1e-19));
        let widths = HalfWidths::PerLine(wn(sequence(3, m, 0.01, 2.0)));

        let batch = doppler_profile(&BatchKernel, &g, &centers, &intensities, &widths).unwrap();
        let streaming = doppler_profile(
            &StreamingKernel::new(16),
            &g,
            &centers,
            &intensities,
            &widths,
        )
        .unwrap();

        assert_close(batch.values(), streaming.values(), 1e-9);
    }

    #[test]
    fn shared_width_equals_identical_per_line_widths() {
        let g = grid(0.0, 10.0, 101);
        let centers = wn(vec![2.0, 5.0, 7.5]);
        let intensities = cm(vec![1.0, 2.0, 0.5]);

        let shared = doppler_profile(
            &BatchKernel,
            &g,
            &centers,
            &intensities,
            &HalfWidths::Shared(Scalar::new(0.3, Unit::PerCentimeter)),
        )
        .unwrap();
        let per_line = doppler_profile(
            &BatchKernel,
            &g,
            &centers,
            &intensities,
            &HalfWidths::PerLine(wn(vec![0.3, 0.3, 0.3])),
        )
        .unwrap();

        assert_close(shared.values(), per_line.values(), 1e-15);
    }

    #[test]
    fn no_lines_gives_an_all_zero_profile() {
        let g = grid(0.0, 1.0, 11);
        for kernel in [&BatchKernel as &dyn ProfileKernel, &StreamingKernel::default()] {
            let profile = doppler_profile(
                kernel,
                &g,
                &wn(vec![]),
                &cm(vec![]),
                &HalfWidths::Shared(Scalar::new(0.1, Unit::PerCentimeter)),
            )
            .unwrap();
            assert_eq!(profile.values(), vec![0.0; 11].as_slice());
        }
    }

    #[test]
    fn untagged_intensities_are_rejected() {
        let result = doppler_profile(
            &BatchKernel,
            &grid(0.0, 1.0, 3),
            &wn(vec![0.5]),
            &Quantity::raw(vec![1.0]),
            &HalfWidths::Shared(Scalar::new(0.1, Unit::PerCentimeter)),
        );
        assert!(matches!(
            result,
            Err(SpectroscopyError::Units(UnitsError::Missing {
                argument: "intensities",
                ..
            }))
        ));
    }

    #[test]
    fn intensities_in_area_units_are_rejected() {
        let result = doppler_profile(
            &BatchKernel,
            &grid(0.0, 1.0, 3),
            &wn(vec![0.5]),
            &Quantity::new(vec![1.0], Unit::SquareCentimeter),
            &HalfWidths::Shared(Scalar::new(0.1, Unit::PerCentimeter)),
        );
        assert!(matches!(
            result,
            Err(SpectroscopyError::Units(UnitsError::Mismatch { .. }))
        ));
    }

    #[test]
    fn mismatched_line_arrays_are_rejected() {
        let result = doppler_profile(
            &StreamingKernel::default(),
            &grid(0.0, 1.0, 3),
            &wn(vec![0.5, 0.6]),
            &cm(vec![1.0]),
            &HalfWidths::Shared(Scalar::new(0.1, Unit::PerCentimeter)),
        );
        assert!(matches!(
            result,
            Err(SpectroscopyError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn accumulating_in_chunks_matches_a_single_pass() {
        let g = grid(100.0, 110.0, 201);
        let centers = sequence(7, 40, 99.0, 111.0);
        let intensities = sequence(8, 40, 0.1, 1.0);
        let widths = HalfWidths::Shared(Scalar::new(0.2, Unit::PerCentimeter));

        let one_shot = doppler_profile(
            &BatchKernel,
            &g,
            &wn(centers.clone()),
            &cm(intensities.clone()),
            &widths,
        )
        .unwrap();

        let mut accumulator = ProfileAccumulator::new(g.clone(), KernelChoice::Streaming);
        for (c, i) in centers.chunks(15).zip(intensities.chunks(15)) {
            accumulator
                .add_lines(&wn(c.to_vec()), &cm(i.to_vec()), &widths)
                .unwrap();
        }
        assert_eq!(accumulator.lines(), 40);

        let cross_section = accumulator.finish();
        assert_close(cross_section.values().values(), one_shot.values(), 1e-12);
    }

    #[test]
    fn failed_batch_leaves_accumulator_unchanged() {
        let mut accumulator = ProfileAccumulator::new(grid(0.0, 1.0, 5), KernelChoice::Batch);
        let result = accumulator.add_lines(
            &wn(vec![0.5]),
            &cm(vec![1.0]),
            &HalfWidths::Shared(Scalar::new(-1.0, Unit::PerCentimeter)),
        );
        assert!(matches!(
            result,
            Err(SpectroscopyError::NonPositiveHalfWidth { .. })
        ));
        assert_eq!(accumulator.lines(), 0);
        assert!(accumulator.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn non_finite_intensity_is_rejected_with_count_and_first_index() {
        let mut accumulator = ProfileAccumulator::new(grid(0.0, 10.0, 11), KernelChoice::Batch);
        let result = accumulator.add_lines(
            &wn(vec![2.0, 0.0, 5.0, 0.0]),
            &cm(vec![1.0, f64::NAN, 1.0, f64::INFINITY]),
            &HalfWidths::Shared(Scalar::new(0.5, Unit::PerCentimeter)),
        );
        match result {
            Err(SpectroscopyError::Domain(message)) => {
                assert!(message.starts_with("2 line intensities"), "{}", message);
                assert!(message.contains("first at line 1"), "{}", message);
            }
            other => panic!("expected a domain error, got {:?}", other),
        }
        assert_eq!(accumulator.lines(), 0);
        assert!(accumulator.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn sequential_line_walk_matches_batch_kernel() {
        let g = grid(200.0, 260.0, 601);
        let m = 120;
        let centers = sequence(11, m, 195.0, 265.0);
        let intensities = sequence(12, m, 1e-23, 1e-20);
        let widths = sequence(13, m, 0.05, 1.5);
        let lines = LineSet::new(&centers, &intensities, Widths::PerLine(widths.into())).unwrap();

        let mut sequential = vec![0.0; g.len()];
        for line in 0..lines.len() {
            StreamingKernel::add_line(g.as_slice(), &lines, line, &mut sequential);
        }
        let mut batch = vec![0.0; g.len()];
        BatchKernel.accumulate(g.as_slice(), &lines, &mut batch);

        assert_close(&batch, &sequential, 1e-9);
    }

    #[test]
    fn auto_choice_switches_to_streaming_above_threshold() {
        let choice = KernelChoice::Auto {
            max_batch_elements: 1000,
        };
        assert_eq!(choice.kernel_for(10, 100).name(), "batch");
        assert_eq!(choice.kernel_for(11, 100).name(), "streaming");
        assert_eq!(KernelChoice::Batch.kernel_for(1 << 20, 1 << 20).name(), "batch");
    }
}

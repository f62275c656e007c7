//! Median filter over one burst of gas samples
//!
//! Switching noise on the ADC shows up as single-sample spikes. The median of
//! a short burst discards them where a mean would smear them in. The window is
//! copied into a fixed stack array and fully sorted; at this size the
//! quadratic sort costs less than the branching of anything cleverer.

use heapless::Vec;

use crate::constants::buffers::MAX_MEDIAN_SAMPLES;

/// Stack-allocated window of gas samples.
pub type SampleWindow = Vec<f32, MAX_MEDIAN_SAMPLES>;

/// Median of `samples`.
///
/// Returns the element at index `len / 2` of the sorted window, so the result
/// is always one of the inputs (the upper median for even lengths). `None` for
/// an empty slice or one longer than [`MAX_MEDIAN_SAMPLES`].
pub fn median_filter(samples: &[f32]) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }

    let mut sorted = SampleWindow::from_slice(samples).ok()?;
    sort_window(&mut sorted);
    sorted.get(sorted.len() / 2).copied()
}

/// In-place exchange sort.
fn sort_window(window: &mut [f32]) {
    let len = window.len();
    for i in 0..len {
        for j in (i + 1)..len {
            if window[i] > window[j] {
                window.swap(i, j);
            }
        }
    }
}

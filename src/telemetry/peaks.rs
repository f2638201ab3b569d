/// Minimum speed difference (km/h) between a peak and its surrounding valleys
/// for the peak to be worth a label on the race line.
pub const SPEED_PROMINENCE_KPH: f64 = 10.;

/// Indices of the local maxima of `values` whose prominence is at least `min_prominence`.
///
/// A flat top counts as one maximum located at its middle sample. The first and
/// last samples are never maxima since only one of their neighbours is known.
pub fn find_peaks(values: &[f64], min_prominence: f64) -> Vec<usize> {
    local_maxima(values)
        .into_iter()
        .filter(|peak| prominence(values, *peak) >= min_prominence)
        .collect()
}

/// Indices of the local minima of `values`, see [`find_peaks`].
pub fn find_valleys(values: &[f64], min_prominence: f64) -> Vec<usize> {
    let inverted: Vec<f64> = values.iter().map(|v| -v).collect();
    find_peaks(&inverted, min_prominence)
}

fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    maxima
}

/// Height of the peak above the higher of the two lowest points reachable
/// on either side before climbing above the peak.
fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_min = height;
    for value in values[..=peak].iter().rev() {
        if *value > height {
            break;
        }
        left_min = left_min.min(*value);
    }

    let mut right_min = height;
    for value in values[peak..].iter() {
        if *value > height {
            break;
        }
        right_min = right_min.min(*value);
    }

    height - left_min.max(right_min)
}

use serde::{Deserialize, Serialize};

// two sided 95% normal quantile
const Z_95:f64 = 1.959963984540054;

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Summary {
    pub count:usize,
    pub mean:f64,
    // sample standard deviation, 0.0 for a single value
    pub std_dev:f64,
    pub min:f64,
    pub max:f64,
    pub median:f64,
    // half width of the 95% confidence interval of the mean
    pub ci_95:f64
}

// None for empty input or any non finite value
pub fn summarize(data:&[f64]) -> Option<Summary> {
    if data.is_empty() || data.iter().any(|x| !x.is_finite()) {
        return None;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>()/n;

    let std_dev = if data.len() > 1 {
        let ss:f64 = data.iter().map(|x| (x - mean).powi(2)).sum();
        (ss/(n - 1.0)).sqrt()
    } else {0.0};

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some(Summary {
        count:data.len(),
        mean,
        std_dev,
        min:sorted[0],
        max:sorted[sorted.len() - 1],
        median:quantile_sorted(&sorted, 0.5)?,
        ci_95:Z_95*std_dev/n.sqrt()
    })
}

// linear interpolation between closest ranks, `sorted` must be ascending
pub fn quantile_sorted(sorted:&[f64],q:f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = q*(sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower])*fraction)
}

// share of `values` at or below `threshold`, over a population of `population`
pub fn fraction_at_most(values:&[f64],threshold:f64,population:usize) -> f64 {
    if population == 0 {
        return 0.0;
    }
    let hits = values.iter().filter(|v| **v <= threshold).count();
    hits as f64/population as f64
}

use rand::Rng;
use tracing::warn;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::train::fit_parameters::{DataPair, Dataset};

/// Generates `x -> f(x)` regression data for a scalar function.
///
/// Training samples come from `[low, high)`. Test and validation samples come
/// from the range widened by `extension · (high - low)` on both sides, which
/// checks how the network extrapolates. Extended samples where `f` is not
/// finite are redrawn from the base range.
pub struct FunctionSampler<F> {
    function: F,
    low: f64,
    high: f64,
    extension: f64,
}

impl<F> FunctionSampler<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(function: F, low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::InvalidConfig(format!(
                "sample range [{low}, {high}) is empty or not finite"
            )));
        }
        let sampler = FunctionSampler {
            function,
            low,
            high,
            extension: 0.0,
        };
        sampler.check_width(false)?;
        Ok(sampler)
    }

    pub fn with_extension(mut self, extension: f64) -> Result<Self> {
        if !(extension.is_finite() && extension >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "range extension must be a non-negative number, got {extension}"
            )));
        }
        self.extension = extension;
        self.check_width(true)?;
        Ok(self)
    }

    // Uniform sampling needs a finite width.
    fn check_width(&self, extended: bool) -> Result<()> {
        let (low, high) = self.range(extended);
        if (high - low).is_finite() {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "sample range [{low}, {high}) is too wide to sample from"
            )))
        }
    }

    fn range(&self, extended: bool) -> (f64, f64) {
        if extended {
            let margin = (self.high - self.low) * self.extension;
            (self.low - margin, self.high + margin)
        } else {
            (self.low, self.high)
        }
    }

    fn draw<R: Rng + ?Sized>(&self, extended: bool, rng: &mut R) -> Result<(f64, f64)> {
        let (low, high) = self.range(extended);
        let x = rng.gen_range(low..high);
        let y = (self.function)(x);
        if y.is_finite() {
            return Ok((x, y));
        }
        if !extended {
            return Err(Error::Domain(format!("f({x}) = {y} inside the base range")));
        }
        warn!("f({x}) = {y} outside the function's domain, resampling from the base range");
        self.draw(false, rng)
    }

    /// `count` samples as a `count x 1` input/output pair.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, extended: bool, rng: &mut R) -> Result<DataPair> {
        let mut xs = Vec::with_capacity(count);
        let mut ys = Vec::with_capacity(count);
        for _ in 0..count {
            let (x, y) = self.draw(extended, rng)?;
            xs.push(x);
            ys.push(y);
        }
        DataPair::new(Matrix::column(xs)?, Matrix::column(ys)?)
    }

    pub fn dataset<R: Rng + ?Sized>(
        &self,
        train: usize,
        test: usize,
        valid: usize,
        rng: &mut R,
    ) -> Result<Dataset> {
        Ok(Dataset::new(
            self.sample(train, false, rng)?,
            self.sample(test, true, rng)?,
            self.sample(valid, true, rng)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn training_data_stays_in_base_range() {
        let sampler = FunctionSampler::new(|x: f64| 3.0 * x, -1.0, 1.0)
            .unwrap()
            .with_extension(0.5)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let dataset = sampler.dataset(50, 20, 20, &mut rng).unwrap();

        let train = dataset.train.inputs.to_vec();
        assert!(train.iter().all(|x| (-1.0..1.0).contains(x)));
        let test = dataset.test.inputs.to_vec();
        assert!(test.iter().all(|x| (-2.0..2.0).contains(x)));
        assert!(test.iter().any(|x| x.abs() > 1.0));
        for (x, y) in train.iter().zip(dataset.train.outputs.to_vec()) {
            assert!((3.0 * x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn out_of_domain_extended_samples_fall_back() {
        let sampler = FunctionSampler::new(f64::sqrt, 0.0, 1.0)
            .unwrap()
            .with_extension(1.0)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let pair = sampler.sample(200, true, &mut rng).unwrap();
        assert!(pair.outputs.to_vec().iter().all(|y| y.is_finite()));
        assert!(pair.inputs.to_vec().iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn base_range_domain_errors_propagate() {
        let sampler = FunctionSampler::new(f64::ln, -2.0, -1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        assert!(matches!(
            sampler.sample(3, false, &mut rng),
            Err(Error::Domain(_))
        ));
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(FunctionSampler::new(|x: f64| x, 1.0, 1.0).is_err());
        assert!(FunctionSampler::new(|x: f64| x, 0.0, f64::INFINITY).is_err());
        assert!(FunctionSampler::new(|x: f64| x, 0.0, 1.0)
            .unwrap()
            .with_extension(-0.1)
            .is_err());
    }

    #[test]
    fn rejects_ranges_too_wide_to_sample() {
        assert!(matches!(
            FunctionSampler::new(|x: f64| x, -1e308, 1e308),
            Err(Error::InvalidConfig(_))
        ));

        let wide = FunctionSampler::new(|x: f64| x, 0.0, 1e308).unwrap();
        assert!(matches!(wide.with_extension(1.0), Err(Error::InvalidConfig(_))));

        let sampler = FunctionSampler::new(|x: f64| x, 0.0, 1e307)
            .unwrap()
            .with_extension(0.5)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sampler.sample(4, true, &mut rng).unwrap().rows(), 4);
    }
}

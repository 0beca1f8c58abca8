//! Medium

use crate::base::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::sampler::*;
use crate::spectrum::*;
use std::sync::Arc;

mod medium_interface;
mod phase_function;

// Re-exports
pub use medium_interface::*;
pub use phase_function::*;

/// Scattering coefficients at a point inside a medium.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MediumProperties {
    /// Absorption coefficient.
    pub sigma_a: Spectrum,

    /// Scattering coefficient.
    pub sigma_s: Spectrum,

    /// Null-collision coefficient; majorant minus extinction.
    pub sigma_n: Spectrum,
}

impl MediumProperties {
    /// Create a new `MediumProperties`.
    ///
    /// * `sigma_a` - Absorption coefficient.
    /// * `sigma_s` - Scattering coefficient.
    /// * `sigma_n` - Null-collision coefficient.
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, sigma_n: Spectrum) -> Self {
        Self {
            sigma_a,
            sigma_s,
            sigma_n,
        }
    }

    /// Returns the extinction coefficient.
    pub fn sigma_t(&self) -> Spectrum {
        self.sigma_a + self.sigma_s
    }
}

/// Outcome of a single free-flight step.
#[derive(Copy, Clone, Debug, Default)]
pub struct MediumSample {
    /// Ray parameter where the in-medium segment starts.
    pub t_start: Float,

    /// Ray parameter of the tentative collision, or of the segment end when
    /// `escaped` is set.
    pub t: Float,

    /// The flight left the medium segment without a tentative collision.
    pub escaped: bool,

    /// Collision point.
    pub p: Point3f,

    /// Coefficients at `p`; zero when escaped.
    pub props: MediumProperties,

    /// Majorant used for the step.
    pub majorant: Spectrum,
}

/// Returns `exp(-majorant * d)` treating zero channels as fully transparent.
///
/// * `majorant` - Extinction majorant.
/// * `d`        - Distance.
pub fn majorant_transmittance(majorant: &Spectrum, d: Float) -> Spectrum {
    let mut tr = Spectrum::ONE;
    for i in 0..SPECTRUM_SAMPLES {
        if majorant[i] > 0.0 {
            tr[i] = (-majorant[i] * d).exp();
        }
    }
    tr
}

/// Picks a spectral channel uniformly.
///
/// * `u` - Sample value in [0, 1).
#[inline]
pub fn sample_channel(u: Float) -> usize {
    min((u * SPECTRUM_SAMPLES as Float) as usize, SPECTRUM_SAMPLES - 1)
}

/// Participating medium. Ray parameters are distances because spawned rays
/// carry unit directions.
pub trait Medium {
    /// Returns the phase function.
    fn phase(&self) -> &PhaseFunction;

    /// Returns true if the coefficients do not vary in space.
    fn is_homogeneous(&self) -> bool;

    /// Returns the parametric range of `ray` inside the medium, clipped to
    /// `[ray.t_min, ray.t_max]`.
    ///
    /// * `ray` - The ray.
    fn intersect_bounds(&self, ray: &Ray) -> Option<(Float, Float)>;

    /// Returns an upper bound of the extinction along `ray`.
    ///
    /// * `ray` - The ray.
    fn majorant(&self, ray: &Ray) -> Spectrum;

    /// Returns the coefficients at a world space point.
    ///
    /// * `p` - The point.
    fn properties(&self, p: &Point3f) -> MediumProperties;

    /// Take one free-flight step along `ray` from `ray.t_min` using the
    /// majorant of the given channel.
    ///
    /// * `ray`     - The ray.
    /// * `u`       - Sample value in [0, 1).
    /// * `channel` - Spectral channel driving the distance sample.
    fn sample_interaction(&self, ray: &Ray, u: Float, channel: usize) -> MediumSample {
        let majorant = self.majorant(ray);
        let (t_start, t_end) = match self.intersect_bounds(ray) {
            Some((t0, t1)) if t0 < t1 => (t0, t1),
            _ => {
                return MediumSample {
                    t_start: ray.t_min,
                    t: ray.t_min,
                    escaped: true,
                    majorant,
                    ..Default::default()
                }
            }
        };

        let escaped = MediumSample {
            t_start,
            t: t_end,
            escaped: true,
            majorant,
            ..Default::default()
        };
        if !(majorant[channel] > 0.0) {
            return escaped;
        }

        let t = t_start - (1.0 - u).ln() / majorant[channel];
        if t >= t_end {
            return escaped;
        }

        let p = ray.at(t);
        MediumSample {
            t_start,
            t,
            escaped: false,
            p,
            props: self.properties(&p),
            majorant,
        }
    }

    /// Sample a scattering point along `ray` with delta tracking. Returns the
    /// throughput weight and the interaction, or `None` if the ray leaves the
    /// medium.
    ///
    /// * `ray`     - The ray; `ray.medium` is this medium.
    /// * `sampler` - The sampler.
    fn sample(&self, ray: &Ray, sampler: &mut dyn Sampler) -> (Spectrum, Option<MediumInteraction>) {
        if self.majorant(ray).is_black() {
            return (Spectrum::ONE, None);
        }

        let mut weight = Spectrum::ONE;
        let mut r = ray.clone();
        loop {
            let channel = sample_channel(sampler.get_1d());
            let ms = self.sample_interaction(&r, sampler.get_1d(), channel);
            let tr = majorant_transmittance(&ms.majorant, ms.t - ms.t_start);

            if ms.escaped {
                let pdf = tr.avg();
                if pdf == 0.0 {
                    return (Spectrum::ZERO, None);
                }
                return (weight * tr / pdf, None);
            }

            let sigma_t = ms.props.sigma_t();
            let p_real = sigma_t[channel] / ms.majorant[channel];
            if sampler.get_1d() < p_real {
                let pdf = (tr * sigma_t).avg();
                if pdf == 0.0 {
                    return (Spectrum::ZERO, None);
                }
                weight *= tr * ms.props.sigma_s / pdf;
                let mi = MediumInteraction::new(ms.p, -ray.d, ray.time, ray.medium.clone(), *self.phase(), ms.props);
                return (weight, Some(mi));
            }

            // Null collision; continue from the tentative collision point.
            let pdf = (tr * ms.props.sigma_n).avg();
            if pdf == 0.0 {
                return (Spectrum::ZERO, None);
            }
            weight *= tr * ms.props.sigma_n / pdf;
            if weight.is_black() {
                return (Spectrum::ZERO, None);
            }
            r.t_min = ms.t;
        }
    }

    /// Estimate transmittance along `ray` with ratio tracking. Returns the
    /// unnormalized transmittance and the probability density of the
    /// tracking decisions; the estimate is their ratio.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn eval_tr_and_pdf(&self, ray: &Ray, sampler: &mut dyn Sampler) -> (Spectrum, Float) {
        let majorant = self.majorant(ray);
        if majorant.is_black() {
            return (Spectrum::ONE, 1.0);
        }

        if self.is_homogeneous() {
            return match self.intersect_bounds(ray) {
                Some((t0, t1)) if t0 < t1 => {
                    let sigma_t = self.properties(&ray.at(t0)).sigma_t();
                    (majorant_transmittance(&sigma_t, t1 - t0), 1.0)
                }
                _ => (Spectrum::ONE, 1.0),
            };
        }

        let mut tr = Spectrum::ONE;
        let mut pdf = 1.0;
        let mut r = ray.clone();
        loop {
            let channel = sample_channel(sampler.get_1d());
            let ms = self.sample_interaction(&r, sampler.get_1d(), channel);
            let t = majorant_transmittance(&ms.majorant, ms.t - ms.t_start);

            if ms.escaped {
                tr *= t;
                pdf *= t.avg();
                break;
            }

            tr *= t * ms.props.sigma_n;
            pdf *= (t * ms.majorant).avg();
            if tr.is_black() || pdf == 0.0 {
                break;
            }
            r.t_min = ms.t;
        }
        (tr, pdf)
    }

    /// Returns the beam transmittance along `ray`.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn tr(&self, ray: &Ray, sampler: &mut dyn Sampler) -> Spectrum {
        let (tr, pdf) = self.eval_tr_and_pdf(ray, sampler);
        if pdf > 0.0 {
            tr / pdf
        } else {
            Spectrum::ZERO
        }
    }

    /// Returns the name used in log output.
    fn get_type(&self) -> &'static str;
}

/// Atomic reference counted `Medium`.
pub type ArcMedium = Arc<dyn Medium + Send + Sync>;

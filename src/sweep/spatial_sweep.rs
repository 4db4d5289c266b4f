use log::{debug, trace};
use rand::distr::weighted::WeightedIndex;
use rand_distr::Poisson;

use crate::config::SimulationConfig;
use crate::context::Context;
use crate::define_rng;
use crate::error::EpiabmError;
use crate::population::{Cell, Person, PersonAddress, Population, Timestep};
use crate::progression::DiseaseProgression;
use crate::random::ContextRandomExt;
use crate::sweep::{apply_infections, Sweep};

define_rng!(SpatialSweepRng);

/// Transmission between cells.
///
/// Every infectious person makes a Poisson number of contact attempts per timestep. Each attempt
/// lands on a uniformly chosen resident of one of a few candidate cells, which the infector draws
/// from the other cells with probability proportional to `kernel(distance) * residents`.
pub struct SpatialSweep {
    spatial_r0: f64,
    spatial_infectiousness: f64,
    candidate_cells: usize,
    kernel_scale: f64,
    kernel_shape: f64,
    timesteps_per_day: f64,
    progression: DiseaseProgression,
    // `weights[source][target]`; the source cell itself always has weight zero.
    weights: Vec<Vec<f64>>,
}

impl SpatialSweep {
    pub fn new(config: &SimulationConfig) -> Self {
        let infection = &config.infection;
        SpatialSweep {
            spatial_r0: infection.spatial_r0,
            spatial_infectiousness: infection.spatial_infectiousness,
            candidate_cells: infection.spatial_candidate_cells,
            kernel_scale: infection.kernel_scale,
            kernel_shape: infection.kernel_shape,
            timesteps_per_day: f64::from(config.timesteps_per_day),
            progression: DiseaseProgression::new(config),
            weights: Vec::new(),
        }
    }

    /// Power-law decay with distance: one at distance zero, one half at `kernel_scale`.
    pub fn kernel(&self, distance: f64) -> f64 {
        1.0 / (1.0 + (distance / self.kernel_scale).powf(self.kernel_shape))
    }

    /// The weight of each cell as a spatial target of `source`.
    pub fn target_weights(&self, source: usize) -> &[f64] {
        &self.weights[source]
    }

    /// The expected number of spatial infection events caused by the cell in one timestep.
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_inf(&self, cell: &Cell) -> f64 {
        cell.number_infectious() as f64 * self.spatial_r0 / self.timesteps_per_day
    }

    pub fn space_inf(&self, infector: &Person, _source: &Cell, _timestep: Timestep) -> f64 {
        infector.params().infectiousness * self.spatial_infectiousness
    }

    pub fn space_susc(&self, infectee: &Person, _target: &Cell, _timestep: Timestep) -> f64 {
        infectee.params().susceptibility
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn collect_infections(
        &self,
        context: &Context,
        population: &Population,
        source: &Cell,
        timestep: Timestep,
        pending: &mut Vec<PersonAddress>,
    ) -> Result<(), EpiabmError> {
        let n_infectious = source.number_infectious();
        let weights = self.target_weights(source.index());
        if n_infectious == 0 || self.candidate_cells == 0 || weights.iter().sum::<f64>() <= 0.0 {
            return Ok(());
        }
        let per_infector = self.cell_inf(source) / n_infectious as f64;
        if per_infector <= 0.0 {
            return Ok(());
        }
        let events = Poisson::new(per_infector)
            .map_err(|e| EpiabmError::SimulationError(format!("invalid contact rate: {e}")))?;
        let targets = WeightedIndex::new(weights)
            .map_err(|e| EpiabmError::SimulationError(format!("invalid spatial weights: {e}")))?;

        for infector in source.people().iter().filter(|person| person.is_infectious()) {
            let n_events: f64 = context.sample_distr(SpatialSweepRng, &events);
            let n_events = n_events as usize;
            if n_events == 0 {
                continue;
            }
            let candidates: Vec<usize> = (0..self.candidate_cells)
                .map(|_| context.sample_distr(SpatialSweepRng, &targets))
                .collect();
            trace!(
                "infector {} in cell {} makes {n_events} contacts over cells {candidates:?}",
                infector.cell_pos(),
                source.index()
            );

            for _ in 0..n_events {
                let candidate = context.sample_range(SpatialSweepRng, 0..candidates.len());
                let target = population.cell(candidates[candidate]);
                let infectee =
                    target.person(context.sample_range(SpatialSweepRng, 0..target.people().len()));
                if !infectee.is_susceptible() {
                    continue;
                }
                let probability = self.space_inf(infector, source, timestep)
                    * self.space_susc(infectee, target, timestep);
                if context.sample_bool(SpatialSweepRng, probability.clamp(0.0, 1.0)) {
                    pending.push(PersonAddress::new(
                        target.index(),
                        infectee.microcell(),
                        infectee.cell_pos(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Sweep for SpatialSweep {
    fn name(&self) -> &'static str {
        "spatial"
    }

    #[allow(clippy::cast_precision_loss)]
    fn bind_population(&mut self, population: &Population) {
        let cells = population.cells();
        self.weights = cells
            .iter()
            .map(|source| {
                let (x, y) = source.location();
                cells
                    .iter()
                    .map(|target| {
                        if target.index() == source.index() {
                            return 0.0;
                        }
                        let (tx, ty) = target.location();
                        let distance = (tx - x).hypot(ty - y);
                        self.kernel(distance) * target.people().len() as f64
                    })
                    .collect()
            })
            .collect();
    }

    fn apply(
        &mut self,
        context: &Context,
        population: &mut Population,
        timestep: Timestep,
    ) -> Result<(), EpiabmError> {
        if self.weights.len() != population.cells().len() {
            return Err(EpiabmError::SimulationError(
                "spatial sweep is not bound to this population".to_string(),
            ));
        }

        let mut pending = Vec::new();
        for source in population.cells() {
            self.collect_infections(context, population, source, timestep, &mut pending)?;
        }
        let infected =
            apply_infections(context, population, &self.progression, &pending, timestep);
        debug!("spatial sweep at timestep {timestep}: {infected} new infections");
        Ok(())
    }
}

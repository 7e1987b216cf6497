//! wave — smallest example for the rust_ts time-stepping framework.
//!
//! Tracks a Gaussian pulse travelling across the unit interval with 16 time
//! steps on adaptively refined 1-D meshes.  Each sweep solves a (mock)
//! primal problem forward in time, then runs a refinement pass that flags
//! cells near the pulse, keeps neighboring step meshes within a cell-count
//! corridor of each other, and mirrors refine flags backward.  Meshes are
//! evicted outside the pass window, so at no point are more than three of
//! them alive.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use ts_core::{CellId, Direction, Signal, SweepId, WindowPolicy};
use ts_mesh::{IntervalMesh, RefinableMesh};
use ts_step::{
    CellCorridor, MeshSlot, RefineData, RefineOutcome, RefinementPolicy, StepResult, StepState,
    TimeStep, WakeFlags, load_relaxations_reader,
};
use ts_timeline::{PassStep, Timeline, TimelineError};

// ── Constants ─────────────────────────────────────────────────────────────────

const STEP_COUNT:  usize = 16;
const ROOT_CELLS:  usize = 16;
const MAX_LEVEL:   u32   = 3;
const SWEEPS:      u32   = 4;
const SEED:        u64   = 42;
const PULSE_WIDTH: f64   = 0.08;

const REFINE_THRESHOLD:  f64 = 0.5;
const COARSEN_THRESHOLD: f64 = 0.05;

// ── Relaxation CSV ────────────────────────────────────────────────────────────

// Corridor relaxations per (sweep, correction iteration): generous in the
// first sweep while meshes are far apart, tightening as sweeps converge.
const RELAXATION_CSV: &str = "\
sweep,iteration,relaxation\n\
0,0,0.5\n\
0,1,0.8\n\
1,0,0.25\n\
1,1,0.5\n\
2,0,0.1\n\
3,0,0.05\n\
";

// ── Awake-mesh gauge ──────────────────────────────────────────────────────────

#[derive(Default)]
struct MeshGauge {
    current: usize,
    peak: usize,
}

impl MeshGauge {
    fn built(&mut self) {
        self.current += 1;
        self.peak = self.peak.max(self.current);
    }

    fn destroyed(&mut self) {
        self.current -= 1;
    }
}

// ── The step type ─────────────────────────────────────────────────────────────

struct WaveStep {
    state: StepState,
    slot: MeshSlot<IntervalMesh>,
    gauge: Rc<RefCell<MeshGauge>>,
    solves: usize,
    last_outcome: Option<RefineOutcome>,
}

impl WaveStep {
    fn new(
        time: f64,
        coarse: &Arc<IntervalMesh>,
        flags: WakeFlags,
        gauge: &Rc<RefCell<MeshGauge>>,
    ) -> Self {
        Self {
            state: StepState::new(time),
            slot: MeshSlot::new(Arc::clone(coarse), flags),
            gauge: Rc::clone(gauge),
            solves: 0,
            last_outcome: None,
        }
    }
}

impl TimeStep for WaveStep {
    fn state(&self) -> &StepState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut StepState {
        &mut self.state
    }

    fn init_sweep(&mut self) {
        self.slot.begin_sweep(self.state.sweep());
    }

    fn wake_up(&mut self, signal: Signal) -> StepResult<()> {
        let was_awake = self.slot.is_awake();
        self.slot.wake_up(signal)?;
        if !was_awake && self.slot.is_awake() {
            self.gauge.borrow_mut().built();
        }
        Ok(())
    }

    fn sleep(&mut self, signal: Signal) -> StepResult<()> {
        let was_awake = self.slot.is_awake();
        self.slot.sleep(signal)?;
        if was_awake && !self.slot.is_awake() {
            self.gauge.borrow_mut().destroyed();
        }
        Ok(())
    }

    fn solve_primal(&mut self) -> StepResult<()> {
        // The first step holds initial data; every other one advances by its
        // backward timestep.
        if self.state.position() > 0 {
            let _dt = self.state.backward_timestep()?;
        }
        let _ = self.slot.mesh()?;
        self.solves += 1;
        Ok(())
    }
}

// ── Error criteria ────────────────────────────────────────────────────────────

/// Midpoint of a cell on the unit interval, read off its structural path.
fn cell_midpoint(mesh: &IntervalMesh, cell: CellId) -> StepResult<f64> {
    let path = mesh.path_of(cell)?;
    let mut x = path.root as f64;
    let mut width = 1.0;
    for &turn in &path.turns {
        width *= 0.5;
        x += turn as f64 * width;
    }
    Ok((x + width * 0.5) / ROOT_CELLS as f64)
}

/// Per-cell indicator: a Gaussian around the pulse position at time `t`,
/// plus a little noise so ties in the correction ordering are realistic.
fn pulse_criteria(mesh: &IntervalMesh, t: f64, rng: &mut SmallRng) -> StepResult<Vec<f64>> {
    let center = t;
    let mut criteria = Vec::new();
    for cell in mesh.active_cells() {
        let x = cell_midpoint(mesh, cell)?;
        let distance = (x - center) / PULSE_WIDTH;
        criteria.push((-distance * distance).exp() + rng.gen_range(0.0..0.02));
    }
    Ok(criteria)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== wave — rust_ts adaptive time stepping ===");
    println!("Steps: {STEP_COUNT}  |  Sweeps: {SWEEPS}  |  Root cells: {ROOT_CELLS}  |  Seed: {SEED}");
    println!();

    // 1. Shared coarse template and pass windows.
    let coarse = Arc::new(IntervalMesh::new(ROOT_CELLS)?);
    let window = WindowPolicy::new(1, 1);
    let flags = WakeFlags::checked(true, Signal(1), Signal(1), window)?;

    // 2. Refinement policy, relaxation table from the embedded CSV.
    let relaxations = load_relaxations_reader(RELAXATION_CSV.as_bytes())?;
    let policy = RefinementPolicy {
        max_level: MAX_LEVEL,
        first_sweep_with_correction: SweepId(1),
        min_cells_for_correction: 8,
        corridor: CellCorridor::new(1.3, 0.7)?,
        relaxations,
        correction_steps: 5,
        mirror_flags_to_previous: true,
        adapt_meshes: true,
    };
    let data = RefineData {
        refine_threshold: REFINE_THRESHOLD,
        coarsen_threshold: COARSEN_THRESHOLD,
    };

    // 3. Build the timeline: equidistant steps over [0, 1].
    let gauge = Rc::new(RefCell::new(MeshGauge::default()));
    let mut timeline = Timeline::new(window, WindowPolicy::NONE, WindowPolicy::NONE);
    for i in 0..STEP_COUNT {
        let time = i as f64 / (STEP_COUNT - 1) as f64;
        timeline.push(WaveStep::new(time, &coarse, flags, &gauge));
    }
    println!("Timeline: {} steps, window look-ahead 1 / look-back 1", timeline.len());
    println!();

    // 4. Sweep loop: primal pass, then refinement pass.  The refinement pass
    //    alternates direction between sweeps so neither end of the timeline
    //    consistently sees its neighbors' flags last.
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut refine_direction = Direction::Backward;
    let t0 = Instant::now();
    for sweep_index in 0..SWEEPS {
        let sweep = SweepId::ZERO.offset(sweep_index);
        timeline.start_sweep(sweep);
        timeline.solve_primal()?;

        timeline.run_refinement(
            |ctx: PassStep<'_, WaveStep>| {
                let criteria = {
                    let mesh = ctx.current.slot.mesh().map_err(TimelineError::from)?;
                    pulse_criteria(mesh, ctx.current.state.time(), &mut rng)
                        .map_err(TimelineError::from)?
                };
                let previous = ctx.previous.map(|p| &mut p.slot);
                let outcome = ctx
                    .current
                    .slot
                    .refine_mesh(data, &criteria, &policy, previous)
                    .map_err(TimelineError::from)?;
                ctx.current.last_outcome = Some(outcome);
                Ok(())
            },
            window,
            refine_direction,
        )?;
        refine_direction = refine_direction.reversed();
        timeline.end_sweep();

        let (mut refined, mut coarsened, mut predicted) = (0, 0, 0);
        for step in timeline.steps() {
            if let Some(outcome) = step.last_outcome {
                refined += outcome.refined;
                coarsened += outcome.coarsened;
                predicted += outcome.predicted;
            }
        }
        println!(
            "sweep {sweep_index}: flagged {refined} refine / {coarsened} coarsen, predicted {predicted} cells total"
        );
    }
    let elapsed = t0.elapsed();
    println!();

    // 5. Summary.
    println!("Completed {SWEEPS} sweeps in {:.3} s", elapsed.as_secs_f64());
    println!(
        "Peak awake meshes: {} (window bound {})",
        gauge.borrow().peak,
        window.max_awake()
    );
    println!();

    // 6. Final per-step table: all meshes are evicted again, but counts and
    //    decision logs survive.
    println!("{:<6} {:<8} {:<8} {:<10} {:<7}", "Step", "Time", "Cells", "Decisions", "Solves");
    println!("{}", "-".repeat(42));
    for step in timeline.steps() {
        println!(
            "{:<6} {:<8.3} {:<8} {:<10} {:<7}",
            step.state.position(),
            step.state.time(),
            step.slot
                .active_cell_count()
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
            step.slot.log().len(),
            step.solves,
        );
    }

    Ok(())
}

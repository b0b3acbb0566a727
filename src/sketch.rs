//! Sketch: one owned context per visualization run.
//!
//! A sketch bundles everything a run needs: one or two sequencer lanes,
//! the tone mapper, the finale animations, and the drawing setup. The host
//! calls [`Sketch::frame`] once per display refresh and gets back the draw
//! commands and tones for that frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{SketchConfig, SketchKind};
use crate::dsp::synth::Synth;
use crate::error::VizError;
use crate::event::{Outcome, StepEvent};
use crate::grid::CellPos;
use crate::render::{self, Canvas, DrawCommand, Palette, PathReveal, Region, Scene};
use crate::sequence::{self, Bar};
use crate::sequencer::{MAX_SPEED, MIN_SPEED, SequencerState, StepSequencer};
use crate::stepper::astar::{AStarStepper, NavGrid};
use crate::stepper::bubble::BubbleSortStepper;
use crate::stepper::maze::{Maze, MazeGenStepper};
use crate::stepper::quick::QuickSortStepper;
use crate::stepper::{AlgorithmStepper, Stepper};
use crate::tone::{EnvelopeParams, Tone, ToneMapper, ToneSink};

/// Time between notes of the sorted sweep.
const SWEEP_MS: f64 = 100.0;
/// A* expansion base pitches: C4 over random boards, E4 over mazes.
const BOARD_SEARCH_HZ: f64 = 261.63;
const MAZE_SEARCH_HZ: f64 = 329.63;

/// Slider and checkbox values read at the start of a frame. Unset fields
/// leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    pub speed: Option<u8>,
    pub envelope: Option<EnvelopeParams>,
    pub diagonal: Option<bool>,
}

/// Output of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    pub tones: Vec<Tone>,
    /// State of the first lane.
    pub state: SequencerState,
    pub complete: bool,
}

/// Left-to-right replay of a sorted sequence, one bar per beat.
#[derive(Debug, Clone, Default, PartialEq)]
struct Sweep {
    position: usize,
    elapsed_ms: f64,
    laps: usize,
}

impl Sweep {
    fn advance(&mut self, dt_ms: f64, bars: &[Bar], mapper: &ToneMapper, sink: &mut dyn ToneSink) {
        if bars.is_empty() {
            self.laps = self.laps.max(1);
            return;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms < SWEEP_MS {
            return;
        }
        self.elapsed_ms = (self.elapsed_ms - SWEEP_MS).min(SWEEP_MS);
        mapper.play_bar(bars, self.position, sink);
        self.position += 1;
        if self.position >= bars.len() {
            self.position = 0;
            self.laps += 1;
        }
    }
}

#[derive(Debug, Clone)]
struct Lane {
    sequencer: StepSequencer<Stepper>,
    region: Region,
    sweep: Option<Sweep>,
}

impl Lane {
    fn new(stepper: Stepper, config: &SketchConfig, region: Region) -> Self {
        let mut sequencer = StepSequencer::new(config.speed_curve);
        sequencer.configure(config.speed);
        sequencer.load(stepper);
        Lane {
            sequencer,
            region,
            sweep: None,
        }
    }

    fn stepper(&self) -> Option<&Stepper> {
        self.sequencer.stepper()
    }

    fn is_finished(&self) -> bool {
        self.sequencer.state() == SequencerState::Finished
    }
}

fn sort_bars(stepper: &Stepper) -> Option<&[Bar]> {
    match stepper {
        Stepper::BubbleSort(s) => Some(s.bars()),
        Stepper::QuickSort(s) => Some(s.bars()),
        _ => None,
    }
}

fn operations(stepper: &Stepper) -> usize {
    match stepper {
        Stepper::BubbleSort(s) => s.comparisons() + s.swaps(),
        Stepper::QuickSort(s) => s.comparisons() + s.swaps(),
        Stepper::MazeGen(s) => s.carved(),
        Stepper::AStar(s) => s.steps(),
    }
}

/// Things a lane's event asks the sketch to do once the lane loop is over.
#[derive(Debug, Clone)]
enum Followup {
    Carved { maze: Maze, nav: NavGrid },
    Reveal(Vec<CellPos>),
}

#[derive(Debug, Clone)]
pub struct Sketch {
    config: SketchConfig,
    seed: u64,
    lanes: Vec<Lane>,
    mapper: ToneMapper,
    palette: Palette,
    debug: bool,
    paused: bool,
    /// Carved maze kept for drawing under the search.
    maze: Option<Maze>,
    /// Passage graph of the carved maze, for (re)solving.
    maze_nav: Option<NavGrid>,
    reveal: Option<PathReveal>,
    frames: u64,
}

impl Sketch {
    pub fn new(config: SketchConfig) -> Result<Self, VizError> {
        config.validate()?;
        let mut mapper = ToneMapper::new(config.envelope, config.volume);
        mapper.set_enabled(config.audio_enabled);
        let mut sketch = Sketch {
            seed: config.seed,
            debug: config.debug,
            config,
            lanes: Vec::new(),
            mapper,
            palette: Palette::default(),
            paused: false,
            maze: None,
            maze_nav: None,
            reveal: None,
            frames: 0,
        };
        sketch.build_lanes();
        Ok(sketch)
    }

    pub fn from_json(json: &str) -> Result<Self, VizError> {
        Self::new(SketchConfig::from_json(json)?)
    }

    fn viewport(&self) -> Region {
        let v = self.config.viewport;
        Region::new(0.0, 0.0, v.width, v.height)
    }

    /// HUD band and the area the lanes share.
    fn layout(&self) -> (Region, Region) {
        let viewport = self.viewport();
        viewport.split_top(viewport.height * 0.1)
    }

    fn build_lanes(&mut self) {
        let config = &self.config;
        let seed = self.seed;
        let (_, body) = self.layout();
        let body = body.inset(10.0);

        self.lanes = match config.kind {
            SketchKind::BubbleSort => {
                let bars = sequence::shuffled_bars(config.bar_count, seed);
                vec![Lane::new(Stepper::BubbleSort(BubbleSortStepper::new(bars)), config, body)]
            }
            SketchKind::QuickSort => {
                let bars = sequence::shuffled_bars(config.bar_count, seed);
                vec![Lane::new(Stepper::QuickSort(QuickSortStepper::new(bars)), config, body)]
            }
            SketchKind::Comparison => {
                let bars = sequence::shuffled_bars(config.bar_count, seed);
                let (left, right) = body.split_columns();
                vec![
                    Lane::new(Stepper::QuickSort(QuickSortStepper::new(bars.clone())), config, left.inset(5.0)),
                    Lane::new(Stepper::BubbleSort(BubbleSortStepper::new(bars)), config, right.inset(5.0)),
                ]
            }
            SketchKind::Maze => {
                let carver = MazeGenStepper::new(config.cols, config.rows, seed);
                vec![Lane::new(Stepper::MazeGen(carver), config, body)]
            }
            SketchKind::Pathfinding => {
                let search = AStarStepper::random(
                    config.cols,
                    config.rows,
                    config.wall_density,
                    config.allow_diagonals,
                    seed,
                );
                vec![Lane::new(Stepper::AStar(search), config, body)]
            }
        };
        let base = match config.kind {
            SketchKind::Maze => MAZE_SEARCH_HZ,
            _ => BOARD_SEARCH_HZ,
        };
        self.mapper.set_search_base(base);
        self.maze = None;
        self.maze_nav = None;
        self.reveal = None;
        self.paused = false;
        info!(kind = ?config.kind, seed, lanes = self.lanes.len(), "sketch ready");
    }

    // ── Controls ────────────────────────────────────────────

    /// Start (or continue) every lane.
    pub fn start(&mut self) {
        self.paused = false;
        for lane in &mut self.lanes {
            lane.sequencer.resume();
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
        for lane in &mut self.lanes {
            lane.sequencer.pause();
        }
    }

    pub fn resume(&mut self) {
        self.start();
    }

    /// Pause a running (or finale-playing) sketch; otherwise start it.
    pub fn toggle_pause(&mut self) {
        let active = self.lanes.iter().any(|l| {
            matches!(
                l.sequencer.state(),
                SequencerState::Running | SequencerState::Finished
            )
        });
        if active && !self.paused {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Throw away the run and rebuild it from `seed`; waits for `start`.
    pub fn reset(&mut self, seed: u64) {
        debug!(seed, "sketch reset");
        self.seed = seed;
        self.build_lanes();
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
    }

    pub fn set_speed(&mut self, speed: u8) {
        let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.config.speed = speed;
        for lane in &mut self.lanes {
            lane.sequencer.configure(speed);
        }
    }

    pub fn set_envelope(&mut self, envelope: EnvelopeParams) {
        self.mapper.set_envelope(envelope);
    }

    /// Switch diagonal movement on a random board. The board and search
    /// restart; other sketch kinds ignore it.
    pub fn set_diagonal(&mut self, diagonal: bool) {
        if self.config.allow_diagonals == diagonal {
            return;
        }
        self.config.allow_diagonals = diagonal;
        if self.config.kind == SketchKind::Pathfinding {
            debug!(diagonal, "diagonal movement changed, restarting search");
            let was_running = self.is_running();
            self.build_lanes();
            if was_running {
                self.start();
            }
        }
    }

    /// Search the carved maze. No-op until carving finishes.
    pub fn solve(&mut self) {
        let Some(nav) = self.maze_nav.clone() else {
            return;
        };
        let Some(lane) = self.lanes.first_mut() else {
            return;
        };
        if matches!(lane.stepper(), Some(Stepper::AStar(_))) {
            return;
        }
        info!("solving carved maze");
        lane.sequencer.load(Stepper::AStar(AStarStepper::for_maze(nav)));
        lane.sequencer.resume();
        self.reveal = None;
        self.paused = false;
    }

    /// Run the search again over the same board or maze.
    pub fn resolve(&mut self) {
        let seed = self.seed;
        if !matches!(self.stepper(0), Some(Stepper::AStar(_))) {
            self.solve();
            return;
        }
        if let Some(lane) = self.lanes.first_mut() {
            // Random boards regenerate from the seed; maze boards are fixed.
            lane.sequencer.restart(seed);
            lane.sequencer.resume();
        }
        self.reveal = None;
        self.paused = false;
    }

    // ── Queries ─────────────────────────────────────────────

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn stepper(&self, lane: usize) -> Option<&Stepper> {
        self.lanes.get(lane).and_then(Lane::stepper)
    }

    pub fn state(&self) -> SequencerState {
        self.lanes
            .first()
            .map(|l| l.sequencer.state())
            .unwrap_or(SequencerState::Idle)
    }

    pub fn is_running(&self) -> bool {
        self.lanes
            .iter()
            .any(|l| l.sequencer.state() == SequencerState::Running)
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn maze(&self) -> Option<&Maze> {
        self.maze.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Every lane finished and its closing animation played through.
    pub fn is_complete(&self) -> bool {
        if self.lanes.is_empty() || !self.lanes.iter().all(Lane::is_finished) {
            return false;
        }
        let sweeps_done = self
            .lanes
            .iter()
            .all(|l| l.sweep.as_ref().is_none_or(|s| s.laps >= 1));
        let reveal_done = self.reveal.as_ref().is_none_or(PathReveal::is_finished);
        let waiting_to_solve = self.config.kind == SketchKind::Maze
            && matches!(self.stepper(0), Some(Stepper::MazeGen(_)))
            && self.config.auto_solve;
        sweeps_done && reveal_done && !waiting_to_solve
    }

    // ── Frame ───────────────────────────────────────────────

    pub fn frame(&mut self, dt_ms: f64, input: &FrameInput) -> Frame {
        if let Some(speed) = input.speed {
            self.set_speed(speed);
        }
        if let Some(envelope) = input.envelope {
            self.set_envelope(envelope);
        }
        if let Some(diagonal) = input.diagonal {
            self.set_diagonal(diagonal);
        }

        let mut tones: Vec<Tone> = Vec::new();
        let followups = self.advance(dt_ms, &mut tones);
        for followup in followups {
            self.apply(followup, &mut tones);
        }
        if !self.paused {
            if let Some(reveal) = self.reveal.as_mut() {
                reveal.advance(dt_ms, &self.mapper, &mut tones);
            }
        }

        let commands = self.draw();
        self.frames += 1;
        Frame {
            commands,
            tones,
            state: self.state(),
            complete: self.is_complete(),
        }
    }

    fn advance(&mut self, dt_ms: f64, sink: &mut dyn ToneSink) -> Vec<Followup> {
        let mut followups = Vec::new();
        let paused = self.paused;
        for lane in &mut self.lanes {
            if let Some(event) = lane.sequencer.tick(dt_ms) {
                let Some(stepper) = lane.sequencer.stepper() else {
                    continue;
                };
                self.mapper.on_event(&event, stepper, sink);
                match (&event, stepper) {
                    (StepEvent::Done { outcome: Outcome::Sorted }, _) => {
                        lane.sweep = Some(Sweep::default());
                    }
                    (StepEvent::Done { outcome: Outcome::Carved }, Stepper::MazeGen(carver)) => {
                        if let Some(nav) = carver.nav_grid() {
                            followups.push(Followup::Carved {
                                maze: carver.maze().clone(),
                                nav: nav.clone(),
                            });
                        }
                    }
                    (StepEvent::FoundGoal { .. }, Stepper::AStar(search)) => {
                        followups.push(Followup::Reveal(search.path().to_vec()));
                    }
                    _ => {}
                }
            } else if !paused && lane.is_finished() {
                if let (Some(sweep), Some(bars)) =
                    (lane.sweep.as_mut(), lane.sequencer.stepper().and_then(sort_bars))
                {
                    sweep.advance(dt_ms, bars, &self.mapper, sink);
                }
            }
        }
        followups
    }

    fn apply(&mut self, followup: Followup, sink: &mut dyn ToneSink) {
        match followup {
            Followup::Carved { maze, nav } => {
                self.maze = Some(maze);
                self.maze_nav = Some(nav);
                if self.config.auto_solve {
                    self.solve();
                }
            }
            Followup::Reveal(path) => {
                self.reveal = Some(PathReveal::new(path, self.config.reveal));
                // Boards play the closing run alongside the reveal.
                if self.config.kind == SketchKind::Pathfinding {
                    self.mapper.play_fanfare(sink);
                }
            }
        }
    }

    // ── Drawing ─────────────────────────────────────────────

    fn draw(&self) -> Vec<DrawCommand> {
        let (hud, _) = self.layout();
        let mut canvas = Canvas::new(self.viewport(), self.palette);
        canvas.set_debug(self.debug);
        canvas.clear();

        for lane in &self.lanes {
            canvas.set_region(lane.region);
            let last = lane.sequencer.last_event();
            match lane.stepper() {
                Some(Stepper::AStar(search)) => self.draw_search(&mut canvas, search),
                Some(stepper) => match (lane.sweep.as_ref(), sort_bars(stepper)) {
                    (Some(sweep), Some(bars)) => {
                        let palette = *canvas.palette();
                        // Highlight the bar that sounded last.
                        let lit = match sweep.position {
                            0 if sweep.laps > 0 => bars.len().checked_sub(1),
                            0 => None,
                            p => Some(p - 1),
                        };
                        render::draw_bars(&mut canvas, bars, |k| {
                            if lit == Some(k) {
                                palette.bar_active
                            } else {
                                palette.bar
                            }
                        });
                        render::draw_title(&mut canvas, stepper.name(), operations(stepper));
                    }
                    _ => stepper.draw(last, &mut canvas),
                },
                None => {}
            }
        }

        canvas.set_region(hud);
        canvas.text(hud.x + 10.0, hud.y + hud.height * 0.6, format!("Speed: {}%", self.config.speed), 16.0);
        if self.debug {
            canvas.set_region(self.viewport());
            let lines = self.debug_lines();
            render::draw_panel(&mut canvas, &lines, 14.0);
        }
        canvas.into_commands()
    }

    fn draw_search(&self, canvas: &mut Canvas, search: &AStarStepper) {
        match &self.maze {
            Some(maze) if self.config.kind == SketchKind::Maze => render::draw_maze(canvas, maze, None),
            _ => render::draw_obstacles(canvas, search.nav()),
        }
        match &self.reveal {
            Some(reveal) => {
                render::draw_search_sets(canvas, search);
                render::draw_path(canvas, search.nav(), reveal.visible(), true);
            }
            None => render::draw_search(canvas, search),
        }
    }

    /// Stats panel text.
    pub fn debug_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for lane in &self.lanes {
            let Some(stepper) = lane.stepper() else {
                continue;
            };
            lines.push(format!("{}: {:?}", stepper.name(), lane.sequencer.state()));
            lines.push(format!("Steps: {}", lane.sequencer.steps()));
            if let Stepper::AStar(search) = stepper {
                lines.push(format!("Open: {}  Closed: {}", search.open_len(), search.closed_len()));
                let status = match (search.outcome(), search.path_length()) {
                    (_, Some(len)) => format!("Path length: {len}"),
                    (Some(Outcome::NoSolution), _) => "No solution".to_string(),
                    _ => format!("Searching: {} nodes", search.current_path().len()),
                };
                lines.push(status);
            }
        }
        let env = self.mapper.envelope();
        lines.push(format!("Speed: {}", self.config.speed));
        lines.push(format!("Attack Time: {}", env.attack));
        lines.push(format!("Decay Time: {}", env.decay));
        lines.push(format!("Sustain Ratio: {}", env.sustain));
        lines.push(format!("Release Time: {}", env.release));
        lines
    }
}

// ── Headless soundtrack ─────────────────────────────────────

/// Run a sketch to completion at a fixed frame time, collecting every tone
/// on a synth clocked in step with the frames.
pub fn run_soundtrack(config: SketchConfig, sample_rate: f64, frame_ms: f64) -> Result<Synth, VizError> {
    let max_frames = config.max_frames;
    let mut sketch = Sketch::new(config)?;
    let mut synth = Synth::new(sample_rate);
    sketch.start();
    let input = FrameInput::default();
    while !sketch.is_complete() && (sketch.frames() as usize) < max_frames {
        let frame = sketch.frame(frame_ms, &input);
        for tone in frame.tones {
            synth.play_tone(tone);
        }
        synth.advance(frame_ms);
    }
    info!(
        frames = sketch.frames(),
        tones = synth.len(),
        complete = sketch.is_complete(),
        "soundtrack run finished"
    );
    Ok(synth)
}

//! RenderAdapter: platform-agnostic draw commands for each stepper.
//!
//! Scenes never touch pixels. They append [`DrawCommand`]s to a [`Canvas`]
//! inside a [`Region`], and the host replays them on whatever surface it
//! owns. Everything is redrawn from current state every frame.

use serde::{Deserialize, Serialize};

use crate::config::RevealConfig;
use crate::event::StepEvent;
use crate::grid::{CellPos, Direction};
use crate::sequence::{self, Bar};
use crate::stepper::astar::{AStarStepper, NavGrid, NodeState};
use crate::stepper::bubble::BubbleSortStepper;
use crate::stepper::maze::{Maze, MazeGenStepper};
use crate::stepper::quick::QuickSortStepper;
use crate::stepper::{AlgorithmStepper, Stepper};
use crate::tone::{ToneMapper, ToneSink};

// ── Primitives ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    /// Axis-aligned rectangle from its top-left corner.
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    /// Ellipse from its center.
    Ellipse {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        weight: f64,
    },
    /// Open polyline through `points`.
    Polyline {
        points: Vec<(f64, f64)>,
        color: Color,
        weight: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        color: Color,
    },
}

/// Rectangle of the viewport a scene draws into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Region { x, y, width, height }
    }

    /// Left and right halves.
    pub fn split_columns(self) -> (Region, Region) {
        let half = self.width / 2.0;
        (
            Region::new(self.x, self.y, half, self.height),
            Region::new(self.x + half, self.y, half, self.height),
        )
    }

    /// Shrink by `margin` on every side, never below zero size.
    pub fn inset(self, margin: f64) -> Region {
        Region::new(
            self.x + margin,
            self.y + margin,
            (self.width - 2.0 * margin).max(0.0),
            (self.height - 2.0 * margin).max(0.0),
        )
    }

    /// Remove a band of `height` from the top; returns (band, rest).
    pub fn split_top(self, height: f64) -> (Region, Region) {
        let band = height.min(self.height);
        (
            Region::new(self.x, self.y, self.width, band),
            Region::new(self.x, self.y + band, self.width, self.height - band),
        )
    }
}

/// Fallout Pip-Boy green for grids, white bars on black for the sorts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub bar: Color,
    pub bar_active: Color,
    pub scan: Color,
    pub store: Color,
    pub pivot: Color,
    pub wall: Color,
    pub visited: Color,
    pub current: Color,
    pub obstacle: Color,
    pub empty: Color,
    pub open: Color,
    pub closed: Color,
    pub start: Color,
    pub goal: Color,
    pub search_path: Color,
    pub final_path: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            background: Color::BLACK,
            text: Color::WHITE,
            bar: Color::WHITE,
            bar_active: Color::RED,
            scan: Color::RED,
            store: Color::GREEN,
            pivot: Color::BLUE,
            wall: Color::rgb(0, 238, 0),
            visited: Color::rgb(0, 47, 0),
            current: Color::rgb(188, 255, 174),
            obstacle: Color::rgb(0, 95, 0),
            empty: Color::rgb(20, 20, 20),
            open: Color::new(0, 238, 0, 160),
            closed: Color::new(0, 238, 0, 70),
            start: Color::rgb(188, 255, 174),
            goal: Color::rgb(0, 238, 0),
            search_path: Color::rgb(0, 200, 0),
            final_path: Color::rgb(0, 238, 0),
        }
    }
}

/// Command buffer plus the region and colors scenes draw with.
#[derive(Debug, Clone)]
pub struct Canvas {
    region: Region,
    palette: Palette,
    debug: bool,
    commands: Vec<DrawCommand>,
}

impl Canvas {
    pub fn new(region: Region, palette: Palette) -> Self {
        Canvas {
            region,
            palette,
            debug: false,
            commands: Vec::new(),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        let color = self.palette.background;
        self.push(DrawCommand::Clear { color });
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color) {
        self.push(DrawCommand::Rect {
            x,
            y,
            w,
            h,
            fill: Some(fill),
            stroke: None,
        });
    }

    pub fn ellipse(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color) {
        self.push(DrawCommand::Ellipse { x, y, w, h, fill });
    }

    pub fn line(&mut self, (x1, y1): (f64, f64), (x2, y2): (f64, f64), color: Color, weight: f64) {
        self.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            weight,
        });
    }

    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>, size: f64) {
        let color = self.palette.text;
        self.push(DrawCommand::Text {
            x,
            y,
            text: text.into(),
            size,
            color,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

/// Something that can draw its current state.
pub trait Scene {
    /// `last` is the most recent step event, if any, for highlighting.
    fn draw(&self, last: Option<&StepEvent>, canvas: &mut Canvas);
}

// ── Bars ────────────────────────────────────────────────────

/// Bars along the bottom of the region, tallest at 80 % of its height.
pub fn draw_bars(canvas: &mut Canvas, bars: &[Bar], color_of: impl Fn(usize) -> Color) {
    if bars.is_empty() {
        return;
    }
    let region = canvas.region();
    let max = sequence::max_value(bars).max(1) as f64;
    let slot = region.width / bars.len() as f64;
    let gap = if slot > 4.0 { 2.0 } else { 0.0 };
    let bottom = region.y + region.height;
    for (k, bar) in bars.iter().enumerate() {
        let h = bar.value as f64 / max * region.height * 0.8;
        let x = region.x + k as f64 * slot;
        canvas.fill_rect(x, bottom - h, slot - gap, h, color_of(k));
    }
}

/// Pair named by a compare or swap event.
fn event_pair(last: Option<&StepEvent>) -> Option<(usize, usize)> {
    match last {
        Some(StepEvent::Compare { i, j } | StepEvent::Swap { i, j }) => Some((*i, *j)),
        _ => None,
    }
}

/// Algorithm name with its running operation count.
pub fn draw_title(canvas: &mut Canvas, title: &str, operations: usize) {
    let region = canvas.region();
    let size = (region.width / 20.0).clamp(12.0, 48.0);
    canvas.text(region.x + 10.0, region.y + size, title, size);
    canvas.text(
        region.x + 10.0,
        region.y + size * 1.8,
        format!("Operations: {operations}"),
        size * 0.5,
    );
}

impl Scene for BubbleSortStepper {
    fn draw(&self, last: Option<&StepEvent>, canvas: &mut Canvas) {
        let palette = *canvas.palette();
        let active = if self.is_done() {
            None
        } else {
            event_pair(last).or_else(|| self.active_pair())
        };
        draw_bars(canvas, self.bars(), |k| match active {
            Some((i, j)) if k == i || k == j => palette.bar_active,
            _ => palette.bar,
        });
        draw_title(canvas, "Bubble Sort", self.comparisons() + self.swaps());
    }
}

impl Scene for QuickSortStepper {
    fn draw(&self, last: Option<&StepEvent>, canvas: &mut Canvas) {
        let palette = *canvas.palette();
        let debug = canvas.debug();
        let (scan, store, pivot) = match (self.is_done(), self.partition(), last) {
            (true, _, _) => (None, None, None),
            (false, Some(p), _) => (Some(p.scan), Some(p.store), Some(p.high)),
            (false, None, Some(StepEvent::Pivot { index })) => (None, None, Some(*index)),
            (false, None, last) => match event_pair(last) {
                Some((i, j)) => (Some(i), None, Some(j)),
                None => (None, None, None),
            },
        };
        draw_bars(canvas, self.bars(), |k| {
            let role = if Some(k) == pivot {
                Some(palette.pivot)
            } else if Some(k) == store {
                Some(palette.store)
            } else if Some(k) == scan {
                Some(palette.scan)
            } else {
                None
            };
            match role {
                Some(color) if debug => color,
                Some(_) => palette.bar_active,
                None => palette.bar,
            }
        });
        draw_title(canvas, "Quick Sort", self.comparisons() + self.swaps());
    }
}

// ── Grids ───────────────────────────────────────────────────

/// Square cell layout centered in a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLayout {
    pub origin_x: f64,
    pub origin_y: f64,
    pub size: f64,
}

impl CellLayout {
    pub fn fit(region: Region, cols: usize, rows: usize) -> Self {
        if cols == 0 || rows == 0 {
            return CellLayout {
                origin_x: region.x,
                origin_y: region.y,
                size: 0.0,
            };
        }
        let size = (region.width / cols as f64).min(region.height / rows as f64);
        CellLayout {
            origin_x: region.x + (region.width - size * cols as f64) / 2.0,
            origin_y: region.y + (region.height - size * rows as f64) / 2.0,
            size,
        }
    }

    pub fn corner(&self, pos: CellPos) -> (f64, f64) {
        (
            self.origin_x + pos.i as f64 * self.size,
            self.origin_y + pos.j as f64 * self.size,
        )
    }

    pub fn center(&self, pos: CellPos) -> (f64, f64) {
        let (x, y) = self.corner(pos);
        (x + self.size / 2.0, y + self.size / 2.0)
    }
}

pub fn draw_maze(canvas: &mut Canvas, maze: &Maze, current: Option<CellPos>) {
    let palette = *canvas.palette();
    let layout = CellLayout::fit(canvas.region(), maze.cols(), maze.rows());
    let s = layout.size;
    for (pos, cell) in maze.iter() {
        let (x, y) = layout.corner(pos);
        if cell.visited {
            canvas.fill_rect(x, y, s, s, palette.visited);
        }
        for dir in Direction::ALL {
            if !cell.has_wall(dir) {
                continue;
            }
            let (a, b) = match dir {
                Direction::North => ((x, y), (x + s, y)),
                Direction::East => ((x + s, y), (x + s, y + s)),
                Direction::South => ((x + s, y + s), (x, y + s)),
                Direction::West => ((x, y + s), (x, y)),
            };
            canvas.line(a, b, palette.wall, 1.0);
        }
    }
    if let Some(pos) = current {
        let (x, y) = layout.corner(pos);
        canvas.fill_rect(x, y, s, s, palette.current);
    }
}

impl Scene for MazeGenStepper {
    fn draw(&self, _last: Option<&StepEvent>, canvas: &mut Canvas) {
        draw_maze(canvas, self.maze(), self.current());
    }
}

/// Obstacle dots and empty-cell dots for a random board.
pub fn draw_obstacles(canvas: &mut Canvas, nav: &NavGrid) {
    let palette = *canvas.palette();
    let layout = CellLayout::fit(canvas.region(), nav.cols(), nav.rows());
    for (pos, cell) in nav.cells() {
        let (x, y) = layout.center(pos);
        if cell.blocked {
            canvas.ellipse(x, y, layout.size / 2.0, layout.size / 2.0, palette.obstacle);
        } else {
            canvas.ellipse(x, y, layout.size / 4.0, layout.size / 4.0, palette.empty);
        }
    }
}

/// Closed and open tints, then start and goal markers.
pub fn draw_search_sets(canvas: &mut Canvas, search: &AStarStepper) {
    let palette = *canvas.palette();
    let nav = search.nav();
    let layout = CellLayout::fit(canvas.region(), nav.cols(), nav.rows());
    let dot = layout.size / 4.0;
    for (pos, _) in nav.cells() {
        let color = match search.node_state(pos) {
            NodeState::Closed => palette.closed,
            NodeState::Open => palette.open,
            NodeState::Unseen => continue,
        };
        let (x, y) = layout.center(pos);
        canvas.ellipse(x, y, dot, dot, color);
    }
    for (pos, color) in [(search.start(), palette.start), (search.goal(), palette.goal)] {
        let Some(pos) = pos else {
            continue;
        };
        let (x, y) = layout.center(pos);
        canvas.ellipse(x, y, dot * 1.5, dot * 1.5, color);
    }
}

/// Path through cell centers: thin while searching, thick when final.
pub fn draw_path(canvas: &mut Canvas, nav: &NavGrid, path: &[CellPos], is_final: bool) {
    if path.len() < 2 {
        return;
    }
    let palette = *canvas.palette();
    let layout = CellLayout::fit(canvas.region(), nav.cols(), nav.rows());
    let (color, weight) = if is_final {
        (palette.final_path, 6.0)
    } else {
        (palette.search_path, 3.0)
    };
    canvas.push(DrawCommand::Polyline {
        points: path.iter().map(|&p| layout.center(p)).collect(),
        color,
        weight,
    });
}

/// Search overlay and path, without the board underneath.
pub fn draw_search(canvas: &mut Canvas, search: &AStarStepper) {
    draw_search_sets(canvas, search);
    if search.path().is_empty() {
        draw_path(canvas, search.nav(), &search.current_path(), false);
    } else {
        draw_path(canvas, search.nav(), search.path(), true);
    }
}

impl Scene for AStarStepper {
    fn draw(&self, _last: Option<&StepEvent>, canvas: &mut Canvas) {
        draw_obstacles(canvas, self.nav());
        draw_search(canvas, self);
    }
}

impl Scene for Stepper {
    fn draw(&self, last: Option<&StepEvent>, canvas: &mut Canvas) {
        match self {
            Stepper::BubbleSort(s) => s.draw(last, canvas),
            Stepper::QuickSort(s) => s.draw(last, canvas),
            Stepper::MazeGen(s) => s.draw(last, canvas),
            Stepper::AStar(s) => s.draw(last, canvas),
        }
    }
}

// ── Overlays ────────────────────────────────────────────────

/// Stacked text lines from the top-left of the region.
pub fn draw_panel(canvas: &mut Canvas, lines: &[String], size: f64) {
    let region = canvas.region();
    for (k, line) in lines.iter().enumerate() {
        canvas.text(region.x + 10.0, region.y + size * (k as f64 + 1.5), line.as_str(), size);
    }
}

// ── Final path reveal ───────────────────────────────────────

/// Reveals a found path in timed chunks, then blinks it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathReveal {
    path: Vec<CellPos>,
    per_chunk: usize,
    chunks: usize,
    config: RevealConfig,
    elapsed_ms: f64,
    shown: usize,
}

impl PathReveal {
    pub fn new(path: Vec<CellPos>, config: RevealConfig) -> Self {
        let chunks = path.len().min(config.chunks.max(1));
        let per_chunk = if chunks == 0 { 0 } else { path.len().div_ceil(chunks) };
        PathReveal {
            path,
            per_chunk,
            chunks,
            config,
            elapsed_ms: 0.0,
            shown: 0,
        }
    }

    fn reveal_ms(&self) -> f64 {
        self.chunks as f64 * self.config.chunk_ms
    }

    fn blink_ms(&self) -> f64 {
        self.config.blink_count as f64 * 2.0 * self.config.blink_ms
    }

    /// Move the animation forward, sounding each newly revealed node.
    pub fn advance(&mut self, dt_ms: f64, mapper: &ToneMapper, sink: &mut dyn ToneSink) {
        self.elapsed_ms += dt_ms.max(0.0);
        let chunks_due = if self.config.chunk_ms > 0.0 {
            ((self.elapsed_ms / self.config.chunk_ms).floor() as usize + 1).min(self.chunks)
        } else {
            self.chunks
        };
        let target = (chunks_due * self.per_chunk).min(self.path.len());
        while self.shown < target {
            mapper.play_reveal(self.shown, sink);
            self.shown += 1;
        }
    }

    /// Nodes to draw this frame; empty during the hidden half of a blink.
    pub fn visible(&self) -> &[CellPos] {
        let into_blink = self.elapsed_ms - self.reveal_ms();
        if self.shown == self.path.len() && into_blink >= 0.0 && into_blink < self.blink_ms() {
            let phase = if self.config.blink_ms > 0.0 {
                (into_blink / self.config.blink_ms).floor() as usize
            } else {
                1
            };
            if phase % 2 == 0 {
                return &[];
            }
        }
        &self.path[..self.shown]
    }

    pub fn is_finished(&self) -> bool {
        self.shown == self.path.len() && self.elapsed_ms >= self.reveal_ms() + self.blink_ms()
    }

    pub fn path(&self) -> &[CellPos] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stepper::run_to_completion;
    use crate::tone::Tone;

    fn canvas() -> Canvas {
        Canvas::new(Region::new(0.0, 0.0, 400.0, 300.0), Palette::default())
    }

    fn rects(commands: &[DrawCommand]) -> Vec<(f64, f64, Color)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { x, h, fill: Some(fill), .. } => Some((*x, *h, *fill)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bars_scale_to_region() {
        let mut c = canvas();
        let bars = sequence::bars_from_values(&[1, 2, 4]);
        draw_bars(&mut c, &bars, |_| Color::WHITE);
        let r = rects(c.commands());
        assert_eq!(r.len(), 3);
        assert!((r[2].1 - 240.0).abs() < 1e-9, "tallest bar at 80% height");
        assert!((r[0].1 - 60.0).abs() < 1e-9);
        assert!((r[1].0 - 400.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn bubble_highlights_last_pair() {
        let mut s = BubbleSortStepper::from_values(&[3, 1, 2]);
        let event = s.step();
        let mut c = canvas();
        s.draw(Some(&event), &mut c);
        let colors: Vec<Color> = rects(c.commands()).into_iter().map(|r| r.2).collect();
        assert_eq!(colors, vec![Color::RED, Color::RED, Color::WHITE]);
    }

    #[test]
    fn quick_debug_colors() {
        let mut s = QuickSortStepper::from_values(&[3, 1, 4, 2]);
        let event = s.step();
        let palette = Palette::default();

        let mut plain = canvas();
        s.draw(Some(&event), &mut plain);
        let plain_colors: Vec<Color> = rects(plain.commands()).into_iter().map(|r| r.2).collect();
        assert_eq!(plain_colors[3], palette.bar_active);

        let mut debug = canvas();
        debug.set_debug(true);
        s.draw(Some(&event), &mut debug);
        let colors: Vec<Color> = rects(debug.commands()).into_iter().map(|r| r.2).collect();
        let p = s.partition().expect("partition in progress");
        assert_eq!(colors[p.high], palette.pivot);
        assert_eq!(colors[p.store], palette.store);
    }

    #[test]
    fn sorted_bars_are_plain() {
        let mut s = BubbleSortStepper::from_values(&[2, 1]);
        let events = run_to_completion(&mut s, 10);
        let mut c = canvas();
        s.draw(events.last(), &mut c);
        assert!(rects(c.commands()).iter().all(|r| r.2 == Color::WHITE));
    }

    #[test]
    fn maze_draws_every_standing_wall() {
        let s = MazeGenStepper::new(3, 2, 0);
        let mut c = canvas();
        s.draw(None, &mut c);
        let lines = c
            .commands()
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Line { .. }))
            .count();
        assert_eq!(lines, 3 * 2 * 4, "uncarved maze draws four walls per cell");
    }

    #[test]
    fn search_path_thickens_when_found() {
        let mut s = AStarStepper::new(
            NavGrid::open(4, 4, false),
            CellPos::new(0, 0),
            CellPos::new(3, 3),
            crate::stepper::astar::Heuristic::Manhattan,
        );
        s.step();
        s.step();
        let mut c = canvas();
        s.draw(None, &mut c);
        let thin = c.commands().iter().any(
            |cmd| matches!(cmd, DrawCommand::Polyline { weight, .. } if *weight == 3.0),
        );
        assert!(thin, "searching path drawn thin");

        run_to_completion(&mut s, 1_000);
        let mut c = canvas();
        s.draw(None, &mut c);
        let thick = c.commands().iter().any(
            |cmd| matches!(cmd, DrawCommand::Polyline { weight, points, .. } if *weight == 6.0 && points.len() == 7),
        );
        assert!(thick, "final path drawn thick through all seven cells");
    }

    #[test]
    fn search_without_endpoints_draws_no_markers() {
        let s = AStarStepper::new(
            NavGrid::open(0, 3, false),
            CellPos::new(0, 0),
            CellPos::new(0, 2),
            crate::stepper::astar::Heuristic::Manhattan,
        );
        let mut c = canvas();
        draw_search_sets(&mut c, &s);
        assert!(c.commands().is_empty());
    }

    #[test]
    fn layout_centers_square_cells() {
        let layout = CellLayout::fit(Region::new(0.0, 0.0, 400.0, 300.0), 4, 3);
        assert_eq!(layout.size, 100.0);
        assert_eq!(layout.center(CellPos::new(0, 0)), (50.0, 50.0));
        let wide = CellLayout::fit(Region::new(0.0, 0.0, 400.0, 100.0), 2, 1);
        assert_eq!(wide.size, 100.0);
        assert_eq!(wide.origin_x, 100.0);
    }

    #[test]
    fn region_splits() {
        let (l, r) = Region::new(0.0, 0.0, 100.0, 50.0).split_columns();
        assert_eq!(l.width, 50.0);
        assert_eq!(r.x, 50.0);
        let (band, rest) = Region::new(0.0, 0.0, 100.0, 50.0).split_top(10.0);
        assert_eq!(band.height, 10.0);
        assert_eq!(rest.y, 10.0);
        assert_eq!(Region::new(0.0, 0.0, 4.0, 4.0).inset(5.0).width, 0.0);
    }

    #[test]
    fn commands_serialize_tagged() {
        let json = serde_json::to_string(&DrawCommand::Clear { color: Color::BLACK }).unwrap();
        assert_eq!(json, r#"{"type":"clear","color":{"r":0,"g":0,"b":0,"a":255}}"#);
    }

    #[test]
    fn reveal_chunks_then_blinks() {
        let path: Vec<CellPos> = (0..10).map(|i| CellPos::new(i, 0)).collect();
        let config = RevealConfig {
            chunks: 4,
            chunk_ms: 50.0,
            blink_count: 2,
            blink_ms: 10.0,
        };
        let mapper = ToneMapper::default();
        let mut tones: Vec<Tone> = Vec::new();
        let mut reveal = PathReveal::new(path, config);

        reveal.advance(0.0, &mapper, &mut tones);
        assert_eq!(reveal.visible().len(), 3, "first chunk shows at once");
        reveal.advance(60.0, &mapper, &mut tones);
        assert_eq!(reveal.visible().len(), 6);
        reveal.advance(140.0, &mapper, &mut tones);
        // 200 ms: all four chunks out, first blink phase hides the path.
        assert!(reveal.visible().is_empty());
        reveal.advance(10.0, &mapper, &mut tones);
        assert_eq!(reveal.visible().len(), 10);
        assert!(!reveal.is_finished());
        reveal.advance(30.0, &mapper, &mut tones);
        assert!(reveal.is_finished());
        assert_eq!(reveal.visible().len(), 10);
        // Nodes 0, 3, 6, 9 sound.
        assert_eq!(tones.len(), 4);
    }

    #[test]
    fn empty_reveal_is_finished() {
        let config = RevealConfig {
            blink_count: 0,
            ..RevealConfig::default()
        };
        let reveal = PathReveal::new(Vec::new(), config);
        assert!(reveal.is_finished());
        assert!(reveal.visible().is_empty());
    }
}

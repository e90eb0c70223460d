//! Paper: the gesture router.
//!
//! Turns a multiplexed stream of pointer events into exactly one of three
//! gesture streams: single drag, double drag or tap.
//!
//! A first pointer begins a single drag right away. If a second pointer
//! lands within the grace period the single drag is cancelled and a double
//! drag begins instead. Once the grace period has passed the gesture is
//! locked as a single drag and extra pointers are ignored until everything
//! has been released. With `defer_begin_drag` the single drag is held back
//! until the grace period elapses, so a double drag never cancels anything.

use crate::config::EngineConfig;
use crate::view::ViewTransform;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Identity of a pointer (finger, mouse button) as reported by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u64);

/// Pointer lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The platform aborted the touch.
    Cancel,
}

/// Raw input for the paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    /// Screen position.
    pub position: Point,
    /// Monotonic timestamp.
    pub time: Duration,
}

impl PointerEvent {
    pub fn new(pointer: u64, phase: PointerPhase, position: Point, time: Duration) -> Self {
        Self {
            pointer: PointerId(pointer),
            phase,
            position,
            time,
        }
    }
}

/// A gesture location in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GesturePoint {
    /// Position in graph content coordinates.
    pub content: Point,
    /// Raw screen position.
    pub screen: Point,
}

impl GesturePoint {
    pub fn new(screen: Point, view: &ViewTransform) -> Self {
        Self {
            content: view.screen_to_content(screen),
            screen,
        }
    }
}

/// Recognized gesture, delivered in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    BeginDrag(GesturePoint),
    Drag(GesturePoint),
    EndDrag(GesturePoint),
    CancelDrag,
    BeginDoubleDrag(GesturePoint, GesturePoint),
    DoubleDrag(GesturePoint, GesturePoint),
    EndDoubleDrag,
    Tap { point: GesturePoint, count: u32 },
}

/// Router state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperState {
    #[default]
    Idle,
    /// One pointer down, a second may still turn this into a double drag.
    SingleDragPending,
    /// Locked as a single drag.
    SingleDragActive,
    DoubleDragActive,
    /// Gesture finished, waiting for the remaining pointers to lift.
    Releasing,
}

#[derive(Debug, Clone, Copy)]
struct TrackedPointer {
    id: PointerId,
    down_position: Point,
    position: Point,
    /// Travelled further than the click threshold at some point.
    moved: bool,
}

impl TrackedPointer {
    fn new(id: PointerId, position: Point) -> Self {
        Self {
            id,
            down_position: position,
            position,
            moved: false,
        }
    }

    fn move_to(&mut self, position: Point, click_threshold: f64) {
        self.position = position;
        if (position - self.down_position).hypot() > click_threshold {
            self.moved = true;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LastTap {
    time: Duration,
    position: Point,
    count: u32,
}

/// Gesture router.
#[derive(Debug, Clone)]
pub struct Paper {
    grace_period: Duration,
    click_threshold: f64,
    multi_tap_interval: Duration,
    multi_tap_distance: f64,
    defer_begin_drag: bool,
    state: PaperState,
    primary: Option<TrackedPointer>,
    secondary: Option<TrackedPointer>,
    down_time: Duration,
    /// Whether `BeginDrag` went out for the current single drag.
    drag_begun: bool,
    /// Pointers that are down but not part of the gesture.
    ignored: HashSet<PointerId>,
    last_tap: Option<LastTap>,
}

impl Default for Paper {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Paper {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            grace_period: config.grace_period,
            click_threshold: config.click_threshold,
            multi_tap_interval: config.multi_tap_interval,
            multi_tap_distance: config.multi_tap_distance,
            defer_begin_drag: config.defer_begin_drag,
            state: PaperState::Idle,
            primary: None,
            secondary: None,
            down_time: Duration::ZERO,
            drag_begun: false,
            ignored: HashSet::new(),
            last_tap: None,
        }
    }

    pub fn state(&self) -> PaperState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PaperState::Idle
    }

    /// Forget every pointer without emitting anything.
    pub fn reset(&mut self) {
        self.state = PaperState::Idle;
        self.primary = None;
        self.secondary = None;
        self.drag_begun = false;
        self.ignored.clear();
    }

    /// Advance time without input; locks a pending single drag once the
    /// grace period is over.
    pub fn tick(&mut self, now: Duration, view: &ViewTransform) -> Vec<Gesture> {
        let mut out = Vec::new();
        self.lock_if_expired(now, view, &mut out);
        out
    }

    /// Feed one pointer event and collect the resulting gestures.
    pub fn handle(&mut self, event: PointerEvent, view: &ViewTransform) -> Vec<Gesture> {
        let mut out = Vec::new();
        self.lock_if_expired(event.time, view, &mut out);

        match event.phase {
            PointerPhase::Down => self.on_down(event, view, &mut out),
            PointerPhase::Move => self.on_move(event, view, &mut out),
            PointerPhase::Up => self.on_release(event, false, view, &mut out),
            PointerPhase::Cancel => self.on_release(event, true, view, &mut out),
        }
        out
    }

    fn lock_if_expired(&mut self, now: Duration, view: &ViewTransform, out: &mut Vec<Gesture>) {
        if self.state != PaperState::SingleDragPending {
            return;
        }
        if now.saturating_sub(self.down_time) < self.grace_period {
            return;
        }
        self.state = PaperState::SingleDragActive;
        log::debug!("Single drag locked");
        if !self.drag_begun {
            self.begin_deferred_drag(view, out);
        }
    }

    /// Emit the held-back begin, catching up with any motion since.
    fn begin_deferred_drag(&mut self, view: &ViewTransform, out: &mut Vec<Gesture>) {
        let Some(primary) = self.primary else {
            return;
        };
        self.drag_begun = true;
        out.push(Gesture::BeginDrag(GesturePoint::new(primary.down_position, view)));
        if primary.position != primary.down_position {
            out.push(Gesture::Drag(GesturePoint::new(primary.position, view)));
        }
    }

    fn on_down(&mut self, event: PointerEvent, view: &ViewTransform, out: &mut Vec<Gesture>) {
        if self.is_tracked(event.pointer) {
            log::debug!("Duplicate down for {:?} ignored", event.pointer);
            return;
        }

        match self.state {
            PaperState::Idle => {
                self.primary = Some(TrackedPointer::new(event.pointer, event.position));
                self.down_time = event.time;
                self.state = PaperState::SingleDragPending;
                self.drag_begun = false;
                if !self.defer_begin_drag {
                    self.drag_begun = true;
                    out.push(Gesture::BeginDrag(GesturePoint::new(event.position, view)));
                }
            }
            PaperState::SingleDragPending => {
                let Some(primary) = self.primary else {
                    return;
                };
                if self.drag_begun {
                    out.push(Gesture::CancelDrag);
                    self.drag_begun = false;
                }
                log::debug!("Second pointer within grace period, switching to double drag");
                let secondary = TrackedPointer::new(event.pointer, event.position);
                self.secondary = Some(secondary);
                self.state = PaperState::DoubleDragActive;
                out.push(Gesture::BeginDoubleDrag(
                    GesturePoint::new(primary.position, view),
                    GesturePoint::new(secondary.position, view),
                ));
            }
            PaperState::SingleDragActive | PaperState::DoubleDragActive | PaperState::Releasing => {
                log::debug!("Extra pointer {:?} ignored in {:?}", event.pointer, self.state);
                self.ignored.insert(event.pointer);
            }
        }
    }

    fn on_move(&mut self, event: PointerEvent, view: &ViewTransform, out: &mut Vec<Gesture>) {
        let threshold = self.click_threshold;
        let tracked = [&mut self.primary, &mut self.secondary]
            .into_iter()
            .flatten()
            .find(|p| p.id == event.pointer);
        let Some(pointer) = tracked else {
            return;
        };
        pointer.move_to(event.position, threshold);

        match self.state {
            PaperState::SingleDragPending | PaperState::SingleDragActive => {
                if self.drag_begun {
                    out.push(Gesture::Drag(GesturePoint::new(event.position, view)));
                }
            }
            PaperState::DoubleDragActive => {
                if let (Some(a), Some(b)) = (self.primary, self.secondary) {
                    out.push(Gesture::DoubleDrag(
                        GesturePoint::new(a.position, view),
                        GesturePoint::new(b.position, view),
                    ));
                }
            }
            PaperState::Idle | PaperState::Releasing => {}
        }
    }

    fn on_release(&mut self, event: PointerEvent, cancelled: bool, view: &ViewTransform, out: &mut Vec<Gesture>) {
        if self.ignored.remove(&event.pointer) {
            self.settle();
            return;
        }
        if !self.is_tracked(event.pointer) {
            log::debug!("Release of untracked pointer {:?} ignored", event.pointer);
            return;
        }

        match self.state {
            PaperState::SingleDragPending | PaperState::SingleDragActive => {
                let Some(mut primary) = self.primary.take() else {
                    return;
                };
                primary.move_to(event.position, self.click_threshold);
                let point = GesturePoint::new(event.position, view);

                if cancelled {
                    if self.drag_begun {
                        out.push(Gesture::CancelDrag);
                    }
                } else if !primary.moved {
                    if self.drag_begun {
                        out.push(Gesture::CancelDrag);
                    }
                    let count = self.next_tap_count(event.time, event.position);
                    out.push(Gesture::Tap { point, count });
                } else {
                    if !self.drag_begun {
                        self.primary = Some(primary);
                        self.begin_deferred_drag(view, out);
                        self.primary = None;
                    }
                    out.push(Gesture::EndDrag(point));
                }
                self.drag_begun = false;
                self.state = PaperState::Releasing;
            }
            PaperState::DoubleDragActive => {
                out.push(Gesture::EndDoubleDrag);
                self.untrack(event.pointer);
                self.state = PaperState::Releasing;
            }
            PaperState::Releasing => {
                self.untrack(event.pointer);
            }
            PaperState::Idle => {}
        }
        self.settle();
    }

    fn next_tap_count(&mut self, time: Duration, position: Point) -> u32 {
        let count = match self.last_tap {
            Some(last)
                if time.saturating_sub(last.time) <= self.multi_tap_interval
                    && (position - last.position).hypot() <= self.multi_tap_distance =>
            {
                last.count + 1
            }
            _ => 1,
        };
        self.last_tap = Some(LastTap { time, position, count });
        count
    }

    fn is_tracked(&self, id: PointerId) -> bool {
        self.primary.is_some_and(|p| p.id == id) || self.secondary.is_some_and(|p| p.id == id)
    }

    fn untrack(&mut self, id: PointerId) {
        if self.primary.is_some_and(|p| p.id == id) {
            self.primary = None;
        }
        if self.secondary.is_some_and(|p| p.id == id) {
            self.secondary = None;
        }
    }

    /// Return to idle once a finished gesture has no pointers left down.
    fn settle(&mut self) {
        if self.state == PaperState::Releasing
            && self.primary.is_none()
            && self.secondary.is_none()
            && self.ignored.is_empty()
        {
            self.state = PaperState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn ev(id: u64, phase: PointerPhase, x: f64, y: f64, t: u64) -> PointerEvent {
        PointerEvent::new(id, phase, Point::new(x, y), ms(t))
    }

    fn feed(paper: &mut Paper, events: &[PointerEvent]) -> Vec<Gesture> {
        let view = ViewTransform::default();
        events.iter().flat_map(|e| paper.handle(*e, &view)).collect()
    }

    fn names(gestures: &[Gesture]) -> Vec<&'static str> {
        gestures
            .iter()
            .map(|g| match g {
                Gesture::BeginDrag(_) => "begin",
                Gesture::Drag(_) => "drag",
                Gesture::EndDrag(_) => "end",
                Gesture::CancelDrag => "cancel",
                Gesture::BeginDoubleDrag(..) => "begin2",
                Gesture::DoubleDrag(..) => "drag2",
                Gesture::EndDoubleDrag => "end2",
                Gesture::Tap { .. } => "tap",
            })
            .collect()
    }

    #[test]
    fn test_single_drag() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(1, PointerPhase::Move, 20.0, 0.0, 50),
                ev(1, PointerPhase::Move, 40.0, 0.0, 200),
                ev(1, PointerPhase::Up, 40.0, 0.0, 250),
            ],
        );
        assert_eq!(names(&out), vec!["begin", "drag", "drag", "end"]);
        assert!(paper.is_idle());
    }

    #[test]
    fn test_second_pointer_within_grace_becomes_double_drag() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(2, PointerPhase::Down, 100.0, 0.0, 50),
                ev(2, PointerPhase::Move, 120.0, 0.0, 60),
            ],
        );
        assert_eq!(names(&out), vec!["begin", "cancel", "begin2", "drag2"]);
        assert_eq!(out.iter().filter(|g| matches!(g, Gesture::CancelDrag)).count(), 1);
        assert_eq!(paper.state(), PaperState::DoubleDragActive);
        if let Gesture::DoubleDrag(a, b) = out[3] {
            assert_eq!(a.screen, Point::new(0.0, 0.0));
            assert_eq!(b.screen, Point::new(120.0, 0.0));
        } else {
            panic!("expected double drag");
        }
    }

    #[test]
    fn test_second_pointer_after_grace_is_ignored() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(2, PointerPhase::Down, 100.0, 0.0, 100),
                ev(2, PointerPhase::Move, 120.0, 0.0, 110),
                ev(1, PointerPhase::Move, 30.0, 0.0, 120),
                ev(1, PointerPhase::Up, 30.0, 0.0, 130),
            ],
        );
        assert_eq!(names(&out), vec!["begin", "drag", "end"]);
        assert_eq!(paper.state(), PaperState::Releasing);

        feed(&mut paper, &[ev(2, PointerPhase::Up, 120.0, 0.0, 140)]);
        assert!(paper.is_idle());
    }

    #[test]
    fn test_double_drag_ends_once_and_idles_after_both_up() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(2, PointerPhase::Down, 100.0, 0.0, 10),
                ev(1, PointerPhase::Up, 0.0, 0.0, 300),
                ev(2, PointerPhase::Move, 150.0, 0.0, 310),
            ],
        );
        assert_eq!(names(&out), vec!["begin", "cancel", "begin2", "end2"]);
        assert_eq!(paper.state(), PaperState::Releasing);

        let out = feed(&mut paper, &[ev(2, PointerPhase::Up, 150.0, 0.0, 320)]);
        assert!(out.is_empty());
        assert!(paper.is_idle());
    }

    #[test]
    fn test_tap_and_double_tap() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 10.0, 10.0, 0),
                ev(1, PointerPhase::Move, 11.0, 10.0, 20),
                ev(1, PointerPhase::Up, 11.0, 10.0, 40),
                ev(1, PointerPhase::Down, 10.0, 10.0, 200),
                ev(1, PointerPhase::Up, 10.0, 10.0, 240),
            ],
        );
        assert_eq!(names(&out), vec!["begin", "drag", "cancel", "tap", "begin", "cancel", "tap"]);
        let counts: Vec<u32> = out
            .iter()
            .filter_map(|g| match g {
                Gesture::Tap { count, .. } => Some(*count),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![1, 2]);
    }

    #[test]
    fn test_tap_count_resets_after_interval() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 10.0, 10.0, 0),
                ev(1, PointerPhase::Up, 10.0, 10.0, 40),
                ev(1, PointerPhase::Down, 10.0, 10.0, 2000),
                ev(1, PointerPhase::Up, 10.0, 10.0, 2040),
            ],
        );
        let last = out.last().copied();
        assert!(matches!(last, Some(Gesture::Tap { count: 1, .. })));
    }

    #[test]
    fn test_unknown_pointers_ignored() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(7, PointerPhase::Move, 0.0, 0.0, 0),
                ev(7, PointerPhase::Up, 0.0, 0.0, 10),
                ev(7, PointerPhase::Cancel, 0.0, 0.0, 20),
            ],
        );
        assert!(out.is_empty());
        assert!(paper.is_idle());
    }

    #[test]
    fn test_cancel_phase_cancels_drag() {
        let mut paper = Paper::default();
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(1, PointerPhase::Move, 50.0, 0.0, 10),
                ev(1, PointerPhase::Cancel, 50.0, 0.0, 20),
            ],
        );
        assert_eq!(names(&out), vec!["begin", "drag", "cancel"]);
        assert!(paper.is_idle());
    }

    #[test]
    fn test_deferred_begin_never_cancels() {
        let config = EngineConfig {
            defer_begin_drag: true,
            ..EngineConfig::default()
        };
        let mut paper = Paper::new(&config);
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(1, PointerPhase::Move, 20.0, 0.0, 20),
                ev(2, PointerPhase::Down, 100.0, 0.0, 50),
            ],
        );
        assert_eq!(names(&out), vec!["begin2"]);
    }

    #[test]
    fn test_deferred_begin_catches_up_on_tick() {
        let config = EngineConfig {
            defer_begin_drag: true,
            ..EngineConfig::default()
        };
        let mut paper = Paper::new(&config);
        let view = ViewTransform::default();
        let mut out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(1, PointerPhase::Move, 20.0, 0.0, 20),
            ],
        );
        assert!(out.is_empty());
        out.extend(paper.tick(ms(150), &view));
        assert_eq!(names(&out), vec!["begin", "drag"]);
        assert_eq!(paper.state(), PaperState::SingleDragActive);
        if let Gesture::BeginDrag(p) = out[0] {
            assert_eq!(p.screen, Point::ZERO);
        }
    }

    #[test]
    fn test_deferred_quick_flick_still_drags() {
        let config = EngineConfig {
            defer_begin_drag: true,
            ..EngineConfig::default()
        };
        let mut paper = Paper::new(&config);
        let out = feed(
            &mut paper,
            &[
                ev(1, PointerPhase::Down, 0.0, 0.0, 0),
                ev(1, PointerPhase::Move, 30.0, 0.0, 20),
                ev(1, PointerPhase::Up, 40.0, 0.0, 40),
            ],
        );
        assert_eq!(names(&out), vec!["begin", "drag", "end"]);
    }

    #[test]
    fn test_content_coordinates_follow_view() {
        let mut paper = Paper::default();
        let view = ViewTransform {
            position: kurbo::Vec2::new(100.0, 0.0),
            scale: 2.0,
        };
        let out = paper.handle(ev(1, PointerPhase::Down, 120.0, 40.0, 0), &view);
        let Some(Gesture::BeginDrag(point)) = out.first().copied() else {
            panic!("expected begin drag");
        };
        assert_eq!(point.screen, Point::new(120.0, 40.0));
        assert_eq!(point.content, Point::new(10.0, 20.0));
    }
}

//! Fixed-tick force simulation with d3-force semantics.

use super::PositionClass;
use crate::scene::Point;
use std::f32::consts::PI;

pub const DEFAULT_TICKS: usize = 300;
/// Distance from the center beyond which an item counts as off-center.
pub const CLASSIFY_THRESHOLD: f32 = 50.0;

const INITIAL_RADIUS: f32 = 10.0;
const ALPHA_MIN: f32 = 0.001;
const VELOCITY_DECAY: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
}

/// Links from node 0 to every other node.
pub fn star_links(count: usize) -> Vec<Link> {
    (1..count).map(|target| Link { source: 0, target }).collect()
}

/// Force set applied on every tick, in field order. `None` disables a force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forces {
    pub link_distance: Option<f32>,
    pub charge: Option<f32>,
    pub center: Option<Point>,
    pub collide_radius: Option<f32>,
}

impl Default for Forces {
    fn default() -> Self {
        Self {
            link_distance: Some(30.0),
            charge: Some(-30.0),
            center: Some(Point::new(0.0, 0.0)),
            collide_radius: None,
        }
    }
}

impl Forces {
    /// Spring links at `spacing`, charge -50, centered at the origin and
    /// collision at `radius`.
    pub fn network(spacing: f32, radius: f32) -> Self {
        Self {
            link_distance: Some(spacing),
            charge: Some(-50.0),
            center: Some(Point::new(0.0, 0.0)),
            collide_radius: Some(radius),
        }
    }
}

/// d3's linear congruential generator, seeded with 1.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Default for Lcg {
    fn default() -> Self {
        Self { state: 1 }
    }
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    pub fn next_f64(&mut self) -> f64 {
        self.state = (Self::A * self.state + Self::C) % Self::M;
        self.state as f64 / Self::M as f64
    }

    fn jiggle(&mut self) -> f32 {
        ((self.next_f64() - 0.5) * 1e-6) as f32
    }
}

/// Phyllotaxis arrangement used for nodes without a position.
pub fn initial_positions(count: usize) -> Vec<Point> {
    let angle_step = PI * (3.0 - 5f32.sqrt());
    (0..count)
        .map(|index| {
            let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
            let angle = index as f32 * angle_step;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
struct Body {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

/// Advances the simulation `ticks` times and returns the final positions.
///
/// Links referencing missing nodes are ignored.
pub fn simulate(nodes: &[Point], links: &[Link], forces: &Forces, ticks: usize) -> Vec<Point> {
    let mut bodies: Vec<Body> = nodes
        .iter()
        .map(|point| Body {
            x: point.x,
            y: point.y,
            ..Body::default()
        })
        .collect();
    let links: Vec<Link> = links
        .iter()
        .copied()
        .filter(|link| link.source < bodies.len() && link.target < bodies.len())
        .collect();
    let springs = Springs::new(&links, bodies.len());
    let mut random = Lcg::default();

    let alpha_decay = 1.0 - ALPHA_MIN.powf(1.0 / DEFAULT_TICKS as f32);
    let mut alpha = 1.0f32;
    for _ in 0..ticks {
        alpha += -alpha * alpha_decay;
        if let Some(distance) = forces.link_distance {
            springs.apply(&links, &mut bodies, distance, alpha, &mut random);
        }
        if let Some(strength) = forces.charge {
            apply_charge(&mut bodies, strength, alpha, &mut random);
        }
        if let Some(center) = forces.center {
            apply_center(&mut bodies, center);
        }
        if let Some(radius) = forces.collide_radius {
            apply_collide(&mut bodies, radius, &mut random);
        }
        for body in &mut bodies {
            body.vx *= VELOCITY_DECAY;
            body.vy *= VELOCITY_DECAY;
            body.x += body.vx;
            body.y += body.vy;
        }
    }
    bodies.iter().map(|body| Point::new(body.x, body.y)).collect()
}

struct Springs {
    strengths: Vec<f32>,
    biases: Vec<f32>,
}

impl Springs {
    fn new(links: &[Link], count: usize) -> Self {
        let mut degree = vec![0usize; count];
        for link in links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }
        let strengths = links
            .iter()
            .map(|link| 1.0 / degree[link.source].min(degree[link.target]) as f32)
            .collect();
        let biases = links
            .iter()
            .map(|link| {
                let source = degree[link.source] as f32;
                source / (source + degree[link.target] as f32)
            })
            .collect();
        Self { strengths, biases }
    }

    fn apply(&self, links: &[Link], bodies: &mut [Body], distance: f32, alpha: f32, random: &mut Lcg) {
        for (index, link) in links.iter().enumerate() {
            let source = bodies[link.source];
            let target = bodies[link.target];
            let mut x = target.x + target.vx - source.x - source.vx;
            let mut y = target.y + target.vy - source.y - source.vy;
            if x == 0.0 {
                x = random.jiggle();
            }
            if y == 0.0 {
                y = random.jiggle();
            }
            let length = (x * x + y * y).sqrt();
            let scale = (length - distance) / length * alpha * self.strengths[index];
            x *= scale;
            y *= scale;
            let bias = self.biases[index];
            bodies[link.target].vx -= x * bias;
            bodies[link.target].vy -= y * bias;
            bodies[link.source].vx += x * (1.0 - bias);
            bodies[link.source].vy += y * (1.0 - bias);
        }
    }
}

/// Pairwise repulsion, evaluated exactly rather than through a quadtree.
fn apply_charge(bodies: &mut [Body], strength: f32, alpha: f32, random: &mut Lcg) {
    for i in 0..bodies.len() {
        for j in 0..bodies.len() {
            if i == j {
                continue;
            }
            let mut x = bodies[j].x - bodies[i].x;
            let mut y = bodies[j].y - bodies[i].y;
            let mut length = x * x + y * y;
            if x == 0.0 {
                x = random.jiggle();
                length += x * x;
            }
            if y == 0.0 {
                y = random.jiggle();
                length += y * y;
            }
            if length < 1.0 {
                length = length.sqrt();
            }
            let weight = strength * alpha / length;
            bodies[i].vx += x * weight;
            bodies[i].vy += y * weight;
        }
    }
}

fn apply_center(bodies: &mut [Body], center: Point) {
    if bodies.is_empty() {
        return;
    }
    let count = bodies.len() as f32;
    let mean_x = bodies.iter().map(|body| body.x).sum::<f32>() / count - center.x;
    let mean_y = bodies.iter().map(|body| body.y).sum::<f32>() / count - center.y;
    for body in bodies {
        body.x -= mean_x;
        body.y -= mean_y;
    }
}

fn apply_collide(bodies: &mut [Body], radius: f32, random: &mut Lcg) {
    let reach = radius * 2.0;
    for i in 0..bodies.len() {
        let xi = bodies[i].x + bodies[i].vx;
        let yi = bodies[i].y + bodies[i].vy;
        for j in i + 1..bodies.len() {
            let mut x = xi - bodies[j].x - bodies[j].vx;
            let mut y = yi - bodies[j].y - bodies[j].vy;
            let mut length = x * x + y * y;
            if length >= reach * reach {
                continue;
            }
            if x == 0.0 {
                x = random.jiggle();
                length += x * x;
            }
            if y == 0.0 {
                y = random.jiggle();
                length += y * y;
            }
            let length = length.sqrt();
            let scale = (reach - length) / length;
            x *= scale;
            y *= scale;
            // Equal radii split the correction evenly.
            bodies[i].vx += x * 0.5;
            bodies[i].vy += y * 0.5;
            bodies[j].vx -= x * 0.5;
            bodies[j].vy -= y * 0.5;
        }
    }
}

/// Horizontal and vertical placement class of a center-relative offset.
pub fn classify(x: f32, y: f32) -> (PositionClass, PositionClass) {
    let axis = |value: f32| {
        if value < -CLASSIFY_THRESHOLD {
            PositionClass::Flipped
        } else if value > CLASSIFY_THRESHOLD {
            PositionClass::Normal
        } else {
            PositionClass::Center
        }
    };
    (axis(x), axis(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: Point, b: Point) -> f32 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn lcg_matches_reference_sequence() {
        let mut lcg = Lcg::default();
        let first = lcg.next_f64();
        assert!((first - 1_015_568_748.0 / 4_294_967_296.0).abs() < 1e-12);
    }

    #[test]
    fn phyllotaxis_start() {
        let points = initial_positions(2);
        assert!((points[0].x - 10.0 * 0.5f32.sqrt()).abs() < 1e-4);
        assert_eq!(points[0].y, 0.0);
        assert!((distance(points[1], Point::new(0.0, 0.0)) - 10.0 * 1.5f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn zero_ticks_is_identity() {
        let start = initial_positions(4);
        let end = simulate(&start, &star_links(4), &Forces::network(120.0, 60.0), 0);
        assert_eq!(start, end);
    }

    #[test]
    fn spring_settles_at_rest_length() {
        let forces = Forces {
            link_distance: Some(100.0),
            charge: None,
            center: Some(Point::new(0.0, 0.0)),
            collide_radius: None,
        };
        let end = simulate(&initial_positions(2), &star_links(2), &forces, DEFAULT_TICKS);
        assert!((distance(end[0], end[1]) - 100.0).abs() < 0.5);
        assert!((end[0].x + end[1].x).abs() < 1e-3);
    }

    #[test]
    fn collision_separates_overlapping_nodes() {
        let forces = Forces {
            link_distance: None,
            charge: None,
            center: Some(Point::new(0.0, 0.0)),
            collide_radius: Some(30.0),
        };
        let end = simulate(&initial_positions(2), &[], &forces, DEFAULT_TICKS);
        assert!(distance(end[0], end[1]) > 59.0);
    }

    #[test]
    fn simulation_is_deterministic() {
        let start = initial_positions(6);
        let forces = Forces::network(120.0, 70.0);
        let a = simulate(&start, &star_links(6), &forces, DEFAULT_TICKS);
        let b = simulate(&start, &star_links(6), &forces, DEFAULT_TICKS);
        assert_eq!(a, b);
    }

    #[test]
    fn single_node_is_centered() {
        let end = simulate(&initial_positions(1), &[], &Forces::network(120.0, 70.0), 10);
        assert!(end[0].x.abs() < 1e-4 && end[0].y.abs() < 1e-4);
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(-51.0, 0.0), (PositionClass::Flipped, PositionClass::Center));
        assert_eq!(classify(50.0, 51.0), (PositionClass::Center, PositionClass::Normal));
    }
}

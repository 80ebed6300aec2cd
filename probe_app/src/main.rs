//! Collision probe
//!
//! Loads a scene of colliders from a RON or TOML file, or generates a random
//! one, runs the narrow phase over every pair and logs the contacts.
//!
//! ```text
//! collision_probe [SCENE] [--random COUNT] [--seed SEED] [--save PATH]
//! ```

use collision3d::prelude::*;
use log::{debug, info, warn};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-size of the cube random bodies are scattered in
const SCATTER_EXTENT: f32 = 8.0;

#[derive(Error, Debug)]
enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Collision(#[from] collision3d::physics::CollisionError),

    #[error("{0}")]
    Usage(String),
}

/// One placed collider
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneBody {
    name: String,
    collider: Collider,
    /// Applied with `update` after loading, when present
    #[serde(default)]
    transform: Option<Transform>,
}

/// A scene file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SceneConfig {
    tolerances: ContactTolerances,
    bodies: Vec<SceneBody>,
}

impl Config for SceneConfig {}

impl SceneConfig {
    fn random(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bodies = (0..count)
            .map(|i| {
                let center = Vec3::new(
                    rng.gen_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                    rng.gen_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                    rng.gen_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                );
                let radius = Vec3::new(rng.gen_range(0.5..2.0), rng.gen_range(0.5..2.0), rng.gen_range(0.5..2.0));
                let (name, collider) = match rng.gen_range(0..4) {
                    0 => ("sphere", Collider::from(Sphere::new(center, Vec3::zeros(), radius.x))),
                    1 => ("box", Collider::from(AxisAlignedBox::new(center, Vec3::zeros(), radius))),
                    2 => ("ellipsoid", Collider::from(Ellipsoid::new(center, Vec3::zeros(), radius))),
                    _ => {
                        let axis = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                        let rotation = Quat::from_scaled_axis(axis.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y) * angle);
                        ("oriented box", Collider::from(OrientedBox::new(center, Vec3::zeros(), radius, rotation)))
                    }
                };
                SceneBody {
                    name: format!("{name} {i}"),
                    collider,
                    transform: None,
                }
            })
            .collect();

        Self {
            tolerances: ContactTolerances::default(),
            bodies,
        }
    }
}

struct Options {
    scene: Option<String>,
    random: usize,
    seed: u64,
    save: Option<String>,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ProbeError> {
        let mut options = Self {
            scene: None,
            random: 12,
            seed: 7,
            save: None,
        };
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| args.next().ok_or_else(|| ProbeError::Usage(format!("{flag} needs a value")));
            match arg.as_str() {
                "--random" => {
                    options.random = value("--random")?
                        .parse()
                        .map_err(|_| ProbeError::Usage("--random expects a count".into()))?;
                }
                "--seed" => {
                    options.seed = value("--seed")?
                        .parse()
                        .map_err(|_| ProbeError::Usage("--seed expects an integer".into()))?;
                }
                "--save" => options.save = Some(value("--save")?),
                flag if flag.starts_with("--") => return Err(ProbeError::Usage(format!("unknown option {flag}"))),
                _ => options.scene = Some(arg.clone()),
            }
        }
        Ok(options)
    }
}

fn run(options: &Options) -> Result<(), ProbeError> {
    let scene = match &options.scene {
        Some(path) => {
            info!("Loading scene from {path}");
            SceneConfig::load_from_file(path)?
        }
        None => {
            info!("Generating {} random bodies (seed {})", options.random, options.seed);
            SceneConfig::random(options.random, options.seed)
        }
    };

    if let Some(path) = &options.save {
        scene.save_to_file(path)?;
        info!("Saved scene to {path}");
    }

    scene
        .tolerances
        .validate()
        .map_err(|message| ProbeError::Usage(format!("invalid tolerances: {message}")))?;

    let colliders: Vec<Collider> = scene
        .bodies
        .iter()
        .map(|body| {
            let mut collider = body.collider.clone();
            if let Some(transform) = &body.transform {
                collider.update(transform);
            }
            collider
        })
        .collect();

    let candidates: Vec<CollisionPair> = CollisionPair::all(colliders.len())
        .into_iter()
        .filter(|pair| {
            let (a, b) = (colliders[pair.a].kind(), colliders[pair.b].kind());
            let supported = a.supports_pairing(b);
            if !supported {
                warn!(
                    "Skipping {} vs {}: {a:?} and {b:?} cannot be compared",
                    scene.bodies[pair.a].name, scene.bodies[pair.b].name
                );
            }
            supported
        })
        .collect();
    debug!("{} candidate pairs among {} bodies", candidates.len(), colliders.len());

    let mut narrow_phase = NarrowPhase::with_tolerances(scene.tolerances);
    let contacts = narrow_phase.detect(&colliders, &candidates)?;
    for contact in &contacts {
        let hit = &contact.interpenetration;
        info!(
            "{} hits {}: depth {:.3}, direction ({:.3}, {:.3}, {:.3}), {} contact points",
            scene.bodies[contact.pair.a].name,
            scene.bodies[contact.pair.b].name,
            hit.depth,
            hit.direction.x,
            hit.direction.y,
            hit.direction.z,
            hit.points.len()
        );
    }

    let ray = Ray::new(Vec3::new(0.0, 2.0 * SCATTER_EXTENT, 0.0), Vec3::new(0.0, -1.0, 0.0));
    let nearest = scene
        .bodies
        .iter()
        .zip(&colliders)
        .filter_map(|(body, collider)| collider.surface_impact(&ray).map(|impact| (body, impact)))
        .min_by(|(_, a), (_, b)| (a.position - ray.origin).norm().total_cmp(&(b.position - ray.origin).norm()));
    if let Some((body, impact)) = nearest {
        info!(
            "Downward probe ray hits {} at y = {:.3} ({:?})",
            body.name,
            impact.position.y,
            impact.surface_type()
        );
    }

    info!("{} contacts among {} bodies", contacts.len(), colliders.len());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    collision3d::foundation::logging::init();

    let options = Options::parse(std::env::args().skip(1))?;
    run(&options)?;
    Ok(())
}

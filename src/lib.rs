//! City Tour Library
//!
//! Plans a short open or round-trip tour through a small set of named
//! geographic places.
//!
//! # Features
//!
//! - Haversine distance matrix over latitude/longitude points
//! - Nearest neighbor construction from a chosen start
//! - 2-opt local search and simulated annealing improvement
//! - CSV input, GeoJSON output and SVG/PNG route charts
//!
//! # Example
//!
//! ```
//! use city_tour::instance::{Place, TourInstance};
//! use city_tour::planner::{PlannerConfig, TourPlanner};
//!
//! let instance = TourInstance::new("paris", vec![
//!     Place::new("Eiffel Tower", 48.8584, 2.2945),
//!     Place::new("Louvre Museum", 48.8606, 2.3376),
//!     Place::new("Notre-Dame", 48.8530, 2.3499),
//!     Place::new("Arc de Triomphe", 48.8738, 2.2950),
//! ]);
//!
//! let start = instance.find_start("eiffel").unwrap();
//! let config = PlannerConfig { return_to_start: true, ..Default::default() };
//! let plan = TourPlanner::new(config).plan(&instance, start).unwrap();
//!
//! assert_eq!(plan.improved.route.first(), plan.improved.route.last());
//! println!("Total distance: {:.1} km", plan.improved.distance);
//! ```

pub mod error;
pub mod geo;
pub mod matrix;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod planner;
pub mod geojson;
pub mod visualization;

pub use error::{Result, TourError};
pub use instance::{Place, TourInstance};
pub use matrix::DistanceMatrix;
pub use solution::Solution;

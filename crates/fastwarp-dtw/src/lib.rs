//! Exact, windowed and multi-resolution (FastDTW) dynamic time warping.
//!
//! Pure math library, zero I/O. Aligns two multivariate series under a
//! pluggable point metric, returning the cumulative alignment cost and,
//! optionally, the warp path. [`Dtw`] computes the exact recurrence over the
//! full grid, a Sakoe-Chiba band or an arbitrary [`SearchWindow`];
//! [`FastDtw`] approximates it in linear time and space by solving at
//! coarser resolutions first.
//!
//! ```
//! use fastwarp_dtw::{Dtw, FastDtw, Metric, Series};
//!
//! let x = Series::new(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();
//! let y = Series::new(vec![vec![0.0, 0.0], vec![2.0, 2.0]]).unwrap();
//!
//! let exact = Dtw::unconstrained().distance(x.as_view(), y.as_view(), &Metric::Euclidean).unwrap();
//! let (fast, path) = FastDtw::new(1)
//!     .distance_and_path(x.as_view(), y.as_view(), &Metric::Euclidean)
//!     .unwrap();
//! assert_eq!(exact, fast);
//! assert!(path.is_valid_for(3, 2));
//! ```

mod coarsen;
mod constraint;
mod cost;
mod dtw;
mod error;
mod fast;
mod grid;
mod matrix;
mod metric;
mod path;
mod project;
mod series;
mod window;

pub use coarsen::{Coarsened, ReductionRecord, coarsen};
pub use constraint::BandConstraint;
pub use cost::WarpCost;
pub use dtw::{Dtw, exact_dtw};
pub use error::DtwError;
pub use fast::{FastDtw, fast_dtw};
pub use matrix::DistanceMatrix;
pub use metric::{Metric, PointMetric};
pub use path::{WarpPath, WarpStep};
pub use project::project;
pub use series::{Series, SeriesView};
pub use window::SearchWindow;

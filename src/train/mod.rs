pub mod early_stopping;
pub mod epoch_stats;
pub mod fit_parameters;
pub mod fit_results;
pub mod loop_fn;
pub mod moving_window;
pub mod train_config;
pub mod trainer;

pub use early_stopping::EarlyStopping;
pub use epoch_stats::EpochStats;
pub use fit_parameters::{DataPair, Dataset, FitParameters};
pub use fit_results::{FitResults, StopReason};
pub use moving_window::MovingWindow;
pub use train_config::{LossMonitor, QueryMode, TrainConfig};
pub use trainer::{fit, Trainer};

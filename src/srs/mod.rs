pub mod interval;
pub mod shuffle;

pub use interval::{calculate_new_srs_interval, get_current_interval};
pub use shuffle::{fisher_yates_shuffle, select_random_subset};

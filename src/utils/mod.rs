mod perf;
pub mod time_utils;

pub use time_utils::{
    AppInstant, TimeUtils, epoch_ms_to_sec, epoch_sec_to_axis_label, epoch_sec_to_time_string,
    iso_to_epoch_ms,
};

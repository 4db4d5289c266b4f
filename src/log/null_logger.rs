//! Used when the `logging` feature is off. Nothing is printed, but the global level is still
//! applied so disabled log statements cost nothing.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}

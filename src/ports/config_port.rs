//! Configuration access port trait.

use crate::domain::error::TraderError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Comma-separated list of integers; `Ok(None)` if the key is absent,
    /// `ConfigInvalid` naming the first item that fails to parse.
    fn get_usize_list(&self, section: &str, key: &str) -> Result<Option<Vec<usize>>, TraderError> {
        let Some(raw) = self.get_string(section, key) else {
            return Ok(None);
        };
        raw.split(',')
            .map(|item| {
                let item = item.trim();
                item.parse::<usize>().map_err(|_| TraderError::ConfigInvalid {
                    section: section.into(),
                    key: key.into(),
                    reason: format!("'{item}' is not a non-negative integer"),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

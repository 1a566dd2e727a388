//! Layered merging of raw config inputs: the last non-`None` value wins.

use crate::config::types::DriverConfigInput;

pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

impl Merge<DriverConfigInput> for DriverConfigInput {
    fn merge(self, other: DriverConfigInput) -> DriverConfigInput {
        DriverConfigInput {
            postgres_url: self.postgres_url.merge(other.postgres_url),
            log_path: self.log_path.merge(other.log_path),
            statistics_path: self.statistics_path.merge(other.statistics_path),
            max_cost: self.max_cost.merge(other.max_cost),
            format: self.format.merge(other.format),
            concurrency: self.concurrency.merge(other.concurrency),
            probe_timeout_ms: self.probe_timeout_ms.merge(other.probe_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layer_overrides_earlier_one() {
        let file = DriverConfigInput { postgres_url: Some("file-url".into()), max_cost: Some(10.0), ..Default::default() };
        let cli = DriverConfigInput { postgres_url: Some("cli-url".into()), ..Default::default() };
        let merged = file.merge(cli);
        assert_eq!(merged.postgres_url, Some("cli-url".into()));
        assert_eq!(merged.max_cost, Some(10.0));
    }
}

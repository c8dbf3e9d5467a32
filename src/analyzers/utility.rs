/// Divides a bucket sum by its count. Returns `None` for an empty bucket so
/// no NaN ever reaches the output.
pub fn average(sum: f64, count: u64) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_empty_bucket() {
        assert_eq!(average(0.0, 0), None);
        assert_eq!(average(12.0, 0), None);
    }

    #[test]
    fn test_average_normal_values() {
        assert_eq!(average(12.0, 2), Some(6.0));
        assert_eq!(average(1.0, 4), Some(0.25));
    }
}

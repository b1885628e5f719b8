//! Utilities.
use serde::{Deserialize, Serialize};

/// Returns the arithmetic mean and the population standard deviation of `xs`.
///
/// The standard deviation is computed with divisor `N`, so a single value has
/// zero deviation. Returns `None` for an empty slice.
pub fn mean_std(xs: &[f32]) -> Option<(f32, f32)> {
    if xs.is_empty() {
        return None;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = xs
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Some((mean as f32, var.sqrt() as f32))
}

/// Mean and standard deviation of episode rewards and lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Mean of episodic returns.
    pub mean_reward: f32,

    /// Population standard deviation of episodic returns.
    pub std_reward: f32,

    /// Mean of episode lengths.
    pub mean_length: f32,

    /// Population standard deviation of episode lengths.
    pub std_length: f32,
}

impl Summary {
    /// Summarizes parallel sequences of episodic returns and lengths.
    ///
    /// Returns `None` if either sequence is empty.
    pub fn from_episodes(rewards: &[f32], lengths: &[f32]) -> Option<Self> {
        let (mean_reward, std_reward) = mean_std(rewards)?;
        let (mean_length, std_length) = mean_std(lengths)?;
        Some(Self {
            mean_reward,
            std_reward,
            mean_length,
            std_length,
        })
    }
}

/// Returns the name of type `T` without module paths and generic arguments.
///
/// For example, `my_crate::agents::Dqn<my_crate::Mlp>` becomes `Dqn`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    struct Dqn<T>(T);

    #[test]
    fn test_mean_std() {
        assert_eq!(mean_std(&[]), None);
        assert_eq!(mean_std(&[3.0]), Some((3.0, 0.0)));

        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((mean - 5.0).abs() < 1e-6);
        assert!((std - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_from_episodes() {
        let s = Summary::from_episodes(&[1.0, 3.0], &[10.0, 10.0]).unwrap();
        assert_eq!(s.mean_reward, 2.0);
        assert_eq!(s.std_reward, 1.0);
        assert_eq!(s.mean_length, 10.0);
        assert_eq!(s.std_length, 0.0);
        assert_eq!(Summary::from_episodes(&[], &[]), None);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Dqn<Vec<u8>>>(), "Dqn");
        assert_eq!(short_type_name::<u32>(), "u32");
    }
}

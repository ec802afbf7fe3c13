use colored::Colorize;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::roster::SyntheticRoster;
use super::scenarios::TestScenario;

/// Largest synthetic roster generated per iteration.
const MAX_ROSTER: usize = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Checking property: {} (seed: {seed})",
                        scenario.name.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut durations = Vec::new();

        for i in 0..iterations {
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let mut rng = ChaCha20Rng::seed_from_u64(iteration_seed);
            let size = rng.gen_range(0..=MAX_ROSTER);
            let roster = SyntheticRoster::generate(&mut rng, size);

            let start_time = Instant::now();
            match (scenario.test_fn)(&roster, &mut rng) {
                Ok(()) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    durations.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{iterations} passed ({duration:?}) players:{size}",
                            i + 1
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (seed {iteration_seed}, {size} local players, {} feed players): {err:#}",
                        i + 1,
                        roster.feed.len()
                    );
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::get_scenario;

    #[test]
    fn runs_one_result_per_seed() {
        let tester = LogicTester::new(false);
        let scenario = get_scenario("merge-uniqueness").unwrap();
        let results = tester.run_scenario(scenario, &[1, 2], 3);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed && r.successful_iterations == 3));
        assert_eq!(results[1].seed, 2);
    }

    #[test]
    fn failures_are_recorded_with_their_seed() {
        fn always_fails(_: &SyntheticRoster, _: &mut ChaCha20Rng) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
        let scenario = TestScenario {
            name: "broken",
            description: "",
            test_fn: always_fails,
        };
        let result = &LogicTester::new(false).run_scenario(&scenario, &[40], 2)[0];
        assert!(!result.passed);
        assert_eq!(result.successful_iterations, 0);
        assert!(result.failures[1].contains("seed 41"));
        assert!(result.failures[0].ends_with("boom"));
    }

    #[test]
    fn results_serialize_durations_as_micros() {
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(2),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 2000);
    }
}

//! Age estimation from an 8-class age-bucket probability vector.
//!
//! The bucket with the highest probability is mapped to a representative
//! age, which is then classified into a human-readable range. Any failure
//! (bad input, classifier error) yields the conservative fallback age of 12
//! instead of an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Representative age used whenever classification fails.
pub const FALLBACK_AGE: u8 = 12;

/// Number of classes produced by the age classifier.
pub const BUCKET_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBucket {
    #[serde(rename = "(0-2)")]
    B0To2,
    #[serde(rename = "(4-6)")]
    B4To6,
    #[serde(rename = "(8-12)")]
    B8To12,
    #[serde(rename = "(15-20)")]
    B15To20,
    #[serde(rename = "(25-32)")]
    B25To32,
    #[serde(rename = "(38-43)")]
    B38To43,
    #[serde(rename = "(48-53)")]
    B48To53,
    #[serde(rename = "(60-100)")]
    B60To100,
}

impl AgeBucket {
    /// Buckets in classifier output order.
    pub const ALL: [AgeBucket; BUCKET_COUNT] = [
        AgeBucket::B0To2,
        AgeBucket::B4To6,
        AgeBucket::B8To12,
        AgeBucket::B15To20,
        AgeBucket::B25To32,
        AgeBucket::B38To43,
        AgeBucket::B48To53,
        AgeBucket::B60To100,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::B0To2 => "(0-2)",
            AgeBucket::B4To6 => "(4-6)",
            AgeBucket::B8To12 => "(8-12)",
            AgeBucket::B15To20 => "(15-20)",
            AgeBucket::B25To32 => "(25-32)",
            AgeBucket::B38To43 => "(38-43)",
            AgeBucket::B48To53 => "(48-53)",
            AgeBucket::B60To100 => "(60-100)",
        }
    }

    pub fn representative_age(self) -> u8 {
        match self {
            AgeBucket::B0To2 => 1,
            AgeBucket::B4To6 => 5,
            AgeBucket::B8To12 => 10,
            AgeBucket::B15To20 => 18,
            AgeBucket::B25To32 => 28,
            AgeBucket::B38To43 => 40,
            AgeBucket::B48To53 => 50,
            AgeBucket::B60To100 => 70,
        }
    }

    /// The bucket whose age span contains `age`, or the nearest one below it.
    fn containing(age: u8) -> AgeBucket {
        match age {
            0..=3 => AgeBucket::B0To2,
            4..=7 => AgeBucket::B4To6,
            8..=14 => AgeBucket::B8To12,
            15..=24 => AgeBucket::B15To20,
            25..=37 => AgeBucket::B25To32,
            38..=47 => AgeBucket::B38To43,
            48..=59 => AgeBucket::B48To53,
            _ => AgeBucket::B60To100,
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable age range. Upper bounds are inclusive; the bands cover 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRange {
    Infant,
    Child,
    Adolescent,
    YoungAdult,
    Adult30To40,
    Adult40To50,
    Adult50To60,
    Senior,
}

impl AgeRange {
    pub fn classify(age: u8) -> AgeRange {
        match age {
            0..=2 => AgeRange::Infant,
            3..=12 => AgeRange::Child,
            13..=18 => AgeRange::Adolescent,
            19..=30 => AgeRange::YoungAdult,
            31..=40 => AgeRange::Adult30To40,
            41..=50 => AgeRange::Adult40To50,
            51..=60 => AgeRange::Adult50To60,
            _ => AgeRange::Senior,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeRange::Infant => "Infant (0-2)",
            AgeRange::Child => "Child (3-12)",
            AgeRange::Adolescent => "Adolescent (13-18)",
            AgeRange::YoungAdult => "Young Adult (19-30)",
            AgeRange::Adult30To40 => "Adult (31-40)",
            AgeRange::Adult40To50 => "Adult (41-50)",
            AgeRange::Adult50To60 => "Adult (51-60)",
            AgeRange::Senior => "Senior (>60)",
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeEstimate {
    /// Always within 0..=100
    pub representative_age: u8,
    pub bucket: AgeBucket,
    pub range: AgeRange,
    /// True when this is the fixed fallback rather than a classifier result
    pub fallback: bool,
}

impl AgeEstimate {
    pub fn from_age(age: u8) -> Self {
        let age = age.min(100);
        Self {
            representative_age: age,
            bucket: AgeBucket::containing(age),
            range: AgeRange::classify(age),
            fallback: false,
        }
    }

    pub fn fallback() -> Self {
        Self {
            fallback: true,
            ..Self::from_age(FALLBACK_AGE)
        }
    }

    pub fn bucket_label(&self) -> &'static str {
        self.bucket.label()
    }

    pub fn age_range_label(&self) -> &'static str {
        self.range.label()
    }
}

/// Index of the largest probability; the first one wins ties. NaNs never win.
fn argmax(probabilities: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in probabilities.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if p <= b => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}

/// Pick the most probable bucket from an 8-class probability vector.
///
/// Returns `None` for a vector of the wrong length or with no comparable
/// entries. An all-zero vector selects the first bucket.
pub fn estimate_from_probabilities(probabilities: &[f32]) -> Option<AgeEstimate> {
    if probabilities.len() != BUCKET_COUNT {
        return None;
    }
    let bucket = AgeBucket::ALL[argmax(probabilities)?];
    let age = bucket.representative_age().min(100);
    Some(AgeEstimate {
        representative_age: age,
        bucket,
        range: AgeRange::classify(age),
        fallback: false,
    })
}

/// Total version of [`estimate_from_probabilities`]: failures become the fallback.
///
/// `probabilities` is whatever the classifier returned; an `Err` is logged
/// and replaced by the fallback estimate.
pub fn estimate_or_fallback<E: fmt::Display>(
    probabilities: std::result::Result<Vec<f32>, E>,
) -> AgeEstimate {
    match probabilities {
        Ok(probs) => estimate_from_probabilities(&probs).unwrap_or_else(|| {
            warn!(len = probs.len(), "malformed age probabilities, using fallback age");
            AgeEstimate::fallback()
        }),
        Err(e) => {
            warn!(error = %e, "age classification failed, using fallback age");
            AgeEstimate::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_most_probable_bucket() {
        let probs = [0.01, 0.02, 0.05, 0.1, 0.6, 0.1, 0.07, 0.05];
        let est = estimate_from_probabilities(&probs).unwrap();
        assert_eq!(est.bucket, AgeBucket::B25To32);
        assert_eq!(est.representative_age, 28);
        assert_eq!(est.range, AgeRange::YoungAdult);
        assert_eq!(est.bucket_label(), "(25-32)");
        assert!(!est.fallback);
    }

    #[test]
    fn all_zero_picks_first_bucket() {
        let est = estimate_from_probabilities(&[0.0; 8]).unwrap();
        assert_eq!(est.bucket, AgeBucket::B0To2);
        assert_eq!(est.representative_age, 1);
        assert_eq!(est.range, AgeRange::Infant);
    }

    #[test]
    fn ties_go_to_first() {
        let probs = [0.0, 0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0];
        assert_eq!(estimate_from_probabilities(&probs).unwrap().bucket, AgeBucket::B4To6);
    }

    #[test]
    fn malformed_vectors_stay_bounded() {
        let cases: [&[f32]; 6] = [
            &[f32::NAN; 8],
            &[f32::NAN, 0.1, f32::NAN, 0.0, 0.0, 0.0, 0.0, 0.0],
            &[-1.0, -0.5, -3.0, -9.0, -1.0, -1.0, -1.0, -1.0],
            &[f32::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, f32::INFINITY],
            &[0.1, 0.2],
            &[],
        ];
        for probs in cases {
            let est = estimate_or_fallback::<String>(Ok(probs.to_vec()));
            assert!(est.representative_age <= 100);
        }

        let probs = vec![f32::NAN, 0.1, f32::NAN, 0.0, 0.0, 0.0, 0.0, 0.0];
        let est = estimate_or_fallback::<String>(Ok(probs));
        assert_eq!(est.bucket, AgeBucket::B4To6);

        let est = estimate_or_fallback::<String>(Ok(vec![0.1, 0.9]));
        assert_eq!(est.representative_age, FALLBACK_AGE);
        assert!(est.fallback);
    }

    #[test]
    fn classifier_error_gives_twelve() {
        let est = estimate_or_fallback(Err("model crashed"));
        assert_eq!(est.representative_age, 12);
        assert_eq!(est.range, AgeRange::Child);
        assert_eq!(est.bucket, AgeBucket::B8To12);
        assert!(est.fallback);
    }

    #[test]
    fn range_partition_boundaries() {
        let expected = [
            (0, AgeRange::Infant),
            (2, AgeRange::Infant),
            (3, AgeRange::Child),
            (12, AgeRange::Child),
            (13, AgeRange::Adolescent),
            (18, AgeRange::Adolescent),
            (19, AgeRange::YoungAdult),
            (30, AgeRange::YoungAdult),
            (31, AgeRange::Adult30To40),
            (40, AgeRange::Adult30To40),
            (41, AgeRange::Adult40To50),
            (50, AgeRange::Adult40To50),
            (51, AgeRange::Adult50To60),
            (60, AgeRange::Adult50To60),
            (61, AgeRange::Senior),
            (100, AgeRange::Senior),
        ];
        for (age, range) in expected {
            assert_eq!(AgeRange::classify(age), range, "age {age}");
        }
    }

    #[test]
    fn range_partition_is_monotonic() {
        // every age maps to exactly one band and bands never go backwards
        let mut previous = AgeRange::classify(0) as u8;
        for age in 1..=100u8 {
            let current = AgeRange::classify(age) as u8;
            assert!(current == previous || current == previous + 1, "age {age}");
            previous = current;
        }
        assert_eq!(previous, AgeRange::Senior as u8);
    }

    #[test]
    fn representative_ages_match_buckets() {
        let ages: Vec<u8> = AgeBucket::ALL.iter().map(|b| b.representative_age()).collect();
        assert_eq!(ages, vec![1, 5, 10, 18, 28, 40, 50, 70]);
        for bucket in AgeBucket::ALL {
            assert_eq!(AgeEstimate::from_age(bucket.representative_age()).bucket, bucket);
        }
    }

    #[test]
    fn from_age_clamps() {
        assert_eq!(AgeEstimate::from_age(250).representative_age, 100);
    }
}

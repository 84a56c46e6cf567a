// ComparisonRanker - pick the channel with the highest SNR
//
// Ties go to the entry seen first, so a fixed input order always yields
// the same winner.

use crate::analysis::types::{ChannelResult, QualityScore};
use crate::error::AnalysisError;

/// Name of the entry with the highest `snr_db`.
///
/// Entries are visited in iteration order and a later entry only wins with
/// a strictly greater SNR.
pub fn rank<'a, I>(entries: I) -> Result<&'a str, AnalysisError>
where
    I: IntoIterator<Item = (&'a str, &'a QualityScore)>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for (name, score) in entries {
        match best {
            Some((_, best_snr)) if score.snr_db <= best_snr => {}
            // NaN never displaces an existing winner
            Some(_) if score.snr_db.is_nan() => {}
            _ => best = Some((name, score.snr_db)),
        }
    }
    best.map(|(name, _)| name).ok_or(AnalysisError::EmptyInput)
}

/// Best channel among analyzed results, in the order given.
pub fn best_channel(results: &[ChannelResult]) -> Result<&str, AnalysisError> {
    rank(results.iter().map(|r| (r.name.as_str(), &r.score)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(snr_db: f64) -> QualityScore {
        QualityScore {
            snr_db,
            noise_floor_db: -40.0,
        }
    }

    #[test]
    fn test_tie_goes_to_first_entry() {
        let (a, b, c) = (scored(5.0), scored(5.0), scored(3.0));
        for _ in 0..10 {
            let best = rank([("A", &a), ("B", &b), ("C", &c)]).expect("non-empty");
            assert_eq!(best, "A");
        }
    }

    #[test]
    fn test_strictly_greater_wins() {
        let (a, b, c) = (scored(1.0), scored(7.5), scored(7.4));
        assert_eq!(rank([("A", &a), ("B", &b), ("C", &c)]), Ok("B"));
    }

    #[test]
    fn test_sentinel_scores_tie() {
        let (a, b) = (scored(0.0), scored(0.0));
        assert_eq!(rank([("first", &a), ("second", &b)]), Ok("first"));
    }

    #[test]
    fn test_negative_infinity_can_lose() {
        let (a, b) = (scored(f64::NEG_INFINITY), scored(-3.0));
        assert_eq!(rank([("muted", &a), ("noisy", &b)]), Ok("noisy"));
    }

    #[test]
    fn test_nan_does_not_win() {
        let (a, b) = (scored(-10.0), scored(f64::NAN));
        assert_eq!(rank([("A", &a), ("B", &b)]), Ok("A"));
    }

    #[test]
    fn test_empty_input_fails() {
        let err = rank(std::iter::empty()).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyInput);
        assert_eq!(best_channel(&[]), Err(AnalysisError::EmptyInput));
    }
}

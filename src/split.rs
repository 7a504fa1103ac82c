//! Partitioning a trade amount into streams.
//!
//! Each stream is routed separately, so a large trade can spread over several
//! paths. Shares are exact: amounts always add up to the total and fractions
//! to exactly one, with the last stream absorbing the rounding remainder.

use crate::errors::RouteError;
use crate::RouteResult;
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;

/// How to split the requested amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Streams {
    /// `n` equal streams
    Count(usize),
    /// One stream per weight, proportional to it
    Weights(Vec<u64>),
}

impl Streams {
    fn weights(&self) -> RouteResult<Vec<u64>> {
        let weights = match self {
            Streams::Count(0) => {
                return Err(RouteError::InvalidStreams {
                    reason: "stream count must be at least 1".to_string(),
                })
            }
            Streams::Count(count) => vec![1; *count],
            Streams::Weights(weights) => weights.clone(),
        };

        if weights.is_empty() {
            return Err(RouteError::InvalidStreams {
                reason: "no stream weights given".to_string(),
            });
        }
        if let Some(index) = weights.iter().position(|weight| *weight == 0) {
            return Err(RouteError::InvalidStreams {
                reason: format!("weight of stream {} is zero", index),
            });
        }
        Ok(weights)
    }

    pub fn len(&self) -> usize {
        match self {
            Streams::Count(count) => *count,
            Streams::Weights(weights) => weights.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Streams {
    fn default() -> Self {
        Streams::Count(1)
    }
}

impl FromStr for Streams {
    type Err = RouteError;

    /// Parse `"3"` as three equal streams and `"1,1,2"` as weights.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RouteError::InvalidStreams {
            reason: format!("cannot parse streams from '{}'", s),
        };
        let trimmed = s.trim();
        if trimmed.contains(',') {
            let weights = trimmed
                .split(',')
                .map(|part| part.trim().parse::<u64>().map_err(|_| invalid()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Streams::Weights(weights))
        } else {
            trimmed.parse::<usize>().map(Streams::Count).map_err(|_| invalid())
        }
    }
}

impl fmt::Display for Streams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Streams::Count(count) => write!(f, "{}", count),
            Streams::Weights(weights) => {
                let parts: Vec<String> = weights.iter().map(u64::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// One stream's portion of the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamShare {
    pub amount: BigUint,
    /// Exact fraction of the total
    pub share: BigRational,
}

impl StreamShare {
    /// The share as a display percentage
    pub fn percent(&self) -> f64 {
        (&self.share * BigRational::from_integer(BigInt::from(100)))
            .to_f64()
            .unwrap_or_default()
    }
}

/// Split `total` into stream shares.
///
/// # Errors
///
/// Returns `InvalidStreams` for a zero count, no weights, a zero weight, or a
/// total too small to give every stream a non-zero amount.
pub fn split_amount(total: &BigUint, streams: &Streams) -> RouteResult<Vec<StreamShare>> {
    let weights = streams.weights()?;
    // Summed wide: u64 weights can overflow u64
    let weight_sum: BigUint = weights.iter().map(|weight| BigUint::from(*weight)).sum();
    let last = weights.len() - 1;

    let mut shares = Vec::with_capacity(weights.len());
    let mut assigned_amount = BigUint::zero();
    let mut assigned_share = BigRational::zero();

    for (index, weight) in weights.iter().enumerate() {
        let (amount, share) = if index == last {
            (total - &assigned_amount, BigRational::one() - &assigned_share)
        } else {
            (
                total * *weight / &weight_sum,
                BigRational::new(BigInt::from(*weight), BigInt::from(weight_sum.clone())),
            )
        };

        if amount.is_zero() {
            return Err(RouteError::InvalidStreams {
                reason: format!(
                    "amount {} is too small for {} streams",
                    total,
                    weights.len()
                ),
            });
        }

        assigned_amount += &amount;
        assigned_share += &share;
        shares.push(StreamShare { amount, share });
    }

    tracing::debug!(
        total = %total,
        streams = shares.len(),
        "Split amount into streams"
    );
    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_split_is_exact() {
        let total = BigUint::from(100u32);

        let shares = split_amount(&total, &Streams::Count(3)).unwrap();

        let amounts: Vec<BigUint> = shares.iter().map(|share| share.amount.clone()).collect();
        assert_eq!(
            amounts,
            vec![BigUint::from(33u32), BigUint::from(33u32), BigUint::from(34u32)]
        );
        let share_sum: BigRational = shares.iter().map(|share| share.share.clone()).sum();
        assert_eq!(share_sum, BigRational::one());
        let amount_sum: BigUint = amounts.iter().sum();
        assert_eq!(amount_sum, total);
    }

    #[test]
    fn test_weighted_split() {
        let shares = split_amount(&BigUint::from(1_000u32), &Streams::Weights(vec![1, 1, 2])).unwrap();

        assert_eq!(shares[0].amount, BigUint::from(250u32));
        assert_eq!(shares[1].amount, BigUint::from(250u32));
        assert_eq!(shares[2].amount, BigUint::from(500u32));
        assert_eq!(shares[2].share, BigRational::new(1.into(), 2.into()));
        assert!((shares[0].percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_streams_are_rejected() {
        let total = BigUint::from(100u32);
        for streams in [
            Streams::Count(0),
            Streams::Weights(vec![]),
            Streams::Weights(vec![1, 0]),
        ] {
            assert!(
                matches!(split_amount(&total, &streams), Err(RouteError::InvalidStreams { .. })),
                "expected {:?} to be rejected",
                streams
            );
        }
    }

    #[test]
    fn test_weights_near_u64_max_split_without_overflow() {
        let total = BigUint::from(1_000u32);

        let shares = split_amount(&total, &Streams::Weights(vec![u64::MAX, 1])).unwrap();

        assert_eq!(shares[0].amount, BigUint::from(999u32));
        assert_eq!(shares[1].amount, BigUint::from(1u32));
        let weight_sum = BigInt::from(u64::MAX) + 1;
        assert_eq!(shares[1].share, BigRational::new(BigInt::one(), weight_sum));
        let share_sum: BigRational = shares.iter().map(|share| share.share.clone()).sum();
        assert_eq!(share_sum, BigRational::one());
    }

    #[test]
    fn test_amount_too_small_for_streams() {
        let err = split_amount(&BigUint::from(2u32), &Streams::Count(3)).unwrap_err();
        assert!(matches!(err, RouteError::InvalidStreams { .. }));
    }

    #[test]
    fn test_parse_streams() {
        assert_eq!("3".parse::<Streams>().unwrap(), Streams::Count(3));
        assert_eq!(
            " 1, 1,2 ".parse::<Streams>().unwrap(),
            Streams::Weights(vec![1, 1, 2])
        );
        assert!("three".parse::<Streams>().is_err());
        assert_eq!(Streams::Weights(vec![1, 2]).to_string(), "1,2");
    }
}
